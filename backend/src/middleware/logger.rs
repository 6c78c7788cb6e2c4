//! Access logging middleware attaching a request-scoped identifier.
//!
//! Each request is tagged with an `x-request-id`: the client's value when it
//! supplies a usable one, otherwise a fresh UUID. The identifier is held in
//! task-local storage for the whole downstream chain, echoed on the response
//! and recorded with one access log line per request.

use std::task::{Context, Poll};
use std::time::Instant;

use actix_web::Error;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::StatusCode;
use actix_web::http::header::{HeaderName, HeaderValue};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::{error, info, warn};

use crate::domain::{REQUEST_ID_HEADER, RequestId};
use crate::middleware::context::RequestContext;

/// Middleware logging every request and propagating its request identifier.
///
/// Handlers can read the identifier via [`RequestId::current`].
///
/// # Examples
/// ```
/// use actix_web::App;
/// use user_service::middleware::RequestLogger;
///
/// let app = App::new().wrap(RequestLogger);
/// ```
#[derive(Clone)]
pub struct RequestLogger;

impl<S, B> Transform<S, ServiceRequest> for RequestLogger
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestLoggerMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestLoggerMiddleware { service }))
    }
}

/// Service wrapper produced by [`RequestLogger`].
pub struct RequestLoggerMiddleware<S> {
    service: S,
}

fn request_id_for(req: &ServiceRequest) -> RequestId {
    req.headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(RequestId::from_client)
        .unwrap_or_else(RequestId::generate)
}

fn log_completion(ctx: &RequestContext, request_id: &RequestId, status: StatusCode, started: Instant) {
    let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    let status = status.as_u16();
    macro_rules! access_log {
        ($level:ident) => {
            $level!(
                request_id = %request_id,
                method = %ctx.method,
                path = %ctx.path,
                client_ip = %ctx.client_ip,
                user_agent = %ctx.user_agent,
                status,
                duration_ms,
                "request completed"
            )
        };
    }
    match status {
        500.. => access_log!(error),
        400..500 => access_log!(warn),
        _ => access_log!(info),
    }
}

impl<S, B> Service<ServiceRequest> for RequestLoggerMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let request_id = request_id_for(&req);
        let ctx = RequestContext::capture(&req);
        let started = Instant::now();
        let fut = RequestId::sync_scope(request_id.clone(), || self.service.call(req));
        Box::pin(RequestId::scope(request_id.clone(), async move {
            match fut.await {
                Ok(mut res) => {
                    match HeaderValue::from_str(request_id.as_str()) {
                        Ok(value) => {
                            res.response_mut()
                                .headers_mut()
                                .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
                        }
                        Err(error) => {
                            error!(
                                %error,
                                request_id = %request_id,
                                "failed to encode request identifier header"
                            );
                        }
                    }
                    log_completion(&ctx, &request_id, res.status(), started);
                    Ok(res)
                }
                Err(err) => {
                    let status = err.as_response_error().status_code();
                    log_completion(&ctx, &request_id, status, started);
                    Err(err)
                }
            }
        }))
    }
}
