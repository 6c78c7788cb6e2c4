//! Panic recovery middleware.
//!
//! A panic raised while building or polling the downstream future is caught
//! here, logged with the request context and converted into a redacted `500`
//! envelope. The worker keeps serving subsequent requests.
//!
//! Attach it to a resource, not the app; see [`crate::middleware`].

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::task::{Context, Poll};

use actix_web::body::{BoxBody, MessageBody};
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{Error, HttpRequest, ResponseError};
use futures_util::FutureExt;
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::error;

use crate::domain::RequestId;
use crate::inbound::http::error::{ApiError, INTERNAL_ERROR_MESSAGE};
use crate::middleware::context::RequestContext;

/// Convert downstream panics into `500 Internal Server Error`.
///
/// # Examples
/// ```
/// use actix_web::{App, HttpResponse, web};
/// use user_service::middleware::Recovery;
///
/// let app = App::new().service(
///     web::resource("/")
///         .wrap(Recovery)
///         .route(web::get().to(HttpResponse::Ok)),
/// );
/// ```
#[derive(Clone)]
pub struct Recovery;

impl<S, B> Transform<S, ServiceRequest> for Recovery
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type InitError = ();
    type Transform = RecoveryMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RecoveryMiddleware { service }))
    }
}

/// Service wrapper produced by [`Recovery`].
pub struct RecoveryMiddleware<S> {
    service: S,
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

fn recovered(
    http_req: HttpRequest,
    ctx: &RequestContext,
    payload: &(dyn Any + Send),
) -> ServiceResponse<BoxBody> {
    let request_id = RequestId::current();
    error!(
        request_id = request_id.as_ref().map(RequestId::as_str),
        method = %ctx.method,
        path = %ctx.path,
        client_ip = %ctx.client_ip,
        user_agent = %ctx.user_agent,
        panic = panic_message(payload),
        "recovered from panic while handling request"
    );
    let response = ApiError::internal(INTERNAL_ERROR_MESSAGE).error_response();
    ServiceResponse::new(http_req, response)
}

impl<S, B> Service<ServiceRequest> for RecoveryMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let http_req = req.request().clone();
        let ctx = RequestContext::capture(&req);
        let fut = match catch_unwind(AssertUnwindSafe(|| self.service.call(req))) {
            Ok(fut) => fut,
            Err(payload) => {
                let res = recovered(http_req, &ctx, payload.as_ref());
                return Box::pin(async move { Ok(res) });
            }
        };
        Box::pin(async move {
            match AssertUnwindSafe(fut).catch_unwind().await {
                Ok(result) => result.map(ServiceResponse::map_into_boxed_body),
                Err(payload) => Ok(recovered(http_req, &ctx, payload.as_ref())),
            }
        })
    }
}
