//! Request deadline middleware.
//!
//! Downstream processing races a fixed deadline. When the deadline wins, the
//! downstream future is dropped, cancelling the handler at its next `.await`,
//! and the client receives `408 Request Timeout`.
//!
//! Attach it to a resource, not the app; see [`crate::middleware`].

use std::task::{Context, Poll};
use std::time::Duration;

use actix_web::body::{BoxBody, MessageBody};
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{Error, ResponseError};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::warn;

use crate::inbound::http::error::ApiError;
use crate::middleware::context::RequestContext;

/// Default deadline applied to every request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Bound the time spent downstream.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use actix_web::{App, HttpResponse, web};
/// use user_service::middleware::Timeout;
///
/// let app = App::new().service(
///     web::resource("/")
///         .wrap(Timeout::new(Duration::from_secs(5)))
///         .route(web::get().to(HttpResponse::Ok)),
/// );
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Timeout {
    limit: Duration,
}

impl Timeout {
    /// Apply `limit` to every request.
    pub fn new(limit: Duration) -> Self {
        Self { limit }
    }
}

impl Default for Timeout {
    fn default() -> Self {
        Self::new(DEFAULT_REQUEST_TIMEOUT)
    }
}

impl<S, B> Transform<S, ServiceRequest> for Timeout
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type InitError = ();
    type Transform = TimeoutMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(TimeoutMiddleware {
            service,
            limit: self.limit,
        }))
    }
}

/// Service wrapper produced by [`Timeout`].
pub struct TimeoutMiddleware<S> {
    service: S,
    limit: Duration,
}

impl<S, B> Service<ServiceRequest> for TimeoutMiddleware<S>
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
        let limit = self.limit;
        let fut = self.service.call(req);
        Box::pin(async move {
            match tokio::time::timeout(limit, fut).await {
                Ok(result) => result.map(ServiceResponse::map_into_boxed_body),
                Err(_) => {
                    warn!(
                        method = %ctx.method,
                        path = %ctx.path,
                        client_ip = %ctx.client_ip,
                        timeout_ms = u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
                        "request timed out"
                    );
                    let response = ApiError::request_timeout("Request timeout").error_response();
                    Ok(ServiceResponse::new(http_req, response))
                }
            }
        })
    }
}
