//! Error normalisation middleware.
//!
//! Handlers and extractors attach errors to their responses. An [`ApiError`]
//! already renders the standard envelope and passes through untouched. Any
//! other error is replaced: client errors keep their status with its
//! canonical reason, everything else becomes a generic `500`.
//!
//! Attach it to a resource, not the app; see [`crate::middleware`].

use std::task::{Context, Poll};

use actix_web::body::{BoxBody, MessageBody};
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::StatusCode;
use actix_web::{Error, HttpResponse, ResponseError};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::{error, warn};

use crate::inbound::http::error::ApiError;

/// Map unrecognised errors onto the standard envelope.
///
/// # Examples
/// ```
/// use actix_web::{App, HttpResponse, web};
/// use user_service::middleware::ErrorHandler;
///
/// let app = App::new().service(
///     web::resource("/")
///         .wrap(ErrorHandler)
///         .route(web::get().to(HttpResponse::Ok)),
/// );
/// ```
#[derive(Clone)]
pub struct ErrorHandler;

impl<S, B> Transform<S, ServiceRequest> for ErrorHandler
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type InitError = ();
    type Transform = ErrorHandlerMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ErrorHandlerMiddleware { service }))
    }
}

/// Service wrapper produced by [`ErrorHandler`].
pub struct ErrorHandlerMiddleware<S> {
    service: S,
}

/// Translate a foreign error into the envelope response that replaces it.
fn replacement_for(err: &Error, status: StatusCode) -> HttpResponse {
    if let Some(api_error) = err.as_error::<ApiError>() {
        return api_error.error_response();
    }
    let mapped = if status.is_client_error() {
        warn!(%status, error = %err, "client error mapped to envelope");
        ApiError::from_status(status)
    } else {
        error!(%status, error = %err, "unhandled error mapped to internal error");
        ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR)
    };
    mapped.error_response()
}

impl<S, B> Service<ServiceRequest> for ErrorHandlerMiddleware<S>
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
        let fut = self.service.call(req);
        Box::pin(async move {
            match fut.await {
                Ok(res) => {
                    let replacement = match res.response().error() {
                        Some(err) if err.as_error::<ApiError>().is_none() => {
                            Some(replacement_for(err, res.status()))
                        }
                        _ => None,
                    };
                    Ok(match replacement {
                        Some(response) => res.into_response(response),
                        None => res.map_into_boxed_body(),
                    })
                }
                Err(err) => {
                    let status = err.as_response_error().status_code();
                    let response = replacement_for(&err, status);
                    Ok(ServiceResponse::new(http_req, response))
                }
            }
        })
    }
}
