//! Route table for the HTTP adapter.
//!
//! Every path, versioned or legacy, is listed once in [`ROUTE_TABLE`] with the
//! endpoints it serves, so legacy aliases always share handlers with their
//! versioned counterparts. Each path becomes a single `web::resource` carrying
//! all of its method routes; a method the resource does not serve yields 405.
//!
//! Timeout, error normalisation and panic recovery wrap each resource rather
//! than the app: they keep a request handle to build their own responses,
//! and the app router needs sole ownership of the request while matching.

use std::time::Duration;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{HttpRequest, HttpResponse, Resource, Route, error::JsonPayloadError, web};

use crate::inbound::http::ApiResult;
use crate::inbound::http::error::ApiError;
use crate::inbound::http::health::{health, live, ready, status};
use crate::inbound::http::users::{create_user, delete_user, get_user, list_users, update_user};
use crate::inbound::http::validation::invalid_body_error;
use crate::middleware::{DEFAULT_REQUEST_TIMEOUT, ErrorHandler, Recovery, Timeout};

/// Endpoints reachable through the route table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Health,
    Status,
    Ready,
    Live,
    CreateUser,
    ListUsers,
    GetUser,
    UpdateUser,
    DeleteUser,
}

impl Endpoint {
    fn route(self) -> Route {
        match self {
            Self::Health => web::get().to(health),
            Self::Status => web::get().to(status),
            Self::Ready => web::get().to(ready),
            Self::Live => web::get().to(live),
            Self::CreateUser => web::post().to(create_user),
            Self::ListUsers => web::get().to(list_users),
            Self::GetUser => web::get().to(get_user),
            Self::UpdateUser => web::put().to(update_user),
            Self::DeleteUser => web::delete().to(delete_user),
        }
    }
}

const USER_ITEM: &[Endpoint] = &[Endpoint::GetUser, Endpoint::UpdateUser, Endpoint::DeleteUser];

/// Path table. Legacy aliases follow the versioned API.
pub const ROUTE_TABLE: &[(&str, &[Endpoint])] = &[
    ("/api/v1/health", &[Endpoint::Health]),
    ("/api/v1/status", &[Endpoint::Status]),
    ("/api/v1/users", &[Endpoint::CreateUser, Endpoint::ListUsers]),
    ("/api/v1/users/{id}", USER_ITEM),
    ("/health/ready", &[Endpoint::Ready]),
    ("/health/live", &[Endpoint::Live]),
    ("/ping", &[Endpoint::Health]),
    ("/status", &[Endpoint::Status]),
    ("/user", &[Endpoint::CreateUser]),
    ("/user/{id}", USER_ITEM),
];

fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    invalid_body_error(&err).into()
}

/// JSON extractor configuration rendering parse failures as envelopes.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(json_error_handler)
}

/// Fallback for paths that match no route.
pub async fn not_found() -> ApiResult<HttpResponse> {
    Err(ApiError::not_found("Resource not found"))
}

async fn method_not_allowed() -> ApiResult<HttpResponse> {
    Err(ApiError::method_not_allowed("Method not allowed"))
}

/// Wrap `resource` in the per-request middleware: the deadline outermost,
/// then error normalisation, then panic recovery around the handlers.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use actix_web::{App, HttpResponse, web};
/// use user_service::inbound::http::routes::guarded;
///
/// let app = App::new().service(guarded(
///     web::resource("/slow").route(web::get().to(HttpResponse::Ok)),
///     Duration::from_secs(5),
/// ));
/// # let _ = app;
/// ```
pub fn guarded(
    resource: Resource,
    request_timeout: Duration,
) -> Resource<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    resource
        .wrap(Recovery)
        .wrap(ErrorHandler)
        .wrap(Timeout::new(request_timeout))
}

/// Register every route in [`ROUTE_TABLE`] with the given request deadline.
pub fn register(cfg: &mut web::ServiceConfig, request_timeout: Duration) {
    cfg.app_data(json_config());
    for (path, endpoints) in ROUTE_TABLE {
        let resource = endpoints.iter().fold(
            web::resource(*path).default_service(web::to(method_not_allowed)),
            |resource, endpoint| resource.route(endpoint.route()),
        );
        cfg.service(guarded(resource, request_timeout));
    }
}

/// Register every route in [`ROUTE_TABLE`] with the default deadline.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use user_service::inbound::http::routes::configure;
///
/// let _app = App::new().configure(configure);
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    register(cfg, DEFAULT_REQUEST_TIMEOUT);
}
