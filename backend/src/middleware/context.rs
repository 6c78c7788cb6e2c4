//! Request attributes captured before a request is handed downstream.

use actix_web::dev::ServiceRequest;
use actix_web::http::{Method, header};

/// Identifying details of a request, kept for logging after the request has
/// been consumed.
#[derive(Debug, Clone)]
pub(crate) struct RequestContext {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) client_ip: String,
    pub(crate) user_agent: String,
}

impl RequestContext {
    pub(crate) fn capture(req: &ServiceRequest) -> Self {
        let client_ip = req
            .connection_info()
            .realip_remote_addr()
            .unwrap_or("unknown")
            .to_owned();
        let user_agent = req
            .headers()
            .get(header::USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_owned();
        Self {
            method: req.method().clone(),
            path: req.path().to_owned(),
            client_ip,
            user_agent,
        }
    }
}
