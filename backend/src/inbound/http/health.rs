//! Health endpoints: service health, application status and the liveness and
//! readiness probes used by orchestrators and load balancers.
//! Documented in OpenAPI via Utoipa.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use actix_web::{HttpResponse, http::header, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::inbound::http::ApiResult;
use crate::inbound::http::envelope::{ok, ok_message};
use crate::inbound::http::error::ApiError;
use crate::inbound::http::state::HttpState;

/// Shared health state for readiness and liveness checks.
pub struct HealthState {
    ready: AtomicBool,
    live: AtomicBool,
}

impl Default for HealthState {
    fn default() -> Self {
        Self {
            ready: AtomicBool::new(false),
            live: AtomicBool::new(true),
        }
    }
}

impl HealthState {
    /// Create a new health state starting as not ready but live.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the service as ready.
    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    /// Flag the service as draining so health checks fail fast during shutdown.
    pub fn mark_unhealthy(&self) {
        self.live.store(false, Ordering::Release);
    }

    /// Return readiness state.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Return liveness state. When false, probes emit 503.
    pub fn is_alive(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    fn probe_response(probe_ok: bool) -> HttpResponse {
        let mut response = if probe_ok {
            HttpResponse::Ok()
        } else {
            HttpResponse::ServiceUnavailable()
        };

        response
            .insert_header((header::CACHE_CONTROL, "no-store"))
            .finish()
    }
}

/// Payload of the application status endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatusResponse {
    /// Always `ok` while the process answers requests.
    #[schema(example = "ok")]
    pub status: String,
    #[schema(example = "user-service")]
    pub app_name: String,
    #[schema(example = "1.0.0")]
    pub version: String,
    /// Human-readable time since start-up.
    #[schema(example = "1h2m3s")]
    pub uptime: String,
    pub uptime_secs: u64,
    pub timestamp: DateTime<Utc>,
}

/// Render an uptime such as `1h2m3s`, `4m0s` or `2.350s`.
pub(crate) fn format_uptime(uptime: Duration) -> String {
    let total = uptime.as_secs();
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);
    if hours > 0 {
        format!("{hours}h{minutes}m{seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m{seconds}s")
    } else {
        format!("{seconds}.{:03}s", uptime.subsec_millis())
    }
}

/// Service health check. Answers 503 once shutdown has begun.
#[utoipa::path(
    get,
    path = "/api/v1/health",
    tags = ["health"],
    responses(
        (status = 200, description = "Service is healthy"),
        (status = 503, description = "Service is shutting down")
    ),
    operation_id = "health"
)]
pub async fn health(state: web::Data<HealthState>) -> ApiResult<HttpResponse> {
    if !state.is_alive() {
        return Err(ApiError::service_unavailable("Service is shutting down"));
    }
    Ok(ok_message("Service is healthy"))
}

/// Application identity and uptime.
#[utoipa::path(
    get,
    path = "/api/v1/status",
    tags = ["health"],
    responses((status = 200, description = "Application status", body = StatusResponse)),
    operation_id = "status"
)]
pub async fn status(state: web::Data<HttpState>) -> HttpResponse {
    let uptime = state.app.started_at.elapsed();
    ok(
        "Application status",
        StatusResponse {
            status: "ok".to_owned(),
            app_name: state.app.name.clone(),
            version: state.app.version.clone(),
            uptime: format_uptime(uptime),
            uptime_secs: uptime.as_secs(),
            timestamp: state.clock.utc(),
        },
    )
}

/// Readiness probe. Return 200 once the server is initialised; 503 otherwise.
#[utoipa::path(
    get,
    path = "/health/ready",
    tags = ["health"],
    responses(
        (status = 200, description = "Server is ready to handle traffic"),
        (status = 503, description = "Server is not ready")
    ),
    operation_id = "ready"
)]
pub async fn ready(state: web::Data<HealthState>) -> HttpResponse {
    HealthState::probe_response(state.is_ready())
}

/// Liveness probe. Return 200 while the process is marked alive and 503 once draining.
/// Call `HealthState::mark_unhealthy` before graceful shutdown to surface the drain early.
#[utoipa::path(
    get,
    path = "/health/live",
    tags = ["health"],
    responses(
        (status = 200, description = "Server is alive"),
        (status = 503, description = "Server is shutting down")
    ),
    operation_id = "live"
)]
pub async fn live(state: web::Data<HealthState>) -> HttpResponse {
    HealthState::probe_response(state.is_alive())
}
