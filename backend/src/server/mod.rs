//! Server construction and middleware wiring.

mod config;

pub use config::{DEFAULT_SHUTDOWN_TIMEOUT, ServerConfig};

use std::sync::Arc;
use std::time::Duration;

use actix_web::dev::{Server, ServerHandle, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::{info, warn};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::domain::ports::UserRepository;
use crate::inbound::http::health::HealthState;
use crate::inbound::http::routes::{not_found, register};
use crate::inbound::http::state::{AppInfo, HttpState};
use crate::middleware::{Cors, RequestLogger};
use crate::outbound::memory::InMemoryUserRepository;

/// Shared state cloned into every worker's application.
#[derive(Clone)]
pub struct AppDependencies {
    pub health_state: web::Data<HealthState>,
    pub http_state: web::Data<HttpState>,
    pub request_timeout: Duration,
}

impl AppDependencies {
    /// Bundle state around a fresh in-memory user repository.
    pub fn in_memory(app: AppInfo, request_timeout: Duration) -> Self {
        let users: Arc<dyn UserRepository> = Arc::new(InMemoryUserRepository::new());
        Self {
            health_state: web::Data::new(HealthState::new()),
            http_state: web::Data::new(HttpState::new(users, app)),
            request_timeout,
        }
    }
}

/// Assemble the application: routes, fallbacks and the middleware chain.
///
/// Middleware runs outermost first: request logging and CORS for the whole
/// app, then the timeout, error mapping and panic recovery attached to each
/// routed resource by [`register`].
pub fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        request_timeout,
    } = deps;

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .configure(|cfg| register(cfg, request_timeout));

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app.default_service(web::to(not_found))
        .wrap(Cors)
        .wrap(RequestLogger)
}

/// Construct an Actix HTTP server from shared dependencies and configuration.
///
/// OS signal handling is disabled; callers drive shutdown through the
/// returned server's handle, e.g. with [`spawn_graceful_shutdown`].
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(deps: AppDependencies, config: &ServerConfig) -> std::io::Result<Server> {
    let health_state = deps.health_state.clone();
    let deps = AppDependencies {
        request_timeout: config.request_timeout(),
        ..deps
    };
    let server = HttpServer::new(move || build_app(deps.clone()))
        .bind(config.bind_addr())?
        .shutdown_timeout(config.shutdown_timeout().as_secs())
        .disable_signals()
        .run();

    health_state.mark_ready();
    Ok(server)
}

/// Resolve once SIGINT or SIGTERM is received.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            warn!(%error, "failed to listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                warn!(%error, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!(signal = "SIGINT", "shutdown signal received"),
        () = terminate => info!(signal = "SIGTERM", "shutdown signal received"),
    }
}

/// Stop the server gracefully once a shutdown signal arrives.
///
/// Health checks start failing before the listener stops so load balancers
/// drain traffic; in-flight requests then get the configured grace period.
pub fn spawn_graceful_shutdown(handle: ServerHandle, health_state: web::Data<HealthState>) {
    actix_web::rt::spawn(async move {
        shutdown_signal().await;
        health_state.mark_unhealthy();
        handle.stop(true).await;
        info!("server stopped");
    });
}
