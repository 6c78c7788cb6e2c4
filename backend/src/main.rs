//! Service entry-point: loads settings, installs logging, serves HTTP until a
//! shutdown signal drains the server.

use ortho_config::OrthoConfig;
use tracing::info;

use user_service::config::AppSettings;
use user_service::inbound::http::state::AppInfo;
use user_service::server::{AppDependencies, ServerConfig, create_server, spawn_graceful_shutdown};
use user_service::telemetry;

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let settings = AppSettings::load()
        .map_err(|err| std::io::Error::other(format!("failed to load settings: {err}")))?;
    let log_settings = settings.log_settings().map_err(std::io::Error::other)?;
    let _telemetry = telemetry::init(&log_settings).map_err(std::io::Error::other)?;
    let server_config = ServerConfig::from_settings(&settings).map_err(std::io::Error::other)?;

    let deps = AppDependencies::in_memory(
        AppInfo::new(settings.name(), settings.version()),
        server_config.request_timeout(),
    );
    let health_state = deps.health_state.clone();
    let server = create_server(deps, &server_config)?;
    spawn_graceful_shutdown(server.handle(), health_state);

    let bind_addr = server_config.bind_addr();
    info!(
        app_name = settings.name(),
        version = settings.version(),
        %bind_addr,
        api_base_url = %format!("http://{bind_addr}/api/v1"),
        log_format = ?log_settings.format,
        log_output = ?log_settings.output,
        request_timeout_secs = server_config.request_timeout().as_secs(),
        "server started"
    );

    server.await?;
    info!("shutdown complete");
    Ok(())
}
