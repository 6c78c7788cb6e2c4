//! Application settings loaded via OrthoConfig.
//!
//! Values come from CLI flags, `APP_*` environment variables and optional
//! configuration files, in OrthoConfig's usual precedence. Fields carry
//! their defaults in the derive, so loading succeeds with no sources at all.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

/// Errors raised when settings hold unusable values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("unknown log format `{0}`; expected `json` or `text`")]
    LogFormat(String),
    #[error("unknown log output `{0}`; expected `stdout`, `stderr` or `file`")]
    LogOutput(String),
    #[error("invalid bind address `{0}`")]
    BindAddress(String),
}

/// Log line encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Json,
    Text,
}

impl FromStr for LogFormat {
    type Err = SettingsError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "text" | "console" => Ok(Self::Text),
            _ => Err(SettingsError::LogFormat(value.to_owned())),
        }
    }
}

/// Log destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogOutput {
    #[default]
    Stdout,
    Stderr,
    File,
}

impl FromStr for LogOutput {
    type Err = SettingsError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "stdout" => Ok(Self::Stdout),
            "stderr" => Ok(Self::Stderr),
            "file" => Ok(Self::File),
            _ => Err(SettingsError::LogOutput(value.to_owned())),
        }
    }
}

/// Resolved logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub level: String,
    pub format: LogFormat,
    pub output: LogOutput,
    pub directory: PathBuf,
    pub filename: String,
}

/// Configuration values controlling the service at startup.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "APP")]
pub struct AppSettings {
    /// Application name reported by the status endpoint.
    #[ortho_config(default = String::from("user-service"), cli_short = 'n')]
    pub name: String,
    /// Application version reported by the status endpoint.
    #[ortho_config(cli_long = "app-version", cli_short = 'v')]
    pub version: Option<String>,
    /// Interface to bind.
    #[ortho_config(default = String::from("0.0.0.0"), cli_short = 'H')]
    pub host: String,
    /// Port to bind.
    #[ortho_config(default = 9000, cli_short = 'p')]
    pub port: u16,
    /// Log filter directive, e.g. `info` or `user_service=debug`.
    #[ortho_config(default = String::from("info"), cli_short = 'l')]
    pub log_level: String,
    /// `json` or `text`.
    #[ortho_config(default = String::from("json"), cli_short = 'f')]
    pub log_format: String,
    /// `stdout`, `stderr` or `file`.
    #[ortho_config(default = String::from("stdout"), cli_short = 'o')]
    pub log_output: String,
    /// Directory receiving log files when `log_output` is `file`.
    #[ortho_config(default = PathBuf::from("logs"), cli_short = 'd')]
    pub log_directory: PathBuf,
    /// Base file name for rotated log files.
    #[ortho_config(default = String::from("app.log"), cli_short = 'F')]
    pub log_filename: String,
    /// Per-request deadline in seconds.
    #[ortho_config(default = 10, cli_short = 't')]
    pub request_timeout_secs: u64,
    /// Grace period for in-flight requests during shutdown, in seconds.
    #[ortho_config(default = 5, cli_short = 's')]
    pub shutdown_timeout_secs: u64,
}

impl AppSettings {
    /// Return the configured application name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return the configured version, falling back to the crate version.
    pub fn version(&self) -> &str {
        self.version.as_deref().unwrap_or(env!("CARGO_PKG_VERSION"))
    }

    /// Return the configured bind interface.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Return the configured bind port.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Socket address composed from `host` and `port`.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = format!("{}:{}", self.host(), self.port());
        raw.parse().map_err(|_| SettingsError::BindAddress(raw))
    }

    /// Return the per-request deadline.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Return the shutdown grace period.
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }

    /// Resolve and validate the logging settings.
    pub fn log_settings(&self) -> Result<LogSettings, SettingsError> {
        Ok(LogSettings {
            level: self.log_level.clone(),
            format: self.log_format.parse()?,
            output: self.log_output.parse()?,
            directory: self.log_directory.clone(),
            filename: self.log_filename.clone(),
        })
    }
}
