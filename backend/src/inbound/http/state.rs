//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports and remain testable without I/O.

use std::sync::Arc;
use std::time::Instant;

use mockable::{Clock, DefaultClock};

use crate::domain::ports::UserRepository;

/// Identity of the running application, reported by the status endpoint.
#[derive(Debug, Clone)]
pub struct AppInfo {
    pub name: String,
    pub version: String,
    pub started_at: Instant,
}

impl AppInfo {
    /// Capture application identity with the start instant set to now.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            started_at: Instant::now(),
        }
    }
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub users: Arc<dyn UserRepository>,
    pub app: AppInfo,
    pub clock: Arc<dyn Clock + Send + Sync>,
}

impl HttpState {
    /// Construct state using the system clock.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use user_service::inbound::http::state::{AppInfo, HttpState};
    /// use user_service::outbound::memory::InMemoryUserRepository;
    ///
    /// let state = HttpState::new(
    ///     Arc::new(InMemoryUserRepository::new()),
    ///     AppInfo::new("user-service", "1.0.0"),
    /// );
    /// assert_eq!(state.app.name, "user-service");
    /// ```
    pub fn new(users: Arc<dyn UserRepository>, app: AppInfo) -> Self {
        Self::with_clock(users, app, Arc::new(DefaultClock))
    }

    /// Construct state with an explicit wall clock.
    pub fn with_clock(
        users: Arc<dyn UserRepository>,
        app: AppInfo,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Self {
        Self { users, app, clock }
    }
}
