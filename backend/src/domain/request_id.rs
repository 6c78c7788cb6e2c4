//! Request-scoped correlation identifier.
//!
//! `RequestId` follows a request through the middleware chain and handlers.
//! It lives in task-local storage so log statements can pick it up without
//! threading it through every call.
//!
//! Tokio task-local variables are not inherited across spawned tasks. Use
//! [`RequestId::scope`] when spawning new tasks so the identifier propagates.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use tokio::task_local;
use uuid::Uuid;

/// Header used to accept and echo request identifiers.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest client-supplied identifier that will be honoured.
const MAX_REQUEST_ID_LEN: usize = 128;

task_local! {
    static REQUEST_ID: RequestId;
}

/// Per-request correlation identifier exposed via task-local storage.
///
/// # Examples
/// ```
/// use user_service::domain::RequestId;
///
/// async fn handler() {
///     if let Some(id) = RequestId::current() {
///         tracing::info!(request_id = %id, "handling request");
///     }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(Arc<str>);

impl RequestId {
    /// Generate a fresh identifier backed by a random UUID.
    pub fn generate() -> Self {
        Self(Arc::from(Uuid::new_v4().to_string()))
    }

    /// Accept a client-supplied identifier when it is printable ASCII,
    /// non-empty and reasonably short.
    pub fn from_client(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        let acceptable = !trimmed.is_empty()
            && trimmed.len() <= MAX_REQUEST_ID_LEN
            && trimmed.bytes().all(|b| b.is_ascii_graphic());
        acceptable.then(|| Self(Arc::from(trimmed)))
    }

    /// Returns the identifier in scope, if any.
    pub fn current() -> Option<Self> {
        REQUEST_ID.try_with(Clone::clone).ok()
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Execute the future with the supplied identifier in scope.
    ///
    /// # Examples
    /// ```
    /// use user_service::domain::RequestId;
    ///
    /// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
    /// let id = RequestId::from_client("abc-123").expect("valid id");
    /// let observed = RequestId::scope(id.clone(), async { RequestId::current() }).await;
    /// assert_eq!(observed, Some(id));
    /// # });
    /// ```
    pub async fn scope<Fut>(id: RequestId, fut: Fut) -> Fut::Output
    where
        Fut: Future,
    {
        REQUEST_ID.scope(id, fut).await
    }

    /// Run a synchronous closure with the supplied identifier in scope.
    pub fn sync_scope<F, R>(id: RequestId, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        REQUEST_ID.sync_scope(id, f)
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
