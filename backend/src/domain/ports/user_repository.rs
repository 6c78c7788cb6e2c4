//! Port abstraction for user storage adapters and their errors.

use async_trait::async_trait;

use crate::domain::{Email, User, UserId, Username};

use super::define_port_error;

/// Which unique attribute a conflicting write collided on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Username,
    Email,
}

impl UniqueField {
    /// Request field name for the attribute.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Username => "username",
            Self::Email => "email",
        }
    }
}

impl std::fmt::Display for UniqueField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

define_port_error! {
    /// Failures raised by user repository adapters.
    pub enum UserRepositoryError {
        /// A user with the same identifier is already stored.
        AlreadyExists { id: String } => "user with id {id} already exists",
        /// Another user already holds the username or email.
        Conflict { field: UniqueField } => "{field} already in use by another user",
        /// No user matches the lookup.
        NotFound { key: String } => "user {key} not found",
    }
}

/// Storage port for user entities.
///
/// Implementations are the sole arbiter of the identity and uniqueness
/// invariants; every call is atomic with respect to every other call.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user, stamping both timestamps with the current time.
    async fn create(&self, user: User) -> Result<User, UserRepositoryError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<User, UserRepositoryError>;

    /// Fetch a user by username.
    async fn find_by_username(&self, username: &Username) -> Result<User, UserRepositoryError>;

    /// Fetch a user by email address.
    async fn find_by_email(&self, email: &Email) -> Result<User, UserRepositoryError>;

    /// Return every stored user. Ordering is adapter-defined.
    async fn list(&self) -> Result<Vec<User>, UserRepositoryError>;

    /// Replace a stored user, preserving its creation time and refreshing
    /// its update time.
    async fn update(&self, user: User) -> Result<User, UserRepositoryError>;

    /// Remove a user.
    async fn delete(&self, id: &UserId) -> Result<(), UserRepositoryError>;
}
