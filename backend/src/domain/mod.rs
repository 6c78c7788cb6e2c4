//! Domain primitives and ports.
//!
//! Purpose: define the user entity, its validated field types, the failure
//! taxonomy shared by adapters, and the storage port. Nothing here knows
//! about HTTP.
//!
//! Public surface:
//! - `User`, `UserId`, `Username`, `Email`, `Password`: the user entity.
//! - `ErrorCode`: transport-agnostic failure category.
//! - `RequestId`: task-local correlation identifier.
//! - `ports`: the `UserRepository` port and its errors.

pub mod error;
pub mod ports;
pub mod request_id;
pub mod user;

pub use self::error::ErrorCode;
pub use self::request_id::{REQUEST_ID_HEADER, RequestId};
pub use self::user::{
    Email, PASSWORD_MIN, Password, USERNAME_MAX, USERNAME_MIN, User, UserId, UserValidationError,
    Username,
};
