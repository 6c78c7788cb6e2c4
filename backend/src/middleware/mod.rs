//! Request middleware.
//!
//! Purpose: cross-cutting request lifecycle concerns. The server applies
//! them outermost first as [`RequestLogger`], [`Cors`], [`Timeout`],
//! [`ErrorHandler`], then [`Recovery`] closest to the handlers.
//!
//! [`Timeout`], [`ErrorHandler`] and [`Recovery`] keep a clone of the
//! `HttpRequest` while the request is downstream, so they must wrap a
//! resource, never the app: the app router panics on a shared request.

mod context;
pub mod cors;
pub mod error_handler;
pub mod logger;
pub mod recovery;
pub mod timeout;

pub use cors::Cors;
pub use error_handler::ErrorHandler;
pub use logger::RequestLogger;
pub use recovery::Recovery;
pub use timeout::{DEFAULT_REQUEST_TIMEOUT, Timeout};
