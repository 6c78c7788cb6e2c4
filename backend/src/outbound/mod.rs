//! Outbound adapters implementing domain ports.
//!
//! - **memory**: process-local user repository guarded by a read-write lock.
//!
//! Adapters are thin translators between domain types and their storage
//! representation. They contain no request-handling logic.

pub mod memory;
