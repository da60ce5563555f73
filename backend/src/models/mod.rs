//! Payload types for the FarmGuard AI backend
//!
//! Re-exports the shared class sets and request/response types

pub use shared::models::*;
