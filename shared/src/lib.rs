//! Shared types and models for the FarmGuard AI backend
//!
//! This crate contains the class sets, prediction payloads and chat types
//! shared between the HTTP server, the trainer and the tests.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
