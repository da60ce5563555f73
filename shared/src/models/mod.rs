//! Domain models for the FarmGuard AI backend

pub mod chat;
pub mod classes;
pub mod detection;

pub use chat::*;
pub use classes::*;
pub use detection::*;
