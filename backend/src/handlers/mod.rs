//! HTTP handlers

pub mod chat;
pub mod detection;
pub mod health;

pub use chat::chat;
pub use detection::{detect_crop, detect_disease};
pub use health::{health_check, root};
