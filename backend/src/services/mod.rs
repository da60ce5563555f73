//! Services behind the FarmGuard HTTP handlers

pub mod chat;
pub mod classifier;
pub mod image_store;

pub use chat::ChatService;
pub use classifier::Classifier;
pub use image_store::{ImageStore, StoredImage};
