//! Error types for the vision crate

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading, saving or running a classifier
#[derive(Error, Debug)]
pub enum VisionError {
    #[error("Model artifact not found: {0}")]
    ArtifactMissing(PathBuf),

    #[error("Invalid artifact manifest: {0}")]
    Manifest(String),

    #[error("Model record error: {0}")]
    Record(String),

    #[error("Invalid network configuration: {0}")]
    InvalidConfig(String),

    #[error("Image decoding error: {0}")]
    Image(String),

    #[error("Tensor error: {0}")]
    Tensor(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type VisionResult<T> = Result<T, VisionError>;
