//! Error types for the trainer

use std::path::PathBuf;

use farmguard_vision::VisionError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrainerError {
    #[error("Dataset directory does not exist: {0}")]
    DatasetNotFound(PathBuf),

    #[error("No class directories in {0}")]
    NoClasses(PathBuf),

    #[error("No training images in {0}")]
    NoTrainingImages(PathBuf),

    #[error("Failed to read image {path}: {message}")]
    Image { path: PathBuf, message: String },

    #[error("Invalid training configuration: {0}")]
    InvalidConfig(String),

    #[error("Tensor error: {0}")]
    Tensor(String),

    #[error(transparent)]
    Vision(#[from] VisionError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type TrainResult<T> = Result<T, TrainerError>;
