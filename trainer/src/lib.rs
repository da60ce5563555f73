//! Offline trainer for the FarmGuard image classifiers
//!
//! Reads a directory-per-class dataset, trains the convolutional classifier
//! with augmentation and writes a model artifact for the server.

pub mod augment;
pub mod dataset;
pub mod error;
pub mod train;

pub use augment::{AugmentConfig, Augmenter};
pub use dataset::{ImageFolder, Sample};
pub use error::{TrainResult, TrainerError};
pub use train::{train, EpochSummary, TrainConfig, TrainReport};
