//! Convolutional image classifier shared by the FarmGuard server and trainer
//!
//! Holds the network definition, the preprocessing used at both training and
//! inference time, and the on-disk artifact format.

pub mod artifact;
pub mod backend;
pub mod error;
pub mod inference;
pub mod network;
pub mod preprocess;

pub use artifact::{load_artifact, manifest_path, save_artifact, ArtifactManifest, LoadedArtifact};
pub use backend::{default_device, CpuBackend, CpuDevice, TrainingBackend};
pub use error::{VisionError, VisionResult};
pub use inference::{predict_probabilities, top_class};
pub use network::{ClassifierNet, ClassifierNetConfig};
