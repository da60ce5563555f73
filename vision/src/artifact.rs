//! Model artifact persistence
//!
//! An artifact is a `CompactRecorder` weights file (`*.mpk`) plus a JSON
//! manifest with the same stem describing the network and its class names.

use std::path::{Path, PathBuf};

use burn::{module::Module, record::CompactRecorder, tensor::backend::Backend};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{VisionError, VisionResult};
use crate::network::{ClassifierNet, ClassifierNetConfig};

/// Metadata stored next to the weights
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactManifest {
    pub network: ClassifierNetConfig,
    /// Class names in network output order
    pub class_names: Vec<String>,
    #[serde(default)]
    pub trained_at: Option<DateTime<Utc>>,
}

impl ArtifactManifest {
    pub fn new(network: ClassifierNetConfig, class_names: Vec<String>) -> Self {
        Self {
            network,
            class_names,
            trained_at: Some(Utc::now()),
        }
    }

    fn validate(&self) -> VisionResult<()> {
        self.network.validate()?;
        if self.class_names.len() != self.network.num_classes {
            return Err(VisionError::Manifest(format!(
                "{} class names for {} network outputs",
                self.class_names.len(),
                self.network.num_classes
            )));
        }
        Ok(())
    }
}

/// A network loaded from disk together with its manifest
#[derive(Debug)]
pub struct LoadedArtifact<B: Backend> {
    pub net: ClassifierNet<B>,
    pub manifest: ArtifactManifest,
}

/// Manifest location for a weights file
pub fn manifest_path(weights: &Path) -> PathBuf {
    weights.with_extension("json")
}

/// Write weights and manifest
pub fn save_artifact<B: Backend>(
    net: ClassifierNet<B>,
    weights: &Path,
    manifest: &ArtifactManifest,
) -> VisionResult<()> {
    manifest.validate()?;

    if let Some(parent) = weights.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    net.save_file(weights.to_path_buf(), &CompactRecorder::new())
        .map_err(|e| VisionError::Record(format!("{:?}", e)))?;

    let json = serde_json::to_string_pretty(manifest)
        .map_err(|e| VisionError::Manifest(e.to_string()))?;
    std::fs::write(manifest_path(weights), json)?;

    tracing::debug!("Saved model artifact to {}", weights.display());
    Ok(())
}

/// Load an artifact
///
/// Without a manifest the network falls back to its default configuration
/// with one output per entry of `default_classes`.
pub fn load_artifact<B: Backend>(
    weights: &Path,
    default_classes: &[&str],
    device: &B::Device,
) -> VisionResult<LoadedArtifact<B>> {
    if !weights.is_file() {
        return Err(VisionError::ArtifactMissing(weights.to_path_buf()));
    }

    let manifest_file = manifest_path(weights);
    let manifest = if manifest_file.is_file() {
        let raw = std::fs::read_to_string(&manifest_file)?;
        serde_json::from_str::<ArtifactManifest>(&raw)
            .map_err(|e| VisionError::Manifest(e.to_string()))?
    } else {
        tracing::warn!(
            "No manifest at {}, assuming default network configuration",
            manifest_file.display()
        );
        ArtifactManifest {
            network: ClassifierNetConfig::new(default_classes.len()),
            class_names: default_classes.iter().map(|c| c.to_string()).collect(),
            trained_at: None,
        }
    };
    manifest.validate()?;

    let net = manifest
        .network
        .init::<B>(device)
        .load_file(weights.to_path_buf(), &CompactRecorder::new(), device)
        .map_err(|e| VisionError::Record(format!("{:?}", e)))?;

    Ok(LoadedArtifact { net, manifest })
}
