//! Directory-structured image dataset
//!
//! The data directory holds one sub-directory per class:
//!
//! ```text
//! dataset/
//! ├── Maize/
//! │   ├── img_001.jpg
//! │   └── field_b/
//! │       └── img_002.jpg
//! └── Wheat/
//!     └── ...
//! ```
//!
//! Classes are ordered by directory name, which fixes the network's output
//! order. Images in nested folders belong to the enclosing class. Within each
//! class, files are ordered by folder and then by name, and the leading
//! `floor(split * n)` files are held out for validation.

use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{TrainResult, TrainerError};

/// File extensions treated as images
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "gif", "tif", "tiff", "webp"];

/// One labelled image file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    pub path: PathBuf,
    pub label: usize,
}

/// A scanned dataset split into training and validation samples
#[derive(Debug, Clone)]
pub struct ImageFolder {
    pub root: PathBuf,
    pub class_names: Vec<String>,
    pub train: Vec<Sample>,
    pub validation: Vec<Sample>,
}

impl ImageFolder {
    /// Scan `root` and split each class
    pub fn scan(root: &Path, validation_split: f64) -> TrainResult<Self> {
        if !(0.0..1.0).contains(&validation_split) {
            return Err(TrainerError::InvalidConfig(format!(
                "validation split must be in [0, 1), got {}",
                validation_split
            )));
        }
        if !root.is_dir() {
            return Err(TrainerError::DatasetNotFound(root.to_path_buf()));
        }

        let mut class_names = Vec::new();
        for entry in std::fs::read_dir(root)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                if let Some(name) = entry.file_name().to_str() {
                    class_names.push(name.to_string());
                }
            }
        }
        class_names.sort();

        if class_names.is_empty() {
            return Err(TrainerError::NoClasses(root.to_path_buf()));
        }

        let mut train = Vec::new();
        let mut validation = Vec::new();

        for (label, class_name) in class_names.iter().enumerate() {
            let files = list_images(&root.join(class_name))?;
            let held_out = validation_count(files.len(), validation_split);

            tracing::debug!(
                "Class {} '{}': {} images, {} for validation",
                label,
                class_name,
                files.len(),
                held_out
            );

            for (i, path) in files.into_iter().enumerate() {
                let sample = Sample { path, label };
                if i < held_out {
                    validation.push(sample);
                } else {
                    train.push(sample);
                }
            }
        }

        if train.is_empty() {
            return Err(TrainerError::NoTrainingImages(root.to_path_buf()));
        }

        tracing::info!(
            "Found {} training and {} validation images in {} classes",
            train.len(),
            validation.len(),
            class_names.len()
        );

        Ok(Self {
            root: root.to_path_buf(),
            class_names,
            train,
            validation,
        })
    }

    pub fn num_classes(&self) -> usize {
        self.class_names.len()
    }
}

/// Number of a class's files held out for validation
pub fn validation_count(num_files: usize, validation_split: f64) -> usize {
    (num_files as f64 * validation_split).floor() as usize
}

/// Whether a path has an image extension (case-insensitive)
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Image files anywhere below `dir`, grouped by folder and sorted by name
fn list_images(dir: &Path) -> TrainResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1) {
        let entry = entry.map_err(io::Error::from)?;
        if entry.file_type().is_file() && is_image_file(entry.path()) {
            files.push(entry.into_path());
        }
    }
    files.sort_by(|a, b| {
        let folder = |p: &Path| p.parent().map(|d| d.to_string_lossy().into_owned());
        folder(a)
            .cmp(&folder(b))
            .then_with(|| a.file_name().cmp(&b.file_name()))
    });
    Ok(files)
}
