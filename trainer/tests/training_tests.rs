//! Trainer integration tests
//!
//! Builds tiny datasets on disk and checks:
//! - class discovery and the per-class validation split
//! - an end-to-end run writes an artifact the server-side loader accepts

use std::path::Path;

use farmguard_trainer::{train, ImageFolder, TrainConfig, TrainerError};
use farmguard_vision::{load_artifact, manifest_path, CpuBackend};
use image::{Rgb, RgbImage};
use proptest::prelude::*;
use tempfile::TempDir;

// ============================================================================
// Helpers
// ============================================================================

fn write_class(root: &Path, class: &str, count: usize, color: [u8; 3]) {
    let dir = root.join(class);
    std::fs::create_dir_all(&dir).unwrap();
    for i in 0..count {
        let image = RgbImage::from_fn(28, 28, |x, y| {
            if (x + y + i as u32) % 5 == 0 {
                Rgb([255, 255, 255])
            } else {
                Rgb(color)
            }
        });
        image.save(dir.join(format!("img_{:02}.png", i))).unwrap();
    }
}

fn small_config(root: &Path) -> TrainConfig {
    TrainConfig {
        data_dir: root.join("dataset"),
        output: root.join("model").join("crop_model.mpk"),
        image_size: 24,
        batch_size: 4,
        epochs: 2,
        learning_rate: 1e-3,
        validation_split: 0.2,
        seed: 7,
    }
}

// ============================================================================
// Dataset scanning
// ============================================================================

#[test]
fn test_scan_orders_classes_and_splits() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("dataset");
    write_class(&root, "Wheat", 5, [200, 180, 40]);
    write_class(&root, "Rice", 10, [40, 160, 40]);
    std::fs::write(root.join("Rice").join("notes.txt"), "not an image").unwrap();
    std::fs::write(root.join("stray.png"), "outside any class").unwrap();

    let folder = ImageFolder::scan(&root, 0.2).unwrap();

    assert_eq!(folder.class_names, vec!["Rice", "Wheat"]);
    assert_eq!(folder.train.len(), 8 + 4);
    assert_eq!(folder.validation.len(), 2 + 1);

    // Leading files of each class are held out
    let held_out: Vec<_> = folder
        .validation
        .iter()
        .map(|s| s.path.file_name().unwrap().to_str().unwrap().to_string())
        .collect();
    assert_eq!(held_out, vec!["img_00.png", "img_01.png", "img_00.png"]);
    assert!(folder.validation.iter().take(2).all(|s| s.label == 0));
}

#[test]
fn test_scan_includes_nested_folders() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("dataset");
    write_class(&root, "Maize", 3, [220, 200, 60]);
    write_class(&root.join("Maize"), "field_b", 2, [210, 190, 50]);
    write_class(&root, "Wheat", 2, [200, 180, 40]);

    let folder = ImageFolder::scan(&root, 0.4).unwrap();

    // Nested folders do not become classes
    assert_eq!(folder.class_names, vec!["Maize", "Wheat"]);
    let maize: Vec<_> = folder
        .validation
        .iter()
        .chain(&folder.train)
        .filter(|s| s.label == 0)
        .collect();
    assert_eq!(maize.len(), 5);

    // Top-level files come first, so they are the ones held out
    let held_out: Vec<_> = folder
        .validation
        .iter()
        .filter(|s| s.label == 0)
        .map(|s| s.path.strip_prefix(&root).unwrap().to_path_buf())
        .collect();
    assert_eq!(
        held_out,
        vec![
            Path::new("Maize").join("img_00.png"),
            Path::new("Maize").join("img_01.png"),
        ]
    );
}

#[test]
fn test_scan_errors() {
    let dir = TempDir::new().unwrap();

    let missing = ImageFolder::scan(&dir.path().join("nope"), 0.2);
    assert!(matches!(missing, Err(TrainerError::DatasetNotFound(_))));

    let empty = ImageFolder::scan(dir.path(), 0.2);
    assert!(matches!(empty, Err(TrainerError::NoClasses(_))));

    std::fs::create_dir_all(dir.path().join("Maize")).unwrap();
    let no_images = ImageFolder::scan(dir.path(), 0.2);
    assert!(matches!(no_images, Err(TrainerError::NoTrainingImages(_))));
}

// ============================================================================
// End to end
// ============================================================================

#[test]
fn test_training_writes_loadable_artifact() {
    let dir = TempDir::new().unwrap();
    let config = small_config(dir.path());
    write_class(&config.data_dir, "Maize", 5, [220, 200, 60]);
    write_class(&config.data_dir, "Tomato", 5, [200, 30, 30]);

    let report = train(&config).unwrap();

    assert_eq!(report.class_names, vec!["Maize", "Tomato"]);
    assert_eq!(report.epochs.len(), 2);
    for epoch in &report.epochs {
        assert!(epoch.train_loss.is_finite());
        assert!((0.0..=100.0).contains(&epoch.train_accuracy));
        assert!(epoch.validation_accuracy.is_some());
    }

    assert!(config.output.is_file());
    assert!(manifest_path(&config.output).is_file());

    let device = Default::default();
    let loaded = load_artifact::<CpuBackend>(&config.output, &["a", "b"], &device).unwrap();
    assert_eq!(loaded.manifest.class_names, vec!["Maize", "Tomato"]);
    assert_eq!(loaded.manifest.network.image_size, 24);
    assert!(loaded.manifest.trained_at.is_some());
}

#[test]
fn test_training_without_validation_split() {
    let dir = TempDir::new().unwrap();
    let config = TrainConfig {
        validation_split: 0.0,
        epochs: 1,
        ..small_config(dir.path())
    };
    write_class(&config.data_dir, "Cotton", 3, [240, 240, 240]);
    write_class(&config.data_dir, "Potato", 3, [120, 80, 40]);

    let report = train(&config).unwrap();
    assert!(report.epochs[0].validation_accuracy.is_none());
}

#[test]
fn test_image_size_too_small_is_rejected() {
    let dir = TempDir::new().unwrap();
    let config = TrainConfig {
        image_size: 8,
        ..small_config(dir.path())
    };
    write_class(&config.data_dir, "Rice", 2, [0, 200, 0]);

    assert!(matches!(train(&config), Err(TrainerError::Vision(_))));
    assert!(!config.output.exists());
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// Every file lands in exactly one split, validation gets floor(split * n)
    #[test]
    fn prop_split_partitions_class(count in 1usize..30, split in 0.0f64..0.9) {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("dataset");
        let class_dir = root.join("Sugarcane");
        std::fs::create_dir_all(&class_dir).unwrap();
        for i in 0..count {
            std::fs::write(class_dir.join(format!("{:03}.jpg", i)), b"").unwrap();
        }

        match ImageFolder::scan(&root, split) {
            Ok(folder) => {
                let held_out = (count as f64 * split).floor() as usize;
                prop_assert_eq!(folder.validation.len(), held_out);
                prop_assert_eq!(folder.train.len() + folder.validation.len(), count);
            }
            Err(TrainerError::NoTrainingImages(_)) => {
                prop_assert_eq!((count as f64 * split).floor() as usize, count);
            }
            Err(e) => prop_assert!(false, "unexpected error: {}", e),
        }
    }
}
