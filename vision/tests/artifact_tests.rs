//! Artifact persistence tests
//!
//! A saved network must reload into the same predictions.

use farmguard_vision::{
    load_artifact, manifest_path, predict_probabilities, save_artifact,
    ArtifactManifest, ClassifierNetConfig, CpuBackend, VisionError,
};
use image::{DynamicImage, Rgb, RgbImage};
use tempfile::TempDir;

const SIZE: usize = 24;

fn striped_image() -> DynamicImage {
    let mut rgb = RgbImage::new(30, 30);
    for (x, _, pixel) in rgb.enumerate_pixels_mut() {
        *pixel = if x % 4 < 2 {
            Rgb([200, 30, 10])
        } else {
            Rgb([10, 180, 40])
        };
    }
    DynamicImage::ImageRgb8(rgb)
}

#[test]
fn test_saved_network_reloads_with_manifest() {
    let dir = TempDir::new().unwrap();
    let weights = dir.path().join("model").join("crop_model.mpk");
    let device = Default::default();

    let config = ClassifierNetConfig::new(3).with_image_size(SIZE);
    let net = config.init::<CpuBackend>(&device);
    let before = predict_probabilities(&net, &striped_image(), SIZE, &device).unwrap();

    let manifest = ArtifactManifest::new(
        config,
        vec!["Wheat".into(), "Rice".into(), "Maize".into()],
    );
    save_artifact(net, &weights, &manifest).unwrap();
    assert!(weights.is_file());
    assert!(manifest_path(&weights).is_file());

    let loaded = load_artifact::<CpuBackend>(&weights, &["ignored"], &device).unwrap();
    assert_eq!(loaded.manifest.class_names, vec!["Wheat", "Rice", "Maize"]);
    assert_eq!(loaded.manifest.network.image_size, SIZE);

    let after = predict_probabilities(&loaded.net, &striped_image(), SIZE, &device).unwrap();
    assert_eq!(after.len(), 3);
    // Weights are stored at half precision
    for (a, b) in before.iter().zip(after.iter()) {
        assert!((a - b).abs() < 1e-2, "{} vs {}", a, b);
    }
}

#[test]
fn test_corrupt_manifest_is_reported() {
    let dir = TempDir::new().unwrap();
    let weights = dir.path().join("disease_model.mpk");
    let device = Default::default();

    let config = ClassifierNetConfig::new(2).with_image_size(SIZE);
    let manifest = ArtifactManifest::new(config.clone(), vec!["a".into(), "b".into()]);
    save_artifact(config.init::<CpuBackend>(&device), &weights, &manifest).unwrap();

    std::fs::write(manifest_path(&weights), "{ not json").unwrap();

    let result = load_artifact::<CpuBackend>(&weights, &["a", "b"], &device);
    assert!(matches!(result, Err(VisionError::Manifest(_))));
}
