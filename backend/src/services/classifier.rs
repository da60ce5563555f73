//! Classifier adapter
//!
//! Wraps an optional trained network for one class set. Without a network
//! it produces demo predictions: a uniformly drawn label with a confidence in
//! [0.82, 0.98).

use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use farmguard_vision::{
    default_device, load_artifact, predict_probabilities, preprocess, top_class, ClassifierNet,
    CpuBackend, CpuDevice,
};
use rand::seq::SliceRandom;
use rand::Rng;
use shared::{
    validate_distribution, ClassLabel, InferenceMode, Prediction, DEMO_CONFIDENCE_MAX,
    DEMO_CONFIDENCE_MIN,
};

use crate::error::{AppError, AppResult};
use crate::services::image_store::StoredImage;

/// A network loaded from a model artifact
struct LoadedModel {
    net: Mutex<ClassifierNet<CpuBackend>>,
    image_size: usize,
    device: CpuDevice,
    source: PathBuf,
}

/// Classifier for one class set, in real or demo mode
#[derive(Clone)]
pub struct Classifier<C: ClassLabel> {
    model: Option<Arc<LoadedModel>>,
    _labels: PhantomData<C>,
}

impl<C: ClassLabel> Classifier<C> {
    /// Classifier without a network
    pub fn demo() -> Self {
        Self {
            model: None,
            _labels: PhantomData,
        }
    }

    /// Load a trained network from its artifact
    pub fn from_artifact(path: &Path) -> AppResult<Self> {
        let device = default_device();
        let artifact = load_artifact::<CpuBackend>(path, &C::names(), &device)?;

        if artifact.manifest.class_names.len() != C::ALL.len() {
            return Err(AppError::ArtifactUnavailable(format!(
                "{} has {} outputs but the {} set has {} labels",
                path.display(),
                artifact.manifest.class_names.len(),
                C::SET_NAME,
                C::ALL.len()
            )));
        }
        if artifact.manifest.class_names.iter().map(String::as_str).ne(C::names()) {
            tracing::warn!(
                "Class names in {} differ from the {} set; outputs are mapped by index",
                path.display(),
                C::SET_NAME
            );
        }

        Ok(Self {
            model: Some(Arc::new(LoadedModel {
                net: Mutex::new(artifact.net),
                image_size: artifact.manifest.network.image_size,
                device,
                source: path.to_path_buf(),
            })),
            _labels: PhantomData,
        })
    }

    /// Load the artifact if possible, otherwise fall back to demo mode
    pub fn load_or_demo(path: &Path) -> Self {
        match Self::from_artifact(path) {
            Ok(classifier) => {
                tracing::info!("Loaded {} model: {}", C::SET_NAME, path.display());
                classifier
            }
            Err(e) => {
                tracing::warn!("{} model not loaded ({}), running in demo mode", C::SET_NAME, e);
                Self::demo()
            }
        }
    }

    pub fn mode(&self) -> InferenceMode {
        if self.model.is_some() {
            InferenceMode::RealAi
        } else {
            InferenceMode::DemoAi
        }
    }

    /// Path the network was loaded from
    pub fn source(&self) -> Option<&Path> {
        self.model.as_ref().map(|m| m.source.as_path())
    }

    /// Classify a stored upload
    pub async fn classify(&self, image: &StoredImage) -> AppResult<Prediction<C>> {
        let Some(model) = &self.model else {
            return Ok(Self::demo_prediction(&mut rand::thread_rng()));
        };

        let bytes = tokio::fs::read(image.path())
            .await
            .map_err(|e| AppError::StorageError(format!("Failed to read upload: {}", e)))?;

        let model = Arc::clone(model);
        let probabilities = tokio::task::spawn_blocking(move || -> AppResult<Vec<f32>> {
            let decoded = preprocess::decode(&bytes)?;
            let net = model
                .net
                .lock()
                .map_err(|_| AppError::Inference("model lock poisoned".to_string()))?;
            Ok(predict_probabilities::<CpuBackend>(
                &*net,
                &decoded,
                model.image_size,
                &model.device,
            )?)
        })
        .await
        .map_err(|e| AppError::Internal(format!("Inference task failed: {}", e)))??;

        Self::prediction_from_probabilities(&probabilities)
    }

    /// Pick the arg-max label from a probability distribution
    pub fn prediction_from_probabilities(probabilities: &[f32]) -> AppResult<Prediction<C>> {
        validate_distribution(probabilities, C::ALL.len())
            .map_err(|e| AppError::Inference(e.to_string()))?;

        let (index, confidence) = top_class(probabilities)
            .ok_or_else(|| AppError::Inference("empty model output".to_string()))?;
        let label = C::from_index(index)
            .ok_or_else(|| AppError::Inference(format!("output index {} out of range", index)))?;

        Ok(Prediction {
            label,
            confidence,
            mode: InferenceMode::RealAi,
        })
    }

    /// Random prediction used when no network is loaded
    pub fn demo_prediction<R: Rng + ?Sized>(rng: &mut R) -> Prediction<C> {
        let label = *C::ALL.choose(rng).unwrap_or(&C::ALL[0]);
        let confidence = rng.gen_range(DEMO_CONFIDENCE_MIN..DEMO_CONFIDENCE_MAX);

        Prediction {
            label,
            confidence,
            mode: InferenceMode::DemoAi,
        }
    }
}
