//! Supervised training loop
//!
//! Fixed number of epochs with Adam and cross-entropy on the autodiff CPU
//! backend. The finished network and its manifest are written with
//! [`save_artifact`] so the server can load them.

use std::path::PathBuf;

use burn::{
    module::AutodiffModule,
    nn::loss::CrossEntropyLossConfig,
    optim::{AdamConfig, GradientsParams, Optimizer},
    tensor::{backend::Backend, ElementConversion, Int, Tensor, TensorData},
};
use farmguard_vision::{
    default_device, preprocess, save_artifact, ArtifactManifest, ClassifierNet,
    ClassifierNetConfig, CpuBackend, CpuDevice, TrainingBackend,
};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::augment::Augmenter;
use crate::dataset::{ImageFolder, Sample};
use crate::error::{TrainResult, TrainerError};

/// Training hyperparameters and paths
#[derive(Debug, Clone)]
pub struct TrainConfig {
    pub data_dir: PathBuf,
    pub output: PathBuf,
    pub image_size: usize,
    pub batch_size: usize,
    pub epochs: usize,
    pub learning_rate: f64,
    pub validation_split: f64,
    pub seed: u64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("dataset"),
            output: PathBuf::from("model/crop_model.mpk"),
            image_size: 224,
            batch_size: 8,
            epochs: 5,
            learning_rate: 1e-3,
            validation_split: 0.2,
            seed: 42,
        }
    }
}

impl TrainConfig {
    pub fn validate(&self) -> TrainResult<()> {
        if self.batch_size == 0 {
            return Err(TrainerError::InvalidConfig("batch size must be positive".into()));
        }
        if self.epochs == 0 {
            return Err(TrainerError::InvalidConfig("epochs must be positive".into()));
        }
        if !(self.learning_rate > 0.0) {
            return Err(TrainerError::InvalidConfig(format!(
                "learning rate must be positive, got {}",
                self.learning_rate
            )));
        }
        Ok(())
    }
}

/// Metrics of one epoch
#[derive(Debug, Clone, Copy)]
pub struct EpochSummary {
    pub epoch: usize,
    pub train_loss: f64,
    /// Percent of training samples classified correctly
    pub train_accuracy: f64,
    /// Percent of validation samples classified correctly, if any are held out
    pub validation_accuracy: Option<f64>,
}

/// Outcome of a training run
#[derive(Debug, Clone)]
pub struct TrainReport {
    pub class_names: Vec<String>,
    pub epochs: Vec<EpochSummary>,
    pub output: PathBuf,
}

/// Train a classifier on `config.data_dir` and save it to `config.output`
pub fn train(config: &TrainConfig) -> TrainResult<TrainReport> {
    config.validate()?;

    let dataset = ImageFolder::scan(&config.data_dir, config.validation_split)?;
    let net_config =
        ClassifierNetConfig::new(dataset.num_classes()).with_image_size(config.image_size);
    net_config.validate()?;

    tracing::info!(
        "Training on {:?}: classes {:?}, image size {}, batch size {}, {} epochs",
        dataset.root,
        dataset.class_names,
        config.image_size,
        config.batch_size,
        config.epochs
    );

    <TrainingBackend as Backend>::seed(config.seed);
    let device = default_device();
    let mut model: ClassifierNet<TrainingBackend> = net_config.init(&device);
    let mut optimizer = AdamConfig::new().init::<TrainingBackend, ClassifierNet<TrainingBackend>>();
    let loss_fn = CrossEntropyLossConfig::new().init(&device);

    let augmenter = Augmenter::default();
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let mut order: Vec<usize> = (0..dataset.train.len()).collect();
    let mut history = Vec::with_capacity(config.epochs);

    for epoch in 1..=config.epochs {
        order.shuffle(&mut rng);

        let mut epoch_loss = 0.0f64;
        let mut batches = 0usize;
        let mut correct = 0usize;

        for chunk in order.chunks(config.batch_size) {
            let samples: Vec<&Sample> = chunk.iter().map(|&i| &dataset.train[i]).collect();
            let (pixels, labels) =
                load_batch(&samples, config.image_size, Some((&augmenter, &mut rng)))?;
            let images = preprocess::batch_tensor::<TrainingBackend>(
                pixels,
                samples.len(),
                config.image_size,
                &device,
            )?;
            let targets = targets_tensor::<TrainingBackend>(&labels, &device);

            let logits = model.forward(images);
            let loss = loss_fn.forward(logits.clone(), targets);

            epoch_loss += loss.clone().into_scalar().elem::<f64>();
            batches += 1;
            correct += count_correct(logits, &labels)?;

            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optimizer.step(config.learning_rate, model, grads);
        }

        let summary = EpochSummary {
            epoch,
            train_loss: epoch_loss / batches.max(1) as f64,
            train_accuracy: percent(correct, dataset.train.len()),
            validation_accuracy: evaluate(
                &model.valid(),
                &dataset.validation,
                config.image_size,
                config.batch_size,
                &device,
            )?,
        };

        match summary.validation_accuracy {
            Some(val_acc) => tracing::info!(
                "Epoch {}/{}: loss = {:.4}, accuracy = {:.2}%, val accuracy = {:.2}%",
                epoch,
                config.epochs,
                summary.train_loss,
                summary.train_accuracy,
                val_acc
            ),
            None => tracing::info!(
                "Epoch {}/{}: loss = {:.4}, accuracy = {:.2}%",
                epoch,
                config.epochs,
                summary.train_loss,
                summary.train_accuracy
            ),
        }
        history.push(summary);
    }

    let manifest = ArtifactManifest::new(net_config, dataset.class_names.clone());
    save_artifact(model.valid(), &config.output, &manifest)?;
    tracing::info!("Model saved to {}", config.output.display());

    Ok(TrainReport {
        class_names: dataset.class_names,
        epochs: history,
        output: config.output.clone(),
    })
}

/// Accuracy of an inference-mode network on held-out samples
fn evaluate(
    model: &ClassifierNet<CpuBackend>,
    samples: &[Sample],
    image_size: usize,
    batch_size: usize,
    device: &CpuDevice,
) -> TrainResult<Option<f64>> {
    if samples.is_empty() {
        return Ok(None);
    }

    let mut correct = 0usize;
    for chunk in samples.chunks(batch_size) {
        let batch: Vec<&Sample> = chunk.iter().collect();
        let (pixels, labels) = load_batch::<ChaCha8Rng>(&batch, image_size, None)?;
        let images =
            preprocess::batch_tensor::<CpuBackend>(pixels, batch.len(), image_size, device)?;
        correct += count_correct(model.forward(images), &labels)?;
    }

    Ok(Some(percent(correct, samples.len())))
}

/// Read, resize and optionally augment a batch of samples
fn load_batch<R: Rng>(
    samples: &[&Sample],
    image_size: usize,
    mut augment: Option<(&Augmenter, &mut R)>,
) -> TrainResult<(Vec<f32>, Vec<usize>)> {
    let mut pixels = Vec::with_capacity(samples.len() * 3 * image_size * image_size);
    let mut labels = Vec::with_capacity(samples.len());

    for sample in samples {
        let image = image::open(&sample.path).map_err(|e| TrainerError::Image {
            path: sample.path.clone(),
            message: e.to_string(),
        })?;
        let mut rgb = preprocess::resize_rgb(&image, image_size as u32);
        if let Some((augmenter, rng)) = augment.as_mut() {
            rgb = augmenter.apply(&rgb, &mut **rng);
        }
        pixels.extend(preprocess::to_chw(&rgb));
        labels.push(sample.label);
    }

    Ok((pixels, labels))
}

fn targets_tensor<B: Backend>(labels: &[usize], device: &B::Device) -> Tensor<B, 1, Int> {
    let data: Vec<i64> = labels.iter().map(|&l| l as i64).collect();
    Tensor::from_data(TensorData::new(data, [labels.len()]), device)
}

/// Number of rows whose arg-max matches the label
fn count_correct<B: Backend>(logits: Tensor<B, 2>, labels: &[usize]) -> TrainResult<usize> {
    let predicted = logits
        .argmax(1)
        .into_data()
        .convert::<i64>()
        .to_vec::<i64>()
        .map_err(|e| TrainerError::Tensor(format!("{:?}", e)))?;

    Ok(predicted
        .iter()
        .zip(labels)
        .filter(|(p, l)| **p == **l as i64)
        .count())
}

fn percent(correct: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        100.0 * correct as f64 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TrainConfig::default();
        assert_eq!(config.image_size, 224);
        assert_eq!(config.batch_size, 8);
        assert_eq!(config.epochs, 5);
        assert_eq!(config.seed, 42);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_config() {
        let config = TrainConfig {
            batch_size: 0,
            ..TrainConfig::default()
        };
        assert!(matches!(config.validate(), Err(TrainerError::InvalidConfig(_))));

        let config = TrainConfig {
            learning_rate: 0.0,
            ..TrainConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_count_correct() {
        let device = default_device();
        let logits = Tensor::<CpuBackend, 2>::from_data(
            TensorData::new(vec![0.9f32, 0.1, 0.2, 0.8, 0.7, 0.3], [3, 2]),
            &device,
        );
        assert_eq!(count_correct(logits, &[0, 1, 1]).unwrap(), 2);
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(0, 0), 0.0);
        assert_eq!(percent(1, 4), 25.0);
    }
}
