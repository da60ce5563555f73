//! FarmGuard classifier trainer
//!
//! ```text
//! farmguard-train --data-dir dataset --output model/crop_model.mpk
//! ```

use std::path::PathBuf;

use clap::Parser;
use farmguard_trainer::{train, TrainConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about = "Train the FarmGuard image classifier", long_about = None)]
struct Args {
    /// Dataset root with one sub-directory per class
    #[arg(long, default_value = "dataset", value_name = "DIR")]
    data_dir: PathBuf,

    /// Weights file to write; the manifest is written next to it
    #[arg(long, default_value = "model/crop_model.mpk", value_name = "FILE")]
    output: PathBuf,

    /// Square input resolution
    #[arg(long, default_value_t = 224)]
    image_size: usize,

    #[arg(long, default_value_t = 8)]
    batch_size: usize,

    #[arg(long, default_value_t = 5)]
    epochs: usize,

    #[arg(long, default_value_t = 1e-3)]
    learning_rate: f64,

    /// Fraction of each class held out for validation
    #[arg(long, default_value_t = 0.2)]
    validation_split: f64,

    #[arg(long, default_value_t = 42)]
    seed: u64,
}

impl From<Args> for TrainConfig {
    fn from(args: Args) -> Self {
        Self {
            data_dir: args.data_dir,
            output: args.output,
            image_size: args.image_size,
            batch_size: args.batch_size,
            epochs: args.epochs,
            learning_rate: args.learning_rate,
            validation_split: args.validation_split,
            seed: args.seed,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "farmguard_train=info,farmguard_trainer=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = TrainConfig::from(Args::parse());
    let report = train(&config)?;

    if let Some(last) = report.epochs.last() {
        tracing::info!(
            "Finished: {} classes, final loss {:.4}, accuracy {:.2}%",
            report.class_names.len(),
            last.train_loss,
            last.train_accuracy
        );
    }
    tracing::info!("Artifact: {}", report.output.display());

    Ok(())
}
