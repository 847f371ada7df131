//! Training driver: full-run orchestration.
//!
//! Builds datasets, model, loss and optimizer from a `RunConfig`, runs the
//! train/eval epoch loop, tracks the best evaluation accuracy, writes the
//! checkpoint slots and the eval log, and renders the summary chart. All
//! run artifacts live under the configured output directory.

use std::path::PathBuf;

use anyhow::Context;
use burn::tensor::backend::{AutodiffBackend, Backend};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};

use crate::dataset::{ClassificationDataset, ImageBatcher, ImageFolderDataset, Transform};
use crate::model::{ClassifierConfig, ImageClassifier};
use crate::training::checkpoint::{self, BestTracker, BEST_CHECKPOINT, LAST_CHECKPOINT};
use crate::training::eval_log::EvalLog;
use crate::training::runner::Trainer;
use crate::utils::charts::render_training_curves;
use crate::utils::error::Error;
use crate::utils::metrics::{EpochMetrics, Metrics};

/// Immutable parameters of one training run
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Training batch size; evaluation uses half of it
    pub batch_size: usize,
    /// SGD learning rate
    pub learning_rate: f64,
    /// SGD momentum
    pub momentum: f64,
    /// Square input resolution fed to the model
    pub input_size: usize,
    /// Number of epochs to run
    pub epochs: usize,
    /// Number of output classes (sizes the model head)
    pub num_classes: usize,
    /// Root of the training split (class-per-subdirectory)
    pub train_dir: PathBuf,
    /// Root of the validation split
    pub val_dir: PathBuf,
    /// Optional initial weights to load before epoch 0
    pub weights: Option<PathBuf>,
    /// Directory receiving all run artifacts
    pub output_dir: PathBuf,
    /// Eval log location; defaults to `<output_dir>/log_eval.txt`
    pub log_path: Option<PathBuf>,
    /// Seed for epoch shuffling
    pub seed: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            batch_size: 64,
            learning_rate: 0.001,
            momentum: 0.9,
            input_size: 120,
            epochs: 100,
            num_classes: 5,
            train_dir: PathBuf::from("data/train"),
            val_dir: PathBuf::from("data/val"),
            weights: None,
            output_dir: PathBuf::from("output/run"),
            log_path: None,
            seed: 42,
        }
    }
}

impl RunConfig {
    /// Reject configurations that cannot produce a meaningful run
    pub fn validate(&self) -> Result<(), Error> {
        if self.batch_size == 0 {
            return Err(Error::Config("batch_size must be greater than 0".into()));
        }
        if self.num_classes < 2 {
            return Err(Error::Config("class_num must be at least 2".into()));
        }
        if self.input_size < 16 {
            return Err(Error::Config("input_size must be at least 16".into()));
        }
        if self.learning_rate <= 0.0 {
            return Err(Error::Config("lr must be positive".into()));
        }
        Ok(())
    }

    /// Resolved eval log path
    pub fn log_path(&self) -> PathBuf {
        self.log_path
            .clone()
            .unwrap_or_else(|| self.output_dir.join("log_eval.txt"))
    }
}

/// Per-split metric history of a completed run
#[derive(Debug, Clone, Default)]
pub struct TrainingHistory {
    /// Training split record per epoch
    pub train: Vec<EpochMetrics>,
    /// Validation split record per epoch
    pub test: Vec<EpochMetrics>,
    /// Best evaluation accuracy reached
    pub best_accuracy: f64,
    /// Number of epochs actually completed
    pub epochs_run: usize,
}

/// Execute a full training run and return its history.
///
/// Dataset, checkpoint and log failures abort the run; only the chart and
/// confusion-matrix artifacts are best-effort.
pub fn run_training<B: AutodiffBackend>(
    config: &RunConfig,
    device: B::Device,
) -> anyhow::Result<TrainingHistory> {
    config.validate()?;

    info!("starting training on device {:?}", device);

    std::fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("failed to create output dir {:?}", config.output_dir))?;

    // Datasets: augmented training transform, deterministic eval transform
    let train_folder = ImageFolderDataset::new(&config.train_dir)
        .with_context(|| format!("failed to load training set from {:?}", config.train_dir))?;
    let test_folder = ImageFolderDataset::new(&config.val_dir)
        .with_context(|| format!("failed to load validation set from {:?}", config.val_dir))?;

    if train_folder.is_empty() {
        anyhow::bail!("training set at {:?} contains no images", config.train_dir);
    }
    if train_folder.num_classes() != config.num_classes {
        warn!(
            "dataset has {} classes but class_num is {}; keeping the configured count",
            train_folder.num_classes(),
            config.num_classes
        );
    }

    info!(
        "using {} images for training, {} for validation",
        train_folder.len(),
        test_folder.len()
    );

    // Class mapping is derived from the training split and persisted once
    train_folder.save_class_indices(&config.output_dir.join("class_indices.json"))?;

    let train_dataset = ClassificationDataset::new(
        train_folder.to_samples(),
        Transform::train(config.input_size as u32),
    );
    let test_dataset = ClassificationDataset::new(
        test_folder.to_samples(),
        Transform::eval(config.input_size as u32),
    );

    // Model, loss and optimizer
    let model_config = ClassifierConfig::new()
        .with_num_classes(config.num_classes)
        .with_input_size(config.input_size);
    let mut model = ImageClassifier::<B>::new(&model_config, &device);

    if let Some(weights) = &config.weights {
        info!("loading initial weights from {:?}", weights);
        model = checkpoint::load_model(model, weights, &device)
            .with_context(|| format!("failed to load weights from {:?}", weights))?;
    }

    let mut trainer = Trainer::new(
        model,
        config.learning_rate,
        config.momentum,
        config.num_classes,
    );

    let train_batcher = ImageBatcher::<B>::new(device.clone(), config.input_size);
    let eval_device = <B::InnerBackend as Backend>::Device::default();
    let eval_batcher = ImageBatcher::<B::InnerBackend>::new(eval_device, config.input_size);
    let eval_batch_size = (config.batch_size / 2).max(1);

    let log = EvalLog::create(config.log_path())?;

    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let mut best = BestTracker::new();
    let mut history = TrainingHistory::default();
    let mut final_eval: Option<Metrics> = None;

    for epoch in 0..config.epochs {
        let train_report =
            trainer.train_epoch(&train_dataset, &train_batcher, config.batch_size, &mut rng);
        let eval_report = trainer.eval_epoch(&test_dataset, &eval_batcher, eval_batch_size);

        info!(
            "epoch {}/{}: train loss {:.4} acc {:.2}% | test loss {:.4} acc {:.2}%",
            epoch + 1,
            config.epochs,
            train_report.summary.loss,
            train_report.summary.accuracy * 100.0,
            eval_report.summary.loss,
            eval_report.summary.accuracy * 100.0
        );

        // Last checkpoint is refreshed every epoch, best only on >= ties
        checkpoint::save_model(
            trainer.model().clone(),
            &config.output_dir.join(LAST_CHECKPOINT),
        )?;
        if best.observe(eval_report.summary.accuracy) {
            checkpoint::save_model(
                trainer.model().clone(),
                &config.output_dir.join(BEST_CHECKPOINT),
            )?;
            info!("new best accuracy: {:.2}%", best.best() * 100.0);
        }

        log.append_block(epoch, &train_report.summary, &eval_report.summary, best.best())?;

        history.train.push(train_report.summary);
        history.test.push(eval_report.summary);
        history.epochs_run += 1;
        final_eval = Some(eval_report.details);
    }

    history.best_accuracy = best.best();

    // Summary artifacts are best-effort; a failed chart must not lose the run
    let chart_path = config.output_dir.join("training_curves.svg");
    if let Err(e) = render_training_curves(&history.train, &history.test, &chart_path) {
        warn!("failed to render training curves to {:?}: {}", chart_path, e);
    }
    if let Some(metrics) = &final_eval {
        let csv_path = config.output_dir.join("confusion_matrix.csv");
        if let Err(e) = metrics.confusion_matrix.save_csv(&csv_path) {
            warn!("failed to write confusion matrix to {:?}: {}", csv_path, e);
        }
    }

    info!(
        "training complete: {} epochs, best accuracy {:.2}%",
        history.epochs_run,
        history.best_accuracy * 100.0
    );

    Ok(history)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = RunConfig::default();
        assert_eq!(config.batch_size, 64);
        assert_eq!(config.num_classes, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_rejects_zero_batch() {
        let config = RunConfig {
            batch_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_rejects_single_class() {
        let config = RunConfig {
            num_classes: 1,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_log_path_defaults_into_output_dir() {
        let config = RunConfig {
            output_dir: PathBuf::from("/tmp/run"),
            ..Default::default()
        };
        assert_eq!(config.log_path(), PathBuf::from("/tmp/run/log_eval.txt"));

        let config = RunConfig {
            log_path: Some(PathBuf::from("/elsewhere/log.txt")),
            ..config
        };
        assert_eq!(config.log_path(), PathBuf::from("/elsewhere/log.txt"));
    }
}
