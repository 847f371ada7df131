//! # imgclass
//!
//! An image-classification training harness built on the Burn framework.
//! Loads a labeled image-folder dataset (one subdirectory per class),
//! trains a convolutional classifier with SGD + momentum, evaluates
//! accuracy/precision/recall/F1 after every epoch, and keeps `last.pth` /
//! `best.pth` checkpoints together with a plain-text metrics log and an
//! SVG training-curve chart.
//!
//! ## Modules
//!
//! - `dataset`: folder scanning, image transforms and Burn batching
//! - `model`: the CNN classifier
//! - `training`: epoch runner, run driver, checkpoints and eval log
//! - `utils`: metrics, logging, charts and error types
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use imgclass::backend::{default_device, TrainingBackend};
//! use imgclass::training::{run_training, RunConfig};
//!
//! let config = RunConfig::default();
//! let history = run_training::<TrainingBackend>(&config, default_device())?;
//! println!("best accuracy: {:.2}%", history.best_accuracy * 100.0);
//! ```

pub mod backend;
pub mod dataset;
pub mod model;
pub mod training;
pub mod utils;

pub use dataset::{ClassificationDataset, ImageBatcher, ImageFolderDataset};
pub use model::{ClassifierConfig, ImageClassifier};
pub use training::{run_training, RunConfig, TrainingHistory};
pub use utils::{EpochMetrics, Metrics};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
