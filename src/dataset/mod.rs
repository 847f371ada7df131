//! Dataset loading, transforms and batching.
//!
//! - `loader`: scans a class-per-subdirectory image folder into samples
//! - `augmentation`: train/eval image transforms
//! - `burn_dataset`: Burn `Dataset`/`Batcher` integration

pub mod augmentation;
pub mod burn_dataset;
pub mod loader;

pub use augmentation::{EvalTransform, TrainTransform, Transform};
pub use burn_dataset::{ClassificationDataset, ImageBatch, ImageBatcher, ImageItem};
pub use loader::{DatasetStats, ImageFolderDataset, ImageSample};
