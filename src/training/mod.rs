//! Training loop orchestration.
//!
//! - `runner`: the epoch runner (`Trainer`) executing one pass per split
//! - `driver`: the full-run driver wiring datasets, model and artifacts
//! - `checkpoint`: last/best model slots and best-accuracy tracking
//! - `eval_log`: the per-epoch plain-text metrics log

pub mod checkpoint;
pub mod driver;
pub mod eval_log;
pub mod runner;

pub use checkpoint::{BestTracker, BEST_CHECKPOINT, LAST_CHECKPOINT};
pub use driver::{run_training, RunConfig, TrainingHistory};
pub use eval_log::EvalLog;
pub use runner::{EpochReport, Trainer};
