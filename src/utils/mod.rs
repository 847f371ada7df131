//! Logging, metrics, charts and error helpers.

pub mod charts;
pub mod error;
pub mod logging;
pub mod metrics;

pub use error::{Error, Result};
pub use metrics::{ConfusionMatrix, EpochMetrics, Metrics};
