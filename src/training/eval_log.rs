//! Plain-text evaluation log.
//!
//! The log is truncated once at run start, then appended to after every
//! epoch. Each epoch contributes exactly one four-line block:
//!
//! ```text
//! ======
//! Train Epoch(0): Acc:0.5000 Prec:0.5000 Recall:0.5000 F1-score:0.5000 Loss:0.6931
//! Test  Epoch(0): Acc:0.5000 Prec:0.5000 Recall:0.5000 F1-score:0.5000 Loss:0.6931
//! Best Acc(Test):0.5000
//! ```

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::utils::error::Result;
use crate::utils::metrics::EpochMetrics;

/// Number of lines one epoch appends to the log
pub const LINES_PER_BLOCK: usize = 4;

/// Append-only run log, truncated at creation
#[derive(Debug)]
pub struct EvalLog {
    path: PathBuf,
}

impl EvalLog {
    /// Create the log file, truncating any previous content so stale
    /// blocks from an earlier run cannot mix with the new one.
    pub fn create<P: Into<PathBuf>>(path: P) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        File::create(&path)?;
        Ok(Self { path })
    }

    /// Path of the underlying file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one epoch block: separator, train line, test line, best line.
    pub fn append_block(
        &self,
        epoch: usize,
        train: &EpochMetrics,
        test: &EpochMetrics,
        best_accuracy: f64,
    ) -> Result<()> {
        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        writeln!(file, "======")?;
        writeln!(file, "{}", split_line("Train", epoch, train))?;
        writeln!(file, "{}", split_line("Test ", epoch, test))?;
        writeln!(file, "Best Acc(Test):{:.4}", best_accuracy)?;
        Ok(())
    }
}

fn split_line(split: &str, epoch: usize, m: &EpochMetrics) -> String {
    format!(
        "{} Epoch({}): Acc:{:.4} Prec:{:.4} Recall:{:.4} F1-score:{:.4} Loss:{:.4}",
        split, epoch, m.accuracy, m.precision, m.recall, m.f1, m.loss
    )
}
