//! End-to-end training run on a tiny synthetic dataset.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use image::{Rgb, RgbImage};
use tempfile::TempDir;

use imgclass::backend::{default_device, TrainingBackend};
use imgclass::training::{run_training, RunConfig};

/// Write a solid-color image with slight per-pixel variation so the two
/// classes are separable but not degenerate.
fn write_image(path: &Path, base: [u8; 3], salt: u8) {
    let img = RgbImage::from_fn(16, 16, |x, y| {
        let jitter = ((x + y + salt as u32) % 7) as u8;
        Rgb([
            base[0].saturating_add(jitter),
            base[1].saturating_add(jitter),
            base[2].saturating_add(jitter),
        ])
    });
    img.save(path).unwrap();
}

/// Two classes, four training images and two validation images
fn synthetic_dataset(root: &Path) {
    let red = [200u8, 30, 30];
    let blue = [30u8, 30, 200];

    for (split, count) in [("train", 2), ("val", 1)] {
        for (class, color) in [("class_a", red), ("class_b", blue)] {
            let dir = root.join(split).join(class);
            fs::create_dir_all(&dir).unwrap();
            for i in 0..count {
                write_image(&dir.join(format!("{}.png", i)), color, i as u8);
            }
        }
    }
}

fn run_config(root: &Path, epochs: usize) -> RunConfig {
    RunConfig {
        batch_size: 2,
        learning_rate: 0.01,
        momentum: 0.9,
        input_size: 16,
        epochs,
        num_classes: 2,
        train_dir: root.join("train"),
        val_dir: root.join("val"),
        weights: None,
        output_dir: root.join("output"),
        log_path: None,
        seed: 42,
    }
}

#[test]
fn test_single_epoch_run_produces_artifacts() {
    let dir = TempDir::new().unwrap();
    synthetic_dataset(dir.path());

    let config = run_config(dir.path(), 1);
    let history = run_training::<TrainingBackend>(&config, default_device()).unwrap();

    assert_eq!(history.epochs_run, 1);
    assert_eq!(history.train.len(), 1);
    assert_eq!(history.test.len(), 1);
    assert_eq!(history.best_accuracy, history.test[0].accuracy);

    let output = dir.path().join("output");
    assert!(output.join("last.pth").exists());
    // First epoch always reaches the best slot under the >= rule
    assert!(output.join("best.pth").exists());

    let class_indices: BTreeMap<String, String> =
        serde_json::from_str(&fs::read_to_string(output.join("class_indices.json")).unwrap())
            .unwrap();
    assert_eq!(class_indices.len(), 2);
    assert_eq!(class_indices["0"], "class_a");
    assert_eq!(class_indices["1"], "class_b");

    // Exactly one 4-line log block
    let log = fs::read_to_string(output.join("log_eval.txt")).unwrap();
    let lines: Vec<&str> = log.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], "======");
    assert!(lines[1].starts_with("Train Epoch(0)"));
    assert!(lines[2].starts_with("Test  Epoch(0)"));
    assert!(lines[3].starts_with("Best Acc(Test):"));

    // Summary chart is best-effort but should exist in the happy path
    assert!(output.join("training_curves.svg").exists());
    assert!(output.join("confusion_matrix.csv").exists());
}

#[test]
fn test_second_run_truncates_log_and_history_tracks_best() {
    let dir = TempDir::new().unwrap();
    synthetic_dataset(dir.path());

    let config = run_config(dir.path(), 2);
    run_training::<TrainingBackend>(&config, default_device()).unwrap();

    let log_path = dir.path().join("output").join("log_eval.txt");
    let first = fs::read_to_string(&log_path).unwrap();
    assert_eq!(first.lines().count(), 2 * 4);

    // Re-running against the same log path leaves only the new run's blocks
    let history = run_training::<TrainingBackend>(&config, default_device()).unwrap();
    let second = fs::read_to_string(&log_path).unwrap();
    assert_eq!(second.lines().count(), 2 * 4);

    // Recorded best equals the max of the per-epoch test accuracies
    let max_acc = history
        .test
        .iter()
        .map(|m| m.accuracy)
        .fold(f64::MIN, f64::max);
    assert_eq!(history.best_accuracy, max_acc);
}

#[test]
fn test_missing_dataset_fails() {
    let dir = TempDir::new().unwrap();
    let config = run_config(dir.path(), 1);

    let result = run_training::<TrainingBackend>(&config, default_device());
    assert!(result.is_err());
}
