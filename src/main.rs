//! imgclass CLI
//!
//! Command-line entry point for training an image classifier on a
//! class-per-subdirectory dataset and for inspecting dataset statistics.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;

use imgclass::backend::{backend_name, default_device, TrainingBackend};
use imgclass::dataset::ImageFolderDataset;
use imgclass::training::{run_training, RunConfig};
use imgclass::utils::logging::{init_logging, LogConfig};

/// Image classification training harness built on Burn
#[derive(Parser, Debug)]
#[command(name = "imgclass")]
#[command(version = imgclass::VERSION)]
#[command(about = "Train and evaluate a CNN image classifier", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, default_value = "false")]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Train a classifier and write checkpoints, log and charts
    Train {
        /// Batch size for training (evaluation uses half)
        #[arg(long, default_value = "64")]
        batch_size: usize,

        /// SGD learning rate
        #[arg(long, default_value = "0.001")]
        lr: f64,

        /// SGD momentum
        #[arg(long, default_value = "0.9")]
        momentum: f64,

        /// Square input resolution images are cropped/resized to
        #[arg(long, default_value = "120")]
        input_size: usize,

        /// Number of training epochs
        #[arg(long, default_value = "100")]
        epochs: usize,

        /// Optional initial weights checkpoint to start from
        #[arg(long)]
        weights: Option<PathBuf>,

        /// Eval log path (defaults to <output-path>/log_eval.txt)
        #[arg(long)]
        log_eval: Option<PathBuf>,

        /// Training split root (one subdirectory per class)
        #[arg(long, default_value = "data/train")]
        train_path: PathBuf,

        /// Validation split root
        #[arg(long, default_value = "data/val")]
        val_path: PathBuf,

        /// Number of classes
        #[arg(long, default_value = "5")]
        class_num: usize,

        /// Directory for checkpoints and run artifacts
        #[arg(long, default_value = "output/run")]
        output_path: PathBuf,

        /// Random seed for epoch shuffling
        #[arg(long, default_value = "42")]
        seed: u64,
    },

    /// Print dataset statistics for a split directory
    Stats {
        /// Dataset split root (one subdirectory per class)
        #[arg(long, default_value = "data/train")]
        data_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_config = if cli.verbose {
        LogConfig::verbose()
    } else {
        LogConfig::default()
    };
    let _ = init_logging(&log_config);

    match cli.command {
        Commands::Train {
            batch_size,
            lr,
            momentum,
            input_size,
            epochs,
            weights,
            log_eval,
            train_path,
            val_path,
            class_num,
            output_path,
            seed,
        } => {
            let config = RunConfig {
                batch_size,
                learning_rate: lr,
                momentum,
                input_size,
                epochs,
                num_classes: class_num,
                train_dir: train_path,
                val_dir: val_path,
                weights,
                output_dir: output_path,
                log_path: log_eval,
                seed,
            };
            cmd_train(config)
        }
        Commands::Stats { data_dir } => cmd_stats(&data_dir),
    }
}

fn cmd_train(config: RunConfig) -> Result<()> {
    println!("{}", "Training configuration:".cyan().bold());
    println!("  backend:     {}", backend_name());
    println!("  train split: {}", config.train_dir.display());
    println!("  val split:   {}", config.val_dir.display());
    println!("  epochs:      {}", config.epochs);
    println!("  batch size:  {}", config.batch_size);
    println!("  input size:  {}", config.input_size);
    println!("  lr:          {}", config.learning_rate);
    println!("  classes:     {}", config.num_classes);
    println!("  output:      {}", config.output_dir.display());
    println!();

    let history = run_training::<TrainingBackend>(&config, default_device())?;

    println!();
    println!("{}", "Training complete!".green().bold());
    println!(
        "  best test accuracy: {:.2}% over {} epochs",
        history.best_accuracy * 100.0,
        history.epochs_run
    );
    println!(
        "  checkpoints: {} / {}",
        config.output_dir.join("last.pth").display(),
        config.output_dir.join("best.pth").display()
    );
    println!("  eval log:    {}", config.log_path().display());

    Ok(())
}

fn cmd_stats(data_dir: &PathBuf) -> Result<()> {
    let dataset = ImageFolderDataset::new(data_dir)?;
    dataset.stats().print();
    Ok(())
}
