//! Epoch runner: one full pass over a dataset split.
//!
//! The `Trainer` owns the model and the SGD optimizer. A training epoch
//! runs forward/loss/backward/step per batch and mutates the model once
//! per batch; an evaluation epoch runs the same measurement on the
//! non-autodiff view of the model and leaves it untouched. Both collect
//! the full ordered prediction/label sequences, and metrics are computed
//! once over those sequences at the end of the epoch.

use burn::data::dataloader::batcher::Batcher;
use burn::data::dataset::Dataset;
use burn::{
    module::AutodiffModule,
    nn::loss::CrossEntropyLossConfig,
    optim::{
        adaptor::OptimizerAdaptor, momentum::MomentumConfig, GradientsParams, Optimizer, Sgd,
        SgdConfig,
    },
    tensor::{backend::AutodiffBackend, ElementConversion},
};
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::dataset::{ClassificationDataset, ImageBatcher, ImageItem};
use crate::model::ImageClassifier;
use crate::utils::metrics::{EpochMetrics, Metrics};

/// Result of one epoch on one split
#[derive(Debug, Clone)]
pub struct EpochReport {
    /// Aggregate record for history and logging
    pub summary: EpochMetrics,
    /// Full metrics including the confusion matrix
    pub details: Metrics,
}

/// Owns the model and optimizer state for a training run
pub struct Trainer<B: AutodiffBackend> {
    model: ImageClassifier<B>,
    optimizer: OptimizerAdaptor<Sgd<B::InnerBackend>, ImageClassifier<B>, B>,
    learning_rate: f64,
    num_classes: usize,
}

impl<B: AutodiffBackend> Trainer<B> {
    /// Create a trainer with an SGD + momentum optimizer at a fixed
    /// learning rate.
    pub fn new(
        model: ImageClassifier<B>,
        learning_rate: f64,
        momentum: f64,
        num_classes: usize,
    ) -> Self {
        let optimizer = SgdConfig::new()
            .with_momentum(Some(MomentumConfig::new().with_momentum(momentum)))
            .init();

        Self {
            model,
            optimizer,
            learning_rate,
            num_classes,
        }
    }

    /// Run one training epoch over the dataset in freshly shuffled order.
    ///
    /// Mutates the model once per batch via the optimizer update.
    pub fn train_epoch(
        &mut self,
        dataset: &ClassificationDataset,
        batcher: &ImageBatcher<B>,
        batch_size: usize,
        rng: &mut ChaCha8Rng,
    ) -> EpochReport {
        let mut indices: Vec<usize> = (0..dataset.len()).collect();
        indices.shuffle(rng);

        let num_batches = indices.len().div_ceil(batch_size);
        let mut total_loss = 0.0f64;
        let mut batches_seen = 0usize;
        let mut predictions: Vec<usize> = Vec::with_capacity(indices.len());
        let mut truths: Vec<usize> = Vec::with_capacity(indices.len());

        for (batch_idx, chunk) in indices.chunks(batch_size).enumerate() {
            let items: Vec<ImageItem> = chunk.iter().filter_map(|&i| dataset.get(i)).collect();
            if items.is_empty() {
                continue;
            }
            let batch = batcher.batch(items);

            let output = self.model.forward(batch.images.clone());
            let loss = CrossEntropyLossConfig::new()
                .init(&output.device())
                .forward(output.clone(), batch.targets.clone());

            let loss_value: f64 = loss.clone().into_scalar().elem();
            total_loss += loss_value;
            batches_seen += 1;

            // argmax(1) returns shape [batch, 1]; flatten to [batch]
            let preds = output.argmax(1).flatten::<1>(0, 1);
            let pred_vec: Vec<i64> = preds.into_data().to_vec().unwrap();
            let target_vec: Vec<i64> = batch.targets.into_data().to_vec().unwrap();
            predictions.extend(pred_vec.iter().map(|&p| p as usize));
            truths.extend(target_vec.iter().map(|&t| t as usize));

            // Gradients are freshly computed per backward pass; the update
            // consumes them and returns the stepped model
            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &self.model);
            self.model = self
                .optimizer
                .step(self.learning_rate, self.model.clone(), grads);

            debug!(
                "train batch {}/{}: loss = {:.4}",
                batch_idx + 1,
                num_batches,
                loss_value
            );
        }

        self.report(&predictions, &truths, total_loss, batches_seen)
    }

    /// Run one evaluation epoch in sequential order.
    ///
    /// Uses the inner (non-autodiff) model; no gradients are computed and
    /// the model state is left untouched.
    pub fn eval_epoch(
        &self,
        dataset: &ClassificationDataset,
        batcher: &ImageBatcher<B::InnerBackend>,
        batch_size: usize,
    ) -> EpochReport {
        let model = self.model.valid();

        let mut total_loss = 0.0f64;
        let mut batches_seen = 0usize;
        let mut predictions: Vec<usize> = Vec::with_capacity(dataset.len());
        let mut truths: Vec<usize> = Vec::with_capacity(dataset.len());

        let len = dataset.len();
        for start in (0..len).step_by(batch_size) {
            let end = (start + batch_size).min(len);
            let items: Vec<ImageItem> = (start..end).filter_map(|i| dataset.get(i)).collect();
            if items.is_empty() {
                continue;
            }
            let batch = batcher.batch(items);

            let output = model.forward(batch.images);
            let loss = CrossEntropyLossConfig::new()
                .init(&output.device())
                .forward(output.clone(), batch.targets.clone());

            let loss_value: f64 = loss.into_scalar().elem();
            total_loss += loss_value;
            batches_seen += 1;

            let preds = output.argmax(1).flatten::<1>(0, 1);
            let pred_vec: Vec<i64> = preds.into_data().to_vec().unwrap();
            let target_vec: Vec<i64> = batch.targets.into_data().to_vec().unwrap();
            predictions.extend(pred_vec.iter().map(|&p| p as usize));
            truths.extend(target_vec.iter().map(|&t| t as usize));
        }

        self.report(&predictions, &truths, total_loss, batches_seen)
    }

    fn report(
        &self,
        predictions: &[usize],
        truths: &[usize],
        total_loss: f64,
        batches_seen: usize,
    ) -> EpochReport {
        let mean_loss = total_loss / batches_seen.max(1) as f64;
        let details = Metrics::from_predictions(predictions, truths, self.num_classes);
        EpochReport {
            summary: EpochMetrics::new(&details, mean_loss),
            details,
        }
    }

    /// Borrow the current model state
    pub fn model(&self) -> &ImageClassifier<B> {
        &self.model
    }
}
