//! Burn dataset and batcher for labeled images.
//!
//! Implements Burn's `Dataset` trait over lazily decoded images and a
//! `Batcher` that assembles [N, 3, S, S] float tensors with ImageNet
//! channel normalization.

use std::path::PathBuf;

use burn::data::dataloader::batcher::Batcher;
use burn::data::dataset::Dataset;
use burn::prelude::*;
use image::ImageReader;
use serde::{Deserialize, Serialize};

use crate::dataset::augmentation::Transform;
use crate::utils::error::{Error, Result};

/// ImageNet channel means
const NORM_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
/// ImageNet channel standard deviations
const NORM_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// A single decoded, transformed image ready for batching
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ImageItem {
    /// Image data as a flattened CHW float array [3 * S * S], range [0, 1]
    pub image: Vec<f32>,
    /// Class label
    pub label: usize,
    /// Source path (for debugging)
    pub path: String,
}

impl ImageItem {
    /// Decode an image from disk, apply the transform and convert to CHW
    pub fn load(path: &PathBuf, label: usize, transform: &Transform) -> Result<Self> {
        let img = ImageReader::open(path)
            .map_err(|e| Error::ImageLoad(path.clone(), e.to_string()))?
            .decode()
            .map_err(|e| Error::ImageLoad(path.clone(), e.to_string()))?;

        let rgb = transform.apply(&img).to_rgb8();
        let size = transform.input_size() as usize;
        debug_assert_eq!(rgb.dimensions(), (size as u32, size as u32));

        let mut image = vec![0.0f32; 3 * size * size];
        for y in 0..size {
            for x in 0..size {
                let pixel = rgb.get_pixel(x as u32, y as u32);
                image[y * size + x] = pixel[0] as f32 / 255.0;
                image[size * size + y * size + x] = pixel[1] as f32 / 255.0;
                image[2 * size * size + y * size + x] = pixel[2] as f32 / 255.0;
            }
        }

        Ok(Self {
            image,
            label,
            path: path.to_string_lossy().to_string(),
        })
    }

    /// Create from pre-computed pixel data
    pub fn from_data(image: Vec<f32>, label: usize, path: String) -> Self {
        Self { image, label, path }
    }
}

/// Burn dataset over (path, label) samples with a fixed transform.
///
/// Items are decoded on demand; the training transform re-randomizes its
/// crop and flip on every access, so each epoch sees fresh augmentations.
#[derive(Debug, Clone)]
pub struct ClassificationDataset {
    samples: Vec<(PathBuf, usize)>,
    transform: Transform,
}

impl ClassificationDataset {
    pub fn new(samples: Vec<(PathBuf, usize)>, transform: Transform) -> Self {
        Self { samples, transform }
    }
}

impl Dataset<ImageItem> for ClassificationDataset {
    fn get(&self, index: usize) -> Option<ImageItem> {
        let (path, label) = self.samples.get(index)?;
        ImageItem::load(path, *label, &self.transform).ok()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}

/// A batch of images for one training/evaluation step
#[derive(Clone, Debug)]
pub struct ImageBatch<B: Backend> {
    /// Images with shape [batch_size, 3, size, size]
    pub images: Tensor<B, 4>,
    /// Labels with shape [batch_size]
    pub targets: Tensor<B, 1, Int>,
}

/// Batcher assembling image tensors with ImageNet normalization
#[derive(Clone, Debug)]
pub struct ImageBatcher<B: Backend> {
    device: B::Device,
    input_size: usize,
}

impl<B: Backend> ImageBatcher<B> {
    pub fn new(device: B::Device, input_size: usize) -> Self {
        Self { device, input_size }
    }
}

impl<B: Backend> Batcher<ImageItem, ImageBatch<B>> for ImageBatcher<B> {
    fn batch(&self, items: Vec<ImageItem>) -> ImageBatch<B> {
        let batch_size = items.len();
        let size = self.input_size;

        let images_data: Vec<f32> = items.iter().flat_map(|item| item.image.clone()).collect();
        let images = Tensor::<B, 4>::from_floats(
            TensorData::new(images_data, [batch_size, 3, size, size]),
            &self.device,
        );

        // Per-channel normalization: (x - mean) / std
        let mean = Tensor::<B, 4>::from_floats(
            TensorData::new(NORM_MEAN.to_vec(), [1, 3, 1, 1]),
            &self.device,
        );
        let std = Tensor::<B, 4>::from_floats(
            TensorData::new(NORM_STD.to_vec(), [1, 3, 1, 1]),
            &self.device,
        );
        let images = (images - mean) / std;

        let targets_data: Vec<i64> = items.iter().map(|item| item.label as i64).collect();
        let targets = Tensor::<B, 1, Int>::from_data(
            TensorData::new(targets_data, [batch_size]),
            &self.device,
        );

        ImageBatch { images, targets }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::DefaultBackend;
    use image::RgbImage;
    use tempfile::TempDir;

    type B = DefaultBackend;

    #[test]
    fn test_image_item_from_data() {
        let item = ImageItem::from_data(vec![0.5f32; 3 * 16 * 16], 3, "a.png".to_string());
        assert_eq!(item.label, 3);
        assert_eq!(item.image.len(), 3 * 16 * 16);
    }

    #[test]
    fn test_item_load_applies_transform_size() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("img.png");
        RgbImage::from_pixel(24, 24, image::Rgb([255, 0, 0]))
            .save(&path)
            .unwrap();

        let item = ImageItem::load(&path, 1, &Transform::eval(16)).unwrap();
        assert_eq!(item.image.len(), 3 * 16 * 16);
        // Red channel stays high, green/blue stay low after CHW split
        assert!(item.image[0] > 0.9);
        assert!(item.image[16 * 16] < 0.1);
    }

    #[test]
    fn test_dataset_len_and_missing_index() {
        let dataset = ClassificationDataset::new(
            vec![(PathBuf::from("/nonexistent.png"), 0)],
            Transform::eval(16),
        );
        assert_eq!(dataset.len(), 1);
        // Unreadable file surfaces as None, matching the Dataset contract
        assert!(dataset.get(0).is_none());
        assert!(dataset.get(1).is_none());
    }

    #[test]
    fn test_batcher_shapes() {
        let device = Default::default();
        let batcher = ImageBatcher::<B>::new(device, 8);

        let items = vec![
            ImageItem::from_data(vec![0.0f32; 3 * 8 * 8], 0, "a".to_string()),
            ImageItem::from_data(vec![1.0f32; 3 * 8 * 8], 1, "b".to_string()),
        ];
        let batch = batcher.batch(items);

        assert_eq!(batch.images.dims(), [2, 3, 8, 8]);
        assert_eq!(batch.targets.dims(), [2]);
        let targets: Vec<i64> = batch.targets.into_data().to_vec().unwrap();
        assert_eq!(targets, vec![0, 1]);
    }

    #[test]
    fn test_batcher_normalizes_channels() {
        let device = Default::default();
        let batcher = ImageBatcher::<B>::new(device, 2);

        // Fill each channel with its ImageNet mean so normalization lands on 0
        let mut image = Vec::with_capacity(3 * 2 * 2);
        for c in 0..3 {
            image.extend(std::iter::repeat(NORM_MEAN[c]).take(4));
        }
        let batch = batcher.batch(vec![ImageItem::from_data(image, 0, "m".to_string())]);

        let values: Vec<f32> = batch.images.into_data().to_vec().unwrap();
        for v in values {
            assert!(v.abs() < 1e-5, "expected ~0 after normalization, got {}", v);
        }
    }
}
