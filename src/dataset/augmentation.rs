//! Image transforms for training and evaluation.
//!
//! Training uses a random resized crop plus random horizontal flip; the
//! evaluation transform is a fixed resize followed by a center crop so
//! metrics are comparable across epochs. Channel normalization happens in
//! the batcher, not here.

use image::{imageops::FilterType, DynamicImage, GenericImageView};
use rand::Rng;

/// Fraction of each dimension a training crop may shrink to
const MIN_CROP_FRAC: f32 = 0.6;

/// Oversize factor applied before the evaluation center crop
const EVAL_RESIZE_FACTOR: f32 = 8.0 / 7.0;

/// Augmented transform for the training split
#[derive(Debug, Clone)]
pub struct TrainTransform {
    pub input_size: u32,
    pub flip_prob: f64,
}

impl TrainTransform {
    pub fn new(input_size: u32) -> Self {
        Self {
            input_size,
            flip_prob: 0.5,
        }
    }

    /// Random crop, resize to the target resolution, random horizontal flip
    pub fn apply<R: Rng>(&self, img: &DynamicImage, rng: &mut R) -> DynamicImage {
        let (w, h) = img.dimensions();

        let frac = rng.gen_range(MIN_CROP_FRAC..=1.0f32);
        let cw = ((w as f32 * frac).round() as u32).clamp(1, w);
        let ch = ((h as f32 * frac).round() as u32).clamp(1, h);
        let x0 = rng.gen_range(0..=w - cw);
        let y0 = rng.gen_range(0..=h - ch);

        let out = img
            .crop_imm(x0, y0, cw, ch)
            .resize_exact(self.input_size, self.input_size, FilterType::Triangle);

        if rng.gen_bool(self.flip_prob) {
            out.fliph()
        } else {
            out
        }
    }
}

/// Deterministic transform for the evaluation split
#[derive(Debug, Clone)]
pub struct EvalTransform {
    pub input_size: u32,
}

impl EvalTransform {
    pub fn new(input_size: u32) -> Self {
        Self { input_size }
    }

    /// Fixed oversize resize followed by a center crop
    pub fn apply(&self, img: &DynamicImage) -> DynamicImage {
        let resize = ((self.input_size as f32 * EVAL_RESIZE_FACTOR).round() as u32)
            .max(self.input_size);
        let resized = img.resize_exact(resize, resize, FilterType::Triangle);
        center_crop(&resized, self.input_size)
    }
}

/// Transform applied when a dataset item is materialized
#[derive(Debug, Clone)]
pub enum Transform {
    Train(TrainTransform),
    Eval(EvalTransform),
}

impl Transform {
    pub fn train(input_size: u32) -> Self {
        Self::Train(TrainTransform::new(input_size))
    }

    pub fn eval(input_size: u32) -> Self {
        Self::Eval(EvalTransform::new(input_size))
    }

    pub fn input_size(&self) -> u32 {
        match self {
            Self::Train(t) => t.input_size,
            Self::Eval(t) => t.input_size,
        }
    }

    /// Apply the transform; training draws its randomness from the thread rng
    pub fn apply(&self, img: &DynamicImage) -> DynamicImage {
        match self {
            Self::Train(t) => t.apply(img, &mut rand::thread_rng()),
            Self::Eval(t) => t.apply(img),
        }
    }
}

fn center_crop(img: &DynamicImage, size: u32) -> DynamicImage {
    let (w, h) = img.dimensions();
    let size = size.min(w).min(h);
    let x0 = (w - size) / 2;
    let y0 = (h - size) / 2;
    img.crop_imm(x0, y0, size, size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn gradient_image(w: u32, h: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(w, h, |x, y| {
            image::Rgb([(x * 7 % 256) as u8, (y * 11 % 256) as u8, 128])
        }))
    }

    #[test]
    fn test_eval_transform_output_size() {
        let img = gradient_image(100, 60);
        let out = EvalTransform::new(48).apply(&img);
        assert_eq!(out.dimensions(), (48, 48));
    }

    #[test]
    fn test_eval_transform_deterministic() {
        let img = gradient_image(100, 60);
        let t = EvalTransform::new(32);
        let a = t.apply(&img).to_rgb8();
        let b = t.apply(&img).to_rgb8();
        assert_eq!(a.as_raw(), b.as_raw());
    }

    #[test]
    fn test_train_transform_output_size() {
        let img = gradient_image(64, 64);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let out = TrainTransform::new(32).apply(&img, &mut rng);
        assert_eq!(out.dimensions(), (32, 32));
    }

    #[test]
    fn test_train_transform_seeded_reproducibility() {
        let img = gradient_image(64, 64);
        let t = TrainTransform::new(32);

        let a = t.apply(&img, &mut ChaCha8Rng::seed_from_u64(3)).to_rgb8();
        let b = t.apply(&img, &mut ChaCha8Rng::seed_from_u64(3)).to_rgb8();
        assert_eq!(a.as_raw(), b.as_raw());
    }

    #[test]
    fn test_center_crop_smaller_than_image() {
        let img = gradient_image(10, 10);
        let out = center_crop(&img, 4);
        assert_eq!(out.dimensions(), (4, 4));
    }
}
