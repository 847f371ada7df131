//! Image-folder dataset loader.
//!
//! Scans a `root/<class_name>/*.jpg` directory layout into an ordered list
//! of (path, label) samples. Class indices are assigned by sorted directory
//! name, and the resulting index-to-name mapping can be persisted as a JSON
//! artifact for later inference.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::utils::error::{Error, Result};

/// File extensions treated as images
const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "bmp"];

/// A single image sample with its label
#[derive(Debug, Clone)]
pub struct ImageSample {
    /// Path to the image file
    pub path: PathBuf,
    /// Class label index
    pub label: usize,
    /// Class name (directory name)
    pub class_name: String,
}

/// Labeled image-folder dataset, immutable after load
#[derive(Debug)]
pub struct ImageFolderDataset {
    /// Root directory of the split
    pub root_dir: PathBuf,
    /// All samples, ordered by class then directory order
    pub samples: Vec<ImageSample>,
    /// Mapping from class name to label index
    pub class_to_idx: HashMap<String, usize>,
    /// Mapping from label index to class name
    pub idx_to_class: HashMap<usize, String>,
}

impl ImageFolderDataset {
    /// Load a dataset split from a class-per-subdirectory layout.
    ///
    /// ```text
    /// root_dir/
    /// ├── cat/
    /// │   ├── 001.jpg
    /// │   └── 002.jpg
    /// └── dog/
    ///     └── ...
    /// ```
    pub fn new<P: AsRef<Path>>(root_dir: P) -> Result<Self> {
        let root_dir = root_dir.as_ref().to_path_buf();
        info!("loading image folder dataset from {:?}", root_dir);

        if !root_dir.exists() {
            return Err(Error::Dataset(format!(
                "dataset directory does not exist: {}",
                root_dir.display()
            )));
        }

        let mut class_dirs: Vec<String> = Vec::new();
        for entry in std::fs::read_dir(&root_dir)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                if let Some(name) = entry.file_name().to_str() {
                    class_dirs.push(name.to_string());
                }
            }
        }
        class_dirs.sort();

        if class_dirs.is_empty() {
            return Err(Error::Dataset(format!(
                "no class directories found under {}",
                root_dir.display()
            )));
        }

        let class_to_idx: HashMap<String, usize> = class_dirs
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.clone(), idx))
            .collect();
        let idx_to_class: HashMap<usize, String> = class_dirs
            .iter()
            .enumerate()
            .map(|(idx, name)| (idx, name.clone()))
            .collect();

        let mut samples = Vec::new();
        for class_name in &class_dirs {
            let class_dir = root_dir.join(class_name);
            let label = class_to_idx[class_name];
            let before = samples.len();

            for entry in WalkDir::new(&class_dir)
                .min_depth(1)
                .max_depth(1)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let path = entry.path().to_path_buf();
                if let Some(ext) = path.extension() {
                    let ext = ext.to_string_lossy().to_lowercase();
                    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
                        samples.push(ImageSample {
                            path,
                            label,
                            class_name: class_name.clone(),
                        });
                    }
                }
            }

            debug!(
                "class '{}' (label {}): {} samples",
                class_name,
                label,
                samples.len() - before
            );
        }

        info!(
            "loaded {} samples across {} classes",
            samples.len(),
            class_dirs.len()
        );

        Ok(Self {
            root_dir,
            samples,
            class_to_idx,
            idx_to_class,
        })
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the dataset has no samples
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Number of classes
    pub fn num_classes(&self) -> usize {
        self.class_to_idx.len()
    }

    /// Extract the (path, label) pairs for tensor dataset construction
    pub fn to_samples(&self) -> Vec<(PathBuf, usize)> {
        self.samples
            .iter()
            .map(|s| (s.path.clone(), s.label))
            .collect()
    }

    /// Persist the index-to-class mapping as a JSON object keyed by the
    /// stringified class index.
    pub fn save_class_indices(&self, path: &Path) -> Result<()> {
        let mapping: BTreeMap<String, String> = self
            .idx_to_class
            .iter()
            .map(|(idx, name)| (idx.to_string(), name.clone()))
            .collect();

        let json = serde_json::to_string_pretty(&mapping)
            .map_err(|e| Error::Serialization(e.to_string()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)?;

        info!("class index mapping written to {:?}", path);
        Ok(())
    }

    /// Per-class sample counts and names
    pub fn stats(&self) -> DatasetStats {
        let mut class_counts = vec![0usize; self.num_classes()];
        for sample in &self.samples {
            class_counts[sample.label] += 1;
        }

        DatasetStats {
            total_samples: self.samples.len(),
            num_classes: self.num_classes(),
            class_counts,
            class_names: self.idx_to_class.clone(),
        }
    }
}

/// Summary statistics about a dataset split
#[derive(Debug, Clone)]
pub struct DatasetStats {
    pub total_samples: usize,
    pub num_classes: usize,
    pub class_counts: Vec<usize>,
    pub class_names: HashMap<usize, String>,
}

impl DatasetStats {
    /// Print the class distribution to the console
    pub fn print(&self) {
        println!("Dataset statistics:");
        println!("  total samples: {}", self.total_samples);
        println!("  classes: {}", self.num_classes);

        let mut sorted: Vec<_> = self.class_names.iter().collect();
        sorted.sort_by_key(|(idx, _)| *idx);

        for (idx, name) in sorted {
            let count = self.class_counts[*idx];
            let pct = if self.total_samples > 0 {
                100.0 * count as f64 / self.total_samples as f64
            } else {
                0.0
            };
            println!("    {:3}. {:32} {:6} ({:5.1}%)", idx, name, count, pct);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;
    use tempfile::TempDir;

    fn write_image(path: &Path) {
        RgbImage::from_pixel(8, 8, image::Rgb([10, 20, 30]))
            .save(path)
            .unwrap();
    }

    fn fixture_dataset() -> TempDir {
        let dir = TempDir::new().unwrap();
        for (class, n) in [("cat", 2), ("dog", 3)] {
            let class_dir = dir.path().join(class);
            std::fs::create_dir_all(&class_dir).unwrap();
            for i in 0..n {
                write_image(&class_dir.join(format!("{}.png", i)));
            }
        }
        dir
    }

    #[test]
    fn test_class_indices_sorted_by_name() {
        let dir = fixture_dataset();
        let dataset = ImageFolderDataset::new(dir.path()).unwrap();

        assert_eq!(dataset.num_classes(), 2);
        assert_eq!(dataset.class_to_idx["cat"], 0);
        assert_eq!(dataset.class_to_idx["dog"], 1);
        assert_eq!(dataset.len(), 5);
    }

    #[test]
    fn test_non_image_files_skipped() {
        let dir = fixture_dataset();
        std::fs::write(dir.path().join("cat").join("notes.txt"), "not an image").unwrap();

        let dataset = ImageFolderDataset::new(dir.path()).unwrap();
        assert_eq!(dataset.len(), 5);
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let err = ImageFolderDataset::new("/nonexistent/dataset/path").unwrap_err();
        assert!(matches!(err, Error::Dataset(_)));
    }

    #[test]
    fn test_save_class_indices() {
        let dir = fixture_dataset();
        let dataset = ImageFolderDataset::new(dir.path()).unwrap();

        let out = dir.path().join("class_indices.json");
        dataset.save_class_indices(&out).unwrap();

        let json: std::collections::BTreeMap<String, String> =
            serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(json.len(), 2);
        assert_eq!(json["0"], "cat");
        assert_eq!(json["1"], "dog");
    }

    #[test]
    fn test_stats_counts() {
        let dir = fixture_dataset();
        let dataset = ImageFolderDataset::new(dir.path()).unwrap();

        let stats = dataset.stats();
        assert_eq!(stats.total_samples, 5);
        assert_eq!(stats.class_counts, vec![2, 3]);
    }
}
