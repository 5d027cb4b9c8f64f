use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::data::transform::ImageTransform;
use crate::domain::sample::ImageSample;
use crate::error::{PipelineError, PipelineResult};

/// Every direct child of one directory, addressable by index.
///
/// The listing is captured once in `new` and sorted by path, so
/// index → file is the same on every run. Files added or removed
/// afterwards are not seen. Nothing is filtered by extension, so a
/// stray non-image file surfaces as an `ImageDecode` error when it
/// is sampled.
#[derive(Debug)]
pub struct FlatImageDataset {
    root:      PathBuf,
    paths:     Vec<PathBuf>,
    transform: ImageTransform,
}

impl FlatImageDataset {
    pub fn new(root: impl AsRef<Path>, transform: ImageTransform) -> PipelineResult<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_dir() {
            return Err(PipelineError::DirectoryNotFound(root));
        }

        let mut paths = Vec::new();
        for entry in fs::read_dir(&root).map_err(|e| PipelineError::io(&root, e))? {
            let entry = entry.map_err(|e| PipelineError::io(&root, e))?;
            paths.push(entry.path());
        }
        // read_dir order is platform-defined
        paths.sort();

        tracing::debug!("Indexed {} files in '{}'", paths.len(), root.display());
        Ok(Self { root, paths, transform })
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    #[cfg(test)]
    pub fn path(&self, index: usize) -> Option<&Path> {
        self.paths.get(index).map(PathBuf::as_path)
    }

    /// Decode and transform the image at `index`. Never cached.
    pub fn get(&self, index: usize) -> PipelineResult<ImageSample> {
        let path = self.paths.get(index).ok_or(PipelineError::IndexOutOfRange {
            index,
            len: self.paths.len(),
        })?;
        self.transform.load(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{image_dir, scratch_dir};

    #[test]
    fn test_missing_directory() {
        let dir = scratch_dir("dataset_missing").join("nope");
        let err = FlatImageDataset::new(&dir, ImageTransform::new(4)).unwrap_err();
        assert!(matches!(err, PipelineError::DirectoryNotFound(p) if p == dir));
    }

    #[test]
    fn test_lists_direct_children_only() {
        let dir = image_dir("dataset_flat", 3, 8);
        fs::create_dir(dir.join("nested")).unwrap();
        fs::write(dir.join("nested").join("deep.png"), b"x").unwrap();

        let ds = FlatImageDataset::new(&dir, ImageTransform::new(4)).unwrap();
        // three images + the subdirectory entry itself
        assert_eq!(ds.len(), 4);
        assert!((0..ds.len()).all(|i| ds.path(i).unwrap().parent() == Some(dir.as_path())));
    }

    #[test]
    fn test_get_matches_listing() {
        let dir = image_dir("dataset_get", 2, 8);
        let ds = FlatImageDataset::new(&dir, ImageTransform::new(4)).unwrap();

        for i in 0..ds.len() {
            let sample = ds.get(i).unwrap();
            assert_eq!(sample.source, ds.path(i).unwrap());
            assert_eq!(sample.size, 4);
        }
    }

    #[test]
    fn test_index_out_of_range() {
        let dir = image_dir("dataset_oob", 2, 8);
        let ds = FlatImageDataset::new(&dir, ImageTransform::new(4)).unwrap();
        let err = ds.get(2).unwrap_err();
        assert!(matches!(err, PipelineError::IndexOutOfRange { index: 2, len: 2 }));
    }
}
