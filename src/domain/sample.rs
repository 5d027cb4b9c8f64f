// ============================================================
// Layer 3 — ImageSample Domain Type
// ============================================================
// A single image after decoding and transformation:
//   - 3 colour channels (RGB)
//   - square, `size` × `size` pixels
//   - values in [0, 1], stored channel-first (C, H, W)
//
// Samples are rebuilt on every dataset access and dropped as
// soon as they have been stacked into a batch tensor.

use std::path::PathBuf;

/// Number of colour channels in every sample.
pub const CHANNELS: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct ImageSample {
    /// The file this sample was decoded from, for error messages
    /// and debug logs only
    pub source: PathBuf,

    /// Side length in pixels
    pub size: usize,

    /// CHW pixel values, length = CHANNELS * size * size
    pub pixels: Vec<f32>,
}

impl ImageSample {
    pub fn new(source: impl Into<PathBuf>, size: usize, pixels: Vec<f32>) -> Self {
        debug_assert_eq!(pixels.len(), CHANNELS * size * size);
        Self { source: source.into(), size, pixels }
    }

    /// Shape as (channels, height, width)
    pub fn shape(&self) -> [usize; 3] {
        [CHANNELS, self.size, self.size]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_is_channel_first() {
        let s = ImageSample::new("a.png", 4, vec![0.0; CHANNELS * 16]);
        assert_eq!(s.shape(), [3, 4, 4]);
    }
}
