// ============================================================
// Layer 4 — Image Decoding and Transform
// ============================================================
// Turns a file on disk into an ImageSample:
//
//   file ──► decode (tolerant) ──► RGB ──► resize to size×size
//        ──► f32 in [0, 1], channel-first
//
// Tolerant decoding:
//   - pixel-count limits are lifted (no decompression-bomb guard)
//   - if the header parses but the pixel data is cut short, the
//     rows already decoded are kept and the rest stays zero
//   - only files whose header cannot be read at all are errors
//
// Reference: image crate documentation (ImageReader, ImageDecoder)

use std::path::Path;

use image::{
    imageops::FilterType, ColorType, DynamicImage, ImageBuffer, ImageDecoder, ImageReader,
};

use crate::domain::sample::{ImageSample, CHANNELS};
use crate::error::{PipelineError, PipelineResult};

/// Resize-to-square + to-tensor transform applied to every image.
#[derive(Debug, Clone, Copy)]
pub struct ImageTransform {
    /// Output side length in pixels
    pub size: u32,
}

impl ImageTransform {
    pub fn new(size: u32) -> Self {
        Self { size }
    }

    /// Decode `path` and apply the transform.
    pub fn load(&self, path: &Path) -> PipelineResult<ImageSample> {
        let img = decode_tolerant(path)?;
        Ok(self.apply(path, &img))
    }

    /// Resize (bilinear, aspect ratio not preserved) and convert
    /// interleaved RGB u8 into planar f32.
    pub fn apply(&self, path: &Path, img: &DynamicImage) -> ImageSample {
        let size = self.size as usize;
        let rgb = img
            .resize_exact(self.size, self.size, FilterType::Triangle)
            .to_rgb8();

        let plane = size * size;
        let mut pixels = vec![0.0f32; CHANNELS * plane];
        for (i, px) in rgb.pixels().enumerate() {
            for c in 0..CHANNELS {
                pixels[c * plane + i] = px[c] as f32 / 255.0;
            }
        }
        ImageSample::new(path, size, pixels)
    }
}

/// Decode an image, keeping whatever was readable from truncated data.
pub fn decode_tolerant(path: &Path) -> PipelineResult<DynamicImage> {
    let decode_err = |reason: String| PipelineError::ImageDecode {
        path: path.to_path_buf(),
        reason,
    };

    let mut reader = ImageReader::open(path)
        .map_err(|e| PipelineError::io(path, e))?
        .with_guessed_format()
        .map_err(|e| PipelineError::io(path, e))?;
    reader.no_limits();

    let decoder = reader.into_decoder().map_err(|e| decode_err(e.to_string()))?;
    let (width, height) = decoder.dimensions();
    let color = decoder.color_type();
    let total = usize::try_from(decoder.total_bytes())
        .map_err(|_| decode_err(format!("{width}x{height} image does not fit in memory")))?;

    let mut buf = vec![0u8; total];
    if let Err(e) = decoder.read_image(&mut buf) {
        tracing::warn!(
            "'{}' is truncated or corrupt ({}), keeping partially decoded pixels",
            path.display(),
            e
        );
    }

    image_from_raw(width, height, color, buf)
        .ok_or_else(|| decode_err(format!("unsupported colour type {color:?}")))
}

/// Rebuild a DynamicImage from a decoder's native-endian output buffer.
fn image_from_raw(width: u32, height: u32, color: ColorType, buf: Vec<u8>) -> Option<DynamicImage> {
    match color {
        ColorType::L8 => ImageBuffer::from_raw(width, height, buf).map(DynamicImage::ImageLuma8),
        ColorType::La8 => ImageBuffer::from_raw(width, height, buf).map(DynamicImage::ImageLumaA8),
        ColorType::Rgb8 => ImageBuffer::from_raw(width, height, buf).map(DynamicImage::ImageRgb8),
        ColorType::Rgba8 => ImageBuffer::from_raw(width, height, buf).map(DynamicImage::ImageRgba8),
        ColorType::L16 => {
            ImageBuffer::from_raw(width, height, to_u16(&buf)).map(DynamicImage::ImageLuma16)
        }
        ColorType::La16 => {
            ImageBuffer::from_raw(width, height, to_u16(&buf)).map(DynamicImage::ImageLumaA16)
        }
        ColorType::Rgb16 => {
            ImageBuffer::from_raw(width, height, to_u16(&buf)).map(DynamicImage::ImageRgb16)
        }
        ColorType::Rgba16 => {
            ImageBuffer::from_raw(width, height, to_u16(&buf)).map(DynamicImage::ImageRgba16)
        }
        ColorType::Rgb32F => {
            ImageBuffer::from_raw(width, height, to_f32(&buf)).map(DynamicImage::ImageRgb32F)
        }
        ColorType::Rgba32F => {
            ImageBuffer::from_raw(width, height, to_f32(&buf)).map(DynamicImage::ImageRgba32F)
        }
        _ => None,
    }
}

fn to_u16(buf: &[u8]) -> Vec<u16> {
    buf.chunks_exact(2)
        .map(|c| u16::from_ne_bytes([c[0], c[1]]))
        .collect()
}

fn to_f32(buf: &[u8]) -> Vec<f32> {
    buf.chunks_exact(4)
        .map(|c| f32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{scratch_dir, write_noise_png};
    use std::fs;

    #[test]
    fn test_output_has_configured_size() {
        let dir = scratch_dir("transform_size");
        let path = write_noise_png(&dir, "a.png", 20, 10, 1);

        let sample = ImageTransform::new(8).load(&path).unwrap();
        assert_eq!(sample.shape(), [3, 8, 8]);
        assert_eq!(sample.pixels.len(), 3 * 8 * 8);
        assert!(sample.pixels.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_grayscale_is_expanded_to_rgb() {
        let dir = scratch_dir("transform_gray");
        let path = dir.join("g.png");
        image::GrayImage::from_pixel(4, 4, image::Luma([255])).save(&path).unwrap();

        let sample = ImageTransform::new(4).load(&path).unwrap();
        assert!(sample.pixels.iter().all(|&v| (v - 1.0).abs() < 1e-6));
    }

    #[test]
    fn test_truncated_png_still_loads() {
        let dir = scratch_dir("transform_truncated");
        let path = write_noise_png(&dir, "t.png", 64, 64, 7);

        let bytes = fs::read(&path).unwrap();
        fs::write(&path, &bytes[..bytes.len() / 2]).unwrap();

        let sample = ImageTransform::new(16).load(&path).unwrap();
        assert_eq!(sample.pixels.len(), 3 * 16 * 16);
    }

    #[test]
    fn test_garbage_file_is_decode_error() {
        let dir = scratch_dir("transform_garbage");
        let path = dir.join("notes.txt");
        fs::write(&path, b"definitely not an image").unwrap();

        let err = ImageTransform::new(8).load(&path).unwrap_err();
        assert!(matches!(err, PipelineError::ImageDecode { .. }));
    }
}
