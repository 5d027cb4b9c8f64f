// ============================================================
// Layer 4 — Image Batcher
// ============================================================
// Implements Burn's Batcher trait to stack a Vec<ImageSample>
// into one [batch, channels, height, width] tensor.
//
// Each sample is already channel-first and the same size, so
// every sample becomes a [C, H, W] tensor and they are stacked
// along a new leading dimension.
//
// Reference: Burn Book §4 (Batcher)

use burn::{data::dataloader::batcher::Batcher, prelude::*, tensor::TensorData};

use crate::domain::sample::ImageSample;

/// A batch of images ready for the network.
#[derive(Debug, Clone)]
pub struct ImageBatch<B: Backend> {
    /// Shape: [batch_size, 3, size, size], values in [0, 1]
    pub images: Tensor<B, 4>,
}

impl<B: Backend> ImageBatch<B> {
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.images.dims()[0]
    }
}

#[derive(Clone, Debug, Default)]
pub struct ImageBatcher;

impl<B: Backend> Batcher<B, ImageSample, ImageBatch<B>> for ImageBatcher {
    fn batch(&self, items: Vec<ImageSample>, device: &B::Device) -> ImageBatch<B> {
        let images = items
            .into_iter()
            .map(|item| {
                let shape = item.shape();
                Tensor::<B, 3>::from_data(
                    TensorData::new(item.pixels, shape).convert::<B::FloatElem>(),
                    device,
                )
            })
            .collect::<Vec<_>>();

        ImageBatch { images: Tensor::stack(images, 0) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    #[test]
    fn test_stacks_channel_first() {
        let device = <TestBackend as Backend>::Device::default();
        let items = (0..3)
            .map(|i| ImageSample::new(format!("{i}.png"), 2, vec![i as f32 / 10.0; 12]))
            .collect();

        let batch: ImageBatch<TestBackend> = ImageBatcher.batch(items, &device);
        assert_eq!(batch.images.dims(), [3, 3, 2, 2]);
        assert_eq!(batch.len(), 3);

        let values = batch.images.into_data().to_vec::<f32>().unwrap();
        assert!((values[12] - 0.1).abs() < 1e-6);
        assert!((values[24] - 0.2).abs() < 1e-6);
    }
}
