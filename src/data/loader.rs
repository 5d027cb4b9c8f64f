// ============================================================
// Layer 4 — Stream Loader
// ============================================================
// One loader per image stream (train-content, val-content,
// style). Each pull:
//
//   sampler ──► B indices ──► worker pool decodes B images
//           ──► ImageBatcher stacks them ──► ImageBatch
//
// The calling thread blocks until all B images are decoded; the
// next batch is not prefetched. Workers only touch the dataset
// (read-only paths + transform), never training state.
//
// Reference: Burn Book §4 (Datasets and Dataloaders)
//            rayon documentation (ThreadPool::install)

use anyhow::{Context, Result};
use burn::{data::dataloader::batcher::Batcher, prelude::*};
use rayon::prelude::*;

use crate::data::{
    batcher::{ImageBatch, ImageBatcher},
    dataset::FlatImageDataset,
    sampler::InfiniteSampler,
};
use crate::domain::sample::ImageSample;
use crate::error::PipelineResult;

pub struct StreamLoader<B: Backend> {
    name:       String,
    dataset:    FlatImageDataset,
    sampler:    InfiniteSampler,
    batcher:    ImageBatcher,
    batch_size: usize,
    pool:       rayon::ThreadPool,
    device:     B::Device,
    pulls:      u64,
}

impl<B: Backend> StreamLoader<B> {
    /// `num_workers = 0` lets rayon pick one thread per CPU.
    pub fn new(
        name:        impl Into<String>,
        dataset:     FlatImageDataset,
        sampler:     InfiniteSampler,
        batch_size:  usize,
        num_workers: usize,
        device:      B::Device,
    ) -> Result<Self> {
        let name = name.into();
        let thread_prefix = name.clone();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_workers)
            .thread_name(move |i| format!("{thread_prefix}-loader-{i}"))
            .build()
            .with_context(|| format!("Cannot start worker pool for '{name}'"))?;

        tracing::info!(
            "Stream '{}': {} images from '{}', batch_size={}, workers={}",
            name,
            dataset.len(),
            dataset.root().display(),
            batch_size,
            pool.current_num_threads(),
        );

        Ok(Self {
            name,
            dataset,
            sampler,
            batcher: ImageBatcher,
            batch_size,
            pool,
            device,
            pulls: 0,
        })
    }

    /// Pull the next batch. Always exactly `batch_size` images.
    pub fn next_batch(&mut self) -> PipelineResult<ImageBatch<B>> {
        let indices: Vec<usize> = self.sampler.by_ref().take(self.batch_size).collect();

        let dataset = &self.dataset;
        let items = self.pool.install(|| {
            indices
                .par_iter()
                .map(|&index| dataset.get(index))
                .collect::<PipelineResult<Vec<ImageSample>>>()
        })?;

        self.pulls += 1;
        tracing::trace!(
            "Stream '{}' pull #{}: {:?}",
            self.name,
            self.pulls,
            items.iter().map(|s| s.source.display().to_string()).collect::<Vec<_>>()
        );
        Ok(self.batcher.batch(items, &self.device))
    }
}
