// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from image files on disk to batch tensors:
//
//   flat directory of images
//       │
//       ▼
//   FlatImageDataset  → fixed listing, decode + transform on get()
//       │
//       ▼
//   InfiniteSampler   → endless, reshuffled-per-cycle indices
//       │
//       ▼
//   StreamLoader      → B indices → worker pool decode
//       │
//       ▼
//   ImageBatcher      → [B, 3, H, W] tensor
//
// The trainer owns three StreamLoaders: train-content,
// validation-content, and style. They never synchronise with
// each other beyond being pulled once per iteration.
//
// Reference: Burn Book §4 (Datasets and Dataloaders)
//            Rust Book §13 (Iterators and Closures)

/// Tolerant image decoding and the resize/to-tensor transform
pub mod transform;

/// Non-recursive directory listing as an indexable dataset
pub mod dataset;

/// Endless per-cycle permutations of dataset indices
pub mod sampler;

/// Implements Burn's Batcher trait for image samples
pub mod batcher;

/// Pull-based batch loader with a worker pool
pub mod loader;
