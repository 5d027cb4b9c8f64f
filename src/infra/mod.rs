// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting concerns used by the other layers:
//
//   randomness.rs — the single seed and the per-stream RNG forks
//
//   pretrained.rs — reads VGG-19 weights from .safetensors into
//                   the encoder, once, at startup
//
//   checkpoint.rs — decoder snapshots via Burn's
//                   NamedMpkBytesRecorder, written then renamed;
//                   also stores the run config as JSON
//
//   metrics.rs    — per-iteration scalars appended to a CSV file
//
// Reference: Rust Book §7 (Modules)
//            Rust Book §9 (Error Handling with anyhow)
//            Burn Book §5 (Checkpointing)

/// Decoder checkpoint saving
pub mod checkpoint;

/// Training metrics CSV logger
pub mod metrics;

pub mod pretrained;

/// Seed and RNG forks
pub mod randomness;
