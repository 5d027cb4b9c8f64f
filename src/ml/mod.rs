// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// Everything that builds or updates the network.
//
//   network.rs  — the StyleNetwork contract the loop trains
//                 against, plus StyleLosses
//
//   model.rs    — the AdaIN network: frozen VGG-19 encoder up to
//                 relu4_1, adaptive instance normalisation, and
//                 the trainable mirrored decoder
//
//   schedule.rs — inverse-time learning-rate decay
//
//   trainer.rs  — the iteration loop: train step, validation,
//                 metrics, progress lines, checkpoints
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)
//            Huang & Belongie (2017) Arbitrary Style Transfer
//            in Real-time with Adaptive Instance Normalization

/// AdaIN encoder/decoder architecture
pub mod model;

/// Trait the training loop is generic over
pub mod network;

pub mod schedule;

/// Training loop with validation and checkpointing
pub mod trainer;
