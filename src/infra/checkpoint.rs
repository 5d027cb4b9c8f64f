// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Persists decoder weights with Burn's NamedMpkBytesRecorder.
//
// What gets saved:
//   1. decoder_iter_<N>.mpk  — decoder parameters after N
//                              completed iterations
//   2. train_config.json     — the run's configuration
//
// Each checkpoint is serialised fully in memory from the
// decoder's inner-backend record (plain TensorData, no device
// handle), written to `<name>.mpk.partial`, then renamed into
// place. A reader either sees the whole file or none of it.
//
// Checkpoints are never overwritten or pruned; the optimiser's
// moment estimates are not saved.
//
// File layout:
//   experiments/
//     train_config.json
//     decoder_iter_10000.mpk
//     decoder_iter_20000.mpk
//     ...
//
// Reference: Burn Book §5 (Records and Checkpointing)
//            Rust Book §9 (Error Handling)

use std::{
    fs,
    path::{Path, PathBuf},
};

use burn::{
    prelude::*,
    record::{FullPrecisionSettings, NamedMpkBytesRecorder, Recorder},
};
use serde::Serialize;

use crate::error::{PipelineError, PipelineResult};

pub const CHECKPOINT_EXTENSION: &str = "mpk";

/// Saves decoder snapshots and the run config into one directory.
#[derive(Debug, Clone)]
pub struct CheckpointManager {
    /// Directory where checkpoints are stored
    dir: PathBuf,
}

impl CheckpointManager {
    /// Create the manager, creating `dir` (and parents) if absent.
    pub fn new(dir: impl Into<PathBuf>) -> PipelineResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| PipelineError::io(&dir, e))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `decoder_iter_<iteration>.mpk` inside the checkpoint dir.
    pub fn decoder_path(&self, iteration: usize) -> PathBuf {
        self.dir
            .join(format!("decoder_iter_{iteration}.{CHECKPOINT_EXTENSION}"))
    }

    /// Snapshot `decoder` as the state after `iteration` completed
    /// iterations (1-indexed).
    ///
    /// Pass the inner-backend module (`decoder.valid()`), so the
    /// record holds no autodiff state.
    pub fn save_decoder<B: Backend, M: Module<B>>(
        &self,
        decoder:   M,
        iteration: usize,
    ) -> PipelineResult<PathBuf> {
        let path = self.decoder_path(iteration);
        let checkpoint_err = |reason: String| PipelineError::Checkpoint {
            path: path.clone(),
            reason,
        };

        let recorder = NamedMpkBytesRecorder::<FullPrecisionSettings>::new();
        let bytes = <NamedMpkBytesRecorder<FullPrecisionSettings> as Recorder<B>>::record(
            &recorder,
            decoder.into_record(),
            (),
        )
        .map_err(|e| checkpoint_err(e.to_string()))?;

        let partial = path.with_extension(format!("{CHECKPOINT_EXTENSION}.partial"));
        fs::write(&partial, &bytes).map_err(|e| PipelineError::io(&partial, e))?;
        fs::rename(&partial, &path).map_err(|e| PipelineError::io(&path, e))?;

        tracing::debug!(
            "Saved checkpoint '{}' ({} bytes)",
            path.display(),
            bytes.len()
        );
        Ok(path)
    }

    /// Write the run configuration as pretty JSON.
    pub fn save_config<T: Serialize>(&self, cfg: &T) -> PipelineResult<PathBuf> {
        let path = self.dir.join("train_config.json");

        let json = serde_json::to_string_pretty(cfg)
            .map_err(|e| PipelineError::config(format!("cannot serialise config: {e}")))?;
        fs::write(&path, json).map_err(|e| PipelineError::io(&path, e))?;

        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(path)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::scratch_dir;
    use burn::{
        backend::NdArray,
        nn::{Linear, LinearConfig},
    };

    type TestBackend = NdArray;

    #[test]
    fn test_creates_missing_directory() {
        let dir = scratch_dir("ckpt_mkdir").join("a").join("b");
        let ckpt = CheckpointManager::new(&dir).unwrap();
        assert!(ckpt.dir().is_dir());
    }

    #[test]
    fn test_saved_decoder_reloads() {
        let dir = scratch_dir("ckpt_roundtrip");
        let ckpt = CheckpointManager::new(&dir).unwrap();
        let device = <TestBackend as Backend>::Device::default();

        let layer: Linear<TestBackend> = LinearConfig::new(4, 2).init(&device);
        let path = ckpt.save_decoder(layer.clone(), 7).unwrap();
        assert_eq!(path, dir.join("decoder_iter_7.mpk"));
        assert!(!dir.join("decoder_iter_7.mpk.partial").exists());

        let bytes = fs::read(&path).unwrap();
        let record = <NamedMpkBytesRecorder<FullPrecisionSettings> as Recorder<TestBackend>>::load(
            &NamedMpkBytesRecorder::new(),
            bytes,
            &device,
        )
        .unwrap();
        let fresh: Linear<TestBackend> = LinearConfig::new(4, 2).init(&device);
        let reloaded = fresh.load_record(record);

        let expected = layer.weight.val().into_data().to_vec::<f32>().unwrap();
        let actual = reloaded.weight.val().into_data().to_vec::<f32>().unwrap();
        assert_eq!(expected, actual);
    }

    #[test]
    fn test_config_written_as_json() {
        let dir = scratch_dir("ckpt_config");
        let ckpt = CheckpointManager::new(&dir).unwrap();
        let path = ckpt.save_config(&serde_json::json!({ "lr": 1e-4 })).unwrap();
        let text = fs::read_to_string(path).unwrap();
        assert!(text.contains("\"lr\""));
    }
}
