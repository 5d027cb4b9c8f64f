// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Validate the config                 (this layer)
//   Step 2: Seed every RNG                      (Layer 6 - infra)
//   Step 3: Check the three input directories   (this layer)
//   Step 4: Open checkpoint dir + metrics sink  (Layer 6 - infra)
//   Step 5: Build datasets, samplers, loaders   (Layer 4 - data)
//   Step 6: Load VGG weights, build the network (Layer 5/6)
//   Step 7: Save config                         (Layer 6 - infra)
//   Step 8: Run training loop                   (Layer 5 - ml)
//
// Everything up to Step 8 can fail with a configuration error;
// no iteration runs until all of it has succeeded.
//
// Reference: Rust Book §13 (Iterators and Closures)
//            Burn Book §5 (Training)

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use burn::tensor::backend::AutodiffBackend;
use serde::{Deserialize, Serialize};

use crate::data::{
    dataset::FlatImageDataset,
    loader::StreamLoader,
    sampler::InfiniteSampler,
    transform::ImageTransform,
};
use crate::error::{PipelineError, PipelineResult};
use crate::infra::{
    checkpoint::CheckpointManager,
    metrics::CsvScalarSink,
    pretrained::load_vgg_encoder,
    randomness::RandomnessContext,
};
use crate::ml::{
    model::{StyleTransferConfig, VggEncoder},
    trainer::{run_training, LoopSettings, Streams, TrainingSummary},
};

/// Autodiff on top of the GPU backend for the binary.
pub type MyBackend = burn::backend::Autodiff<burn::backend::Wgpu>;

// ─── Training Configuration ──────────────────────────────────────────────────
// All settings for a training run. Serialisable so the exact
// configuration is stored next to the checkpoints it produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub train_content_dir:   PathBuf,
    pub val_content_dir:     PathBuf,
    pub style_dir:           PathBuf,
    pub vgg:                 PathBuf,
    pub save_dir:            PathBuf,
    pub log_dir:             PathBuf,
    pub lr:                  f64,
    pub lr_decay:            f64,
    pub max_iter:            usize,
    pub batch_size:          usize,
    pub style_weight:        f64,
    pub content_weight:      f64,
    pub n_threads:           usize,
    pub save_model_interval: usize,
    pub loss_print_interval: usize,
    pub seed:                u64,
    pub image_size:          u32,
    pub quiet:               bool,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            train_content_dir:   PathBuf::new(),
            val_content_dir:     PathBuf::new(),
            style_dir:           PathBuf::new(),
            vgg:                 PathBuf::from("models/vgg_normalised.safetensors"),
            save_dir:            PathBuf::from("./experiments"),
            log_dir:             PathBuf::from("./logs"),
            lr:                  1e-4,
            lr_decay:            1e-5,
            max_iter:            160_000,
            batch_size:          8,
            style_weight:        1.0,
            content_weight:      1.0,
            n_threads:           16,
            save_model_interval: 10_000,
            loss_print_interval: 100,
            seed:                42,
            image_size:          512,
            quiet:               false,
        }
    }
}

impl TrainConfig {
    /// Reject settings the loop cannot run with.
    pub fn validate(&self) -> PipelineResult<()> {
        let positive = [
            ("batch_size", self.batch_size),
            ("max_iter", self.max_iter),
            ("save_model_interval", self.save_model_interval),
            ("loss_print_interval", self.loss_print_interval),
        ];
        for (name, value) in positive {
            if value == 0 {
                return Err(PipelineError::config(format!("{name} must be at least 1")));
            }
        }

        // three 2× poolings in the encoder, three 2× upsamplings back;
        // relu4_1 needs at least 2×2 positions for a channel std
        if self.image_size < 16 || self.image_size % 8 != 0 {
            return Err(PipelineError::config(format!(
                "image_size must be a multiple of 8 and at least 16, got {}",
                self.image_size
            )));
        }
        if !self.lr.is_finite() || self.lr <= 0.0 {
            return Err(PipelineError::config(format!("lr must be positive, got {}", self.lr)));
        }
        if !self.lr_decay.is_finite() || self.lr_decay < 0.0 {
            return Err(PipelineError::config(format!(
                "lr_decay must be non-negative, got {}",
                self.lr_decay
            )));
        }
        if !self.style_weight.is_finite() || !self.content_weight.is_finite() {
            return Err(PipelineError::config("loss weights must be finite"));
        }
        Ok(())
    }

    fn loop_settings(&self) -> LoopSettings {
        LoopSettings {
            lr:                  self.lr,
            lr_decay:            self.lr_decay,
            max_iter:            self.max_iter,
            content_weight:      self.content_weight,
            style_weight:        self.style_weight,
            save_model_interval: self.save_model_interval,
            loss_print_interval: self.loss_print_interval,
            show_progress:       !self.quiet,
        }
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Train on the default WGPU device.
    pub fn execute(&self) -> Result<TrainingSummary> {
        let device = burn::backend::wgpu::WgpuDevice::default();
        tracing::info!("Using WGPU device: {:?}", device);
        self.execute_on::<MyBackend>(device)
    }

    pub fn execute_on<B: AutodiffBackend>(&self, device: B::Device) -> Result<TrainingSummary> {
        let cfg = &self.config;

        // ── Step 1: Validate ──────────────────────────────────────────────────
        cfg.validate()?;

        // ── Step 2: Seed ──────────────────────────────────────────────────────
        // Before any module or sampler is built.
        let mut rng = RandomnessContext::new(cfg.seed);
        rng.seed_backend::<B>(&device);

        // ── Step 3: Input directories ─────────────────────────────────────────
        for (flag, dir) in [
            ("train_content_dir", &cfg.train_content_dir),
            ("val_content_dir", &cfg.val_content_dir),
            ("style_dir", &cfg.style_dir),
        ] {
            require_dir(flag, dir)?;
        }

        // ── Step 4: Outputs ───────────────────────────────────────────────────
        let ckpt = CheckpointManager::new(&cfg.save_dir).context("creating checkpoint directory")?;
        let mut metrics = CsvScalarSink::new(&cfg.log_dir)?;
        tracing::info!(
            "Checkpoints → '{}', metrics → '{}'",
            ckpt.dir().display(),
            metrics.csv_path().display()
        );

        // ── Step 5: Streams ───────────────────────────────────────────────────
        // Fork order is fixed: train-content, val-content, style.
        let train_content = build_stream::<B>("train-content", &cfg.train_content_dir, cfg, &mut rng, &device)
            .context("building train-content stream")?;
        let val_content = build_stream::<B::InnerBackend>("val-content", &cfg.val_content_dir, cfg, &mut rng, &device)
            .context("building val-content stream")?;
        let style = build_stream::<B>("style", &cfg.style_dir, cfg, &mut rng, &device)
            .context("building style stream")?;
        let mut streams = Streams { style, train_content, val_content };

        // ── Step 6: Network ───────────────────────────────────────────────────
        let encoder = load_vgg_encoder(VggEncoder::<B>::new(&device), &cfg.vgg, &device)
            .context("loading pretrained encoder")?;
        let network = StyleTransferConfig::new().init(encoder, &device);

        // ── Step 7: Save config ───────────────────────────────────────────────
        ckpt.save_config(cfg).context("saving run configuration")?;

        // ── Step 8: Run training loop (Layer 5) ───────────────────────────────
        // progress lines go to stdout; the bar and tracing use stderr
        let mut console = std::io::stdout();
        run_training(&cfg.loop_settings(), network, &mut streams, &mut metrics, &ckpt, &mut console)
    }
}

fn require_dir(flag: &str, dir: &Path) -> PipelineResult<()> {
    if dir.is_dir() {
        Ok(())
    } else {
        Err(PipelineError::config(format!(
            "{flag} '{}' does not exist or is not a directory",
            dir.display()
        )))
    }
}

fn build_stream<B: burn::prelude::Backend>(
    name:   &str,
    dir:    &Path,
    cfg:    &TrainConfig,
    rng:    &mut RandomnessContext,
    device: &B::Device,
) -> Result<StreamLoader<B>> {
    let dataset = FlatImageDataset::new(dir, ImageTransform::new(cfg.image_size))?;
    let sampler = InfiniteSampler::new(dataset.len(), rng.fork(name), dataset.root())?;
    StreamLoader::new(name, dataset, sampler, cfg.batch_size, cfg.n_threads, device.clone())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{image_dir, scratch_dir};
    use burn::backend::{Autodiff, NdArray};

    type TestBackend = Autodiff<NdArray>;

    fn config_with_dirs(tag: &str) -> TrainConfig {
        let out = scratch_dir(&format!("{tag}_out"));
        TrainConfig {
            train_content_dir: image_dir(&format!("{tag}_train"), 2, 8),
            val_content_dir:   image_dir(&format!("{tag}_val"), 2, 8),
            style_dir:         image_dir(&format!("{tag}_style"), 2, 8),
            vgg:               out.join("missing.safetensors"),
            save_dir:          out.join("experiments"),
            log_dir:           out.join("logs"),
            max_iter:          2,
            batch_size:        2,
            image_size:        16,
            quiet:             true,
            ..TrainConfig::default()
        }
    }

    #[test]
    fn test_defaults_validate() {
        assert!(TrainConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let cfg = TrainConfig { batch_size: 0, ..TrainConfig::default() };
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("batch_size"));
    }

    #[test]
    fn test_negative_decay_rejected() {
        let cfg = TrainConfig { lr_decay: -1e-5, ..TrainConfig::default() };
        assert!(matches!(cfg.validate(), Err(PipelineError::Configuration(_))));
    }

    #[test]
    fn test_image_size_must_be_multiple_of_eight() {
        let cfg = TrainConfig { image_size: 100, ..TrainConfig::default() };
        assert!(cfg.validate().is_err());
        let cfg = TrainConfig { image_size: 8, ..TrainConfig::default() };
        assert!(cfg.validate().is_err());
        let cfg = TrainConfig { image_size: 96, ..TrainConfig::default() };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_missing_input_directory_fails_before_outputs() {
        let mut cfg = config_with_dirs("usecase_nodir");
        cfg.style_dir = cfg.save_dir.join("no_such_dir");

        let err = TrainUseCase::new(cfg.clone())
            .execute_on::<TestBackend>(Default::default())
            .unwrap_err();
        assert!(err.to_string().contains("style_dir"));
        assert!(!cfg.save_dir.exists());
    }

    #[test]
    fn test_missing_weights_fail_before_training() {
        let cfg = config_with_dirs("usecase_noweights");

        let err = TrainUseCase::new(cfg.clone())
            .execute_on::<TestBackend>(Default::default())
            .unwrap_err();
        assert!(format!("{err:#}").contains("missing.safetensors"));
        assert!(!cfg.save_dir.join("decoder_iter_1.mpk").exists());
        assert!(!cfg.save_dir.join("train_config.json").exists());
    }

    #[test]
    fn test_empty_style_directory_rejected() {
        let mut cfg = config_with_dirs("usecase_empty");
        cfg.style_dir = scratch_dir("usecase_empty_style");

        let err = TrainUseCase::new(cfg)
            .execute_on::<TestBackend>(Default::default())
            .unwrap_err();
        let root = err.root_cause().downcast_ref::<PipelineError>();
        assert!(matches!(root, Some(PipelineError::EmptyDataset(_))));
    }
}
