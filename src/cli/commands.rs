// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the `train` subcommand and all its flags.
//
// Only the three input directories are required; every other
// flag carries the default of the reference training script.
//
// Reference: Rust Book §12 (Building a CLI Program)

use std::path::PathBuf;

use clap::{Args, Subcommand};
use crate::application::train_use_case::TrainConfig;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the style-transfer decoder
    Train(TrainArgs),
}

/// All arguments for the `train` command.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Directory of content images used for training
    #[arg(long)]
    pub train_content_dir: PathBuf,

    /// Directory of content images used for validation
    #[arg(long)]
    pub val_content_dir: PathBuf,

    /// Directory of style images
    #[arg(long)]
    pub style_dir: PathBuf,

    /// Normalised VGG-19 weights (.safetensors)
    #[arg(long, default_value = "models/vgg_normalised.safetensors")]
    pub vgg: PathBuf,

    /// Directory to save decoder checkpoints
    #[arg(long, default_value = "./experiments")]
    pub save_dir: PathBuf,

    /// Directory for the metrics CSV
    #[arg(long, default_value = "./logs")]
    pub log_dir: PathBuf,

    #[arg(long, default_value_t = 1e-4)]
    pub lr: f64,

    /// Inverse-time decay: lr / (1 + lr_decay * iteration)
    #[arg(long, default_value_t = 1e-5)]
    pub lr_decay: f64,

    #[arg(long, default_value_t = 160_000)]
    pub max_iter: usize,

    #[arg(long, default_value_t = 8)]
    pub batch_size: usize,

    #[arg(long, default_value_t = 1.0)]
    pub style_weight: f64,

    #[arg(long, default_value_t = 1.0)]
    pub content_weight: f64,

    /// Decode workers per stream (0 = one per CPU)
    #[arg(long, default_value_t = 16)]
    pub n_threads: usize,

    #[arg(long, default_value_t = 10_000)]
    pub save_model_interval: usize,

    #[arg(long, default_value_t = 100)]
    pub loss_print_interval: usize,

    /// Seed for weight init and every sampler
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Side length images are resized to
    #[arg(long, default_value_t = 512)]
    pub image_size: u32,

    /// Hide the progress bar (loss lines are still printed)
    #[arg(long)]
    pub quiet: bool,
}

/// The application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            train_content_dir:   a.train_content_dir,
            val_content_dir:     a.val_content_dir,
            style_dir:           a.style_dir,
            vgg:                 a.vgg,
            save_dir:            a.save_dir,
            log_dir:             a.log_dir,
            lr:                  a.lr,
            lr_decay:            a.lr_decay,
            max_iter:            a.max_iter,
            batch_size:          a.batch_size,
            style_weight:        a.style_weight,
            content_weight:      a.content_weight,
            n_threads:           a.n_threads,
            save_model_interval: a.save_model_interval,
            loss_print_interval: a.loss_print_interval,
            seed:                a.seed,
            image_size:          a.image_size,
            quiet:               a.quiet,
        }
    }
}
