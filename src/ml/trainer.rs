// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Iteration-based (not epoch-based) train + validate loop.
//
// Per iteration i (0-indexed), strictly in this order:
//   1. lr = base / (1 + decay * i), recorded
//   2. pull ONE style batch (shared by both phases below)
//   3. train: pull content batch, forward, weighted total,
//      backward, Adam step on the decoder only
//   4. record train losses
//   5. validate: pull val batch, forward on the inner backend
//      (no autodiff graph) with the same style batch
//   6. record val losses
//   7. every loss_print_interval: one progress line, written to
//      `console` whether or not the bar is drawn
//   8. every save_model_interval, and at the last iteration:
//      checkpoint the decoder as decoder_iter_<i+1>
//
// Any error ends the run. Nothing is skipped or retried.
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use std::{io::Write, path::PathBuf};

use anyhow::{Context, Result};
use burn::{
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::{backend::AutodiffBackend, ElementConversion},
};
use indicatif::{ProgressBar, ProgressStyle};

use crate::data::loader::StreamLoader;
use crate::domain::traits::ScalarSink;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::{network::StyleNetwork, schedule::learning_rate};

/// The loop's share of the run configuration.
#[derive(Debug, Clone)]
pub struct LoopSettings {
    pub lr:                  f64,
    pub lr_decay:            f64,
    pub max_iter:            usize,
    pub content_weight:      f64,
    pub style_weight:        f64,
    pub save_model_interval: usize,
    pub loss_print_interval: usize,
    pub show_progress:       bool,
}

/// The three image streams, each pulled once per iteration.
pub struct Streams<B: AutodiffBackend> {
    pub style:         StreamLoader<B>,
    pub train_content: StreamLoader<B>,
    /// Validation runs without autodiff, so its batches live on
    /// the inner backend.
    pub val_content:   StreamLoader<B::InnerBackend>,
}

/// What a finished run produced.
#[derive(Debug, Clone)]
pub struct TrainingSummary {
    pub iterations:      usize,
    pub progress_lines:  usize,
    pub checkpoints:     Vec<PathBuf>,
    pub last_train_loss: f64,
    pub last_val_loss:   f64,
}

/// `step` is the 1-indexed count of completed iterations.
pub fn is_checkpoint_step(step: usize, save_model_interval: usize, max_iter: usize) -> bool {
    step % save_model_interval == 0 || step == max_iter
}

pub fn is_print_step(step: usize, loss_print_interval: usize) -> bool {
    step % loss_print_interval == 0
}

pub fn run_training<B, N>(
    settings: &LoopSettings,
    mut network: N,
    streams:  &mut Streams<B>,
    metrics:  &mut dyn ScalarSink,
    ckpt:     &CheckpointManager,
    console:  &mut dyn Write,
) -> Result<TrainingSummary>
where
    B: AutodiffBackend,
    N: StyleNetwork<B>,
{
    // ── Adam optimiser over the decoder's parameters only ─────────────────────
    let mut optim = AdamConfig::new().init::<B, N::Decoder>();

    let progress = if settings.show_progress {
        ProgressBar::new(settings.max_iter as u64)
    } else {
        ProgressBar::hidden()
    };
    progress.set_style(
        ProgressStyle::with_template("{bar:40} {pos}/{len} [{elapsed_precise}<{eta_precise}, {per_sec}]")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let mut summary = TrainingSummary {
        iterations:      0,
        progress_lines:  0,
        checkpoints:     Vec::new(),
        last_train_loss: f64::NAN,
        last_val_loss:   f64::NAN,
    };

    tracing::info!("Training for {} iterations", settings.max_iter);

    for i in 0..settings.max_iter {
        let step = i + 1;

        // ── 1. Learning rate ──────────────────────────────────────────────────
        let lr = learning_rate(settings.lr, settings.lr_decay, i);
        metrics.record("Learning rate", lr, step)?;

        // ── 2. Style batch ────────────────────────────────────────────────────
        let style = streams
            .style
            .next_batch()
            .with_context(|| format!("iteration {step}: pulling style batch"))?
            .images;

        // ── 3. Train phase ────────────────────────────────────────────────────
        let content = streams
            .train_content
            .next_batch()
            .with_context(|| format!("iteration {step}: pulling train content batch"))?
            .images;

        let train = network
            .forward(content, style.clone())
            .weighted(settings.content_weight, settings.style_weight);
        let train_total = train.total();

        let grads = train_total.backward();
        let grads = GradientsParams::from_grads(grads, network.decoder());
        let decoder = optim.step(lr, network.decoder().clone(), grads);
        network = network.with_decoder(decoder);

        // ── 4. Record train losses ────────────────────────────────────────────
        let train_c = scalar(train.content);
        let train_s = scalar(train.style);
        metrics.record("train loss_content", train_c, step)?;
        metrics.record("train loss_style", train_s, step)?;

        // ── 5. Validation phase ───────────────────────────────────────────────
        let val_content = streams
            .val_content
            .next_batch()
            .with_context(|| format!("iteration {step}: pulling validation content batch"))?
            .images;

        let val = network
            .evaluate(val_content, style.inner())
            .weighted(settings.content_weight, settings.style_weight);
        let val_total = scalar(val.total());

        // ── 6. Record val losses ──────────────────────────────────────────────
        metrics.record("val loss_content", scalar(val.content), step)?;
        metrics.record("val loss_style", scalar(val.style), step)?;
        metrics.flush()?;

        summary.last_train_loss = train_c + train_s;
        summary.last_val_loss = val_total;

        // ── 7. Progress line ──────────────────────────────────────────────────
        if is_print_step(step, settings.loss_print_interval) {
            // suspend clears the bar (if drawn) around the write
            progress
                .suspend(|| {
                    writeln!(
                        console,
                        "Learning rate = {lr}; Train Loss = {}; Val Loss = {}",
                        summary.last_train_loss, summary.last_val_loss
                    )
                })
                .context("writing progress line")?;
            summary.progress_lines += 1;
        }

        // ── 8. Checkpoint ─────────────────────────────────────────────────────
        if is_checkpoint_step(step, settings.save_model_interval, settings.max_iter) {
            let path = ckpt
                .save_decoder::<B::InnerBackend, _>(network.decoder().valid(), step)
                .with_context(|| format!("iteration {step}: saving checkpoint"))?;
            tracing::info!("Checkpoint saved: '{}'", path.display());
            summary.checkpoints.push(path);
        }

        summary.iterations = step;
        progress.inc(1);
    }

    progress.finish_and_clear();
    metrics.close()?;

    tracing::info!("Training complete!");
    Ok(summary)
}

fn scalar<B: Backend>(t: Tensor<B, 1>) -> f64 {
    t.into_scalar().elem::<f64>()
}
