// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses the command line with clap and hands a TrainConfig to
// Layer 2. Prints the run summary; all other output goes through
// tracing or the progress bar.
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, TrainArgs};

#[derive(Parser, Debug)]
#[command(
    name = "style-trainer",
    version = "0.1.0",
    about = "Train an AdaIN style-transfer decoder on content and style image folders."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args) => run_train(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!(
        "Starting training: content '{}', style '{}'",
        args.train_content_dir.display(),
        args.style_dir.display()
    );

    let summary = TrainUseCase::new(args.into()).execute()?;

    println!(
        "Training complete after {} iterations ({} progress lines). Final train loss {:.4}, val loss {:.4}.",
        summary.iterations, summary.progress_lines, summary.last_train_loss, summary.last_val_loss
    );
    for path in &summary.checkpoints {
        println!("  checkpoint: {}", path.display());
    }
    Ok(())
}
