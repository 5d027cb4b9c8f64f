// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Records per-iteration scalars to a CSV file, one row per point.
//
// Tags written by the trainer (step = completed iterations):
//   Learning rate
//   train loss_content, train loss_style
//   val loss_content,   val loss_style
//
// Output file: <log_dir>/metrics.csv
//
// Example CSV output:
//   step,tag,value
//   1,Learning rate,0.0001
//   1,train loss_content,4.213874
//   ...
//
// Rows are buffered and flushed once per iteration, so a crash
// loses at most the iteration in flight.
//
// Reference: Rust Book §12 (I/O and File Handling)

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use crate::domain::traits::ScalarSink;

pub const METRICS_FILE: &str = "metrics.csv";

/// Appends scalar points to `<dir>/metrics.csv`.
pub struct CsvScalarSink {
    /// Full path to the CSV file
    csv_path: PathBuf,
    writer:   BufWriter<fs::File>,
    rows:     u64,
}

impl CsvScalarSink {
    /// Create the log directory if needed and open the CSV for
    /// appending. The header is written only when the file is new.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create log directory '{}'", dir.display()))?;

        let csv_path = dir.join(METRICS_FILE);
        let is_new = !csv_path.exists();

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&csv_path)
            .with_context(|| format!("Cannot open '{}'", csv_path.display()))?;
        let mut writer = BufWriter::new(file);

        if is_new {
            writeln!(writer, "step,tag,value")?;
            writer.flush()?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path, writer, rows: 0 })
    }

    /// Return the path to the metrics CSV file
    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }

    #[cfg(test)]
    pub fn rows_written(&self) -> u64 {
        self.rows
    }
}

impl ScalarSink for CsvScalarSink {
    fn record(&mut self, tag: &str, value: f64, step: usize) -> Result<()> {
        writeln!(self.writer, "{step},{tag},{value}")
            .with_context(|| format!("Cannot append to '{}'", self.csv_path.display()))?;
        self.rows += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer
            .flush()
            .with_context(|| format!("Cannot flush '{}'", self.csv_path.display()))
    }

    fn close(&mut self) -> Result<()> {
        self.flush()?;
        self.writer.get_ref().sync_all()?;
        tracing::debug!("Closed '{}' after {} rows", self.csv_path.display(), self.rows);
        Ok(())
    }
}
