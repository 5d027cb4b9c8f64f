// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The training loop talks to its metrics backend only through
// this trait. infra::metrics::CsvScalarSink is the production
// implementation; tests use an in-memory Vec.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;

// ─── ScalarSink ───────────────────────────────────────────────────────────────
/// Anything that can store a scalar time series.
pub trait ScalarSink {
    /// Append one `(tag, value)` point at `step`.
    fn record(&mut self, tag: &str, value: f64, step: usize) -> Result<()>;

    /// Persist everything recorded so far. Called once per iteration.
    fn flush(&mut self) -> Result<()>;

    /// Final flush at the end of a run.
    fn close(&mut self) -> Result<()> {
        self.flush()
    }
}

/// In-memory sink: `(tag, value, step)` triples in call order.
impl ScalarSink for Vec<(String, f64, usize)> {
    fn record(&mut self, tag: &str, value: f64, step: usize) -> Result<()> {
        self.push((tag.to_string(), value, step));
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}
