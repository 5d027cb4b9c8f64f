// ============================================================
// Error taxonomy
// ============================================================
// Every failure the pipeline can raise before or during a run.
// None of them is retried: the application layer wraps them in
// anyhow context naming the stage and the process exits non-zero.
//
// Truncated or very large images are NOT errors. They are
// decoded best-effort in data/transform.rs.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    /// Invalid run configuration or unusable pretrained weights.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("directory not found: '{}'", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("index {index} out of range for dataset of {len} images")]
    IndexOutOfRange { index: usize, len: usize },

    /// The file exists but not even its header could be decoded.
    #[error("cannot decode image '{}': {reason}", .path.display())]
    ImageDecode { path: PathBuf, reason: String },

    #[error("dataset '{}' contains no files", .0.display())]
    EmptyDataset(PathBuf),

    #[error("cannot write checkpoint '{}': {reason}", .path.display())]
    Checkpoint { path: PathBuf, reason: String },

    #[error("I/O error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;
