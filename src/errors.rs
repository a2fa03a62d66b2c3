use std::path::PathBuf;
use thiserror::Error;

/// Per-file failure while reading or decoding a source file. The graph
/// builder absorbs these (skip and log); they are never fatal to a run.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid UTF-8 in file {file}")]
    InvalidUtf8 { file: PathBuf },
}

/// Run-level failure: a root that cannot be opened, or an output that
/// cannot be encoded or written.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
