use std::path::PathBuf;

use ml::MlError;
use puzzle::PuzzleError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RlError {
    #[error(transparent)]
    Puzzle(#[from] PuzzleError),
    #[error(transparent)]
    Ml(#[from] MlError),
    #[error("observations have {found} values but the networks expect {expected}")]
    DimensionMismatch { expected: usize, found: usize },
    #[error("rendering unavailable: {0:#}")]
    Render(anyhow::Error),
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid {field}: {reason}")]
    InvalidConfig { field: &'static str, reason: &'static str },
    #[error("policy expects {expected} but the environment provides {found}")]
    Incompatible { expected: String, found: String },
}
