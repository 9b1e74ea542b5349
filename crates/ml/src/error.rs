use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MlError {
    #[error("dimension mismatch: expected {expected}, found {found}")]
    ShapeMismatch { expected: usize, found: usize },
    #[error("expected {expected} parameter tensors, found {found}")]
    ParamCount { expected: usize, found: usize },
}
