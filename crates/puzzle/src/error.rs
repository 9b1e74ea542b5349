use thiserror::Error;

use crate::types::Pos;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PuzzleError {
    #[error("grid must be at least 1x1, got {width}x{height}")]
    EmptyGrid { width: usize, height: usize },
    #[error("{interior} interior cells cannot hold {boxes} boxes (margin {margin})")]
    InsufficientInterior { interior: usize, boxes: usize, margin: usize },
    #[error("{free} free cells cannot hold a player and {targets} targets")]
    InsufficientCells { free: usize, targets: usize },
    #[error("action {0} is outside the discrete range 0..4")]
    InvalidAction(usize),
    #[error("cell {0:?} lies outside the grid")]
    OutOfBounds(Pos),
    #[error("{boxes} boxes but {targets} targets")]
    CountMismatch { boxes: usize, targets: usize },
    #[error("cell {0:?} is listed twice")]
    DuplicateCell(Pos),
    #[error("level is {}x{} but {}x{} is expected", found.0, found.1, expected.0, expected.1)]
    SizeMismatch { expected: (usize, usize), found: (usize, usize) },
    #[error("level text: {0}")]
    Parse(String),
}
