#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! # Sokoban Puzzle Engine
//!
//! Pure game logic for a small, wall-less Sokoban: a player pushes boxes on an
//! open grid until every box rests on a target.
//!
//! ## Key Components
//!
//! -   **Levels:** [`Level`] holds the player, box and target cells.
//!     [`Level::generate`] samples random levels from a [`LevelConfig`] using an
//!     explicit, seedable `fastrand::Rng`.
//! -   **Rules:** [`resolve_move`] applies one move, [`compute_reward`] scores
//!     it and [`Level::is_win`] detects the solved state. [`Game`] bundles the
//!     three for callers that just want to step a puzzle.
//! -   **Observations:** [`Level::encode`] renders the level as a [`Grid`] of
//!     [`Cell`] codes for learning agents.
//!
//! ```rust
//! use puzzle::{Direction, Level, resolve_move};
//!
//! let mut level = Level::parse("@$*").unwrap();
//! resolve_move(&mut level, Direction::Right);
//! assert!(level.is_win());
//! ```

pub mod error;
pub mod level;
pub mod observation;
pub mod rules;
pub mod types;

pub use error::PuzzleError;
pub use level::{Level, LevelConfig};
pub use observation::{Cell, Grid};
pub use rules::{compute_reward, resolve_move, Game, MoveResult, StepOutcome, PUSH_REWARD, STEP_PENALTY, WIN_REWARD};
pub use types::{Command, Direction, Pos};
