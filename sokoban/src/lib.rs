//! # Sokoban
//!
//! A small, wall-less Sokoban that people can play and reinforcement-learning
//! agents can train on.
//!
//! -   **[`puzzle`]:** levels, move rules, rewards and observation encoding.
//! -   **[`rl`]:** the environment contract, the Sokoban environment, a
//!     Random Network Distillation bonus, PPO training and playback, built on
//!     the small `ml` network toolkit.
//! -   **`render`:** a `wgpu` window drawing boards and reading the keyboard
//!     (behind the default `render` feature).
//!
//! The `sokoban` binary exposes `play`, `train` and `watch` subcommands.

pub mod app;
#[cfg(feature = "render")]
pub mod canvas;
pub mod cli;

pub use puzzle;
#[cfg(feature = "render")]
pub use render;
pub use rl;
