//! Window rendering for Sokoban boards with `wgpu` and `winit`.
//!
//! [`tiles`] turns a level into coloured triangles and is usable without a
//! display; [`Renderer`] owns the window, the GPU pipeline and keyboard input.

pub mod input;
pub mod renderer;
pub mod tiles;

pub use input::command_for_key;
pub use renderer::{Renderer, CLEAR_TITLE};
