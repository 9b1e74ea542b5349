#![deny(clippy::all)]
//! # Sokoban reinforcement learning
//!
//! -   [`Env`] is the step/reset/render contract. [`SokobanEnv`] implements
//!     it on top of the `puzzle` engine and draws through an optional
//!     [`Canvas`].
//! -   [`RndRewardWrapper`] adds a Random Network Distillation novelty bonus
//!     to any environment's rewards.
//! -   [`PpoTrainer`] trains an [`ActorCritic`] policy; [`train::run`] adds
//!     resuming and checkpoints, [`playback::run`] shows a policy playing.

pub mod canvas;
pub mod config;
pub mod env;
pub mod error;
pub mod playback;
pub mod policy;
pub mod ppo;
pub mod rnd;
pub mod sokoban;
pub mod train;

pub use canvas::{Canvas, CanvasFactory, RenderMode};
pub use config::Config;
pub use env::{Discrete, Env, Info, Observation, ObservationSpace, ResetOptions, Step};
pub use error::RlError;
pub use playback::{PlaybackConfig, PlaybackSummary};
pub use policy::{IdlePolicy, PlannerPolicy, Policy, RandomPolicy};
pub use ppo::{compute_gae, ActorCritic, PolicyArtifact, PpoConfig, PpoTrainer, Rollout, UpdateStats};
pub use rnd::{RndConfig, RndRewardWrapper};
pub use sokoban::{EnvConfig, SokobanEnv};
pub use train::{Checkpointer, TrainConfig, TrainSummary};
