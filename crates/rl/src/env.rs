//! The contract between environments and whatever drives them.
//!
//! Modelled on the Gym interface: [`Env::reset`] starts an episode and
//! returns the first observation, [`Env::step`] advances it by one discrete
//! action and reports the reward and whether the episode terminated
//! (solved) or was truncated (out of time).

use puzzle::{Command, Grid, Level};

use crate::error::RlError;

/// A `channels x height x width` grid of small codes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Observation {
    shape: [usize; 3],
    data: Vec<u8>,
}

impl Observation {
    /// Wraps a puzzle grid with a leading channel dimension of one.
    #[must_use]
    pub fn from_grid(grid: Grid) -> Self {
        Self { shape: [1, grid.height, grid.width], data: grid.cells }
    }

    #[must_use]
    pub fn shape(&self) -> [usize; 3] {
        self.shape
    }

    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[must_use]
    pub fn flat_len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn get(&self, channel: usize, y: usize, x: usize) -> u8 {
        let [_, h, w] = self.shape;
        self.data[(channel * h + y) * w + x]
    }

    /// First channel as a puzzle grid.
    #[must_use]
    pub fn grid(&self) -> Grid {
        let [_, height, width] = self.shape;
        Grid { width, height, cells: self.data[..width * height].to_vec() }
    }

    #[must_use]
    pub fn to_f32(&self) -> Vec<f32> {
        self.data.iter().map(|&v| f32::from(v)).collect()
    }

    #[must_use]
    pub fn to_f64(&self) -> Vec<f64> {
        self.data.iter().map(|&v| f64::from(v)).collect()
    }
}

/// Bounds of every observation an environment can emit.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ObservationSpace {
    pub shape: [usize; 3],
    pub low: u8,
    pub high: u8,
}

impl ObservationSpace {
    #[must_use]
    pub fn flat_len(&self) -> usize {
        self.shape.iter().product()
    }

    #[must_use]
    pub fn contains(&self, obs: &Observation) -> bool {
        obs.shape == self.shape && obs.data.iter().all(|v| (self.low..=self.high).contains(v))
    }
}

/// `n` actions numbered `0..n`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Discrete(pub usize);

impl Discrete {
    #[must_use]
    pub fn n(self) -> usize {
        self.0
    }

    #[must_use]
    pub fn contains(self, action: usize) -> bool {
        action < self.0
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Info {
    pub boxes_on_target: usize,
    pub steps: usize,
    pub is_success: bool,
}

#[derive(Clone, Debug)]
pub struct Step {
    pub observation: Observation,
    pub reward: f32,
    pub terminated: bool,
    pub truncated: bool,
    pub info: Info,
}

impl Step {
    #[must_use]
    pub fn done(&self) -> bool {
        self.terminated || self.truncated
    }
}

#[derive(Clone, Debug, Default)]
pub struct ResetOptions {
    /// Play this level instead of generating one.
    pub level: Option<Level>,
}

impl ResetOptions {
    #[must_use]
    pub fn with_level(level: Level) -> Self {
        Self { level: Some(level) }
    }
}

pub trait Env {
    fn observation_space(&self) -> ObservationSpace;

    fn action_space(&self) -> Discrete;

    /// Starts a new episode. `seed` reseeds the environment's generator.
    ///
    /// # Errors
    ///
    /// Fails when a level cannot be produced.
    fn reset(&mut self, seed: Option<u64>, options: Option<ResetOptions>) -> Result<(Observation, Info), RlError>;

    /// # Errors
    ///
    /// Rejects actions outside [`Env::action_space`].
    fn step(&mut self, action: usize) -> Result<Step, RlError>;

    /// Draws the current state if a human-visible mode is configured.
    ///
    /// # Errors
    ///
    /// Fails when a required display cannot be acquired or drawn to.
    fn render(&mut self) -> Result<(), RlError>;

    /// Releases display resources. Safe to call repeatedly.
    fn close(&mut self);

    /// Input gathered by the display since the last call.
    fn poll_commands(&mut self) -> Vec<Command> {
        Vec::new()
    }
}
