use crate::error::PuzzleError;
use crate::level::{Level, LevelConfig};
use crate::types::Direction;

/// Per-move penalty.
pub const STEP_PENALTY: f32 = -0.01;
/// Bonus (or, negated, penalty) for a net change in boxes on targets.
pub const PUSH_REWARD: f32 = 10.0;
/// Bonus for the move that solves the level.
pub const WIN_REWARD: f32 = 100.0;

/// What a single move did to the level.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MoveResult {
    Moved,
    Pushed,
    Blocked,
}

/// Moves the player one cell in `dir`, pushing a box ahead of it if needed.
///
/// Leaving the grid, pushing a box off the grid or into another box leaves
/// the level untouched.
pub fn resolve_move(level: &mut Level, dir: Direction) -> MoveResult {
    let (w, h) = (level.width(), level.height());
    let Some(next) = level.player.step(dir, w, h) else {
        return MoveResult::Blocked;
    };

    if !level.boxes.contains(&next) {
        level.player = next;
        return MoveResult::Moved;
    }

    match next.step(dir, w, h) {
        Some(beyond) if !level.boxes.contains(&beyond) => {
            level.boxes.remove(&next);
            level.boxes.insert(beyond);
            level.player = next;
            MoveResult::Pushed
        }
        _ => MoveResult::Blocked,
    }
}

/// Reward for one move given the boxes-on-target count before and after it.
///
/// Only the sign of the net change matters: any increase earns a flat
/// [`PUSH_REWARD`], any decrease costs the same.
#[must_use]
pub fn compute_reward(before: usize, after: usize, is_win: bool) -> f32 {
    let mut reward = STEP_PENALTY;
    if after > before {
        reward += PUSH_REWARD;
    } else if after < before {
        reward -= PUSH_REWARD;
    }
    if is_win {
        reward += WIN_REWARD;
    }
    reward
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct StepOutcome {
    pub reward: f32,
    pub won: bool,
    pub result: MoveResult,
}

/// A level together with the configuration used to regenerate it.
#[derive(Clone, Debug)]
pub struct Game {
    config: LevelConfig,
    level: Level,
}

impl Game {
    /// # Errors
    ///
    /// Propagates level generation failures.
    pub fn new(config: LevelConfig, rng: &mut fastrand::Rng) -> Result<Self, PuzzleError> {
        let level = Level::generate(&config, rng)?;
        Ok(Self { config, level })
    }

    #[must_use]
    pub fn with_level(config: LevelConfig, level: Level) -> Self {
        Self { config, level }
    }

    /// Replaces the level with a freshly generated one.
    ///
    /// # Errors
    ///
    /// Propagates level generation failures.
    pub fn reset(&mut self, rng: &mut fastrand::Rng) -> Result<&Level, PuzzleError> {
        self.level = Level::generate(&self.config, rng)?;
        tracing::debug!("new level\n{}", self.level);
        Ok(&self.level)
    }

    /// Replaces the level with `level`, which must have the configured size.
    ///
    /// # Errors
    ///
    /// [`PuzzleError::SizeMismatch`] when the dimensions differ; the current
    /// level is kept.
    pub fn load(&mut self, level: Level) -> Result<(), PuzzleError> {
        let expected = (self.config.width, self.config.height);
        let found = (level.width(), level.height());
        if found != expected {
            return Err(PuzzleError::SizeMismatch { expected, found });
        }
        self.level = level;
        Ok(())
    }

    pub fn step(&mut self, dir: Direction) -> StepOutcome {
        let before = self.level.boxes_on_target();
        let result = resolve_move(&mut self.level, dir);
        let after = self.level.boxes_on_target();
        let won = self.level.is_win();
        StepOutcome { reward: compute_reward(before, after, won), won, result }
    }

    #[must_use]
    pub fn level(&self) -> &Level {
        &self.level
    }

    #[must_use]
    pub fn config(&self) -> &LevelConfig {
        &self.config
    }
}
