use puzzle::{Cell, Command, Direction, Game, LevelConfig};
use serde::{Deserialize, Serialize};

use crate::canvas::{Canvas, CanvasFactory, RenderMode};
use crate::env::{Discrete, Env, Info, Observation, ObservationSpace, ResetOptions, Step};
use crate::error::RlError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvConfig {
    /// Episodes are truncated once this many steps have been taken.
    pub max_episode_steps: usize,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self { max_episode_steps: 200 }
    }
}

/// Sokoban exposed through the [`Env`] contract.
pub struct SokobanEnv {
    game: Game,
    rng: fastrand::Rng,
    config: EnvConfig,
    steps: usize,
    mode: RenderMode,
    factory: Option<CanvasFactory>,
    canvas: Option<Box<dyn Canvas>>,
    render_disabled: bool,
}

impl SokobanEnv {
    /// Generates the first level right away so the environment is usable
    /// before the first [`Env::reset`].
    ///
    /// # Errors
    ///
    /// Fails when `level` cannot produce a level.
    pub fn new(level: LevelConfig, config: EnvConfig, seed: u64) -> Result<Self, RlError> {
        let mut rng = fastrand::Rng::with_seed(seed);
        let game = Game::new(level, &mut rng)?;
        Ok(Self {
            game,
            rng,
            config,
            steps: 0,
            mode: RenderMode::None,
            factory: None,
            canvas: None,
            render_disabled: false,
        })
    }

    /// Draws through canvases produced by `factory`.
    #[must_use]
    pub fn with_renderer(mut self, mode: RenderMode, factory: CanvasFactory) -> Self {
        self.mode = mode;
        self.factory = Some(factory);
        self
    }

    #[must_use]
    pub fn game(&self) -> &Game {
        &self.game
    }

    #[must_use]
    pub fn steps(&self) -> usize {
        self.steps
    }

    #[must_use]
    pub fn render_mode(&self) -> RenderMode {
        self.mode
    }

    /// Whether a canvas is currently open.
    #[must_use]
    pub fn is_rendering(&self) -> bool {
        self.canvas.is_some()
    }

    fn observation(&self) -> Observation {
        Observation::from_grid(self.game.level().encode())
    }

    fn info(&self) -> Info {
        let level = self.game.level();
        Info { boxes_on_target: level.boxes_on_target(), steps: self.steps, is_success: level.is_win() }
    }

    fn acquire_canvas(&mut self, interactive: bool) -> Result<(), RlError> {
        let Some(factory) = self.factory.as_mut() else {
            if interactive {
                return Err(RlError::Render(anyhow::anyhow!("no display backend configured")));
            }
            tracing::warn!("no display backend configured, rendering disabled");
            self.render_disabled = true;
            return Ok(());
        };
        match factory() {
            Ok(canvas) => {
                tracing::info!("display opened");
                self.canvas = Some(canvas);
                Ok(())
            }
            Err(err) if interactive => Err(RlError::Render(err)),
            Err(err) => {
                tracing::warn!("could not open a display, rendering disabled: {err:#}");
                self.render_disabled = true;
                Ok(())
            }
        }
    }
}

impl Env for SokobanEnv {
    fn observation_space(&self) -> ObservationSpace {
        let config = self.game.config();
        ObservationSpace { shape: [1, config.height, config.width], low: 0, high: Cell::MAX }
    }

    fn action_space(&self) -> Discrete {
        Discrete(Direction::ALL.len())
    }

    fn reset(&mut self, seed: Option<u64>, options: Option<ResetOptions>) -> Result<(Observation, Info), RlError> {
        if let Some(seed) = seed {
            self.rng.seed(seed);
        }
        match options.and_then(|o| o.level) {
            Some(level) => self.game.load(level)?,
            None => {
                self.game.reset(&mut self.rng)?;
            }
        }
        self.steps = 0;
        Ok((self.observation(), self.info()))
    }

    fn step(&mut self, action: usize) -> Result<Step, RlError> {
        let dir = Direction::try_from(action)?;
        let outcome = self.game.step(dir);
        self.steps += 1;
        let step = Step {
            observation: self.observation(),
            reward: outcome.reward,
            terminated: outcome.won,
            truncated: self.steps >= self.config.max_episode_steps,
            info: self.info(),
        };
        if matches!(self.mode, RenderMode::Human { .. }) {
            self.render()?;
        }
        Ok(step)
    }

    fn render(&mut self) -> Result<(), RlError> {
        let RenderMode::Human { interactive } = self.mode else {
            return Ok(());
        };
        if self.render_disabled {
            return Ok(());
        }
        if self.canvas.is_none() {
            self.acquire_canvas(interactive)?;
        }
        let Some(canvas) = self.canvas.as_mut() else {
            return Ok(());
        };
        if let Err(err) = canvas.draw(self.game.level()) {
            if interactive {
                return Err(RlError::Render(err));
            }
            tracing::warn!("drawing failed, rendering disabled: {err:#}");
            self.close();
            self.render_disabled = true;
        }
        Ok(())
    }

    fn close(&mut self) {
        if let Some(mut canvas) = self.canvas.take() {
            canvas.close();
            tracing::info!("display closed");
        }
    }

    fn poll_commands(&mut self) -> Vec<Command> {
        self.canvas.as_mut().map(|c| c.poll_commands()).unwrap_or_default()
    }
}

impl Drop for SokobanEnv {
    fn drop(&mut self) {
        self.close();
    }
}
