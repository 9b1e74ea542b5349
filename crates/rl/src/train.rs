use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::canvas::{CanvasFactory, RenderMode};
use crate::config::Config;
use crate::env::Env;
use crate::error::RlError;
use crate::ppo::{ActorCritic, PpoTrainer};
use crate::rnd::RndRewardWrapper;
use crate::sokoban::SokobanEnv;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    pub total_timesteps: u64,
    /// Environment steps between checkpoints; zero disables them.
    pub checkpoint_interval: u64,
    pub model_dir: PathBuf,
    pub name_prefix: String,
    pub use_rnd: bool,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            total_timesteps: 5_000_000,
            checkpoint_interval: 50_000,
            model_dir: PathBuf::from("sokoban_models"),
            name_prefix: "sokoban".into(),
            use_rnd: false,
        }
    }
}

impl TrainConfig {
    /// Where the finished policy is written and where a run resumes from.
    #[must_use]
    pub fn final_path(&self) -> PathBuf {
        self.model_dir.join(format!("{}_final.json", self.name_prefix))
    }

    #[must_use]
    pub fn checkpoint_path(&self, timesteps: u64) -> PathBuf {
        self.model_dir.join(format!("{}_{timesteps}_steps.json", self.name_prefix))
    }
}

/// Saves the trainer's policy each time another `interval` steps have
/// passed.
pub struct Checkpointer<'a> {
    config: &'a TrainConfig,
    last: u64,
    saved: Vec<PathBuf>,
}

impl<'a> Checkpointer<'a> {
    #[must_use]
    pub fn new(config: &'a TrainConfig, start: u64) -> Self {
        Self { config, last: start, saved: Vec::new() }
    }

    /// # Errors
    ///
    /// Fails when the checkpoint cannot be written.
    pub fn observe(&mut self, trainer: &PpoTrainer) -> Result<(), RlError> {
        let interval = self.config.checkpoint_interval;
        let now = trainer.num_timesteps();
        if interval == 0 || now / interval <= self.last / interval {
            return Ok(());
        }
        let path = self.config.checkpoint_path(now);
        trainer.model().save(&path, now)?;
        tracing::info!(path = %path.display(), "checkpoint saved");
        self.last = now;
        self.saved.push(path);
        Ok(())
    }

    #[must_use]
    pub fn saved(&self) -> &[PathBuf] {
        &self.saved
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrainSummary {
    pub resumed_from: Option<u64>,
    pub num_timesteps: u64,
    pub final_path: PathBuf,
    pub checkpoints: Vec<PathBuf>,
}

/// Trains a policy on Sokoban as configured, resuming from the final
/// artifact of a previous run when one exists.
///
/// # Errors
///
/// Environment, I/O and artifact failures end the run.
pub fn run(config: &Config) -> Result<TrainSummary, RlError> {
    run_with_display(config, None)
}

/// Like [`run`], drawing every step through `display` when given. A display
/// that cannot be opened only disables drawing.
///
/// # Errors
///
/// Environment, I/O and artifact failures end the run.
pub fn run_with_display(config: &Config, display: Option<CanvasFactory>) -> Result<TrainSummary, RlError> {
    config.ppo.validate()?;
    let mut env = SokobanEnv::new(config.level.clone(), config.env.clone(), config.ppo.seed)?;
    if let Some(factory) = display {
        env = env.with_renderer(RenderMode::Human { interactive: false }, factory);
    }
    if config.train.use_rnd {
        tracing::info!(coef = config.rnd.intrinsic_coef, "random network distillation enabled");
        train_on(RndRewardWrapper::new(env, config.rnd.clone())?, config)
    } else {
        train_on(env, config)
    }
}

fn train_on<E: Env>(mut env: E, config: &Config) -> Result<TrainSummary, RlError> {
    let train = &config.train;
    fs::create_dir_all(&train.model_dir).map_err(|source| RlError::Io { path: train.model_dir.clone(), source })?;

    let final_path = train.final_path();
    let (model, start) = if final_path.exists() {
        let (model, timesteps) = ActorCritic::load(&final_path)?;
        model.ensure_compatible(env.observation_space(), env.action_space())?;
        tracing::info!(path = %final_path.display(), timesteps, "resuming from saved policy");
        (model, Some(timesteps))
    } else {
        tracing::info!("no saved policy, starting from scratch");
        (ActorCritic::for_env(&env, config.ppo.hidden_dim, config.ppo.seed), None)
    };

    let mut trainer = PpoTrainer::new(model, config.ppo.clone())?.with_timesteps(start.unwrap_or(0));
    let mut checkpointer = Checkpointer::new(train, trainer.num_timesteps());
    let result = trainer.learn(&mut env, train.total_timesteps, |t| checkpointer.observe(t).map(|()| true));
    env.close();
    result?;

    save_final(&trainer, &final_path)?;
    Ok(TrainSummary {
        resumed_from: start,
        num_timesteps: trainer.num_timesteps(),
        final_path,
        checkpoints: checkpointer.saved().to_vec(),
    })
}

fn save_final(trainer: &PpoTrainer, path: &Path) -> Result<(), RlError> {
    trainer.model().save(path, trainer.num_timesteps())?;
    tracing::info!(path = %path.display(), timesteps = trainer.num_timesteps(), "training finished");
    Ok(())
}
