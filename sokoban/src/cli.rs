//! Command-line surface. Flags override the matching fields of the optional
//! JSON config file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rl::Config;

#[derive(Parser, Debug)]
#[command(name = "sokoban", version, about)]
pub struct Cli {
    /// JSON file with level, environment and training settings.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Play with the arrow keys; R restarts, Esc quits.
    Play {
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Train a policy, resuming from the last final artifact if present.
    Train {
        #[arg(long)]
        timesteps: Option<u64>,
        #[arg(long)]
        model_dir: Option<PathBuf>,
        /// Add the random network distillation bonus.
        #[arg(long)]
        rnd: bool,
        #[arg(long)]
        seed: Option<u64>,
        /// Show training in a window when a display is available.
        #[arg(long)]
        render: bool,
    },
    /// Watch a trained policy play.
    Watch {
        /// Policy artifact; defaults to the final artifact of the configured run.
        #[arg(long)]
        model: Option<PathBuf>,
        #[arg(long)]
        episodes: Option<usize>,
        #[arg(long)]
        seed: Option<u64>,
    },
}

impl Cli {
    /// The config file (or defaults) with this command's flags applied.
    ///
    /// # Errors
    ///
    /// Fails when the config file cannot be read or parsed.
    pub fn load_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path).with_context(|| format!("loading config {}", path.display()))?,
            None => Config::default(),
        };
        apply_overrides(&mut config, &self.command);
        Ok(config)
    }
}

pub fn apply_overrides(config: &mut Config, command: &Commands) {
    match command {
        Commands::Play { seed } => {
            if let Some(seed) = seed {
                config.ppo.seed = *seed;
            }
        }
        Commands::Train { timesteps, model_dir, rnd, seed, render: _ } => {
            if let Some(timesteps) = timesteps {
                config.train.total_timesteps = *timesteps;
            }
            if let Some(dir) = model_dir {
                config.train.model_dir.clone_from(dir);
            }
            config.train.use_rnd |= *rnd;
            if let Some(seed) = seed {
                config.ppo.seed = *seed;
                config.rnd.seed = *seed;
            }
        }
        Commands::Watch { episodes, seed, model: _ } => {
            if episodes.is_some() {
                config.playback.max_episodes = *episodes;
            }
            if let Some(seed) = seed {
                config.ppo.seed = *seed;
            }
        }
    }
}
