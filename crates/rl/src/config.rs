use std::fs;
use std::path::Path;
use std::str::FromStr;

use puzzle::LevelConfig;
use serde::{Deserialize, Serialize};

use crate::error::RlError;
use crate::playback::PlaybackConfig;
use crate::ppo::PpoConfig;
use crate::rnd::RndConfig;
use crate::sokoban::EnvConfig;
use crate::train::TrainConfig;

/// Everything a run needs. Missing sections and fields take their defaults.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub level: LevelConfig,
    pub env: EnvConfig,
    pub rnd: RndConfig,
    pub ppo: PpoConfig,
    pub train: TrainConfig,
    pub playback: PlaybackConfig,
}

impl Config {
    /// # Errors
    ///
    /// Fails when the file cannot be read or is not valid JSON.
    pub fn from_file(path: &Path) -> Result<Self, RlError> {
        let text = fs::read_to_string(path).map_err(|source| RlError::Io { path: path.to_path_buf(), source })?;
        text.parse()
    }
}

impl FromStr for Config {
    type Err = RlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(serde_json::from_str(s)?)
    }
}
