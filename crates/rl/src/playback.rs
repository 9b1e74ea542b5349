use std::thread;
use std::time::{Duration, Instant};

use puzzle::Command;
use serde::{Deserialize, Serialize};

use crate::env::Env;
use crate::error::RlError;
use crate::policy::Policy;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    pub fps: u32,
    /// Seconds to hold the final frame of an episode.
    pub episode_pause: f32,
    /// Stop after this many episodes; `None` runs until the window closes.
    pub max_episodes: Option<usize>,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self { fps: 30, episode_pause: 2.0, max_episodes: None }
    }
}

impl PlaybackConfig {
    #[must_use]
    pub fn frame_time(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.fps.max(1)))
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlaybackSummary {
    pub episodes: usize,
    pub solved: usize,
    pub steps: usize,
    pub quit: bool,
}

/// Closes the environment however playback ends.
struct CloseGuard<'a, E: Env>(&'a mut E);

impl<E: Env> Drop for CloseGuard<'_, E> {
    fn drop(&mut self) {
        self.0.close();
    }
}

/// Lets `policy` play `env` on screen, episode after episode.
///
/// # Errors
///
/// Environment and rendering failures stop playback; the environment is
/// closed on every exit path.
pub fn run<E: Env>(env: &mut E, policy: &mut impl Policy, config: &PlaybackConfig) -> Result<PlaybackSummary, RlError> {
    let mut guard = CloseGuard(env);
    let env = &mut *guard.0;
    let frame = config.frame_time();
    let mut summary = PlaybackSummary::default();

    let (mut obs, _) = env.reset(None, None)?;
    tracing::info!("playback started");
    loop {
        let started = Instant::now();
        env.render()?;
        let action = policy.predict(&obs, true);
        let step = env.step(action)?;
        summary.steps += 1;

        obs = if step.done() {
            summary.episodes += 1;
            if step.info.is_success {
                summary.solved += 1;
            }
            tracing::info!(
                episode = summary.episodes,
                solved = step.info.is_success,
                steps = step.info.steps,
                "episode finished"
            );
            env.render()?;
            thread::sleep(Duration::from_secs_f32(config.episode_pause.max(0.0)));
            if config.max_episodes.is_some_and(|max| summary.episodes >= max) {
                break;
            }
            env.reset(None, None)?.0
        } else {
            step.observation
        };

        if env.poll_commands().contains(&Command::Quit) {
            summary.quit = true;
            break;
        }
        if let Some(rest) = frame.checked_sub(started.elapsed()) {
            thread::sleep(rest);
        }
    }
    tracing::info!(episodes = summary.episodes, solved = summary.solved, "playback finished");
    Ok(summary)
}
