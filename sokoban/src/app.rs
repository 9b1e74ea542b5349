//! The three things the binary can do: let a human play, train a policy and
//! watch a trained policy play.

use std::path::Path;

use anyhow::{Context, Result};
use rl::Config;

#[cfg(feature = "render")]
use crate::canvas::WindowCanvas;

/// Interactive play. The window is required.
///
/// # Errors
///
/// Fails when no window can be opened or the level config is unusable.
#[cfg(feature = "render")]
pub fn play(config: &Config) -> Result<()> {
    use std::thread;
    use std::time::Instant;

    use puzzle::{Command, Game};
    use render::Renderer;

    let mut rng = fastrand::Rng::with_seed(config.ppo.seed);
    let mut game = Game::new(config.level.clone(), &mut rng).context("generating a level")?;
    let mut renderer = Renderer::new("Sokoban").context("opening the game window")?;
    let frame = config.playback.frame_time();
    tracing::info!("arrow keys move, R restarts, Esc quits");

    loop {
        let started = Instant::now();
        for command in renderer.poll() {
            match command {
                Command::Move(dir) => {
                    let outcome = game.step(dir);
                    if outcome.won {
                        tracing::info!("level clear");
                    }
                }
                Command::Reset => {
                    game.reset(&mut rng)?;
                }
                Command::Quit => return Ok(()),
            }
        }
        renderer.draw(game.level())?;
        if let Some(rest) = frame.checked_sub(started.elapsed()) {
            thread::sleep(rest);
        }
    }
}

/// # Errors
///
/// Always; this build has no window support.
#[cfg(not(feature = "render"))]
pub fn play(_config: &Config) -> Result<()> {
    anyhow::bail!("built without the `render` feature")
}

/// Runs training; `show` additionally draws the environment when possible.
///
/// # Errors
///
/// Propagates training failures.
pub fn train(config: &Config, show: bool) -> Result<()> {
    #[cfg(feature = "render")]
    let display = show.then(|| WindowCanvas::factory("Sokoban Training"));
    #[cfg(not(feature = "render"))]
    let display = {
        if show {
            tracing::warn!("built without the `render` feature, training headless");
        }
        None
    };

    let summary = rl::train::run_with_display(config, display)?;
    tracing::info!(
        timesteps = summary.num_timesteps,
        checkpoints = summary.checkpoints.len(),
        path = %summary.final_path.display(),
        "policy saved"
    );
    Ok(())
}

/// Shows the policy at `model` playing until the window closes.
///
/// # Errors
///
/// Fails when the policy cannot be loaded or does not fit the configured
/// level, and when no window can be opened.
#[cfg(feature = "render")]
pub fn watch(config: &Config, model: &Path) -> Result<()> {
    use rl::{ActorCritic, Env, RenderMode, SokobanEnv};

    let (mut policy, timesteps) =
        ActorCritic::load(model).with_context(|| format!("loading policy {}", model.display()))?;
    tracing::info!(path = %model.display(), timesteps, "policy loaded");

    let mut env = SokobanEnv::new(config.level.clone(), config.env.clone(), config.ppo.seed)?
        .with_renderer(RenderMode::Human { interactive: true }, WindowCanvas::factory("Sokoban Agent"));
    policy.ensure_compatible(env.observation_space(), env.action_space())?;

    let summary = rl::playback::run(&mut env, &mut policy, &config.playback)?;
    tracing::info!(episodes = summary.episodes, solved = summary.solved, "done watching");
    Ok(())
}

/// # Errors
///
/// Always; this build has no window support.
#[cfg(not(feature = "render"))]
pub fn watch(_config: &Config, _model: &Path) -> Result<()> {
    anyhow::bail!("built without the `render` feature")
}
