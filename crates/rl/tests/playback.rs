mod common;

use common::{fake_factory, small_env, Counters};
use puzzle::Command;
use rl::{playback, EnvConfig, IdlePolicy, PlaybackConfig, RenderMode, SokobanEnv};

fn quick() -> PlaybackConfig {
    PlaybackConfig { fps: 1000, episode_pause: 0.0, max_episodes: Some(1) }
}

fn short_env(counters: &Counters, commands: Vec<Command>) -> SokobanEnv {
    let level = puzzle::LevelConfig { width: 4, height: 4, num_boxes: 1, box_margin: 1 };
    SokobanEnv::new(level, EnvConfig { max_episode_steps: 5 }, 0)
        .unwrap()
        .with_renderer(RenderMode::Human { interactive: true }, fake_factory(counters, commands))
}

#[test]
fn plays_the_requested_number_of_episodes() {
    let counters = Counters::default();
    let mut env = short_env(&counters, Vec::new());
    let summary = playback::run(&mut env, &mut IdlePolicy(0), &quick()).unwrap();
    assert_eq!(summary.episodes, 1);
    assert!(summary.steps <= 5);
    assert!(!summary.quit);
    assert!(counters.draws.get() > summary.steps);
    assert_eq!(counters.closes.get(), 1);
}

#[test]
fn quit_command_stops_and_closes() {
    let counters = Counters::default();
    let mut env = short_env(&counters, vec![Command::Quit]);
    let config = PlaybackConfig { max_episodes: None, ..quick() };
    let summary = playback::run(&mut env, &mut IdlePolicy(1), &config).unwrap();
    assert!(summary.quit);
    assert_eq!(summary.steps, 1);
    assert_eq!(counters.closes.get(), 1);
}

#[test]
fn headless_playback_fails_and_still_closes() {
    let mut env = small_env(0).with_renderer(RenderMode::Human { interactive: true }, common::failing_factory());
    assert!(playback::run(&mut env, &mut IdlePolicy(0), &quick()).is_err());
}

#[test]
fn frame_time_follows_fps() {
    let config = PlaybackConfig { fps: 30, ..PlaybackConfig::default() };
    assert!((config.frame_time().as_secs_f64() - 1.0 / 30.0).abs() < 1e-9);
    assert_eq!(PlaybackConfig::default().episode_pause, 2.0);
}
