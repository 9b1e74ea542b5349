use std::path::PathBuf;

use clap::Parser;
use sokoban::cli::{apply_overrides, Cli, Commands};
use sokoban::rl::Config;

#[test]
fn train_flags_override_the_config() {
    let cli = Cli::try_parse_from([
        "sokoban",
        "train",
        "--timesteps",
        "1000",
        "--model-dir",
        "runs",
        "--rnd",
        "--seed",
        "7",
    ])
    .unwrap();
    let config = cli.load_config().unwrap();
    assert_eq!(config.train.total_timesteps, 1000);
    assert_eq!(config.train.model_dir, PathBuf::from("runs"));
    assert!(config.train.use_rnd);
    assert_eq!(config.ppo.seed, 7);
    assert_eq!(config.rnd.seed, 7);
    assert!(matches!(cli.command, Commands::Train { render: false, .. }));
}

#[test]
fn absent_flags_keep_the_defaults() {
    let cli = Cli::try_parse_from(["sokoban", "train"]).unwrap();
    assert_eq!(cli.load_config().unwrap(), Config::default());
}

#[test]
fn watch_limits_episodes() {
    let cli = Cli::try_parse_from(["sokoban", "watch", "--episodes", "3", "--model", "m.json"]).unwrap();
    let config = cli.load_config().unwrap();
    assert_eq!(config.playback.max_episodes, Some(3));
    assert_eq!(cli.command, Commands::Watch { model: Some("m.json".into()), episodes: Some(3), seed: None });
}

#[test]
fn config_file_is_read_before_flags() {
    let dir = std::env::temp_dir().join(format!("sokoban-cli-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("config.json");
    std::fs::write(&path, r#"{"level": {"width": 5}, "train": {"total_timesteps": 10}}"#).unwrap();

    let cli = Cli::try_parse_from(["sokoban", "--config", path.to_str().unwrap(), "train", "--timesteps", "20"])
        .unwrap();
    let config = cli.load_config().unwrap();
    assert_eq!(config.level.width, 5);
    assert_eq!(config.train.total_timesteps, 20);
}

#[test]
fn missing_config_file_is_an_error() {
    let cli = Cli::try_parse_from(["sokoban", "play", "--config", "/nonexistent/sokoban.json"]).unwrap();
    let err = cli.load_config().unwrap_err();
    assert!(format!("{err:#}").contains("/nonexistent/sokoban.json"));
}

#[test]
fn play_seed_is_applied() {
    let mut config = Config::default();
    apply_overrides(&mut config, &Commands::Play { seed: Some(3) });
    assert_eq!(config.ppo.seed, 3);
}

#[test]
fn unknown_subcommand_is_rejected() {
    assert!(Cli::try_parse_from(["sokoban", "dance"]).is_err());
}
