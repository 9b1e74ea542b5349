use std::path::PathBuf;

use puzzle::LevelConfig;
use rl::{Config, RlError};

#[test]
fn empty_object_gives_defaults() {
    let config: Config = "{}".parse().unwrap();
    assert_eq!(config, Config::default());
    assert_eq!(config.level, LevelConfig::default());
    assert_eq!(config.env.max_episode_steps, 200);
    assert_eq!(config.train.total_timesteps, 5_000_000);
    assert_eq!(config.train.checkpoint_interval, 50_000);
    assert_eq!(config.rnd.window, 1000);
    assert_eq!(config.ppo.n_steps, 2048);
    assert_eq!(config.playback.fps, 30);
}

#[test]
fn partial_sections_keep_other_defaults() {
    let config: Config = r#"{
        "level": { "width": 8, "num_boxes": 3 },
        "train": { "use_rnd": true, "model_dir": "runs/a" },
        "rnd": { "intrinsic_coef": 0.001 }
    }"#
    .parse()
    .unwrap();
    assert_eq!(config.level.width, 8);
    assert_eq!(config.level.height, 6);
    assert_eq!(config.level.num_boxes, 3);
    assert!(config.train.use_rnd);
    assert_eq!(config.train.model_dir, PathBuf::from("runs/a"));
    assert_eq!(config.train.name_prefix, "sokoban");
    assert!((config.rnd.intrinsic_coef - 0.001).abs() < 1e-9);
    assert_eq!(config.rnd.feature_dim, 128);
}

#[test]
fn malformed_files_are_reported() {
    assert!(matches!("{ \"level\": 3 }".parse::<Config>(), Err(RlError::Json(_))));
    assert!(matches!(
        Config::from_file(&PathBuf::from("/definitely/not/here.json")),
        Err(RlError::Io { .. })
    ));
}

#[test]
fn config_round_trips() {
    let mut config = Config::default();
    config.playback.max_episodes = Some(3);
    config.ppo.seed = 42;
    let json = serde_json::to_string(&config).unwrap();
    assert_eq!(json.parse::<Config>().unwrap(), config);
}
