use puzzle::{Cell, Level, LevelConfig, Pos, PuzzleError};
use std::collections::BTreeSet;

#[test]
fn generated_levels_respect_invariants() {
    let config = LevelConfig::default();
    let mut rng = fastrand::Rng::with_seed(7);
    for _ in 0..500 {
        let level = Level::generate(&config, &mut rng).unwrap();
        assert_eq!(level.boxes().len(), config.num_boxes);
        assert_eq!(level.targets().len(), config.num_boxes);

        let mut all = BTreeSet::new();
        for p in level.boxes().iter().chain(level.targets()).chain(std::iter::once(&level.player())) {
            assert!(p.x < config.width && p.y < config.height, "{p:?} out of bounds");
            assert!(all.insert(*p), "{p:?} used twice");
        }
        for b in level.boxes() {
            assert!(b.x >= 1 && b.x < config.width - 1, "box {b:?} in margin");
            assert!(b.y >= 1 && b.y < config.height - 1, "box {b:?} in margin");
        }
        assert!(!level.is_win());
    }
}

#[test]
fn same_seed_same_level() {
    let config = LevelConfig::default();
    let a = Level::generate(&config, &mut fastrand::Rng::with_seed(42)).unwrap();
    let b = Level::generate(&config, &mut fastrand::Rng::with_seed(42)).unwrap();
    assert_eq!(a, b);
}

#[test]
fn margin_too_wide_is_a_config_error() {
    let config = LevelConfig { width: 4, height: 4, num_boxes: 2, box_margin: 2 };
    let err = Level::generate(&config, &mut fastrand::Rng::with_seed(1)).unwrap_err();
    assert_eq!(err, PuzzleError::InsufficientInterior { interior: 0, boxes: 2, margin: 2 });
}

#[test]
fn too_few_free_cells_is_a_config_error() {
    let config = LevelConfig { width: 2, height: 2, num_boxes: 2, box_margin: 0 };
    let err = Level::generate(&config, &mut fastrand::Rng::with_seed(1)).unwrap_err();
    assert_eq!(err, PuzzleError::InsufficientCells { free: 2, targets: 2 });
}

#[test]
fn zero_sized_grid_is_rejected() {
    let config = LevelConfig { width: 0, height: 5, num_boxes: 0, box_margin: 0 };
    assert!(matches!(
        Level::generate(&config, &mut fastrand::Rng::with_seed(1)),
        Err(PuzzleError::EmptyGrid { .. })
    ));
}

#[test]
fn encode_matches_layout() {
    let level = Level::parse(
        "
        @.$
        .*+
        ",
    )
    .unwrap();
    let grid = level.encode();
    assert_eq!(grid.width, 3);
    assert_eq!(grid.height, 2);
    assert_eq!(
        grid.cells,
        vec![
            Cell::Player as u8, Cell::Empty as u8, Cell::Box as u8,
            Cell::Empty as u8, Cell::Target as u8, Cell::BoxOnTarget as u8,
        ]
    );
}

#[test]
fn player_on_target_encodes_as_player() {
    let level = Level::parse("&$.\n.$*").unwrap();
    assert_eq!(level.encode().get(Pos::new(0, 0)), Cell::Player as u8);
    assert_eq!(level.to_string(), "&$.\n.$*\n");
}

#[test]
fn from_parts_validates_cells() {
    let p = Pos::new(0, 0);
    assert_eq!(
        Level::from_parts(3, 3, p, [Pos::new(3, 0)], [Pos::new(1, 1)]).unwrap_err(),
        PuzzleError::OutOfBounds(Pos::new(3, 0))
    );
    assert_eq!(
        Level::from_parts(3, 3, p, [Pos::new(1, 0), Pos::new(1, 0)], [Pos::new(1, 1), Pos::new(2, 2)]).unwrap_err(),
        PuzzleError::DuplicateCell(Pos::new(1, 0))
    );
    assert_eq!(
        Level::from_parts(3, 3, p, [Pos::new(1, 0)], []).unwrap_err(),
        PuzzleError::CountMismatch { boxes: 1, targets: 0 }
    );
}

#[test]
fn parse_rejects_bad_boards() {
    assert!(matches!(Level::parse("@.\n..."), Err(PuzzleError::Parse(_))));
    assert!(matches!(Level::parse("..\n.."), Err(PuzzleError::Parse(_))));
    assert!(matches!(Level::parse("@@"), Err(PuzzleError::Parse(_))));
    assert!(matches!(Level::parse("@#"), Err(PuzzleError::Parse(_))));
}

#[test]
fn level_config_deserializes_with_defaults() {
    let config: LevelConfig = serde_json::from_str(r#"{ "num_boxes": 3 }"#).unwrap();
    assert_eq!(config, LevelConfig { num_boxes: 3, ..LevelConfig::default() });
}

#[test]
fn grid_decodes_back_to_level() {
    let mut rng = fastrand::Rng::with_seed(9);
    for _ in 0..100 {
        let level = Level::generate(&LevelConfig::default(), &mut rng).unwrap();
        assert_eq!(Level::from_grid(&level.encode()).unwrap(), level);
    }
    // The hidden target under the player is recovered.
    let level = Level::parse("&$.\n.$*").unwrap();
    assert_eq!(Level::from_grid(&level.encode()).unwrap(), level);
}
