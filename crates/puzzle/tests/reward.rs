use puzzle::{compute_reward, Direction, Game, Level, LevelConfig};

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-5
}

fn game(board: &str) -> Game {
    Game::with_level(LevelConfig::default(), Level::parse(board).unwrap())
}

#[test]
fn plain_move_costs_step_penalty() {
    let mut g = game("@..\n$*.\n*$.");
    let out = g.step(Direction::Right);
    assert!(close(out.reward, -0.01));
    assert!(!out.won);
}

#[test]
fn blocked_move_still_costs_step_penalty() {
    let mut g = game("@..\n$*.\n*$.");
    assert!(close(g.step(Direction::Up).reward, -0.01));
}

#[test]
fn pushing_onto_target_pays_ten() {
    let mut g = game("@$*\n.$*");
    let out = g.step(Direction::Right);
    assert!(close(out.reward, -0.01 + 10.0));
    assert!(!out.won);
}

#[test]
fn pushing_off_target_costs_ten() {
    let mut g = game("@+.\n.$*");
    let out = g.step(Direction::Right);
    assert!(close(out.reward, -0.01 - 10.0));
}

#[test]
fn winning_push_pays_bonus() {
    let mut g = game("@$*\n.+.");
    let out = g.step(Direction::Right);
    assert!(out.won);
    assert!(close(out.reward, -0.01 + 10.0 + 100.0));
}

#[test]
fn reward_is_flat_in_the_net_change() {
    assert!(close(compute_reward(0, 2, false), -0.01 + 10.0));
    assert!(close(compute_reward(2, 0, false), -0.01 - 10.0));
    assert!(close(compute_reward(1, 1, false), -0.01));
}

#[test]
fn win_is_set_equality() {
    assert!(Level::parse("+@+").unwrap().is_win());
    assert!(!Level::parse("@+$*").unwrap().is_win());
    // Shifted: same count, wrong cells.
    assert!(!Level::parse("@$*.").unwrap().is_win());
    // Zero boxes, zero targets.
    assert!(Level::parse("@..").unwrap().is_win());
}

#[test]
fn reset_replaces_level() {
    let mut rng = fastrand::Rng::with_seed(11);
    let mut g = Game::new(LevelConfig::default(), &mut rng).unwrap();
    let first = g.level().clone();
    let second = g.reset(&mut rng).unwrap().clone();
    assert_ne!(first, second);
}
