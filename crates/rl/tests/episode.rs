mod common;

use common::default_env;
use puzzle::{Level, LevelConfig};
use rl::{Env, EnvConfig, IdlePolicy, PlannerPolicy, Policy, RandomPolicy, ResetOptions, SokobanEnv};

const TWO_BOXES: &str = "
    ......
    .@$.*.
    ......
    ..$...
    ..*...
    ......
";

#[test]
fn planner_solves_a_two_box_level() {
    let mut env = default_env(0);
    let level = Level::parse(TWO_BOXES).unwrap();
    let (mut obs, _) = env.reset(None, Some(ResetOptions::with_level(level))).unwrap();
    let mut policy = PlannerPolicy::default();

    let mut last = None;
    for _ in 0..200 {
        let step = env.step(policy.predict(&obs, true)).unwrap();
        let done = step.done();
        obs = step.observation.clone();
        last = Some(step);
        if done {
            break;
        }
    }
    let last = last.unwrap();
    assert!(last.terminated);
    assert!(!last.truncated);
    assert!(last.reward >= 100.0, "final reward {}", last.reward);
    assert!(last.info.is_success);
    assert!(last.info.steps <= 200);
    assert_eq!(last.info.boxes_on_target, 2);
}

#[test]
fn planner_finds_a_shortest_plan() {
    let level = Level::parse("@$.*").unwrap();
    let plan = PlannerPolicy::default().solve(&level).unwrap();
    assert_eq!(plan.len(), 2);
    assert!(PlannerPolicy::default().solve(&Level::parse("@+").unwrap()).unwrap().is_empty());
    // a box stuck in a corner off its target
    assert!(PlannerPolicy::default().solve(&Level::parse("$..\n.@.\n..*").unwrap()).is_none());
}

#[test]
fn planner_solves_generated_levels() {
    let mut env = default_env(11);
    let mut solved = 0;
    for episode in 0..10 {
        let (mut obs, _) = env.reset(Some(episode), None).unwrap();
        let mut policy = PlannerPolicy::default();
        loop {
            let step = env.step(policy.predict(&obs, true)).unwrap();
            if step.done() {
                solved += usize::from(step.terminated);
                break;
            }
            obs = step.observation;
        }
    }
    assert!(solved >= 8, "solved {solved} of 10");
}

#[test]
fn idle_policy_is_truncated_with_only_step_penalties() {
    let mut env = default_env(0);
    let level = Level::parse(
        "..@...
         ......
         ..$...
         ......
         ...$*.
         ....*.",
    )
    .unwrap();
    let (mut obs, _) = env.reset(None, Some(ResetOptions::with_level(level))).unwrap();
    let mut policy = IdlePolicy(0);

    let mut total = 0.0f32;
    let mut steps = 0;
    loop {
        let step = env.step(policy.predict(&obs, true)).unwrap();
        total += step.reward;
        steps += 1;
        if step.done() {
            assert!(step.truncated);
            assert!(!step.terminated);
            break;
        }
        obs = step.observation;
    }
    assert_eq!(steps, 200);
    assert!((total + 2.0).abs() < 1e-3, "total {total}");
}

#[test]
fn random_policy_stays_in_the_action_space() {
    let mut env = SokobanEnv::new(LevelConfig::default(), EnvConfig { max_episode_steps: 50 }, 1).unwrap();
    let (mut obs, _) = env.reset(None, None).unwrap();
    let mut policy = RandomPolicy::new(env.action_space().n(), 1);
    for _ in 0..50 {
        let action = policy.predict(&obs, false);
        assert!(env.action_space().contains(action));
        obs = env.step(action).unwrap().observation;
    }
}
