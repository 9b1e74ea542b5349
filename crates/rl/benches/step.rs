use criterion::{black_box, criterion_group, criterion_main, Criterion};
use puzzle::LevelConfig;
use rl::{Env, EnvConfig, RndConfig, RndRewardWrapper, SokobanEnv};

fn run_steps(env: &mut impl Env, rng: &mut fastrand::Rng, n: usize) {
    for _ in 0..n {
        let step = env.step(rng.usize(..4)).unwrap();
        if step.done() {
            env.reset(None, None).unwrap();
        }
        black_box(step.reward);
    }
}

fn bench_env_step(c: &mut Criterion) {
    let mut env = SokobanEnv::new(LevelConfig::default(), EnvConfig::default(), 0).unwrap();
    env.reset(Some(0), None).unwrap();
    let mut rng = fastrand::Rng::with_seed(0);
    c.bench_function("sokoban_step_x100", |b| b.iter(|| run_steps(&mut env, &mut rng, 100)));
}

fn bench_rnd_step(c: &mut Criterion) {
    let env = SokobanEnv::new(LevelConfig::default(), EnvConfig::default(), 0).unwrap();
    let mut env = RndRewardWrapper::new(env, RndConfig::default()).unwrap();
    env.reset(Some(0), None).unwrap();
    let mut rng = fastrand::Rng::with_seed(0);
    c.bench_function("sokoban_rnd_step_x100", |b| b.iter(|| run_steps(&mut env, &mut rng, 100)));
}

criterion_group!(benches, bench_env_step, bench_rnd_step);
criterion_main!(benches);
