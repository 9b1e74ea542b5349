//! Random Network Distillation.
//!
//! A randomly initialised *target* network is frozen at construction and a
//! *predictor* network is trained online to imitate it. Observations the
//! predictor has seen often are predicted well; novel ones are not, and the
//! prediction error becomes an exploration bonus added to the extrinsic
//! reward.

use std::collections::VecDeque;

use ml::{mse, mse_grad, Adam, Frozen, RunningMeanStd, Sequential, Tensor};
use puzzle::Command;
use serde::{Deserialize, Serialize};

use crate::env::{Discrete, Env, Info, Observation, ObservationSpace, ResetOptions, Step};
use crate::error::RlError;

const STD_EPSILON: f32 = 1e-8;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RndConfig {
    pub feature_dim: usize,
    pub hidden_dim: usize,
    pub learning_rate: f32,
    /// Multiplier applied to the rescaled bonus before it is added.
    pub intrinsic_coef: f32,
    /// Number of recent raw bonuses used to rescale the current one.
    pub window: usize,
    pub seed: u64,
}

impl Default for RndConfig {
    fn default() -> Self {
        Self { feature_dim: 128, hidden_dim: 128, learning_rate: 1e-4, intrinsic_coef: 1.0, window: 1000, seed: 0 }
    }
}

/// Wraps an environment and adds a novelty bonus to every step reward.
pub struct RndRewardWrapper<E> {
    env: E,
    target: Frozen,
    predictor: Sequential,
    optimizer: Adam,
    obs_stats: RunningMeanStd,
    history: VecDeque<f32>,
    config: RndConfig,
}

impl<E: Env> RndRewardWrapper<E> {
    /// Builds fresh target and predictor networks sized for `env`'s
    /// observations.
    ///
    /// # Errors
    ///
    /// Infallible for well-formed configs; shares the validation of
    /// [`RndRewardWrapper::with_networks`].
    pub fn new(env: E, config: RndConfig) -> Result<Self, RlError> {
        let obs_dim = env.observation_space().flat_len();
        let widths = [obs_dim, config.hidden_dim, config.hidden_dim, config.feature_dim];
        let mut rng = fastrand::Rng::with_seed(config.seed);
        let target = Frozen::new(Sequential::mlp(&widths, &mut rng));
        let predictor = Sequential::mlp(&widths, &mut rng);
        Self::with_networks(env, target, predictor, config)
    }

    /// Attaches caller-supplied networks.
    ///
    /// # Errors
    ///
    /// [`RlError::DimensionMismatch`] when either network's input width
    /// differs from the flattened observation size, or the two networks
    /// disagree on their output width.
    pub fn with_networks(env: E, target: Frozen, predictor: Sequential, config: RndConfig) -> Result<Self, RlError> {
        let obs_dim = env.observation_space().flat_len();
        for input in [target.input_dim(), predictor.input_dim()] {
            let found = input.unwrap_or(0);
            if found != obs_dim {
                return Err(RlError::DimensionMismatch { expected: obs_dim, found });
            }
        }
        let target_out = target.output_dim().unwrap_or(0);
        let predictor_out = predictor.output_dim().unwrap_or(0);
        if target_out != predictor_out {
            return Err(RlError::DimensionMismatch { expected: target_out, found: predictor_out });
        }
        tracing::info!(obs_dim, features = target_out, "rnd attached");

        Ok(Self {
            env,
            target,
            predictor,
            optimizer: Adam::new(config.learning_rate),
            obs_stats: RunningMeanStd::new(obs_dim),
            history: VecDeque::with_capacity(config.window),
            config,
        })
    }

    fn normalized(&self, obs: &Observation) -> Result<Tensor, RlError> {
        let x = self.obs_stats.normalize(&obs.to_f64())?;
        Ok(Tensor::vector(&x))
    }

    /// Raw prediction error for `obs`. Folds `obs` into the running
    /// observation statistics first.
    ///
    /// # Errors
    ///
    /// Fails when `obs` does not match the attached observation width.
    pub fn compute_bonus(&mut self, obs: &Observation) -> Result<f32, RlError> {
        self.obs_stats.update(&[obs.to_f64()])?;
        let x = self.normalized(obs)?;
        Ok(mse(&self.predictor.predict(&x), &self.target.forward(&x)))
    }

    /// One Adam step moving the predictor towards the target on `obs`.
    /// Returns the loss before the step. The statistics are left alone.
    ///
    /// # Errors
    ///
    /// Fails when `obs` does not match the attached observation width.
    pub fn train_predictor(&mut self, obs: &Observation) -> Result<f32, RlError> {
        let x = self.normalized(obs)?;
        let target = self.target.forward(&x);
        let (pred, activations) = self.predictor.forward(&x);
        let loss = mse(&pred, &target);
        let (_, grads) = self.predictor.backward(&activations, &mse_grad(&pred, &target));
        let mut pairs: Vec<_> = self.predictor.params_mut().into_iter().zip(grads.iter()).collect();
        self.optimizer.step(&mut pairs);
        Ok(loss)
    }

    /// Divides `raw` by the spread of the recent bonuses once there are at
    /// least two of them.
    fn rescale(&mut self, raw: f32) -> f32 {
        while self.history.len() >= self.config.window.max(1) {
            self.history.pop_front();
        }
        self.history.push_back(raw);
        if self.history.len() <= 1 {
            return raw;
        }
        let n = self.history.len() as f32;
        let mean = self.history.iter().sum::<f32>() / n;
        let var = self.history.iter().map(|b| (b - mean).powi(2)).sum::<f32>() / n;
        raw / (var.sqrt() + STD_EPSILON)
    }

    #[must_use]
    pub fn inner(&self) -> &E {
        &self.env
    }

    pub fn inner_mut(&mut self) -> &mut E {
        &mut self.env
    }

    #[must_use]
    pub fn into_inner(self) -> E {
        self.env
    }

    #[must_use]
    pub fn target(&self) -> &Frozen {
        &self.target
    }

    #[must_use]
    pub fn predictor(&self) -> &Sequential {
        &self.predictor
    }

    #[must_use]
    pub fn obs_stats(&self) -> &RunningMeanStd {
        &self.obs_stats
    }

    #[must_use]
    pub fn history(&self) -> &VecDeque<f32> {
        &self.history
    }

    #[must_use]
    pub fn config(&self) -> &RndConfig {
        &self.config
    }
}

impl<E: Env> Env for RndRewardWrapper<E> {
    fn observation_space(&self) -> ObservationSpace {
        self.env.observation_space()
    }

    fn action_space(&self) -> Discrete {
        self.env.action_space()
    }

    fn reset(&mut self, seed: Option<u64>, options: Option<ResetOptions>) -> Result<(Observation, Info), RlError> {
        self.env.reset(seed, options)
    }

    fn step(&mut self, action: usize) -> Result<Step, RlError> {
        let mut step = self.env.step(action)?;
        let raw = self.compute_bonus(&step.observation)?;
        let bonus = self.rescale(raw);
        self.train_predictor(&step.observation)?;
        step.reward += self.config.intrinsic_coef * bonus;
        Ok(step)
    }

    fn render(&mut self) -> Result<(), RlError> {
        self.env.render()
    }

    fn close(&mut self) {
        self.env.close();
    }

    fn poll_commands(&mut self) -> Vec<Command> {
        self.env.poll_commands()
    }
}
