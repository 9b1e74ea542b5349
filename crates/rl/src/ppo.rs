//! Proximal Policy Optimisation with a categorical actor and a separate value
//! network, both plain MLPs from `ml`.

use std::collections::VecDeque;
use std::fs;
use std::path::Path;

use ml::{clip_grad_norm, entropy, log_softmax, softmax, Adam, Sequential, Tensor};
use puzzle::Cell;
use serde::{Deserialize, Serialize};

use crate::env::{Discrete, Env, Observation, ObservationSpace};
use crate::error::RlError;
use crate::policy::Policy;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PpoConfig {
    pub learning_rate: f32,
    /// Environment steps per rollout.
    pub n_steps: usize,
    pub batch_size: usize,
    pub n_epochs: usize,
    pub gamma: f32,
    pub gae_lambda: f32,
    pub clip_range: f32,
    pub ent_coef: f32,
    pub vf_coef: f32,
    pub max_grad_norm: f32,
    pub hidden_dim: usize,
    pub seed: u64,
}

impl Default for PpoConfig {
    fn default() -> Self {
        Self {
            learning_rate: 3e-4,
            n_steps: 2048,
            batch_size: 128,
            n_epochs: 10,
            gamma: 0.99,
            gae_lambda: 0.95,
            clip_range: 0.2,
            ent_coef: 0.01,
            vf_coef: 0.5,
            max_grad_norm: 0.5,
            hidden_dim: 64,
            seed: 0,
        }
    }
}

impl PpoConfig {
    /// # Errors
    ///
    /// [`RlError::InvalidConfig`] for settings under which training cannot
    /// advance.
    pub fn validate(&self) -> Result<(), RlError> {
        if self.n_steps == 0 {
            return Err(RlError::InvalidConfig { field: "ppo.n_steps", reason: "must be at least 1" });
        }
        Ok(())
    }
}

/// On-disk form of an [`ActorCritic`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PolicyArtifact {
    pub obs_dim: usize,
    pub n_actions: usize,
    pub hidden_dim: usize,
    pub num_timesteps: u64,
    pub actor: Vec<Tensor>,
    pub critic: Vec<Tensor>,
}

/// Categorical policy and state-value estimate over flattened observations.
pub struct ActorCritic {
    actor: Sequential,
    critic: Sequential,
    obs_dim: usize,
    n_actions: usize,
    hidden_dim: usize,
    rng: fastrand::Rng,
}

impl ActorCritic {
    #[must_use]
    pub fn new(obs_dim: usize, n_actions: usize, hidden_dim: usize, seed: u64) -> Self {
        let mut rng = fastrand::Rng::with_seed(seed);
        let actor = Sequential::mlp(&[obs_dim, hidden_dim, hidden_dim, n_actions], &mut rng);
        let critic = Sequential::mlp(&[obs_dim, hidden_dim, hidden_dim, 1], &mut rng);
        Self { actor, critic, obs_dim, n_actions, hidden_dim, rng }
    }

    #[must_use]
    pub fn for_env(env: &impl Env, hidden_dim: usize, seed: u64) -> Self {
        Self::new(env.observation_space().flat_len(), env.action_space().n(), hidden_dim, seed)
    }

    #[must_use]
    pub fn obs_dim(&self) -> usize {
        self.obs_dim
    }

    #[must_use]
    pub fn n_actions(&self) -> usize {
        self.n_actions
    }

    /// Observation codes scaled into `[0, 1]`.
    #[must_use]
    pub fn features(obs: &Observation) -> Tensor {
        let scale = 1.0 / f32::from(Cell::MAX);
        Tensor::vector(&obs.to_f32().iter().map(|v| v * scale).collect::<Vec<_>>())
    }

    #[must_use]
    pub fn logits(&self, x: &Tensor) -> Vec<f32> {
        self.actor.predict(x).data
    }

    #[must_use]
    pub fn value(&self, x: &Tensor) -> f32 {
        self.critic.predict(x).data[0]
    }

    /// Samples (or picks the mode of) the action distribution. Returns the
    /// action, its log-probability and the value estimate.
    pub fn act(&mut self, x: &Tensor, deterministic: bool) -> (usize, f32, f32) {
        let log_probs = log_softmax(&self.logits(x));
        let action = if deterministic { argmax(&log_probs) } else { sample(&log_probs, &mut self.rng) };
        (action, log_probs[action], self.value(x))
    }

    /// # Errors
    ///
    /// [`RlError::Incompatible`] when the environment's shapes differ from the
    /// ones this policy was built for.
    pub fn ensure_compatible(&self, space: ObservationSpace, actions: Discrete) -> Result<(), RlError> {
        if space.flat_len() != self.obs_dim || actions.n() != self.n_actions {
            return Err(RlError::Incompatible {
                expected: format!("{} observations, {} actions", self.obs_dim, self.n_actions),
                found: format!("{} observations, {} actions", space.flat_len(), actions.n()),
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn to_artifact(&self, num_timesteps: u64) -> PolicyArtifact {
        PolicyArtifact {
            obs_dim: self.obs_dim,
            n_actions: self.n_actions,
            hidden_dim: self.hidden_dim,
            num_timesteps,
            actor: self.actor.state(),
            critic: self.critic.state(),
        }
    }

    /// # Errors
    ///
    /// Fails when the stored tensors do not fit the stored dimensions.
    pub fn from_artifact(artifact: &PolicyArtifact, seed: u64) -> Result<Self, RlError> {
        let mut model = Self::new(artifact.obs_dim, artifact.n_actions, artifact.hidden_dim, seed);
        model.actor.load_state(&artifact.actor)?;
        model.critic.load_state(&artifact.critic)?;
        Ok(model)
    }

    /// # Errors
    ///
    /// I/O and serialisation failures.
    pub fn save(&self, path: &Path, num_timesteps: u64) -> Result<(), RlError> {
        let json = serde_json::to_string(&self.to_artifact(num_timesteps))?;
        fs::write(path, json).map_err(|source| RlError::Io { path: path.to_path_buf(), source })
    }

    /// Loads a saved policy and the number of timesteps it was trained for.
    ///
    /// # Errors
    ///
    /// I/O failures, malformed JSON and tensors that do not fit.
    pub fn load(path: &Path) -> Result<(Self, u64), RlError> {
        let json = fs::read_to_string(path).map_err(|source| RlError::Io { path: path.to_path_buf(), source })?;
        let artifact: PolicyArtifact = serde_json::from_str(&json)?;
        Ok((Self::from_artifact(&artifact, 0)?, artifact.num_timesteps))
    }
}

impl Policy for ActorCritic {
    fn predict(&mut self, obs: &Observation, deterministic: bool) -> usize {
        self.act(&Self::features(obs), deterministic).0
    }
}

fn argmax(values: &[f32]) -> usize {
    values
        .iter()
        .enumerate()
        .fold((0, f32::NEG_INFINITY), |best, (i, &v)| if v > best.1 { (i, v) } else { best })
        .0
}

fn sample(log_probs: &[f32], rng: &mut fastrand::Rng) -> usize {
    let u = rng.f32();
    let mut acc = 0.0;
    for (i, lp) in log_probs.iter().enumerate() {
        acc += lp.exp();
        if u < acc {
            return i;
        }
    }
    log_probs.len() - 1
}

/// Generalised advantage estimates and the matching value targets.
///
/// `dones[t]` marks that the episode ended after step `t`; `last_value` is
/// the estimate for the observation following the final step.
#[must_use]
pub fn compute_gae(
    rewards: &[f32],
    values: &[f32],
    dones: &[bool],
    last_value: f32,
    gamma: f32,
    lambda: f32,
) -> (Vec<f32>, Vec<f32>) {
    let n = rewards.len();
    let mut advantages = vec![0.0; n];
    let mut running = 0.0;
    for t in (0..n).rev() {
        let next_value = if t + 1 == n { last_value } else { values[t + 1] };
        let live = if dones[t] { 0.0 } else { 1.0 };
        let delta = rewards[t] + gamma * next_value * live - values[t];
        running = delta + gamma * lambda * live * running;
        advantages[t] = running;
    }
    let returns = advantages.iter().zip(values).map(|(a, v)| a + v).collect();
    (advantages, returns)
}

#[derive(Clone, Debug, Default)]
pub struct Rollout {
    pub observations: Vec<Tensor>,
    pub actions: Vec<usize>,
    pub log_probs: Vec<f32>,
    pub values: Vec<f32>,
    pub rewards: Vec<f32>,
    pub dones: Vec<bool>,
    pub last_value: f32,
}

impl Rollout {
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct UpdateStats {
    pub policy_loss: f32,
    pub value_loss: f32,
    pub entropy: f32,
    pub clip_fraction: f32,
    pub grad_norm: f32,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EpisodeStats {
    pub reward: f32,
    pub length: usize,
    pub success: bool,
}

const EPISODE_HISTORY: usize = 100;

pub struct PpoTrainer {
    config: PpoConfig,
    model: ActorCritic,
    optimizer: Adam,
    rng: fastrand::Rng,
    num_timesteps: u64,
    last_obs: Option<Observation>,
    episode_reward: f32,
    episode_length: usize,
    episodes: VecDeque<EpisodeStats>,
    episodes_total: u64,
}

impl PpoTrainer {
    /// # Errors
    ///
    /// Rejects configs that fail [`PpoConfig::validate`].
    pub fn new(model: ActorCritic, config: PpoConfig) -> Result<Self, RlError> {
        config.validate()?;
        Ok(Self {
            optimizer: Adam::new(config.learning_rate),
            rng: fastrand::Rng::with_seed(config.seed.wrapping_add(1)),
            model,
            config,
            num_timesteps: 0,
            last_obs: None,
            episode_reward: 0.0,
            episode_length: 0,
            episodes: VecDeque::with_capacity(EPISODE_HISTORY),
            episodes_total: 0,
        })
    }

    /// Continues counting from `num_timesteps`, e.g. after loading a policy.
    #[must_use]
    pub fn with_timesteps(mut self, num_timesteps: u64) -> Self {
        self.num_timesteps = num_timesteps;
        self
    }

    #[must_use]
    pub fn model(&self) -> &ActorCritic {
        &self.model
    }

    #[must_use]
    pub fn into_model(self) -> ActorCritic {
        self.model
    }

    #[must_use]
    pub fn num_timesteps(&self) -> u64 {
        self.num_timesteps
    }

    #[must_use]
    pub fn config(&self) -> &PpoConfig {
        &self.config
    }

    /// The most recent finished episodes, oldest first.
    #[must_use]
    pub fn recent_episodes(&self) -> &VecDeque<EpisodeStats> {
        &self.episodes
    }

    /// Steps `env` for `n_steps` with the current policy.
    ///
    /// Truncated episodes are bootstrapped by adding the discounted value of
    /// the final observation to the last reward.
    ///
    /// # Errors
    ///
    /// Propagates environment failures.
    pub fn collect_rollout(&mut self, env: &mut impl Env) -> Result<Rollout, RlError> {
        let mut obs = match self.last_obs.take() {
            Some(obs) => obs,
            None => env.reset(Some(self.config.seed), None)?.0,
        };
        let mut rollout = Rollout::default();
        for _ in 0..self.config.n_steps {
            let x = ActorCritic::features(&obs);
            let (action, log_prob, value) = self.model.act(&x, false);
            let step = env.step(action)?;
            self.num_timesteps += 1;

            let mut reward = step.reward;
            if step.truncated && !step.terminated {
                reward += self.config.gamma * self.model.value(&ActorCritic::features(&step.observation));
            }
            self.episode_reward += step.reward;
            self.episode_length += 1;

            rollout.observations.push(x);
            rollout.actions.push(action);
            rollout.log_probs.push(log_prob);
            rollout.values.push(value);
            rollout.rewards.push(reward);
            rollout.dones.push(step.done());

            obs = if step.done() {
                self.finish_episode(step.info.is_success);
                env.reset(None, None)?.0
            } else {
                step.observation
            };
        }
        rollout.last_value = self.model.value(&ActorCritic::features(&obs));
        self.last_obs = Some(obs);
        Ok(rollout)
    }

    fn finish_episode(&mut self, success: bool) {
        let stats = EpisodeStats { reward: self.episode_reward, length: self.episode_length, success };
        tracing::debug!(reward = stats.reward, length = stats.length, success, "episode finished");
        if self.episodes.len() == EPISODE_HISTORY {
            self.episodes.pop_front();
        }
        self.episodes.push_back(stats);
        self.episodes_total += 1;
        self.episode_reward = 0.0;
        self.episode_length = 0;
    }

    /// Runs `n_epochs` of minibatch updates over `rollout`.
    pub fn update(&mut self, rollout: &Rollout) -> UpdateStats {
        let cfg = self.config.clone();
        let (advantages, returns) =
            compute_gae(&rollout.rewards, &rollout.values, &rollout.dones, rollout.last_value, cfg.gamma, cfg.gae_lambda);

        let mut indices: Vec<usize> = (0..rollout.len()).collect();
        let mut totals = UpdateStats::default();
        let mut batches = 0.0;
        for _ in 0..cfg.n_epochs {
            self.rng.shuffle(&mut indices);
            for batch in indices.chunks(cfg.batch_size.max(1)) {
                let stats = self.update_minibatch(rollout, batch, &advantages, &returns);
                totals.policy_loss += stats.policy_loss;
                totals.value_loss += stats.value_loss;
                totals.entropy += stats.entropy;
                totals.clip_fraction += stats.clip_fraction;
                totals.grad_norm += stats.grad_norm;
                batches += 1.0;
            }
        }
        if batches > 0.0 {
            totals.policy_loss /= batches;
            totals.value_loss /= batches;
            totals.entropy /= batches;
            totals.clip_fraction /= batches;
            totals.grad_norm /= batches;
        }
        totals
    }

    fn update_minibatch(&mut self, rollout: &Rollout, batch: &[usize], advantages: &[f32], returns: &[f32]) -> UpdateStats {
        let cfg = &self.config;
        let n = batch.len() as f32;

        let adv: Vec<f32> = batch.iter().map(|&i| advantages[i]).collect();
        let adv = if adv.len() > 1 {
            let mean = adv.iter().sum::<f32>() / n;
            let std = (adv.iter().map(|a| (a - mean).powi(2)).sum::<f32>() / n).sqrt();
            adv.iter().map(|a| (a - mean) / (std + 1e-8)).collect()
        } else {
            adv
        };

        let mut actor_grads = self.model.actor.zero_grads();
        let mut critic_grads = self.model.critic.zero_grads();
        let mut stats = UpdateStats::default();

        for (&i, &a_hat) in batch.iter().zip(&adv) {
            let x = &rollout.observations[i];
            let action = rollout.actions[i];

            let (logits, acts) = self.model.actor.forward(x);
            let log_probs = log_softmax(&logits.data);
            let probs = softmax(&logits.data);
            let h = entropy(&probs);
            let ratio = (log_probs[action] - rollout.log_probs[i]).exp();
            let unclipped = ratio * a_hat;
            let clipped = ratio.clamp(1.0 - cfg.clip_range, 1.0 + cfg.clip_range) * a_hat;
            stats.policy_loss -= unclipped.min(clipped) / n;
            stats.entropy += h / n;
            if (ratio - 1.0).abs() > cfg.clip_range {
                stats.clip_fraction += 1.0 / n;
            }

            // d(-min(surr))/d(log pi(a)); zero once the clipped branch is taken.
            let g_lp = if unclipped <= clipped { -unclipped / n } else { 0.0 };
            let grad_logits: Vec<f32> = (0..probs.len())
                .map(|j| {
                    let onehot = if j == action { 1.0 } else { 0.0 };
                    let policy = g_lp * (onehot - probs[j]);
                    let bonus = cfg.ent_coef * probs[j] * (log_probs[j] + h) / n;
                    policy + bonus
                })
                .collect();
            let (_, grads) = self.model.actor.backward(&acts, &Tensor::vector(&grad_logits));
            for (acc, g) in actor_grads.iter_mut().zip(&grads) {
                acc.add_scaled(g, 1.0);
            }

            let (value, acts) = self.model.critic.forward(x);
            let err = value.data[0] - returns[i];
            stats.value_loss += err * err / n;
            let grad_value = Tensor::vector(&[2.0 * cfg.vf_coef * err / n]);
            let (_, grads) = self.model.critic.backward(&acts, &grad_value);
            for (acc, g) in critic_grads.iter_mut().zip(&grads) {
                acc.add_scaled(g, 1.0);
            }
        }

        let mut all = actor_grads;
        all.append(&mut critic_grads);
        stats.grad_norm = clip_grad_norm(&mut all, cfg.max_grad_norm);

        let model = &mut self.model;
        let mut params = model.actor.params_mut();
        params.extend(model.critic.params_mut());
        let mut pairs: Vec<_> = params.into_iter().zip(all.iter()).collect();
        self.optimizer.step(&mut pairs);
        stats
    }

    /// Trains for `timesteps` more environment steps. `on_update` runs after
    /// every rollout/update cycle and may stop training early by returning
    /// `false`.
    ///
    /// # Errors
    ///
    /// Propagates environment and callback failures.
    pub fn learn<E, F>(&mut self, env: &mut E, timesteps: u64, mut on_update: F) -> Result<(), RlError>
    where
        E: Env,
        F: FnMut(&Self) -> Result<bool, RlError>,
    {
        let target = self.num_timesteps + timesteps;
        tracing::info!(from = self.num_timesteps, to = target, "training started");
        while self.num_timesteps < target {
            let rollout = self.collect_rollout(env)?;
            let stats = self.update(&rollout);
            self.log_progress(&stats);
            if !on_update(self)? {
                tracing::info!(timesteps = self.num_timesteps, "training stopped by callback");
                break;
            }
        }
        Ok(())
    }

    fn log_progress(&self, stats: &UpdateStats) {
        let n = self.episodes.len().max(1) as f32;
        let mean_reward = self.episodes.iter().map(|e| e.reward).sum::<f32>() / n;
        let mean_length = self.episodes.iter().map(|e| e.length as f32).sum::<f32>() / n;
        let success_rate = self.episodes.iter().filter(|e| e.success).count() as f32 / n;
        tracing::info!(
            timesteps = self.num_timesteps,
            episodes = self.episodes_total,
            mean_reward,
            mean_length,
            success_rate,
            policy_loss = stats.policy_loss,
            value_loss = stats.value_loss,
            entropy = stats.entropy,
            clip_fraction = stats.clip_fraction,
            "update"
        );
    }
}
