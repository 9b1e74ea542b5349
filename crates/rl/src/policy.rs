use std::collections::{HashMap, VecDeque};

use puzzle::{resolve_move, Direction, Level, MoveResult, Pos};

use crate::env::Observation;

/// Maps observations to discrete actions.
pub trait Policy {
    /// `deterministic` asks for the most likely action rather than a sample.
    fn predict(&mut self, obs: &Observation, deterministic: bool) -> usize;
}

/// Uniformly random actions.
pub struct RandomPolicy {
    rng: fastrand::Rng,
    n_actions: usize,
}

impl RandomPolicy {
    #[must_use]
    pub fn new(n_actions: usize, seed: u64) -> Self {
        Self { rng: fastrand::Rng::with_seed(seed), n_actions }
    }
}

impl Policy for RandomPolicy {
    fn predict(&mut self, _obs: &Observation, _deterministic: bool) -> usize {
        self.rng.usize(..self.n_actions)
    }
}

/// Always the same action.
pub struct IdlePolicy(pub usize);

impl Policy for IdlePolicy {
    fn predict(&mut self, _obs: &Observation, _deterministic: bool) -> usize {
        self.0
    }
}

/// Solves the decoded level with a breadth-first search over
/// `(player, boxes)` states and replays the shortest plan.
///
/// The plan is kept while observations follow it and recomputed as soon as
/// one does not.
pub struct PlannerPolicy {
    max_states: usize,
    plan: VecDeque<(Direction, Level)>,
    expected: Option<Level>,
    fallback: RandomPolicy,
}

impl Default for PlannerPolicy {
    fn default() -> Self {
        Self::new(200_000)
    }
}

impl PlannerPolicy {
    /// Searches at most `max_states` distinct states per plan.
    #[must_use]
    pub fn new(max_states: usize) -> Self {
        Self { max_states, plan: VecDeque::new(), expected: None, fallback: RandomPolicy::new(Direction::ALL.len(), 0) }
    }

    /// Shortest sequence of moves that solves `start`, if one exists within
    /// the search budget.
    #[must_use]
    pub fn solve(&self, start: &Level) -> Option<Vec<Direction>> {
        Some(self.search(start)?.into_iter().map(|(dir, _)| dir).collect())
    }

    fn search(&self, start: &Level) -> Option<Vec<(Direction, Level)>> {
        if start.is_win() {
            return Some(Vec::new());
        }
        let mut parents: HashMap<Level, Option<(Level, Direction)>> = HashMap::new();
        parents.insert(start.clone(), None);
        let mut frontier = VecDeque::from([start.clone()]);

        while let Some(state) = frontier.pop_front() {
            for dir in Direction::ALL {
                let mut next = state.clone();
                if resolve_move(&mut next, dir) == MoveResult::Blocked || parents.contains_key(&next) {
                    continue;
                }
                if has_dead_box(&next) {
                    continue;
                }
                parents.insert(next.clone(), Some((state.clone(), dir)));
                if next.is_win() {
                    return Some(unwind(&parents, next));
                }
                if parents.len() >= self.max_states {
                    tracing::debug!(states = parents.len(), "planner budget exhausted");
                    return None;
                }
                frontier.push_back(next);
            }
        }
        None
    }
}

/// A box off-target in a grid corner can never be pushed again.
fn has_dead_box(level: &Level) -> bool {
    let (w, h) = (level.width(), level.height());
    let corner = |p: &Pos| (p.x == 0 || p.x + 1 == w) && (p.y == 0 || p.y + 1 == h);
    level.boxes().iter().any(|b| corner(b) && !level.targets().contains(b))
}

fn unwind(parents: &HashMap<Level, Option<(Level, Direction)>>, goal: Level) -> Vec<(Direction, Level)> {
    let mut path = Vec::new();
    let mut current = goal;
    while let Some(Some((prev, dir))) = parents.get(&current) {
        path.push((*dir, current.clone()));
        current = prev.clone();
    }
    path.reverse();
    path
}

impl Policy for PlannerPolicy {
    fn predict(&mut self, obs: &Observation, deterministic: bool) -> usize {
        let Ok(level) = Level::from_grid(&obs.grid()) else {
            return self.fallback.predict(obs, deterministic);
        };
        if self.expected.as_ref() != Some(&level) || self.plan.is_empty() {
            self.plan = self.search(&level).map(VecDeque::from).unwrap_or_default();
        }
        match self.plan.pop_front() {
            Some((dir, next)) => {
                self.expected = Some(next);
                dir.action()
            }
            None => {
                self.expected = None;
                self.fallback.predict(obs, deterministic)
            }
        }
    }
}
