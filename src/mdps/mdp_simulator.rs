use super::mdp::Transition;
use crate::common::defs::*;
use crate::envs::geometry::Coord;
use crate::envs::grid_world::GridWorld;
use crate::envs::noise::NoiseSource;
use crate::error::{MdpError, Result};
use crate::mdps::mdp::Mdp;
use crate::policy::PolicyMatrix;
use rand::distributions::WeightedIndex;
use rand::prelude::*;
use tracing::debug;

pub trait Weighted<S> {
    fn s(&self) -> S;

    fn p(&self) -> Continous;
}

impl Weighted<Discrete> for Transition {
    fn s(&self) -> Discrete {
        self.next_state
    }

    fn p(&self) -> Continous {
        self.probability
    }
}

impl Weighted<Discrete> for (Discrete, Continous) {
    fn s(&self) -> Discrete {
        self.0
    }

    fn p(&self) -> Continous {
        self.1
    }
}

/// Draws one item's `s` with probability proportional to its `p`.
pub fn pick_next<T, S, R>(rng: &mut R, ts: &[T]) -> Result<S>
where
    T: Weighted<S>,
    R: Rng + ?Sized,
{
    let dist = WeightedIndex::new(ts.iter().map(|item| item.p()))
        .map_err(|e| MdpError::invalid(format!("cannot sample from weights: {e}")))?;

    Ok(ts[dist.sample(rng)].s())
}

#[derive(Debug, Clone, PartialEq)]
pub struct Episode {
    /// Start cell followed by the cell after every step.
    pub states: Vec<Coord>,
    pub actions: Vec<Discrete>,
    pub rewards: Vec<Continous>,
    pub terminated: bool,
}

impl Episode {
    /// `Σ_t γ^t r_{t+1}`.
    pub fn discounted_return(&self, gamma: Continous) -> Continous {
        self.rewards.iter().rev().fold(0., |g, r| r + gamma * g)
    }
}

/// Resets `env` and follows `pi` until the target is reached or `max_steps`
/// steps were taken.
pub fn rollout<N, R>(
    env: &mut GridWorld<N>,
    pi: &PolicyMatrix,
    rng: &mut R,
    max_steps: usize,
) -> Result<Episode>
where
    N: NoiseSource,
    R: Rng + ?Sized,
{
    if (pi.n_s(), pi.n_a()) != (env.n_s(), env.n_a()) {
        let expected = (env.n_s(), env.n_a());
        return Err(MdpError::dims("policy matrix", expected, (pi.n_s(), pi.n_a())));
    }

    let (start, _) = env.reset();
    let mut episode = Episode {
        states: vec![start],
        actions: vec![],
        rewards: vec![],
        terminated: env.is_done(),
    };

    while !episode.terminated && episode.actions.len() < max_steps {
        let s = env
            .index_of(env.agent_state())
            .ok_or_else(|| MdpError::invalid("agent left the grid"))?;
        let row = pi.row(s).iter().copied().enumerate().collect::<Vec<_>>();
        let a: Discrete = pick_next(rng, &row)?;
        let action = env.action_space()[a];
        let step = env.step(&action)?;

        episode.states.push(step.observation);
        episode.actions.push(a);
        episode.rewards.push(step.reward);
        episode.terminated = step.terminated;
    }
    debug!(
        steps = episode.actions.len(),
        terminated = episode.terminated,
        "Rollout finished"
    );

    Ok(episode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envs::config::GridWorldConfig;
    use crate::envs::geometry::Action;
    use crate::envs::noise::NoNoise;
    use crate::envs::simple_golf::SimpleGolf;
    use float_eq::*;

    #[test]
    fn test_pick_next_seeded() {
        let items: Vec<(Discrete, Continous)> = vec![(0, 0.2), (1, 0.8)];
        let counts = &mut [0; 2];

        let rng = &mut StdRng::seed_from_u64(2718);
        let n = 10000;
        for _ in 0..n {
            let i: Discrete = pick_next(rng, &items).unwrap();
            counts[i] += 1;
        }

        assert_float_eq!(counts[0] as f64 / n as f64, 0.2, abs <= 1e-2);
        assert_float_eq!(counts[1] as f64 / n as f64, 0.8, abs <= 1e-2);
    }

    #[test]
    fn pick_next_samples_golf_successors() {
        let transitions = SimpleGolf::new(0.9).transitions();
        let ts = &transitions[&(1, 2)][..];
        let rng = &mut StdRng::seed_from_u64(2718);

        let n = 10000;
        let holed = (0..n)
            .map(|_| pick_next(rng, ts).unwrap())
            .filter(|&s: &Discrete| s == 2)
            .count();
        assert_float_eq!(holed as f64 / n as f64, 0.9, abs <= 1e-2);
    }

    #[test]
    fn pick_next_rejects_zero_weights() {
        let rng = &mut StdRng::seed_from_u64(0);
        let items: Vec<(Discrete, Continous)> = vec![(0, 0.), (1, 0.)];
        assert!(pick_next::<_, Discrete, _>(rng, &items).is_err());
    }

    #[test]
    fn deterministic_policy_walks_to_target() {
        let env = &mut GridWorld::with_noise(GridWorldConfig::new(3, 1), NoNoise).unwrap();
        let right = env.action_index(&Action::RIGHT).unwrap();
        let pi = PolicyMatrix::deterministic(&[right; 3], env.n_a()).unwrap();

        let rng = &mut StdRng::seed_from_u64(1);
        let episode = rollout(env, &pi, rng, 10).unwrap();

        assert!(episode.terminated);
        assert_eq!(
            episode.states,
            vec![Coord::new(0, 0), Coord::new(1, 0), Coord::new(2, 0)]
        );
        assert_eq!(episode.rewards, vec![0., 1.]);
        assert_float_eq!(episode.discounted_return(0.9), 0.9, abs <= 1e-12);
    }

    #[test]
    fn rollout_stops_at_step_budget() {
        let env = &mut GridWorld::with_noise(GridWorldConfig::new(3, 3), NoNoise).unwrap();
        let stay = env.action_index(&Action::STAY).unwrap();
        let pi = PolicyMatrix::deterministic(&[stay; 9], env.n_a()).unwrap();

        let episode = rollout(env, &pi, &mut StdRng::seed_from_u64(1), 4).unwrap();
        assert!(!episode.terminated);
        assert_eq!(episode.actions.len(), 4);
        assert_eq!(episode.discounted_return(0.9), 0.);
    }
}
