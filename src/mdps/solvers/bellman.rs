//! Synchronous Bellman backups over an explicit reward vector/matrix and a
//! transition matrix.
//!
//! Two backup forms are supported. The transition matrix means something
//! different in each, so they are not interchangeable:
//!
//! * [`ValueUpdate::StateReward`]: `v'[s] = R[s] + γ Σ_s' P[s, s'] v[s']`, one
//!   reward per state, `P` is the state-to-state matrix of a fixed policy.
//! * [`ValueUpdate::EdgeReward`]: `v'[s] = Σ_a P[s, a] (R[s, a] + γ v[a])`,
//!   the reward sits on the edge `s -> a` and column `a` names the successor.
//!
//! Every sweep reads only the previous full vector.
use super::common::max_abs_diff;
use crate::common::defs::*;
use crate::error::{MdpError, Result};
use crate::mdps::{mdp::Mdp, tabular::check_gamma};
use crate::policy::PolicyMatrix;
use ndarray::{Array1, Array2, Axis};
use tracing::{debug, info, warn};

const ROW_TOLERANCE: Continous = 1e-8;

#[derive(Debug, Clone, PartialEq)]
pub enum ValueUpdate {
    StateReward {
        rewards: Array1<Continous>,
        transitions: Array2<Continous>,
    },
    EdgeReward {
        rewards: Array2<Continous>,
        transitions: Array2<Continous>,
    },
}

impl ValueUpdate {
    pub fn n_s(&self) -> usize {
        match self {
            Self::StateReward { rewards, .. } => rewards.len(),
            Self::EdgeReward { rewards, .. } => rewards.nrows(),
        }
    }

    /// Policy evaluation: folds `pi` into `mdp`, yielding the state-reward
    /// form `r_π[s] = Σ_a π(a|s) Σ p r` and `P_π[s, s'] = Σ_a π(a|s) p(s'|s, a)`.
    ///
    /// States without any available action are absorbing with zero reward.
    pub fn under_policy(mdp: &dyn Mdp, pi: &PolicyMatrix) -> Result<Self> {
        let (n_s, n_a) = (mdp.n_s(), mdp.n_a());
        if (pi.n_s(), pi.n_a()) != (n_s, n_a) {
            return Err(MdpError::dims("policy matrix", (n_s, n_a), (pi.n_s(), pi.n_a())));
        }

        let transitions = mdp.transitions();
        let mut rewards = Array1::zeros(n_s);
        let mut p = Array2::zeros((n_s, n_s));
        for s in 0..n_s {
            if (0..n_a).all(|a| !transitions.contains_key(&(s, a))) {
                p[[s, s]] = 1.;
                continue;
            }
            for a in 0..n_a {
                let pi_sa = pi.probability(s, a);
                if pi_sa == 0. {
                    continue;
                }
                let ts = transitions.get(&(s, a)).ok_or_else(|| {
                    MdpError::invalid(format!(
                        "policy takes unavailable action {a} in state {s} with probability {pi_sa}"
                    ))
                })?;
                for t in ts {
                    rewards[s] += pi_sa * t.probability * t.reward;
                    p[[s, t.next_state]] += pi_sa * t.probability;
                }
            }
        }

        Ok(Self::StateReward {
            rewards,
            transitions: p,
        })
    }

    /// Checks shapes, finiteness and that transition rows are distributions.
    pub fn validate(&self) -> Result<()> {
        let n = self.n_s();
        let (transitions, rewards_finite) = match self {
            Self::StateReward {
                rewards,
                transitions,
            } => {
                if transitions.dim() != (n, n) {
                    let found = transitions.dim();
                    return Err(MdpError::dims("state transition matrix", (n, n), found));
                }
                (transitions, rewards.iter().all(|r| r.is_finite()))
            }
            Self::EdgeReward {
                rewards,
                transitions,
            } => {
                if rewards.dim() != (n, n) {
                    return Err(MdpError::dims("edge reward matrix", (n, n), rewards.dim()));
                }
                if transitions.dim() != (n, n) {
                    let found = transitions.dim();
                    return Err(MdpError::dims("edge transition matrix", (n, n), found));
                }
                (transitions, rewards.iter().all(|r| r.is_finite()))
            }
        };

        if !rewards_finite {
            return Err(MdpError::invalid("rewards must be finite"));
        }
        for (s, row) in transitions.outer_iter().enumerate() {
            if row.iter().any(|&p| !(0.0..=1.0).contains(&p)) {
                return Err(MdpError::invalid(format!(
                    "transition row {s} has entries outside [0, 1]: {row}"
                )));
            }
            let total = row.sum();
            if (total - 1.).abs() > ROW_TOLERANCE {
                return Err(MdpError::invalid(format!(
                    "transition row {s} sums to {total}, expected 1"
                )));
            }
        }

        Ok(())
    }

    /// One synchronous backup of `v`.
    pub fn backup(&self, v: &Array1<Continous>, gamma: Continous) -> Array1<Continous> {
        match self {
            Self::StateReward {
                rewards,
                transitions,
            } => rewards + &(transitions.dot(v) * gamma),
            Self::EdgeReward {
                rewards,
                transitions,
            } => {
                let bootstrapped = rewards + &(v * gamma).insert_axis(Axis(0));
                (transitions * &bootstrapped).sum_axis(Axis(1))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Termination {
    /// Exactly this many sweeps.
    Iterations(usize),

    /// Sweep until the largest change drops below `epsilon`, at most
    /// `max_iterations` times.
    Tolerance {
        epsilon: Continous,
        max_iterations: usize,
    },
}

impl Termination {
    fn max_iterations(&self) -> usize {
        match *self {
            Self::Iterations(n) => n,
            Self::Tolerance { max_iterations, .. } => max_iterations,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValueFunction {
    pub values: Array1<Continous>,

    /// Number of sweeps performed.
    pub iterations: usize,

    /// `deltas[k]` is the largest change made by sweep `k + 1`.
    pub deltas: Vec<Continous>,
}

impl ValueFunction {
    pub fn last_delta(&self) -> Option<Continous> {
        self.deltas.last().copied()
    }

    pub fn converged(&self, epsilon: Continous) -> bool {
        self.last_delta().is_some_and(|d| d < epsilon)
    }

    /// # Panics
    ///
    /// If `s` is not a state of the solved model.
    pub fn value(&self, s: Discrete) -> Continous {
        self.values[s]
    }
}

/// Runs synchronous sweeps of `update` from `initial` (zeros when `None`).
pub fn solve(
    update: &ValueUpdate,
    gamma: Continous,
    termination: &Termination,
    initial: Option<Array1<Continous>>,
) -> Result<ValueFunction> {
    check_gamma(gamma)?;
    if let Termination::Tolerance { epsilon, .. } = *termination {
        if !(epsilon.is_finite() && epsilon > 0.) {
            return Err(MdpError::invalid(format!(
                "tolerance must be positive and finite, got {epsilon}"
            )));
        }
    }
    update.validate()?;

    let n = update.n_s();
    let mut v = match initial {
        Some(v) if v.len() != n => return Err(MdpError::dims("initial value vector", n, v.len())),
        Some(v) if v.iter().any(|x| !x.is_finite()) => {
            return Err(MdpError::invalid("initial values must be finite"))
        }
        Some(v) => v,
        None => Array1::zeros(n),
    };

    let mut deltas = vec![];
    for k in 0..termination.max_iterations() {
        let v_new = update.backup(&v, gamma);
        let delta = max_abs_diff(v_new.view(), v.view());
        debug!(iteration = k + 1, delta, "Bellman sweep");
        v = v_new;
        deltas.push(delta);

        if let Termination::Tolerance { epsilon, .. } = *termination {
            if delta < epsilon {
                info!(iterations = k + 1, delta, "Value function converged");
                return Ok(ValueFunction {
                    values: v,
                    iterations: k + 1,
                    deltas,
                });
            }
        }
    }

    if let Termination::Tolerance { epsilon, max_iterations } = *termination {
        warn!(max_iterations, epsilon, "Iteration budget exhausted before convergence");
    } else {
        info!(iterations = deltas.len(), "Finished fixed number of sweeps");
    }

    Ok(ValueFunction {
        values: v,
        iterations: deltas.len(),
        deltas,
    })
}
