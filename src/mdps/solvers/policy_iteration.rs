use super::bellman::{self, Termination, ValueUpdate};
use super::common::*;
use super::MdpSolver;
use crate::common::defs::*;
use crate::error::{MdpError, Result};
use crate::mdps::mdp::*;
use crate::policy::PolicyMatrix;
use ndarray::Array1;
use std::rc::Rc;
use tracing::{debug, info};

/// Cap on evaluation sweeps per improvement round.
const MAX_EVALUATION_SWEEPS: usize = 100_000;

/// Policy iteration: evaluate the current deterministic policy to `theta`,
/// then make it greedy. A state keeps its action unless another one is
/// strictly better, so ties never cycle.
#[derive(Clone)]
pub struct PolicyIteration {
    mdp: Rc<dyn Mdp>,
    transitions: Rc<Transitions>,
    v: Array1<Continous>,
    pi: Vec<Discrete>,
}

impl PolicyIteration {
    /// Starts from the lowest-index available action of every state.
    pub fn new(mdp: Rc<dyn Mdp>) -> Self {
        let transitions = mdp.transitions();
        let pi = (0..mdp.n_s())
            .map(|s| {
                (0..mdp.n_a())
                    .find(|&a| transitions.contains_key(&(s, a)))
                    .unwrap_or_default()
            })
            .collect();
        let v = Array1::zeros(mdp.n_s());

        Self {
            mdp,
            transitions,
            v,
            pi,
        }
    }

    pub fn values(&self) -> &Array1<Continous> {
        &self.v
    }

    pub fn policy(&self) -> Result<PolicyMatrix> {
        PolicyMatrix::deterministic(&self.pi, self.mdp.n_a())
    }

    fn evaluate(&mut self, theta: Continous) -> Result<usize> {
        let update = ValueUpdate::under_policy(self.mdp.as_ref(), &self.policy()?)?;
        let termination = Termination::Tolerance {
            epsilon: theta,
            max_iterations: MAX_EVALUATION_SWEEPS,
        };
        let vf = bellman::solve(&update, self.mdp.gamma(), &termination, Some(self.v.clone()))?;
        self.v = vf.values;

        Ok(vf.iterations)
    }

    /// Returns whether the policy was already greedy.
    fn improve(&mut self) -> bool {
        let v = self.v.to_vec();
        let mut stable = true;
        for s in 0..self.mdp.n_s() {
            let qs = q_values(self.mdp.as_ref(), &self.transitions, s, &v);
            let current = qs.get(self.pi[s]).copied().flatten();
            if let Some((a, q)) = best_action(&qs) {
                if current.map_or(true, |c| q > c) {
                    self.pi[s] = a;
                    stable = false;
                }
            }
        }

        stable
    }
}

impl MdpSolver<bool> for PolicyIteration {
    fn v_star(&self, s: Discrete) -> Continous {
        self.v[s]
    }

    fn q_star(&self, s: Discrete, a: Discrete) -> Option<Continous> {
        self.transitions
            .get(&(s, a))
            .map(|ts| q_value(ts, self.mdp.gamma(), self.v.as_slice().unwrap_or_default()))
    }

    fn pi_star(&self, s: Discrete) -> Option<Discrete> {
        let available = (0..self.mdp.n_a()).any(|a| self.transitions.contains_key(&(s, a)));
        available.then(|| self.pi[s])
    }

    /// Returns whether the policy is stable.
    fn exec(&mut self, theta: Continous, num_iterations: Option<usize>) -> Result<(bool, usize)> {
        if !(theta.is_finite() && theta > 0.) {
            return Err(MdpError::invalid(format!("theta must be positive, got {theta}")));
        }

        let mut k = 0;
        let mut stable = false;
        while !stable && num_iterations.map_or(true, |n| k < n) {
            let sweeps = self.evaluate(theta)?;
            stable = self.improve();
            k += 1;
            debug!(round = k, sweeps, stable, "Policy iteration round");
        }
        info!(rounds = k, stable, "Policy iteration finished");

        Ok((stable, k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envs::simple_golf::*;
    use crate::mdps::solvers::value_iteration::ValueIteration;
    use crate::mdps::tabular::TabularMdp;
    use float_eq::*;
    use ndarray::{array, Array3};

    /// Three states, every action leads to the same place from any state:
    /// `0` to B, `1` and `2` to C. Rewards depend on the state and action.
    fn three_state_toy() -> TabularMdp {
        let mut p = Array3::zeros((3, 3, 3));
        for s in 0..3 {
            p[[s, 0, 1]] = 1.;
            p[[s, 1, 2]] = 1.;
            p[[s, 2, 2]] = 1.;
        }
        let r = array![[0., 1., 0.], [0., 0., 2.], [0., 0., 0.]];

        TabularMdp::from_dense(&p, &r, 0.9).unwrap()
    }

    #[test]
    fn three_state_toy_reaches_stable_policy() {
        let pi = &mut PolicyIteration::new(Rc::new(three_state_toy()));
        let (stable, rounds) = pi.exec(1e-9, Some(10)).unwrap();

        assert!(stable);
        assert!(rounds <= 10);
        assert_eq!((0..3).map(|s| pi.pi_star(s).unwrap()).collect::<Vec<_>>(), vec![1, 2, 0]);
        assert_float_eq!(
            pi.values().to_vec(),
            vec![181. / 19., 200. / 19., 180. / 19.],
            abs_all <= 1e-7
        );
    }

    #[test]
    fn agrees_with_value_iteration() {
        let mdp: Rc<dyn Mdp> = Rc::new(SimpleGolf::new(0.9));
        let pi = &mut PolicyIteration::new(Rc::clone(&mdp));
        let vi = &mut ValueIteration::new(mdp);
        pi.exec(1e-10, None).unwrap();
        vi.exec(1e-10, None).unwrap();

        assert_float_eq!(pi.values().to_vec(), vi.values().to_vec(), abs_all <= 1e-7);
        for s in 0..3 {
            assert_eq!(pi.pi_star(s), vi.pi_star(s));
        }
    }

    #[test]
    fn terminal_states_have_no_action() {
        let pi = &mut PolicyIteration::new(Rc::new(SimpleGolf::new(0.9)));
        pi.exec(1e-8, None).unwrap();
        assert_eq!(pi.pi_star(2), None);
        assert_eq!(pi.v_star(2), 0.);
        assert_eq!(pi.q_star(2, 0), None);
    }
}
