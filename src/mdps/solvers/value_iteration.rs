use super::common::*;
use super::MdpSolver;
use crate::common::defs::*;
use crate::error::{MdpError, Result};
use crate::mdps::{mdp::*, tabular::check_gamma};
use crate::policy::PolicyMatrix;
use ndarray::Array1;
use std::rc::Rc;
use tracing::{debug, info};

/// Optimal value iteration: `v(s) <- max_a Σ p (r + γ v(s'))`, all states
/// backed up from the previous sweep.
#[derive(Clone)]
pub struct ValueIteration {
    mdp: Rc<dyn Mdp>,
    transitions: Rc<Transitions>,
    v: Vec<Continous>,
}

impl ValueIteration {
    pub fn new(mdp: Rc<dyn Mdp>) -> Self {
        let transitions = mdp.transitions();
        let v = vec![0.; mdp.n_s()];

        Self {
            mdp,
            transitions,
            v,
        }
    }

    pub fn values(&self) -> Array1<Continous> {
        Array1::from_vec(self.v.clone())
    }

    pub fn policy(&self) -> Result<PolicyMatrix> {
        greedy_policy(self.mdp.as_ref(), &self.values())
    }

    fn sweep(&self) -> Vec<Continous> {
        (0..self.mdp.n_s())
            .map(|s| {
                best_action(&q_values(self.mdp.as_ref(), &self.transitions, s, &self.v))
                    .map_or(self.v[s], |(_, q)| q)
            })
            .collect()
    }
}

impl MdpSolver<Continous> for ValueIteration {
    fn v_star(&self, s: Discrete) -> Continous {
        self.v[s]
    }

    fn q_star(&self, s: Discrete, a: Discrete) -> Option<Continous> {
        self.transitions
            .get(&(s, a))
            .map(|ts| q_value(ts, self.mdp.gamma(), &self.v))
    }

    fn pi_star(&self, s: Discrete) -> Option<Discrete> {
        best_action(&q_values(self.mdp.as_ref(), &self.transitions, s, &self.v)).map(|(a, _)| a)
    }

    /// Returns the last sweep's largest change.
    fn exec(&mut self, theta: Continous, num_iterations: Option<usize>) -> Result<(Continous, usize)> {
        let gamma = self.mdp.gamma();
        check_gamma(gamma)?;
        if !(theta.is_finite() && theta > 0.) {
            return Err(MdpError::invalid(format!("theta must be positive, got {theta}")));
        }
        if gamma >= 1. && num_iterations.is_none() {
            return Err(MdpError::invalid(
                "an iteration budget is required when gamma is 1",
            ));
        }

        let mut delta = Continous::INFINITY;
        let mut k = 0;
        while delta >= theta && num_iterations.map_or(true, |n| k < n) {
            let v_new = self.sweep();
            delta = max_abs_diff(v_new.as_slice().into(), self.v.as_slice().into());
            self.v = v_new;
            k += 1;
            debug!(iteration = k, delta, "Value iteration sweep");
        }
        info!(iterations = k, delta, "Value iteration finished");

        Ok((delta, k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envs::simple_golf::*;
    use float_eq::*;

    #[test]
    fn simple_golf_optimal_values() {
        let mdp = Rc::new(SimpleGolf::new(0.9));
        let vi = &mut ValueIteration::new(mdp);
        let (delta, k) = vi.exec(1e-10, None).unwrap();

        assert!(delta < 1e-10);
        assert!(k > 1);
        let v1 = 9. / 0.91;
        let v0 = 0.81 * v1 / 0.91;
        assert_float_eq!(vi.values().to_vec(), vec![v0, v1, 0.], abs_all <= 1e-8);
        assert_eq!(vi.pi_star(0), Some(0));
        assert_eq!(vi.pi_star(1), Some(2));
        assert_eq!(vi.pi_star(2), None);
        assert_eq!(vi.q_star(0, 1), None);
        assert_float_eq!(vi.q_star(1, 2).unwrap(), v1, abs <= 1e-8);
    }

    #[test]
    fn iteration_budget_caps_sweeps() {
        let vi = &mut ValueIteration::new(Rc::new(SimpleGolf::new(0.9)));
        let (delta, k) = vi.exec(1e-10, Some(3)).unwrap();
        assert_eq!(k, 3);
        assert!(delta > 1e-10);
    }

    #[test]
    fn undiscounted_problem_needs_a_budget() {
        let vi = &mut ValueIteration::new(Rc::new(SimpleGolf::new(1.)));
        assert!(vi.exec(1e-6, None).is_err());
        assert!(vi.exec(1e-6, Some(50)).is_ok());
    }

    #[test]
    fn non_positive_theta_is_rejected() {
        let vi = &mut ValueIteration::new(Rc::new(SimpleGolf::new(0.9)));
        assert!(matches!(vi.exec(0., None), Err(MdpError::InvalidParameter(_))));
    }
}
