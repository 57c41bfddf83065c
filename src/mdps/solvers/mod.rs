pub mod bellman;
pub mod common;
pub mod policy_iteration;
pub mod value_iteration;

use crate::common::defs::*;
use crate::error::Result;

/// Solver computing optimal values and a greedy policy of an MDP.
pub trait MdpSolver<T> {
    fn v_star(&self, s: Discrete) -> Continous;

    /// `None` when `a` is unavailable in `s`.
    fn q_star(&self, s: Discrete, a: Discrete) -> Option<Continous>;

    /// `None` for states without any available action.
    fn pi_star(&self, s: Discrete) -> Option<Discrete>;

    /// Runs until the largest value change drops below `theta` or
    /// `num_iterations` rounds have been made. Returns the solver specific
    /// outcome and the number of rounds.
    fn exec(&mut self, theta: Continous, num_iterations: Option<usize>) -> Result<(T, usize)>;
}
