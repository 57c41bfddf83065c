use super::mdp::*;
use crate::common::defs::*;
use crate::error::{MdpError, Result};
use itertools::iproduct;
use ndarray::{Array2, Array3};
use std::rc::Rc;

const PROBABILITY_TOLERANCE: Continous = 1e-8;

/// Hand-authored MDP backed by an explicit transition table.
#[derive(Debug, Clone)]
pub struct TabularMdp {
    n_s: usize,
    n_a: usize,
    gamma: Continous,
    transitions: Rc<Transitions>,
}

impl TabularMdp {
    pub fn new(n_s: usize, n_a: usize, gamma: Continous, transitions: Transitions) -> Result<Self> {
        check_gamma(gamma)?;
        for (&(s, a), ts) in transitions.iter() {
            if s >= n_s || a >= n_a {
                return Err(MdpError::dims("transition key", (n_s, n_a), (s, a)));
            }
            if let Some(t) = ts.iter().find(|t| t.next_state >= n_s) {
                return Err(MdpError::dims("successor state", n_s, t.next_state));
            }
            if ts
                .iter()
                .any(|t| !t.reward.is_finite() || !(0.0..=1.0).contains(&t.probability))
            {
                return Err(MdpError::invalid(format!(
                    "transitions of ({s}, {a}) need finite rewards and probabilities in [0, 1]"
                )));
            }
            let total = ts.iter().map(|t| t.probability).sum::<Continous>();
            if (total - 1.).abs() > PROBABILITY_TOLERANCE {
                return Err(MdpError::invalid(format!(
                    "probabilities of ({s}, {a}) sum to {total}, expected 1"
                )));
            }
        }

        Ok(Self {
            n_s,
            n_a,
            gamma,
            transitions: Rc::new(transitions),
        })
    }

    /// Builds the table from dense arrays: `p[[s, a, s']]` is the probability
    /// of reaching `s'` and `r[[s, a]]` the reward of taking `a` in `s`.
    /// Zero-probability successors are dropped.
    pub fn from_dense(p: &Array3<Continous>, r: &Array2<Continous>, gamma: Continous) -> Result<Self> {
        let (n_s, n_a, n_next) = p.dim();
        if n_next != n_s {
            return Err(MdpError::dims("transition tensor", (n_s, n_a, n_s), p.dim()));
        }
        if r.dim() != (n_s, n_a) {
            return Err(MdpError::dims("reward matrix", (n_s, n_a), r.dim()));
        }

        let transitions = iproduct!(0..n_s, 0..n_a)
            .map(|(s, a)| {
                let ts = (0..n_s)
                    .filter(|&s_next| p[[s, a, s_next]] != 0.)
                    .map(|s_next| Transition {
                        next_state: s_next,
                        probability: p[[s, a, s_next]],
                        reward: r[[s, a]],
                        done: false,
                    })
                    .collect();
                ((s, a), ts)
            })
            .collect();

        Self::new(n_s, n_a, gamma, transitions)
    }
}

impl Mdp for TabularMdp {
    fn n_s(&self) -> usize {
        self.n_s
    }

    fn n_a(&self) -> usize {
        self.n_a
    }

    fn transitions(&self) -> Rc<Transitions> {
        Rc::clone(&self.transitions)
    }

    fn gamma(&self) -> Continous {
        self.gamma
    }
}

pub(crate) fn check_gamma(gamma: Continous) -> Result<()> {
    if (0.0..=1.0).contains(&gamma) {
        Ok(())
    } else {
        Err(MdpError::invalid(format!("gamma must be in [0, 1], got {gamma}")))
    }
}
