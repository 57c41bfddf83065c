use crate::common::defs::*;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub next_state: Discrete,
    pub probability: Continous,
    pub reward: Continous,
    pub done: bool,
}

/// Successor distribution for every `(state, action)` pair.
pub type Transitions = HashMap<(Discrete, Discrete), Vec<Transition>>;

/// Markov Decision Process - Sutton & Barto 2018.
///
/// A `(state, action)` pair missing from [`Mdp::transitions`] is an action that
/// is unavailable in that state.
pub trait Mdp {
    fn n_s(&self) -> usize;

    fn n_a(&self) -> usize;

    fn transitions(&self) -> Rc<Transitions>;

    fn gamma(&self) -> Continous;
}

/// Expected one-step return `Σ p (r + γ v(s'))` of taking `a` in `s`.
pub fn q_value(ts: &[Transition], gamma: Continous, v: &[Continous]) -> Continous {
    ts.iter()
        .map(|t| t.probability * (t.reward + gamma * v[t.next_state]))
        .sum()
}
