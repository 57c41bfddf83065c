use crate::common::defs::*;
use crate::error::{MdpError, Result};
use crate::mdps::mdp::*;
use crate::policy::PolicyMatrix;
use ndarray::{Array1, ArrayView1};

/// `max_s |a[s] - b[s]|`, 0 for empty vectors.
pub fn max_abs_diff(a: ArrayView1<'_, Continous>, b: ArrayView1<'_, Continous>) -> Continous {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).abs())
        .fold(0., Continous::max)
}

/// Action values of `s`; `None` for actions unavailable in `s`.
pub fn q_values(
    mdp: &dyn Mdp,
    transitions: &Transitions,
    s: Discrete,
    v: &[Continous],
) -> Vec<Option<Continous>> {
    (0..mdp.n_a())
        .map(|a| {
            transitions
                .get(&(s, a))
                .map(|ts| q_value(ts, mdp.gamma(), v))
        })
        .collect()
}

/// Index and value of the best available action, lowest index on ties.
pub fn best_action(qs: &[Option<Continous>]) -> Option<(Discrete, Continous)> {
    qs.iter()
        .enumerate()
        .filter_map(|(a, q)| q.map(|q| (a, q)))
        .fold(None, |best, (a, q)| match best {
            Some((_, best_q)) if best_q >= q => best,
            _ => Some((a, q)),
        })
}

/// Deterministic policy acting greedily with respect to `v`. States without
/// any available action get action 0.
pub fn greedy_policy(mdp: &dyn Mdp, v: &Array1<Continous>) -> Result<PolicyMatrix> {
    if v.len() != mdp.n_s() {
        return Err(MdpError::dims("value vector", mdp.n_s(), v.len()));
    }
    let transitions = mdp.transitions();
    let v = v.to_vec();
    let actions = (0..mdp.n_s())
        .map(|s| {
            best_action(&q_values(mdp, &transitions, s, &v))
                .map(|(a, _)| a)
                .unwrap_or_default()
        })
        .collect::<Vec<_>>();

    PolicyMatrix::deterministic(&actions, mdp.n_a())
}
