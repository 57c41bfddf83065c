use crate::common::defs::*;
use crate::error::{MdpError, Result};
use itertools::Itertools;
use ndarray::{Array2, ArrayView1};

const ROW_TOLERANCE: Continous = 1e-8;

/// Tabular policy: row `s` holds the probability of every action in state `s`.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyMatrix {
    probs: Array2<Continous>,
}

impl PolicyMatrix {
    /// Validates that every row is a probability distribution.
    pub fn from_array(probs: Array2<Continous>) -> Result<Self> {
        for (s, row) in probs.outer_iter().enumerate() {
            if row.iter().any(|&p| !p.is_finite() || p < 0.) {
                return Err(MdpError::invalid(format!(
                    "policy row {s} has negative or non-finite entries: {row}"
                )));
            }
            let total = row.sum();
            if (total - 1.).abs() > ROW_TOLERANCE {
                return Err(MdpError::invalid(format!(
                    "policy row {s} sums to {total}, expected 1"
                )));
            }
        }

        Ok(Self { probs })
    }

    pub fn uniform(n_s: usize, n_a: usize) -> Self {
        Self {
            probs: Array2::from_elem((n_s, n_a), 1. / n_a as Continous),
        }
    }

    /// One action per state, taken with probability 1.
    pub fn deterministic(actions: &[Discrete], n_a: usize) -> Result<Self> {
        let mut probs = Array2::zeros((actions.len(), n_a));
        for (s, &a) in actions.iter().enumerate() {
            if a >= n_a {
                return Err(MdpError::dims("policy action", n_a, a));
            }
            probs[[s, a]] = 1.;
        }

        Ok(Self { probs })
    }

    pub fn n_s(&self) -> usize {
        self.probs.nrows()
    }

    pub fn n_a(&self) -> usize {
        self.probs.ncols()
    }

    /// # Panics
    ///
    /// If `s` or `a` is out of range.
    pub fn probability(&self, s: Discrete, a: Discrete) -> Continous {
        self.probs[[s, a]]
    }

    /// # Panics
    ///
    /// If `s` is out of range.
    pub fn row(&self, s: Discrete) -> ArrayView1<'_, Continous> {
        self.probs.row(s)
    }

    pub fn as_array(&self) -> &Array2<Continous> {
        &self.probs
    }

    /// Most probable action of `s`, lowest index on ties.
    ///
    /// # Panics
    ///
    /// If `s` is out of range.
    pub fn greedy_action(&self, s: Discrete) -> Discrete {
        self.probs
            .row(s)
            .iter()
            .enumerate()
            .rev()
            .max_by(|x, y| x.1.total_cmp(y.1))
            .map(|(a, _)| a)
            .unwrap_or_default()
    }

    /// Plain nested rows, for consumers that draw the policy.
    pub fn to_rows(&self) -> Vec<Vec<Continous>> {
        self.probs
            .outer_iter()
            .map(|row| row.to_vec())
            .collect_vec()
    }
}

impl Policy<Discrete, Discrete> for PolicyMatrix {
    fn policy(&self, s: &Discrete) -> Discrete {
        self.greedy_action(*s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_eq::*;
    use ndarray::array;

    #[test]
    fn rows_must_be_distributions() {
        assert!(PolicyMatrix::from_array(array![[0.5, 0.5], [1., 0.]]).is_ok());
        assert!(PolicyMatrix::from_array(array![[0.5, 0.4], [1., 0.]]).is_err());
        assert!(PolicyMatrix::from_array(array![[1.5, -0.5]]).is_err());
    }

    #[test]
    fn uniform_rows_sum_to_one() {
        let pi = PolicyMatrix::uniform(3, 5);
        for s in 0..3 {
            assert_float_eq!(pi.row(s).sum(), 1., abs <= 1e-12);
        }
    }

    #[test]
    fn deterministic_policy_has_one_nonzero_per_row() {
        let pi = PolicyMatrix::deterministic(&[2, 0, 1], 3).unwrap();
        assert_eq!(pi.to_rows(), vec![vec![0., 0., 1.], vec![1., 0., 0.], vec![0., 1., 0.]]);
        assert_eq!(pi.policy(&0), 2);
        assert!(PolicyMatrix::deterministic(&[3], 3).is_err());
    }

    #[test]
    fn greedy_action_prefers_lowest_index_on_ties() {
        let pi = PolicyMatrix::uniform(1, 4);
        assert_eq!(pi.greedy_action(0), 0);
        let pi = PolicyMatrix::from_array(array![[0.1, 0.45, 0.45]]).unwrap();
        assert_eq!(pi.greedy_action(0), 1);
    }

    #[test]
    #[should_panic]
    fn greedy_action_panics_outside_the_state_space() {
        PolicyMatrix::uniform(2, 3).greedy_action(2);
    }

    #[test]
    #[should_panic]
    fn probability_panics_outside_the_action_space() {
        PolicyMatrix::uniform(2, 3).probability(0, 3);
    }
}
