/// Index of a state or an action in a finite space.
pub type Discrete = usize;

/// Rewards, probabilities and values.
pub type Continous = f64;

pub trait Policy<S, A> {
    fn policy(&self, s: &S) -> A;
}
