use super::solvers::MdpSolver;
use crate::common::defs::*;
use std::rc::Rc;

/// Acts with the solver's greedy action; `None` where no action is available.
pub struct MdpSolverPolicy<T> {
    pub mdp_solver: Rc<dyn MdpSolver<T>>,
}

impl<T> Policy<Discrete, Option<Discrete>> for MdpSolverPolicy<T> {
    fn policy(&self, s: &Discrete) -> Option<Discrete> {
        self.mdp_solver.pi_star(*s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envs::simple_golf::*;
    use crate::mdps::solvers::value_iteration::ValueIteration;

    #[test]
    fn follows_the_solved_policy() {
        let vi = &mut ValueIteration::new(Rc::new(SimpleGolf::new(0.9)));
        vi.exec(1e-8, None).unwrap();
        let policy = MdpSolverPolicy {
            mdp_solver: Rc::new(vi.clone()) as Rc<dyn MdpSolver<Continous>>,
        };

        assert_eq!(policy.policy(&0), Some(0));
        assert_eq!(policy.policy(&1), Some(2));
        assert_eq!(policy.policy(&2), None);
    }
}
