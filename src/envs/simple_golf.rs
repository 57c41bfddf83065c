#[cfg(test)]
use crate::common::defs::*;
#[cfg(test)]
use crate::mdps::mdp::*;
#[cfg(test)]
use std::rc::Rc;

/// Three-state golf course: `0` far from the hole, `1` on the green, `2` in
/// the hole (no actions). Actions: `0` hit to the green, `1` hit to the fairway,
/// `2` hit in the hole.
///
/// https://towardsdatascience.com/reinforcement-learning-an-easy-introduction-to-value-iteration-e4cfe0731fd5
#[cfg(test)]
pub struct SimpleGolf {
    gamma: Continous,
    transitions: Rc<Transitions>,
}

#[cfg(test)]
impl SimpleGolf {
    pub fn new(gamma: Continous) -> Self {
        let t = |next_state, probability, reward, done| Transition {
            next_state,
            probability,
            reward,
            done,
        };
        let transitions = Transitions::from([
            ((0, 0), vec![t(1, 0.9, 0., false), t(0, 0.1, 0., false)]),
            ((1, 1), vec![t(0, 0.9, 0., false), t(1, 0.1, 0., false)]),
            ((1, 2), vec![t(2, 0.9, 10., true), t(1, 0.1, 0., false)]),
        ]);

        Self {
            gamma,
            transitions: Rc::new(transitions),
        }
    }
}

#[cfg(test)]
impl Mdp for SimpleGolf {
    fn n_s(&self) -> usize {
        3
    }

    fn n_a(&self) -> usize {
        3
    }

    fn transitions(&self) -> Rc<Transitions> {
        Rc::clone(&self.transitions)
    }

    fn gamma(&self) -> Continous {
        self.gamma
    }
}
