//! Configuration of [`GridWorld`](super::grid_world::GridWorld).
use super::geometry::*;
use crate::common::defs::*;
use crate::error::{MdpError, Result};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Construction-time configuration of a grid world. Immutable once the
/// environment is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridWorldConfig {
    /// `(width, height)` in cells.
    pub env_size: (usize, usize),

    pub start_state: Coord,

    pub target_state: Coord,

    /// Cells that block movement and penalize the agent.
    pub forbidden_states: Vec<Coord>,

    /// Ordered action space, shared by all states.
    pub action_space: Vec<Action>,

    pub reward_target: Continous,

    /// Also paid for bumping into the grid boundary.
    pub reward_forbidden: Continous,

    pub reward_step: Continous,

    /// Discount factor used when the grid world is solved as an MDP.
    pub gamma: Continous,

    /// Standard deviation of the jitter added to rendered trajectory points.
    pub jitter_std: Continous,
}

impl GridWorldConfig {
    /// A `width` x `height` grid with start in the top-left corner, target in
    /// the bottom-right corner and no forbidden cells.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            env_size: (width, height),
            start_state: Coord::new(0, 0),
            target_state: Coord::new(width as i32 - 1, height as i32 - 1),
            forbidden_states: vec![],
            action_space: Action::standard(),
            reward_target: 1.,
            reward_forbidden: -1.,
            reward_step: 0.,
            gamma: 0.9,
            jitter_std: 0.03,
        }
    }

    pub fn start_state(mut self, c: impl Into<Coord>) -> Self {
        self.start_state = c.into();
        self
    }

    pub fn target_state(mut self, c: impl Into<Coord>) -> Self {
        self.target_state = c.into();
        self
    }

    pub fn forbidden_states<C: Into<Coord>>(mut self, cs: impl IntoIterator<Item = C>) -> Self {
        self.forbidden_states = cs.into_iter().map(Into::into).collect();
        self
    }

    pub fn action_space(mut self, actions: Vec<Action>) -> Self {
        self.action_space = actions;
        self
    }

    /// Sets target, forbidden and step rewards.
    pub fn rewards(mut self, target: Continous, forbidden: Continous, step: Continous) -> Self {
        self.reward_target = target;
        self.reward_forbidden = forbidden;
        self.reward_step = step;
        self
    }

    pub fn gamma(mut self, gamma: Continous) -> Self {
        self.gamma = gamma;
        self
    }

    pub fn jitter_std(mut self, std: Continous) -> Self {
        self.jitter_std = std;
        self
    }

    pub fn shape(&self) -> GridShape {
        GridShape::new(self.env_size.0, self.env_size.1)
    }

    /// Checks the configuration as a whole.
    pub fn validate(&self) -> Result<()> {
        let (width, height) = self.env_size;
        if width == 0 || height == 0 {
            return Err(MdpError::invalid(format!(
                "grid must have at least one cell, got {width}x{height}"
            )));
        }
        if width > i32::MAX as usize || height > i32::MAX as usize {
            return Err(MdpError::invalid("grid is too large"));
        }

        let shape = self.shape();
        let named = [("start", self.start_state), ("target", self.target_state)];
        for (name, c) in named
            .into_iter()
            .chain(self.forbidden_states.iter().map(|&c| ("forbidden", c)))
        {
            if !shape.contains(c) {
                return Err(MdpError::invalid(format!(
                    "{name} state {c:?} lies outside the {width}x{height} grid"
                )));
            }
        }
        if self.forbidden_states.contains(&self.target_state) {
            return Err(MdpError::invalid("target state is also forbidden"));
        }
        if self.forbidden_states.contains(&self.start_state) {
            return Err(MdpError::invalid("start state is forbidden"));
        }

        if self.action_space.is_empty() {
            return Err(MdpError::invalid("action space is empty"));
        }
        if !self.action_space.iter().all_unique() {
            return Err(MdpError::invalid(format!(
                "action space has duplicates: {:?}",
                self.action_space
            )));
        }

        let rewards = [self.reward_target, self.reward_forbidden, self.reward_step];
        if !rewards.iter().all(|r| r.is_finite()) {
            return Err(MdpError::invalid(format!("rewards must be finite: {rewards:?}")));
        }
        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(MdpError::invalid(format!(
                "gamma must be in [0, 1], got {}",
                self.gamma
            )));
        }
        if !(self.jitter_std.is_finite() && self.jitter_std >= 0.) {
            return Err(MdpError::invalid(format!(
                "jitter_std must be finite and non-negative, got {}",
                self.jitter_std
            )));
        }

        Ok(())
    }

    /// Constructs [`GridWorldConfig`] from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let c: Self = serde_json::from_reader(rdr)?;
        c.validate()?;
        Ok(c)
    }

    /// Saves [`GridWorldConfig`] as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_json::to_string_pretty(self)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempdir::TempDir;

    fn book_5x5() -> GridWorldConfig {
        GridWorldConfig::new(5, 5)
            .target_state((2, 3))
            .forbidden_states([(1, 1), (2, 1), (2, 2), (1, 3), (3, 3), (1, 4)])
    }

    #[test]
    fn builder_defaults_are_visible_on_the_object() {
        let c = GridWorldConfig::new(3, 2);
        assert_eq!(c.start_state, Coord::new(0, 0));
        assert_eq!(c.target_state, Coord::new(2, 1));
        assert_eq!(c.action_space.len(), 5);
        assert!(c.validate().is_ok());
    }

    #[rstest]
    #[case::empty_grid(GridWorldConfig::new(0, 3))]
    #[case::start_outside(GridWorldConfig::new(3, 3).start_state((3, 0)))]
    #[case::target_outside(GridWorldConfig::new(3, 3).target_state((0, -1)))]
    #[case::forbidden_outside(GridWorldConfig::new(3, 3).forbidden_states([(5, 5)]))]
    #[case::target_forbidden(GridWorldConfig::new(3, 3).forbidden_states([(2, 2)]))]
    #[case::start_forbidden(GridWorldConfig::new(3, 3).forbidden_states([(0, 0)]))]
    #[case::no_actions(GridWorldConfig::new(3, 3).action_space(vec![]))]
    #[case::duplicate_actions(GridWorldConfig::new(3, 3).action_space(vec![Action::UP, Action::UP]))]
    #[case::gamma_too_large(GridWorldConfig::new(3, 3).gamma(1.5))]
    #[case::gamma_negative(GridWorldConfig::new(3, 3).gamma(-0.1))]
    #[case::nan_reward(GridWorldConfig::new(3, 3).rewards(f64::NAN, -1., 0.))]
    #[case::negative_jitter(GridWorldConfig::new(3, 3).jitter_std(-1.))]
    fn malformed_configurations_are_rejected(#[case] c: GridWorldConfig) {
        assert!(matches!(c.validate(), Err(MdpError::InvalidParameter(_))));
    }

    #[test]
    fn gamma_of_one_is_permitted() {
        assert!(GridWorldConfig::new(2, 2).gamma(1.).validate().is_ok());
    }

    #[test]
    fn load_reads_what_save_wrote() {
        let dir = TempDir::new("gridworld_config").unwrap();
        let path = dir.path().join("config.json");
        let c = book_5x5().rewards(1., -10., -0.5);
        c.save(&path).unwrap();

        assert_eq!(GridWorldConfig::load(&path).unwrap(), c);
    }

    #[test]
    fn load_rejects_invalid_configuration() {
        let dir = TempDir::new("gridworld_config").unwrap();
        let path = dir.path().join("config.json");
        let mut c = book_5x5();
        c.forbidden_states.push(c.target_state);
        c.save(&path).unwrap();

        let err = GridWorldConfig::load(&path).unwrap_err();
        assert!(err.downcast_ref::<MdpError>().is_some());
    }
}
