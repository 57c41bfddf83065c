use super::config::GridWorldConfig;
use super::geometry::*;
use super::noise::*;
use crate::common::defs::*;
use crate::error::{MdpError, Result};
use crate::mdps::mdp::*;
use crate::policy::PolicyMatrix;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::rc::Rc;
use tracing::{info, trace};

/// Offset, in cells, of the interpolated trajectory point along the action.
const TRAJECTORY_LEAD: Continous = 0.2;

#[derive(Debug, Clone, PartialEq)]
pub struct StepInfo {
    pub observation: Coord,
    pub reward: Continous,
    pub terminated: bool,
    pub info: Value,
}

/// Read-only picture of an environment for an external visualizer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridSnapshot {
    pub width: usize,
    pub height: usize,
    pub agent: Coord,
    pub target: Coord,
    pub forbidden: Vec<Coord>,
    pub trajectory: Vec<(Continous, Continous)>,
    /// Action probabilities per state, in the order of the action space.
    pub policy: Option<Vec<Vec<Continous>>>,
    pub values: Option<Vec<Continous>>,
}

/// Deterministic grid world.
///
/// The agent moves by the displacement of the chosen action. Leaving the grid
/// or bumping into a forbidden cell costs `reward_forbidden`, reaching the
/// target pays `reward_target` and ends the episode, anything else pays
/// `reward_step`. Once the episode is done, [`GridWorld::step`] fails until the
/// next [`GridWorld::reset`].
///
/// As an [`Mdp`] every cell is a state (index `y * width + x`), including the
/// target, whose outgoing transitions follow the same rules.
pub struct GridWorld<N: NoiseSource = GaussianNoise> {
    config: GridWorldConfig,
    shape: GridShape,
    forbidden: HashSet<Coord>,
    transitions: Rc<Transitions>,
    noise: N,
    agent_state: Coord,
    traj: Vec<(Continous, Continous)>,
    done: bool,
    steps: usize,
}

impl GridWorld<GaussianNoise> {
    /// Trajectory jitter is Gaussian with `config.jitter_std`.
    pub fn new(config: GridWorldConfig, seed: Option<u64>) -> Result<Self> {
        let noise = GaussianNoise::new(config.jitter_std, seed)?;
        Self::with_noise(config, noise)
    }
}

impl<N: NoiseSource> GridWorld<N> {
    pub fn with_noise(config: GridWorldConfig, noise: N) -> Result<Self> {
        config.validate()?;

        let start = config.start_state;
        let mut env = Self {
            shape: config.shape(),
            forbidden: config.forbidden_states.iter().copied().collect(),
            transitions: Rc::new(Transitions::new()),
            noise,
            agent_state: start,
            traj: vec![to_point(start)],
            done: false,
            steps: 0,
            config,
        };
        env.transitions = Rc::new(env.build_transitions());
        env.done = env.is_target(start);
        info!(
            width = env.shape.width,
            height = env.shape.height,
            forbidden = env.forbidden.len(),
            actions = env.config.action_space.len(),
            "Created grid world"
        );

        Ok(env)
    }

    pub fn reset(&mut self) -> (Coord, Value) {
        self.agent_state = self.config.start_state;
        self.traj = vec![to_point(self.agent_state)];
        self.done = self.is_target(self.agent_state);
        self.steps = 0;

        (self.agent_state, json!({ "steps": self.steps }))
    }

    pub fn step(&mut self, action: &Action) -> Result<StepInfo> {
        if !self.config.action_space.contains(action) {
            return Err(MdpError::InvalidAction { action: *action });
        }
        if self.done {
            return Err(MdpError::EpisodeFinished);
        }

        let (next_state, reward) = self.next_state_and_reward(self.agent_state, *action);
        let terminated = self.is_target(next_state);

        let x = next_state.x as Continous + self.noise.sample();
        let y = next_state.y as Continous + self.noise.sample();
        let lead = (
            x + TRAJECTORY_LEAD * action.dx as Continous,
            y + TRAJECTORY_LEAD * action.dy as Continous,
        );

        trace!(from = ?self.agent_state, ?action, to = ?next_state, reward, terminated, "step");
        self.agent_state = next_state;
        self.traj.push(lead);
        self.traj.push(to_point(next_state));
        self.done = terminated;
        self.steps += 1;

        Ok(StepInfo {
            observation: next_state,
            reward,
            terminated,
            info: json!({ "steps": self.steps }),
        })
    }

    /// Successor cell and reward of taking `action` in `state`, first match
    /// wins: leaving the grid, reaching the target, hitting a forbidden cell,
    /// plain move.
    pub fn next_state_and_reward(&self, state: Coord, action: Action) -> (Coord, Continous) {
        let candidate = state + action;
        if !self.shape.contains(candidate) {
            (self.shape.clamp(candidate), self.config.reward_forbidden)
        } else if self.is_target(candidate) {
            (candidate, self.config.reward_target)
        } else if self.forbidden.contains(&candidate) {
            (state, self.config.reward_forbidden)
        } else {
            (candidate, self.config.reward_step)
        }
    }

    fn build_transitions(&self) -> Transitions {
        let mut transitions = Transitions::new();
        for (s, c) in self.shape.coords().enumerate() {
            for (a, &action) in self.config.action_space.iter().enumerate() {
                let (next, reward) = self.next_state_and_reward(c, action);
                let Some(next_state) = self.shape.index_of(next) else {
                    continue;
                };
                transitions.insert(
                    (s, a),
                    vec![Transition {
                        next_state,
                        probability: 1.,
                        reward,
                        done: self.is_target(next),
                    }],
                );
            }
        }

        transitions
    }

    fn is_target(&self, c: Coord) -> bool {
        c == self.config.target_state
    }

    pub fn config(&self) -> &GridWorldConfig {
        &self.config
    }

    pub fn shape(&self) -> GridShape {
        self.shape
    }

    pub fn agent_state(&self) -> Coord {
        self.agent_state
    }

    /// Start cell, then for every step a jittered lead point and the exact cell.
    pub fn trajectory(&self) -> &[(Continous, Continous)] {
        &self.traj
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn num_states(&self) -> usize {
        self.shape.n_cells()
    }

    pub fn num_actions(&self) -> usize {
        self.config.action_space.len()
    }

    pub fn action_space(&self) -> &[Action] {
        &self.config.action_space
    }

    pub fn action_index(&self, action: &Action) -> Option<Discrete> {
        self.config.action_space.iter().position(|a| a == action)
    }

    pub fn index_of(&self, c: Coord) -> Option<Discrete> {
        self.shape.index_of(c)
    }

    pub fn coord_of(&self, s: Discrete) -> Option<Coord> {
        self.shape.coord_of(s)
    }

    pub fn snapshot(
        &self,
        policy: Option<&PolicyMatrix>,
        values: Option<&[Continous]>,
    ) -> Result<GridSnapshot> {
        let (n_s, n_a) = (self.n_s(), self.n_a());
        if let Some(pi) = policy {
            if (pi.n_s(), pi.n_a()) != (n_s, n_a) {
                return Err(MdpError::dims("policy matrix", (n_s, n_a), (pi.n_s(), pi.n_a())));
            }
        }
        if let Some(v) = values {
            if v.len() != n_s {
                return Err(MdpError::dims("value vector", n_s, v.len()));
            }
        }

        Ok(GridSnapshot {
            width: self.shape.width,
            height: self.shape.height,
            agent: self.agent_state,
            target: self.config.target_state,
            forbidden: self.config.forbidden_states.clone(),
            trajectory: self.traj.clone(),
            policy: policy.map(PolicyMatrix::to_rows),
            values: values.map(<[Continous]>::to_vec),
        })
    }
}

impl<N: NoiseSource> Mdp for GridWorld<N> {
    fn n_s(&self) -> usize {
        self.num_states()
    }

    fn n_a(&self) -> usize {
        self.num_actions()
    }

    fn transitions(&self) -> Rc<Transitions> {
        Rc::clone(&self.transitions)
    }

    fn gamma(&self) -> Continous {
        self.config.gamma
    }
}

fn to_point(c: Coord) -> (Continous, Continous) {
    (c.x as Continous, c.y as Continous)
}
