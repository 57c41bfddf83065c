//! Grid-world Markov Decision Process sandbox.
//!
//! A deterministic grid world ([`envs::grid_world::GridWorld`]) and dynamic
//! programming solvers computing state values that satisfy the Bellman
//! equation, either for an explicit reward/transition model
//! ([`mdps::solvers::bellman`]) or optimally over an [`mdps::mdp::Mdp`]
//! ([`mdps::solvers::value_iteration`], [`mdps::solvers::policy_iteration`]).

pub mod common;
pub mod envs;
pub mod error;
pub mod mdps;
pub mod policy;

pub use common::defs::*;
pub use envs::{config::*, geometry::*, grid_world::*, noise::*};
pub use error::{MdpError, Result};
pub use mdps::{
    mdp::*,
    mdp_simulator::*,
    mdp_solver_policy::*,
    solvers::{
        bellman::*, common::greedy_policy, policy_iteration::*, value_iteration::*, MdpSolver,
    },
    tabular::*,
};
pub use policy::*;
