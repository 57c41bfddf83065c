use crate::envs::geometry::Action;
use std::fmt::Debug;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, MdpError>;

#[derive(Debug, Error, PartialEq)]
pub enum MdpError {
    #[error("Action {action:?} is not in the action space")]
    InvalidAction { action: Action },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Dimension mismatch for {what}: expected {expected}, found {found}")]
    DimensionMismatch {
        what: String,
        expected: String,
        found: String,
    },

    #[error("Episode has finished, call reset() before stepping again")]
    EpisodeFinished,
}

impl MdpError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }

    pub(crate) fn dims(what: &str, expected: impl Debug, found: impl Debug) -> Self {
        Self::DimensionMismatch {
            what: what.to_string(),
            expected: format!("{expected:?}"),
            found: format!("{found:?}"),
        }
    }
}
