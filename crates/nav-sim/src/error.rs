use thiserror::Error;

use nav_core::{AgentId, Vec2};
use nav_localizer::LocalizerError;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error("{what} length {got} does not match agent count {expected}")]
    AgentCountMismatch {
        expected: usize,
        got:      usize,
        what:     &'static str,
    },

    #[error("agent {agent} starts off the mesh at {position}")]
    AgentOffMesh { agent: AgentId, position: Vec2 },

    #[error("agent {0} has no moving goal")]
    NoMovingGoal(AgentId),

    #[error(transparent)]
    Localizer(#[from] LocalizerError),
}

pub type SimResult<T> = Result<T, SimError>;
