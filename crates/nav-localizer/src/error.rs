use thiserror::Error;

use nav_core::{AgentId, CoreError, Vec2};
use nav_mesh::MeshError;
use nav_path::PathError;

#[derive(Debug, Error)]
pub enum LocalizerError {
    #[error("agent {0} has no location on the mesh")]
    NotLocated(AgentId),

    #[error("agent {0} is not following a corridor")]
    NoPath(AgentId),

    #[error("goal {0} is not on the mesh")]
    GoalOffMesh(Vec2),

    #[error(transparent)]
    Path(#[from] PathError),

    #[error(transparent)]
    Mesh(#[from] MeshError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type LocalizerResult<T> = Result<T, LocalizerError>;
