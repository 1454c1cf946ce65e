//! Corridor-subsystem error type.

use thiserror::Error;

use nav_core::NodeId;
use nav_mesh::MeshError;

#[derive(Debug, Error)]
pub enum PathError {
    #[error("no route from node {from} to node {to}")]
    NoRoute { from: NodeId, to: NodeId },

    #[error("portal of length {length} cannot pass an agent of radius {radius}")]
    PortalTooNarrow { length: f32, radius: f32 },

    #[error(transparent)]
    Mesh(#[from] MeshError),
}

pub type PathResult<T> = Result<T, PathError>;
