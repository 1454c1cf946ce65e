//! Mesh-subsystem error type.

use thiserror::Error;

use nav_core::{CoreError, EdgeId, NodeId, ObstacleId};

/// Errors produced by `nav-mesh` while building, loading or querying a mesh.
#[derive(Debug, Error)]
pub enum MeshError {
    #[error("mesh has no vertices")]
    NoVertices,

    #[error("mesh has no nodes")]
    NoNodes,

    #[error("{what} index {index} out of range (count {count})")]
    IndexOutOfRange { what: &'static str, index: u32, count: usize },

    #[error("node {node} has {count} vertices; a polygon needs at least 3")]
    DegenerateNode { node: NodeId, count: usize },

    #[error("edge {0} is too narrow to cross")]
    DegenerateEdge(EdgeId),

    #[error("edge {0} does not connect two distinct nodes")]
    UnconnectedEdge(EdgeId),

    #[error("node {node} lists edge {edge}, which does not touch it")]
    EdgeNotIncident { node: NodeId, edge: EdgeId },

    #[error("obstacle {0} has zero length")]
    DegenerateObstacle(ObstacleId),

    #[error("duplicate node group {0:?}")]
    DuplicateGroup(String),

    #[error("node group {0:?} is empty")]
    EmptyGroup(String),

    #[error("node {0} not found in mesh")]
    NodeNotFound(NodeId),

    #[error("obstacle polyline has {0} vertices; at least 2 are required")]
    TooFewObstacleVertices(usize),

    #[error("open obstacle polylines are not supported by this obstacle set")]
    OpenObstacle,

    #[error("parse error at line {line}: {msg}")]
    Parse { line: usize, msg: String },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type MeshResult<T> = Result<T, MeshError>;
