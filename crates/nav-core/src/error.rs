//! Workspace base error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` as one
//! variant via `#[from]`.

use std::path::PathBuf;

use thiserror::Error;

use crate::{AgentId, NodeId};

/// The error type for `nav-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("agent {0} not found")]
    AgentNotFound(AgentId),

    #[error("node {0} not found")]
    NodeNotFound(NodeId),

    #[error("resource {} is already registered as another type under label {label:?}", path.display())]
    ResourceType { path: PathBuf, label: &'static str },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for `nav-core`.
pub type CoreResult<T> = Result<T, CoreError>;
