//! Per-agent location: a bare node or a corridor.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use nav_core::NodeId;
use nav_path::PortalPath;

/// A corridor handle shared between the location map and the thread
/// currently updating it.
pub type SharedPath = Arc<Mutex<PortalPath>>;

/// Lock a corridor, recovering the data from a poisoned lock.
pub fn lock_path(path: &SharedPath) -> MutexGuard<'_, PortalPath> {
    path.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A corridor together with the node the localizer has recorded for it.
///
/// `node` only changes when the localizer commits a tracking step, so it
/// always agrees with the occupancy index even while the corridor itself is
/// being updated behind its lock.
#[derive(Debug)]
pub struct Corridor {
    node: NodeId,
    path: SharedPath,
}

impl Corridor {
    pub fn new(path: PortalPath) -> Self {
        Self { node: path.node(), path: Arc::new(Mutex::new(path)) }
    }

    pub(crate) fn from_shared(path: SharedPath, node: NodeId) -> Self {
        Self { node, path }
    }

    #[inline]
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn shared(&self) -> &SharedPath {
        &self.path
    }

    /// `true` if this corridor is the one behind `path`.
    pub fn is(&self, path: &SharedPath) -> bool {
        Arc::ptr_eq(&self.path, path)
    }
}

/// Where an agent is on the mesh.
///
/// An agent is either tracked in a single node or follows a corridor, in
/// which case the corridor's recorded node is the agent's node.  Replacing
/// a `Path` location drops the corridor it owned.
#[derive(Debug)]
pub enum Location {
    /// `NodeId::INVALID` until the agent is first located.
    Node(NodeId),
    Path(Corridor),
}

impl Default for Location {
    fn default() -> Self {
        Location::Node(NodeId::INVALID)
    }
}

impl Location {
    pub fn path(path: PortalPath) -> Self {
        Location::Path(Corridor::new(path))
    }

    /// The node the agent is tracked in; `NodeId::INVALID` if never located.
    #[inline]
    pub fn node(&self) -> NodeId {
        match self {
            Location::Node(n) => *n,
            Location::Path(c) => c.node(),
        }
    }

    #[inline]
    pub fn is_path(&self) -> bool {
        matches!(self, Location::Path(_))
    }

    pub fn corridor(&self) -> Option<&Corridor> {
        match self {
            Location::Path(c) => Some(c),
            Location::Node(_) => None,
        }
    }

    /// Drop any corridor, keeping the agent in the node it was tracked in.
    pub fn clear_path(&mut self) {
        if self.is_path() {
            *self = Location::Node(self.node());
        }
    }
}
