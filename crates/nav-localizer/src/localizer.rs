//! `NavMeshLocalizer`: tracks which node every agent is in.
//!
//! # Locking
//!
//! The location map and the occupancy index live behind one `RwLock`, so a
//! reader never sees an agent in two nodes or in a node other than its
//! tracked one.  Queries take the read lock; only changes of location take
//! the write lock.
//!
//! Each corridor sits behind its own `Mutex` and stays in the map while it is
//! updated, so readers always see a path agent as a path agent.  Corridor
//! geometry (tracking, replanning, funnel updates) runs under that mutex
//! only; the write lock is taken afterwards, and only if the agent changed
//! node or lost its corridor.
//!
//! Lock order is corridor, then map.  Nothing locks a corridor while holding
//! the map lock.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use nav_core::{AgentId, NodeId, Vec2};
use nav_mesh::{HIGHEST, MeshError, NavMesh};
use nav_path::{AStarPlanner, Goal, PathUpdate, Planner, PortalPath, PortalRoute, Steering};

use crate::location::{Corridor, SharedPath, lock_path};
use crate::{LocalizerError, LocalizerResult, Location, NavAgent, OccupancyIndex};

#[cfg(feature = "fx-hash")]
type LocationMap = rustc_hash::FxHashMap<AgentId, Location>;
#[cfg(not(feature = "fx-hash"))]
type LocationMap = std::collections::HashMap<AgentId, Location>;

pub(crate) struct Tracking {
    pub(crate) locations: LocationMap,
    pub(crate) occupancy: OccupancyIndex,
}

impl Tracking {
    pub(crate) fn node(&self, agent: AgentId) -> NodeId {
        self.locations.get(&agent).map_or(NodeId::INVALID, Location::node)
    }

    /// Replace `agent`'s location and move it between occupant sets.
    fn place(&mut self, agent: AgentId, loc: Location) {
        let old = self.node(agent);
        self.occupancy.relocate(agent, old, loc.node());
        self.locations.insert(agent, loc);
    }

    /// `true` if `agent` still follows the corridor behind `path`.
    fn follows(&self, agent: AgentId, path: &SharedPath) -> bool {
        self.locations
            .get(&agent)
            .and_then(Location::corridor)
            .is_some_and(|c| c.is(path))
    }
}

/// Agent locations and node occupancy over one shared mesh.
pub struct NavMeshLocalizer {
    mesh:      Arc<NavMesh>,
    planner:   OnceLock<Arc<dyn Planner>>,
    track_all: AtomicBool,
    state:     RwLock<Tracking>,
}

impl fmt::Debug for NavMeshLocalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavMeshLocalizer")
            .field("nodes", &self.mesh.node_count())
            .field("agents", &self.agent_count())
            .field("has_planner", &self.planner.get().is_some())
            .field("track_all", &self.track_all())
            .finish()
    }
}

impl NavMeshLocalizer {
    pub fn new(mesh: Arc<NavMesh>) -> Self {
        Self::with_lock(mesh, OnceLock::new())
    }

    pub fn with_planner(mesh: Arc<NavMesh>, planner: Arc<dyn Planner>) -> Self {
        Self::with_lock(mesh, OnceLock::from(planner))
    }

    fn with_lock(mesh: Arc<NavMesh>, planner: OnceLock<Arc<dyn Planner>>) -> Self {
        let occupancy = OccupancyIndex::new(mesh.node_count());
        Self {
            mesh,
            planner,
            track_all: AtomicBool::new(false),
            state: RwLock::new(Tracking { locations: LocationMap::default(), occupancy }),
        }
    }

    pub fn mesh(&self) -> &Arc<NavMesh> {
        &self.mesh
    }

    pub fn planner(&self) -> Option<&Arc<dyn Planner>> {
        self.planner.get()
    }

    /// Attach `planner`.  Returns `false` if one is already attached.
    pub fn set_planner(&self, planner: Arc<dyn Planner>) -> bool {
        self.planner.set(planner).is_ok()
    }

    /// The attached planner, attaching an [`AStarPlanner`] over this mesh on
    /// first use.
    pub fn ensure_planner(&self) -> &Arc<dyn Planner> {
        self.planner.get_or_init(|| Arc::new(AStarPlanner::new(Arc::clone(&self.mesh))))
    }

    pub fn track_all(&self) -> bool {
        self.track_all.load(Ordering::Relaxed)
    }

    /// Re-localize agents without a corridor on every
    /// [`update_location`](Self::update_location) call, not only when forced.
    pub fn set_track_all(&self, on: bool) {
        self.track_all.store(on, Ordering::Relaxed);
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, Tracking> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tracking> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// `agent`'s corridor handle and recorded node.  The map lock is released
    /// before returning, so the caller may lock the corridor.
    fn corridor_of(&self, agent: AgentId) -> Option<(NodeId, SharedPath)> {
        let state = self.read();
        let corridor = state.locations.get(&agent)?.corridor()?;
        Some((corridor.node(), Arc::clone(corridor.shared())))
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// The node `agent` is tracked in, or `None` if it was never located.
    pub fn node_of(&self, agent: AgentId) -> Option<NodeId> {
        let node = self.read().node(agent);
        node.is_valid().then_some(node)
    }

    pub fn has_path(&self, agent: AgentId) -> bool {
        self.read().locations.get(&agent).is_some_and(Location::is_path)
    }

    /// The route `agent`'s corridor follows.
    pub fn route_of(&self, agent: AgentId) -> Option<Arc<PortalRoute>> {
        let (_, shared) = self.corridor_of(agent)?;
        let path = lock_path(&shared);
        Some(Arc::clone(path.route()))
    }

    /// Number of agents with a location entry.
    pub fn agent_count(&self) -> usize {
        self.read().locations.len()
    }

    /// Number of agents following a corridor.
    pub fn path_agent_count(&self) -> usize {
        self.read().locations.values().filter(|l| l.is_path()).count()
    }

    /// Highest node containing `p`.
    pub fn find_node(&self, p: Vec2) -> Option<NodeId> {
        self.mesh.find_node_blind(p, HIGHEST)
    }

    pub fn find_node_in_group(&self, p: Vec2, group: &str, search_all: bool) -> Option<NodeId> {
        self.mesh.find_node_in_group(p, group, HIGHEST, search_all)
    }

    /// Agents currently in `node`, sorted by id.
    pub fn node_occupants(&self, node: NodeId) -> Vec<AgentId> {
        self.read().occupancy.occupants(node)
    }

    pub fn occupant_count(&self, node: NodeId) -> usize {
        self.read().occupancy.count(node)
    }

    /// Elevation of the agent on its tracked node.
    pub fn elevation(&self, agent: &impl NavAgent) -> Option<f32> {
        let node = self.node_of(agent.id())?;
        self.mesh.elevation(node, agent.position()).ok()
    }

    /// Ground gradient of the agent's tracked node.
    pub fn gradient(&self, agent: &impl NavAgent) -> Option<Vec2> {
        let node = self.node_of(agent.id())?;
        self.mesh.gradient(node).ok()
    }

    /// `true` if every located agent is an occupant of exactly its tracked
    /// node and no other agent is an occupant anywhere.
    pub fn occupancy_consistent(&self) -> bool {
        let state = self.read();
        let located = state.locations.values().filter(|l| l.node().is_valid()).count();
        located == state.occupancy.total()
            && state
                .occupancy
                .assignments()
                .all(|(agent, node)| state.node(agent) == node)
    }

    // ── Direct mutation ───────────────────────────────────────────────────

    /// Put `agent` in `node`, dropping any corridor.  `NodeId::INVALID`
    /// un-locates the agent.
    pub fn set_node(&self, agent: AgentId, node: NodeId) -> LocalizerResult<()> {
        if node.is_valid() && self.mesh.get_node(node).is_none() {
            return Err(MeshError::NodeNotFound(node).into());
        }
        self.write().place(agent, Location::Node(node));
        Ok(())
    }

    /// Make `agent` follow `path`, replacing any corridor it had.  Fails if
    /// the corridor's current node is not a node of this mesh.
    pub fn set_path(&self, agent: AgentId, path: PortalPath) -> LocalizerResult<()> {
        let node = path.node();
        if self.mesh.get_node(node).is_none() {
            return Err(MeshError::NodeNotFound(node).into());
        }
        self.write().place(agent, Location::path(path));
        Ok(())
    }

    /// Drop `agent`'s corridor, leaving it in its current node.  Returns
    /// `false` if it had none.
    pub fn clear_path(&self, agent: AgentId) -> bool {
        let mut state = self.write();
        match state.locations.get_mut(&agent) {
            Some(loc) if loc.is_path() => {
                loc.clear_path();
                true
            }
            _ => false,
        }
    }

    /// Forget `agent` entirely.  Returns the node it was in.
    pub fn remove_agent(&self, agent: AgentId) -> Option<NodeId> {
        let mut state = self.write();
        let loc = state.locations.remove(&agent)?;
        let node = loc.node();
        state.occupancy.relocate(agent, node, NodeId::INVALID);
        node.is_valid().then_some(node)
    }

    /// Move a bare agent from `expected` to `node`, unless its location
    /// changed since it was read.  Returns the node the agent ends up in.
    fn commit_node(&self, agent: AgentId, expected: NodeId, node: NodeId) -> NodeId {
        let mut state = self.write();
        let (is_path, current) = state
            .locations
            .get(&agent)
            .map_or((false, NodeId::INVALID), |l| (l.is_path(), l.node()));
        if is_path || current != expected {
            log::debug!("location of agent {agent} changed during update; keeping {current}");
            return current;
        }
        state.place(agent, Location::Node(node));
        node
    }

    /// Store `loc` for `agent` if it still follows `path`.  Called with the
    /// corridor locked.  Returns the node the agent ends up in.
    fn commit_corridor(&self, agent: AgentId, path: &SharedPath, loc: Location) -> NodeId {
        let mut state = self.write();
        if !state.follows(agent, path) {
            let current = state.node(agent);
            log::debug!("corridor of agent {agent} was replaced during update; keeping {current}");
            return current;
        }
        let node = loc.node();
        state.place(agent, loc);
        node
    }

    // ── Per-step tracking ─────────────────────────────────────────────────

    /// Re-localize `agent` at its current position.
    ///
    /// Agents following a corridor are always updated, through the
    /// corridor.  Other agents are only updated when `force` is set or
    /// track-all is on; otherwise their tracked node is returned unchanged.
    ///
    /// The search tries the tracked node, then its neighbors, then the whole
    /// mesh.  Returns `None` when the agent is off the mesh; it then stays an
    /// occupant of its last node.
    pub fn update_location(&self, agent: &impl NavAgent, force: bool) -> Option<NodeId> {
        if let Some((_, shared)) = self.corridor_of(agent.id()) {
            return self.track_corridor(agent, &shared);
        }

        let id = agent.id();
        let old = self.read().node(id);
        if !(force || self.track_all()) {
            return old.is_valid().then_some(old);
        }
        let new = self.mesh.locate(agent.position(), old.is_valid().then_some(old), HIGHEST)?;
        if new == old {
            return Some(new);
        }
        let node = self.commit_node(id, old, new);
        node.is_valid().then_some(node)
    }

    fn track_corridor(&self, agent: &impl NavAgent, shared: &SharedPath) -> Option<NodeId> {
        let id = agent.id();
        let pos = agent.position();
        let mut path = lock_path(shared);
        let before = path.node();
        let planner = self.ensure_planner();

        match path.update_location(pos, agent.radius(), &self.mesh, planner.as_ref()) {
            Ok(None) => None,
            Ok(Some(_)) if path.node() == before => Some(before),
            Ok(Some(_)) => {
                let loc = Location::Path(Corridor::from_shared(Arc::clone(shared), path.node()));
                let node = self.commit_corridor(id, shared, loc);
                node.is_valid().then_some(node)
            }
            Err(e) => {
                log::warn!("agent {id} dropped its corridor: {e}");
                let found = self.mesh.locate(pos, Some(before), HIGHEST);
                let node = self.commit_corridor(id, shared, Location::Node(found.unwrap_or(before)));
                found.map(|_| node).filter(|n| n.is_valid())
            }
        }
    }

    // ── Corridors ─────────────────────────────────────────────────────────

    /// Plan a corridor from the agent's node to `goal`.
    ///
    /// Returns `true` when the agent now follows a corridor and `false` when
    /// the goal lies in the agent's own node (no corridor is needed).
    pub fn plan_path(&self, agent: &impl NavAgent, goal: Goal) -> LocalizerResult<bool> {
        let id = agent.id();
        let start = match self.node_of(id) {
            Some(node) => node,
            None => self.update_location(agent, true).ok_or(LocalizerError::NotLocated(id))?,
        };
        let goal_node = self
            .mesh
            .find_node_blind(goal.position, HIGHEST)
            .ok_or(LocalizerError::GoalOffMesh(goal.position))?;
        if goal_node == start {
            self.set_node(id, start)?;
            return Ok(false);
        }
        let planner = self.ensure_planner();
        let path = PortalPath::plan(agent.position(), start, goal, goal_node, agent.radius(), planner.as_ref())?;
        log::debug!("agent {id} planned {start} -> {goal_node} through {} portals", path.portal_count());
        self.set_path(id, path)?;
        Ok(true)
    }

    /// Retarget `agent`'s corridor at a goal that moved to `goal_pos`.
    ///
    /// An unchanged goal leaves the corridor and its route untouched.  When
    /// the goal becomes unreachable the corridor is dropped and the agent
    /// stays in its current node.
    pub fn update_path_for_goal(&self, agent: &impl NavAgent, goal_pos: Vec2) -> LocalizerResult<PathUpdate> {
        let id = agent.id();
        let (recorded, shared) = self.corridor_of(id).ok_or(LocalizerError::NoPath(id))?;
        let mut path = lock_path(&shared);
        let planner = self.ensure_planner();
        let result = path.update_goal(agent.position(), agent.radius(), goal_pos, &self.mesh, planner.as_ref());
        match result {
            Ok(PathUpdate::Unreachable) => {
                log::debug!("goal of agent {id} at {goal_pos} is unreachable; corridor dropped");
                self.commit_corridor(id, &shared, Location::Node(path.node()));
            }
            _ if path.node() != recorded => {
                let loc = Location::Path(Corridor::from_shared(Arc::clone(&shared), path.node()));
                self.commit_corridor(id, &shared, loc);
            }
            _ => {}
        }
        Ok(result?)
    }

    /// Nearest clearable point of the agent's next portal, or its goal once
    /// every portal is crossed.  `None` without a corridor.
    pub fn corridor_target(&self, agent: &impl NavAgent) -> LocalizerResult<Option<Vec2>> {
        let Some((_, shared)) = self.corridor_of(agent.id()) else {
            return Ok(None);
        };
        let path = lock_path(&shared);
        Ok(Some(path.target_point(agent.position(), agent.radius())?))
    }

    /// Funnel steering along the agent's corridor.  `None` without one.
    pub fn preferred_direction(&self, agent: &impl NavAgent, heading_cos: f32) -> Option<Steering> {
        let (_, shared) = self.corridor_of(agent.id())?;
        let mut path = lock_path(&shared);
        Some(path.preferred_direction(agent.position(), agent.radius(), heading_cos))
    }
}
