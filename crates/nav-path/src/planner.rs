//! Planner trait and the default A* implementation.
//!
//! # Pluggability
//!
//! Corridors request routes through the [`Planner`] trait, so applications
//! can swap in hierarchical or precomputed planners without touching the
//! corridor code.  [`AStarPlanner`] searches the node adjacency graph with
//! straight-line distance between node centers as the heuristic.
//!
//! # Route cache
//!
//! Many agents share start and end nodes, so computed routes are cached by
//! `(start, end)`.  A cached route is reused for a request of width `w` when
//! its narrowest portal admits `w` and it was planned for a width at most
//! 5 % above `w` (a narrower agent may have a shorter route).

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap};
use std::sync::{Arc, PoisonError, RwLock};

use nav_core::{EdgeId, NodeId, Vec2};
use nav_mesh::{MeshError, NavMesh};

use crate::{PathError, PathResult, PortalRoute, WayPortal};

/// Relative slack when matching a cached route to a requested width.
const WIDTH_SLACK: f32 = 1.05;

// ── Planner trait ─────────────────────────────────────────────────────────────

/// Pluggable route planner.
///
/// # Thread safety
///
/// Implementations must be `Send + Sync`: agents are localized on rayon
/// worker threads and replan from there.
pub trait Planner: Send + Sync {
    /// A route from `start` to `end` whose portals are all wider than
    /// `min_width`.
    ///
    /// Returns [`PathError::NoRoute`] when the nodes are disconnected for
    /// that width.  `start == end` yields a route without portals.
    fn route(&self, start: NodeId, end: NodeId, min_width: f32) -> PathResult<Arc<PortalRoute>>;
}

// ── AStarPlanner ──────────────────────────────────────────────────────────────

struct CachedRoute {
    route:         Arc<PortalRoute>,
    /// Smallest width this route has been shown optimal for.
    best_smallest: f32,
}

/// A* over the node graph of one mesh, with a shared route cache.
pub struct AStarPlanner {
    mesh:  Arc<NavMesh>,
    cache: RwLock<HashMap<(NodeId, NodeId), Vec<CachedRoute>>>,
}

impl AStarPlanner {
    pub fn new(mesh: Arc<NavMesh>) -> Self {
        Self { mesh, cache: RwLock::new(HashMap::new()) }
    }

    pub fn mesh(&self) -> &Arc<NavMesh> {
        &self.mesh
    }

    /// Number of distinct routes held in the cache.
    pub fn cached_route_count(&self) -> usize {
        let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
        cache.values().map(Vec::len).sum()
    }

    pub fn clear_cache(&self) {
        self.cache.write().unwrap_or_else(PoisonError::into_inner).clear();
    }

    fn cached(&self, start: NodeId, end: NodeId, min_width: f32) -> Option<Arc<PortalRoute>> {
        let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
        cache
            .get(&(start, end))?
            .iter()
            .find(|c| c.route.admits(min_width) && c.best_smallest <= min_width * WIDTH_SLACK)
            .map(|c| Arc::clone(&c.route))
    }

    /// Store `route`, or return an equivalent route already cached (another
    /// thread may have computed it meanwhile).
    fn cache_route(&self, route: PortalRoute) -> Arc<PortalRoute> {
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        let list = cache.entry((route.start, route.end)).or_default();
        if let Some(existing) = list.iter_mut().find(|c| c.route.is_equivalent(&route)) {
            existing.best_smallest = existing.best_smallest.min(route.min_width);
            return Arc::clone(&existing.route);
        }
        let best_smallest = route.min_width;
        let route = Arc::new(route);
        list.push(CachedRoute { route: Arc::clone(&route), best_smallest });
        route
    }

    fn check_node(&self, node: NodeId) -> PathResult<()> {
        if node.index() < self.mesh.node_count() {
            Ok(())
        } else {
            Err(MeshError::NodeNotFound(node).into())
        }
    }
}

impl Planner for AStarPlanner {
    fn route(&self, start: NodeId, end: NodeId, min_width: f32) -> PathResult<Arc<PortalRoute>> {
        self.check_node(start)?;
        self.check_node(end)?;
        if let Some(route) = self.cached(start, end, min_width) {
            log::debug!("route cache hit {start} -> {end} (width {min_width})");
            return Ok(route);
        }
        let route = astar(&self.mesh, start, end, min_width)?;
        Ok(self.cache_route(route))
    }
}

// ── A* internals ──────────────────────────────────────────────────────────────

/// Open-set entry ordered by `f`, then node id for determinism.
#[derive(Copy, Clone, PartialEq)]
struct Open {
    f:    f32,
    node: NodeId,
}

impl Eq for Open {}

impl Ord for Open {
    fn cmp(&self, other: &Self) -> Ordering {
        self.f.total_cmp(&other.f).then(self.node.cmp(&other.node))
    }
}

impl PartialOrd for Open {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn astar(mesh: &NavMesh, start: NodeId, end: NodeId, min_width: f32) -> PathResult<PortalRoute> {
    if start == end {
        return Ok(PortalRoute::trivial(start, min_width));
    }

    let n = mesh.node_count();
    let goal: Vec2 = mesh.node(end).center;
    let h = |node: NodeId| mesh.node(node).center.distance(goal);

    let mut g = vec![f32::INFINITY; n];
    let mut reached_by = vec![EdgeId::INVALID; n];
    let mut closed = vec![false; n];

    g[start.index()] = 0.0;
    let mut heap: BinaryHeap<Reverse<Open>> = BinaryHeap::new();
    heap.push(Reverse(Open { f: h(start), node: start }));

    let mut found = false;
    while let Some(Reverse(Open { node: x, .. })) = heap.pop() {
        if closed[x.index()] {
            continue;
        }
        closed[x.index()] = true;
        if x == end {
            found = true;
            break;
        }
        for &e in &mesh.node(x).edges {
            let edge = mesh.edge(e);
            let Some(y) = edge.other(x) else { continue };
            if closed[y.index()] || edge.width <= min_width {
                continue;
            }
            let tentative = g[x.index()] + edge.distance;
            if tentative < g[y.index()] {
                g[y.index()] = tentative;
                reached_by[y.index()] = e;
                heap.push(Reverse(Open { f: tentative + h(y), node: y }));
            }
        }
    }

    if !found {
        return Err(PathError::NoRoute { from: start, to: end });
    }
    Ok(reconstruct(mesh, &reached_by, start, end, g[end.index()], min_width))
}

fn reconstruct(
    mesh: &NavMesh,
    reached_by: &[EdgeId],
    start: NodeId,
    end: NodeId,
    length: f32,
    min_width: f32,
) -> PortalRoute {
    let mut portals = Vec::new();
    let mut cur = end;
    while cur != start {
        let e = reached_by[cur.index()];
        let edge = mesh.edge(e);
        let Some(prev) = edge.other(cur) else { break };
        portals.push(WayPortal::new(edge, e, prev));
        cur = prev;
    }
    portals.reverse();
    let max_width = portals.iter().map(|p| p.width).fold(f32::INFINITY, f32::min);
    PortalRoute { start, end, portals, length, max_width, min_width }
}
