//! Point location: which node contains a point.
//!
//! Three strategies, cheapest last:
//!
//! - **blind**: every node whose bounds contain the point (via the R-tree)
//!   gets the exact polygon test;
//! - **group-scoped**: the same, limited to one named group's id range,
//!   optionally falling back to blind search;
//! - **neighbor**: only the nodes adjacent to a known node.  Agents move a
//!   short distance per step, so this almost always succeeds.
//!
//! When several nodes contain the point (a walkway above a floor), the one
//! whose elevation at the point is closest to a target elevation wins.
//! [`HIGHEST`] as the target picks the topmost node.  Ties go to the lower
//! node id so every query is deterministic.

use rstar::AABB;

use nav_core::{NodeId, Vec2};

use crate::NavMesh;

/// Target elevation that selects the highest of overlapping nodes.
pub const HIGHEST: f32 = f32::INFINITY;

/// `true` if elevation `cand` is a strictly better match for `target` than
/// `best`.
fn closer(cand: f32, best: f32, target: f32) -> bool {
    if target == f32::INFINITY {
        cand > best
    } else if target == f32::NEG_INFINITY {
        cand < best
    } else {
        (cand - target).abs() < (best - target).abs()
    }
}

impl NavMesh {
    /// Pick the best of several containing nodes for `target` elevation.
    fn best_by_elevation(&self, p: Vec2, target: f32, candidates: impl Iterator<Item = NodeId>) -> Option<NodeId> {
        let mut best: Option<(NodeId, f32)> = None;
        for id in candidates {
            let elev = self.node(id).elevation(p);
            best = match best {
                None => Some((id, elev)),
                Some((b, be)) if closer(elev, be, target) || (elev == be && id < b) => Some((id, elev)),
                keep => keep,
            };
        }
        best.map(|(id, _)| id)
    }

    /// Search the whole mesh for the node containing `p`.
    ///
    /// Returns `None` when the point lies on no node.
    pub fn find_node_blind(&self, p: Vec2, target_elevation: f32) -> Option<NodeId> {
        let envelope = AABB::from_point(p.to_array());
        let hits = self
            .node_index
            .locate_in_envelope_intersecting(&envelope)
            .map(|e| e.id)
            .filter(|&id| self.node_contains(id, p));
        self.best_by_elevation(p, target_elevation, hits)
    }

    /// Search only the nodes of the named group, breaking ties between
    /// overlapping nodes toward `target_elevation` as the blind search does.
    ///
    /// On a miss (or an unknown group name) falls back to
    /// [`find_node_blind`](Self::find_node_blind) when `search_all` is set.
    pub fn find_node_in_group(&self, p: Vec2, group: &str, target_elevation: f32, search_all: bool) -> Option<NodeId> {
        let found = self.node_group(group).and_then(|g| {
            let hits = g.ids().filter(|&id| self.node_bounds_contain(id, p) && self.node_contains(id, p));
            self.best_by_elevation(p, target_elevation, hits)
        });
        match found {
            Some(id) => Some(id),
            None if search_all => self.find_node_blind(p, target_elevation),
            None => None,
        }
    }

    /// Test only the nodes adjacent to `node`.
    pub fn test_neighbors(&self, node: NodeId, p: Vec2) -> Option<NodeId> {
        let elev = self.node(node).elevation(p);
        let hits = self.neighbors(node).filter(|&n| self.node_contains(n, p));
        self.best_by_elevation(p, elev, hits)
    }

    /// `node` itself if it contains `p`, otherwise one of its neighbors.
    pub fn find_node_near(&self, node: NodeId, p: Vec2) -> Option<NodeId> {
        if self.node_contains(node, p) {
            Some(node)
        } else {
            self.test_neighbors(node, p)
        }
    }

    /// Incremental location: neighbor search from `hint` when given, then a
    /// blind search using the hint's elevation (or `target_elevation`
    /// without a hint) as the tie-breaker.
    pub fn locate(&self, p: Vec2, hint: Option<NodeId>, target_elevation: f32) -> Option<NodeId> {
        match hint {
            Some(h) => self
                .find_node_near(h, p)
                .or_else(|| self.find_node_blind(p, self.node(h).elevation(p))),
            None => self.find_node_blind(p, target_elevation),
        }
    }

    #[inline]
    fn node_bounds_contain(&self, node: NodeId, p: Vec2) -> bool {
        self.node(node).bounds.contains(p)
    }
}
