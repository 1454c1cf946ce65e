//! Neighbor queries over the occupancy index.
//!
//! Candidates come from the occupant sets of the querying agent's node and
//! of the nodes reachable from it through portals within range.  Agents
//! beyond the first node must also lie in the cone of sight through every
//! portal crossed to reach them, so an agent around a corner is not
//! reported.

use std::collections::VecDeque;

use nav_core::{AgentId, NodeId, Vec2, det};

use crate::{NavAgent, NavMeshLocalizer};

/// The wedge between two directions from the query point.
#[derive(Copy, Clone, Debug)]
struct Cone {
    right: Vec2,
    left:  Vec2,
}

impl Cone {
    /// The narrower wedge spanned by `a` and `b`.
    fn new(a: Vec2, b: Vec2) -> Self {
        if det(a, b) > 0.0 { Cone { right: a, left: b } } else { Cone { right: b, left: a } }
    }

    fn contains(&self, d: Vec2) -> bool {
        det(d, self.right) <= 0.0 && det(self.left, d) <= 0.0
    }

    /// Overlap of two cones, `None` when they only touch or are disjoint.
    fn intersect(&self, other: &Cone) -> Option<Cone> {
        let right = if det(self.right, other.right) > 0.0 { other.right } else { self.right };
        let left = if det(self.left, other.left) > 0.0 { self.left } else { other.left };
        (det(right, left) > 0.0).then_some(Cone { right, left })
    }
}

impl NavMeshLocalizer {
    /// Other agents within `range` of `agent`, nearest first, with their
    /// squared distance.
    ///
    /// `position_of` supplies current positions for occupants; occupants it
    /// returns `None` for are skipped.  Empty when `agent` is not located.
    pub fn agents_near(
        &self,
        agent: &impl NavAgent,
        range: f32,
        position_of: impl Fn(AgentId) -> Option<Vec2>,
    ) -> Vec<(AgentId, f32)> {
        let id = agent.id();
        let pt = agent.position();
        let range_sq = range * range;
        let mesh = self.mesh();
        let state = self.read();

        let start = state.node(id);
        if !start.is_valid() {
            return Vec::new();
        }

        let mut found = Vec::new();
        let mut collect = |node: NodeId, cone: Option<&Cone>| {
            for other in state.occupancy.iter(node) {
                if other == id {
                    continue;
                }
                let Some(pos) = position_of(other) else { continue };
                let d = pos - pt;
                let dist_sq = d.length_squared();
                if dist_sq <= range_sq && cone.is_none_or(|c| c.contains(d)) {
                    found.push((other, dist_sq));
                }
            }
        };
        collect(start, None);

        let mut visited = vec![false; mesh.node_count()];
        visited[start.index()] = true;
        let mut queue: VecDeque<(NodeId, Option<Cone>)> = VecDeque::new();
        queue.push_back((start, None));

        while let Some((node, cone)) = queue.pop_front() {
            if node != start {
                collect(node, cone.as_ref());
            }
            for &e in &mesh.node(node).edges {
                let edge = mesh.edge(e);
                let Some(next) = edge.other(node) else { continue };
                if visited[next.index()] {
                    continue;
                }
                visited[next.index()] = true;
                if edge.distance_sq(pt) > range_sq {
                    continue;
                }
                let through = Cone::new(edge.p0() - pt, edge.p1() - pt);
                let narrowed = match cone {
                    None => Some(through),
                    Some(c) => through.intersect(&c),
                };
                if let Some(c) = narrowed {
                    queue.push_back((next, Some(c)));
                }
            }
        }

        found.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        found
    }
}
