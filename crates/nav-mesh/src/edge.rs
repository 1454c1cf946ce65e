//! Mesh edges: the portal segment shared by two adjacent nodes.

use nav_core::{NodeId, Vec2, VertexId};

/// A portal between two nodes.
///
/// After `finalize`, `point` is the segment start (`p0`), `dir` the unit
/// direction toward `p1` and `width` the segment length.  The nodes are
/// ordered so that `nodes[0]`'s center lies to the right of `p0 → p1`: an
/// agent crossing from `nodes[0]` into `nodes[1]` sees `p0` on its left.
///
/// A boundary edge has `NodeId::INVALID` in `nodes[1]` and is never crossed.
#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
    pub vertices: [VertexId; 2],
    pub nodes:    [NodeId; 2],
    pub point:    Vec2,
    pub dir:      Vec2,
    pub width:    f32,
    /// Distance between the two node centers; the planner's traversal cost.
    pub distance: f32,
}

impl Edge {
    #[inline]
    pub fn p0(&self) -> Vec2 {
        self.point
    }

    #[inline]
    pub fn p1(&self) -> Vec2 {
        self.point + self.dir * self.width
    }

    /// `p0` pulled `inset` units toward `p1`.
    #[inline]
    pub fn p0_inset(&self, inset: f32) -> Vec2 {
        self.point + self.dir * inset
    }

    /// `p1` pulled `inset` units toward `p0`.
    #[inline]
    pub fn p1_inset(&self, inset: f32) -> Vec2 {
        self.point + self.dir * (self.width - inset)
    }

    #[inline]
    pub fn midpoint(&self) -> Vec2 {
        self.point + self.dir * (0.5 * self.width)
    }

    #[inline]
    pub fn is_boundary(&self) -> bool {
        !self.nodes[1].is_valid()
    }

    /// The node on the other side of the portal from `node`.
    ///
    /// `None` for boundary edges or if `node` is not incident.
    pub fn other(&self, node: NodeId) -> Option<NodeId> {
        let other = if self.nodes[0] == node {
            self.nodes[1]
        } else if self.nodes[1] == node {
            self.nodes[0]
        } else {
            return None;
        };
        other.is_valid().then_some(other)
    }

    #[inline]
    pub fn touches(&self, node: NodeId) -> bool {
        self.nodes[0] == node || self.nodes[1] == node
    }

    /// `true` when crossing from `from` puts `p0` on the agent's left.
    #[inline]
    pub fn p0_is_left_from(&self, from: NodeId) -> bool {
        self.nodes[0] == from
    }

    /// Squared distance from `p` to the portal segment.
    pub fn distance_sq(&self, p: Vec2) -> f32 {
        let t = (p - self.point).dot(self.dir).clamp(0.0, self.width);
        (self.point + self.dir * t).distance_squared(p)
    }
}
