//! Planned routes: the portal sequence between two nodes.

use nav_core::NodeId;

use crate::WayPortal;

/// An immutable route from `start` to `end`.
///
/// Routes are shared between every agent that follows them (`Arc`), so they
/// carry no per-agent state.  A route from a node to itself has no portals.
#[derive(Clone, Debug)]
pub struct PortalRoute {
    pub start:     NodeId,
    pub end:       NodeId,
    pub portals:   Vec<WayPortal>,
    /// Sum of the traversal distances of the crossed edges.
    pub length:    f32,
    /// Width of the narrowest portal; the widest agent the route admits is
    /// slightly narrower.  Infinite for a portal-free route.
    pub max_width: f32,
    /// Agent width the route was planned for.
    pub min_width: f32,
}

impl PortalRoute {
    /// A route that stays in `node`.
    pub fn trivial(node: NodeId, min_width: f32) -> Self {
        Self {
            start: node,
            end: node,
            portals: Vec::new(),
            length: 0.0,
            max_width: f32::INFINITY,
            min_width,
        }
    }

    pub fn portal_count(&self) -> usize {
        self.portals.len()
    }

    pub fn portal(&self, i: usize) -> Option<&WayPortal> {
        self.portals.get(i)
    }

    /// The node an agent occupies while heading for portal `i`; `end` once
    /// every portal is crossed.
    pub fn node_at(&self, i: usize) -> NodeId {
        self.portals.get(i).map_or(self.end, |p| p.node)
    }

    /// Every node on the route, `start` through `end`.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.portals.iter().map(|p| p.node).chain(std::iter::once(self.end))
    }

    /// `true` if both routes cross the same edges in the same order.
    pub fn is_equivalent(&self, other: &PortalRoute) -> bool {
        self.start == other.start
            && self.end == other.end
            && self.portals.len() == other.portals.len()
            && self.portals.iter().zip(&other.portals).all(|(a, b)| a.edge == b.edge)
    }

    /// `true` if an agent of width `width` fits through every portal.
    #[inline]
    pub fn admits(&self, width: f32) -> bool {
        self.max_width > width
    }
}
