//! The finalized navigation mesh.
//!
//! # Data layout
//!
//! Vertices, nodes, edges and obstacles are flat arrays indexed by their
//! typed ids.  Node groups are kept in file order, so their id ranges are
//! ascending and disjoint.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) over node bounding rectangles narrows blind point
//! location to the few nodes whose bounds contain the query point before the
//! exact polygon test runs.

use rstar::{AABB, RTree, RTreeObject};

use nav_core::{EdgeId, NodeId, ObstacleId, Vec2, VertexId};

use crate::obstacle::vertex_lists;
use crate::{Bounds, Edge, MeshError, MeshResult, Node, NodeGroup, Obstacle, ObstacleVertexList};

// ── R-tree node entry ─────────────────────────────────────────────────────────

/// Entry stored in the R-tree: a node's bounding rectangle and its id.
#[derive(Clone, Debug)]
pub(crate) struct NodeEntry {
    pub(crate) min: [f32; 2],
    pub(crate) max: [f32; 2],
    pub(crate) id:  NodeId,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f32; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.min, self.max)
    }
}

// ── NavMesh ───────────────────────────────────────────────────────────────────

/// A finalized, read-only navigation mesh.
///
/// Construct with [`NavMeshBuilder`](crate::NavMeshBuilder) or the
/// [`loader`](crate::loader).  Accessors taking an id panic on an
/// out-of-range id, like slice indexing; the `get_*` variants return
/// `Option` instead.
#[derive(Debug)]
pub struct NavMesh {
    pub(crate) vertices:   Vec<Vec2>,
    pub(crate) nodes:      Vec<Node>,
    pub(crate) edges:      Vec<Edge>,
    pub(crate) obstacles:  Vec<Obstacle>,
    /// Vertex ids each obstacle was built from, for serialization.
    pub(crate) obstacle_vertices: Vec<[VertexId; 2]>,
    pub(crate) groups:     Vec<NodeGroup>,
    pub(crate) node_index: RTree<NodeEntry>,
}

impl NavMesh {
    // ── Dimensions ────────────────────────────────────────────────────────

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn obstacle_count(&self) -> usize {
        self.obstacles.len()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    // ── Element access ────────────────────────────────────────────────────

    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    #[inline]
    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id.index()]
    }

    #[inline]
    pub fn obstacle(&self, id: ObstacleId) -> &Obstacle {
        &self.obstacles[id.index()]
    }

    /// Node ids in ascending order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + use<> {
        (0..self.nodes.len() as u32).map(NodeId)
    }

    // ── Node geometry ─────────────────────────────────────────────────────

    /// Elevation of `p` on the plane of `node`.
    pub fn elevation(&self, node: NodeId, p: Vec2) -> MeshResult<f32> {
        self.get_node(node)
            .map(|n| n.elevation(p))
            .ok_or(MeshError::NodeNotFound(node))
    }

    /// Ground-plane gradient of `node`'s plane.  Planes are linear, so the
    /// gradient is the same at every point of the node.
    pub fn gradient(&self, node: NodeId) -> MeshResult<Vec2> {
        self.get_node(node)
            .map(Node::gradient)
            .ok_or(MeshError::NodeNotFound(node))
    }

    /// Exact polygon containment for a single node.
    #[inline]
    pub fn node_contains(&self, node: NodeId, p: Vec2) -> bool {
        self.node(node).contains_point(&self.vertices, p)
    }

    /// Bounding rectangle of the whole mesh.
    pub fn bounds(&self) -> Bounds {
        self.nodes.iter().fold(Bounds::EMPTY, |acc, n| acc.union(&n.bounds))
    }

    // ── Topology ──────────────────────────────────────────────────────────

    /// Nodes sharing a crossable edge with `node`.
    pub fn neighbors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.node(node)
            .edges
            .iter()
            .filter_map(move |&e| self.edges[e.index()].other(node))
    }

    /// The edge shared by `a` and `b`, if they are adjacent.
    pub fn connecting_edge(&self, a: NodeId, b: NodeId) -> Option<EdgeId> {
        self.node(a)
            .edges
            .iter()
            .copied()
            .find(|&e| self.edges[e.index()].other(a) == Some(b))
    }

    // ── Groups ────────────────────────────────────────────────────────────

    pub fn groups(&self) -> &[NodeGroup] {
        &self.groups
    }

    /// The named group's id range, or `None` if no group has that name.
    pub fn node_group(&self, name: &str) -> Option<&NodeGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// The group containing `node`, if any.
    pub fn group_of(&self, node: NodeId) -> Option<&NodeGroup> {
        let i = self.groups.partition_point(|g| g.last < node);
        self.groups.get(i).filter(|g| g.contains(node))
    }

    // ── Obstacles ─────────────────────────────────────────────────────────

    /// Regroup the mesh boundary into polylines with their closed flag.
    pub fn obstacle_vertex_lists(&self) -> Vec<ObstacleVertexList> {
        vertex_lists(&self.obstacles)
    }

    /// Boundary segments of `node` within `range` of `p` that face it.
    /// Segments seen from behind are skipped.
    pub fn obstacles_near(&self, node: NodeId, p: Vec2, range: f32) -> impl Iterator<Item = ObstacleId> + '_ {
        let range_sq = range * range;
        self.node(node).obstacles.iter().copied().filter(move |&o| {
            let obstacle = &self.obstacles[o.index()];
            obstacle.point_outside(p) && obstacle.distance_sq(p) <= range_sq
        })
    }
}
