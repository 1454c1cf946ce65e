//! Mesh construction and finalization.
//!
//! The builder accepts raw vertices, nodes, edges and obstacles in any order.
//! [`finalize`](NavMeshBuilder::finalize) is the single mutation barrier: it
//! validates every cross-reference, derives the per-edge and per-obstacle
//! data the queries rely on, and hands back an immutable [`NavMesh`].
//! Consuming the builder makes querying an unfinalized mesh impossible.

use rstar::RTree;

use nav_core::{EPS, EdgeId, NodeId, ObstacleId, Vec2, VertexId, det, left_of};

use crate::mesh::NodeEntry;
use crate::{Bounds, Edge, MeshError, MeshResult, NavMesh, Node, NodeGroup, Obstacle};
use crate::obstacle::DEFAULT_CLASS;

struct RawEdge {
    vertices: [VertexId; 2],
    nodes:    [NodeId; 2],
}

struct RawObstacle {
    vertices: [VertexId; 2],
    node:     NodeId,
    next:     Option<ObstacleId>,
}

/// Construct a [`NavMesh`] incrementally, then call
/// [`finalize`](Self::finalize).
///
/// # Example
///
/// ```
/// use nav_core::{NodeId, Vec2, VertexId};
/// use nav_mesh::{NavMeshBuilder, Node, Plane};
///
/// let mut b = NavMeshBuilder::new();
/// let v: Vec<VertexId> = [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]
///     .into_iter()
///     .map(|(x, y)| b.add_vertex(Vec2::new(x, y)))
///     .collect();
/// b.add_group("floor", [Node::new(Vec2::new(5.0, 5.0), v, Plane::FLAT)]).unwrap();
/// let mesh = b.finalize().unwrap();
/// assert_eq!(mesh.node_count(), 1);
/// assert_eq!(mesh.find_node_blind(Vec2::new(2.0, 3.0), nav_mesh::HIGHEST), Some(NodeId(0)));
/// ```
#[derive(Default)]
pub struct NavMeshBuilder {
    vertices:  Vec<Vec2>,
    nodes:     Vec<Node>,
    edges:     Vec<RawEdge>,
    obstacles: Vec<RawObstacle>,
    groups:    Vec<NodeGroup>,
}

fn check_index(what: &'static str, index: u32, count: usize) -> MeshResult<()> {
    if (index as usize) < count {
        Ok(())
    } else {
        Err(MeshError::IndexOutOfRange { what, index, count })
    }
}

impl NavMeshBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Bulk setters ──────────────────────────────────────────────────────

    /// Resize the vertex array; new vertices start at the origin.
    pub fn set_vertex_count(&mut self, count: usize) {
        self.vertices.resize(count, Vec2::ZERO);
    }

    pub fn set_vertex(&mut self, id: VertexId, p: Vec2) -> MeshResult<()> {
        check_index("vertex", id.0, self.vertices.len())?;
        self.vertices[id.index()] = p;
        Ok(())
    }

    pub fn add_vertex(&mut self, p: Vec2) -> VertexId {
        let id = VertexId(self.vertices.len() as u32);
        self.vertices.push(p);
        id
    }

    /// Resize the node array with empty, ungrouped placeholder nodes to be
    /// filled through [`node_mut`](Self::node_mut).
    pub fn set_node_count(&mut self, count: usize) {
        self.nodes.resize(count, Node::new(Vec2::ZERO, Vec::new(), Default::default()));
    }

    pub fn node_mut(&mut self, id: NodeId) -> MeshResult<&mut Node> {
        self.nodes.get_mut(id.index()).ok_or(MeshError::NodeNotFound(id))
    }

    /// Append an ungrouped node.
    pub fn add_node(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Append `nodes` as a new named group covering the next id range.
    /// Returns the id of the group's first node.
    pub fn add_group(&mut self, name: &str, nodes: impl IntoIterator<Item = Node>) -> MeshResult<NodeId> {
        if self.groups.iter().any(|g| g.name == name) {
            return Err(MeshError::DuplicateGroup(name.to_owned()));
        }
        let first = self.nodes.len();
        self.nodes.extend(nodes);
        if self.nodes.len() == first {
            return Err(MeshError::EmptyGroup(name.to_owned()));
        }
        let group = NodeGroup::new(name, NodeId(first as u32), NodeId(self.nodes.len() as u32 - 1));
        self.groups.push(group);
        Ok(NodeId(first as u32))
    }

    /// Add a portal between `a` and `b`; pass `NodeId::INVALID` as `b` for
    /// a boundary edge.
    pub fn add_edge(&mut self, v0: VertexId, v1: VertexId, a: NodeId, b: NodeId) -> EdgeId {
        let id = EdgeId(self.edges.len() as u32);
        self.edges.push(RawEdge { vertices: [v0, v1], nodes: [a, b] });
        id
    }

    /// Add a boundary segment of `node`, optionally linked to the segment
    /// that follows it along the boundary.
    pub fn add_obstacle(&mut self, v0: VertexId, v1: VertexId, node: NodeId, next: Option<ObstacleId>) -> ObstacleId {
        let id = ObstacleId(self.obstacles.len() as u32);
        self.obstacles.push(RawObstacle { vertices: [v0, v1], node, next });
        id
    }

    pub fn vertex_count(&self) -> usize { self.vertices.len() }
    pub fn node_count(&self) -> usize { self.nodes.len() }

    // ── Finalize ──────────────────────────────────────────────────────────

    /// Validate and freeze the mesh.
    ///
    /// Fails if there are no vertices or nodes, if any index is out of
    /// range, if a polygon has fewer than three corners, or if an edge or
    /// obstacle is degenerate.  On success every edge knows its width,
    /// direction and traversal distance, node adjacency is complete,
    /// obstacle chains are doubly linked and the spatial index is built.
    pub fn finalize(self) -> MeshResult<NavMesh> {
        let NavMeshBuilder { vertices, mut nodes, edges: raw_edges, obstacles: raw_obstacles, groups } = self;
        let v_count = vertices.len();
        let n_count = nodes.len();
        if v_count == 0 {
            return Err(MeshError::NoVertices);
        }
        if n_count == 0 {
            return Err(MeshError::NoNodes);
        }

        // ── Nodes ─────────────────────────────────────────────────────────
        for (i, node) in nodes.iter_mut().enumerate() {
            if node.vertices.len() < 3 {
                return Err(MeshError::DegenerateNode { node: NodeId(i as u32), count: node.vertices.len() });
            }
            for v in &node.vertices {
                check_index("vertex", v.0, v_count)?;
            }
            for e in &node.edges {
                check_index("edge", e.0, raw_edges.len())?;
            }
            for o in &node.obstacles {
                check_index("obstacle", o.0, raw_obstacles.len())?;
            }
            node.bounds = Bounds::from_points(node.polygon(&vertices));
        }

        // ── Edges ─────────────────────────────────────────────────────────
        let mut edges = Vec::with_capacity(raw_edges.len());
        for (i, raw) in raw_edges.iter().enumerate() {
            let id = EdgeId(i as u32);
            check_index("vertex", raw.vertices[0].0, v_count)?;
            check_index("vertex", raw.vertices[1].0, v_count)?;
            let mut pair = raw.nodes;
            for n in pair.iter().filter(|n| n.is_valid()) {
                check_index("node", n.0, n_count)?;
            }
            if !pair[0].is_valid() {
                pair.swap(0, 1);
            }
            if !pair[0].is_valid() || pair[0] == pair[1] {
                return Err(MeshError::UnconnectedEdge(id));
            }

            let p0 = vertices[raw.vertices[0].index()];
            let p1 = vertices[raw.vertices[1].index()];
            let width = p0.distance(p1);
            if width <= EPS {
                return Err(MeshError::DegenerateEdge(id));
            }
            let dir = (p1 - p0) / width;

            let mut distance = 0.0;
            if pair[1].is_valid() {
                let c0 = nodes[pair[0].index()].center;
                let c1 = nodes[pair[1].index()].center;
                distance = c0.distance(c1);
                if det(dir, c0 - p0) > 0.0 {
                    pair.swap(0, 1);
                }
            }
            edges.push(Edge { vertices: raw.vertices, nodes: pair, point: p0, dir, width, distance });
        }

        for (i, node) in nodes.iter().enumerate() {
            let id = NodeId(i as u32);
            if let Some(&e) = node.edges.iter().find(|e| !edges[e.index()].touches(id)) {
                return Err(MeshError::EdgeNotIncident { node: id, edge: e });
            }
        }
        for (i, edge) in edges.iter().enumerate() {
            let id = EdgeId(i as u32);
            for n in edge.nodes.iter().filter(|n| n.is_valid()) {
                let listed = &mut nodes[n.index()].edges;
                if !listed.contains(&id) {
                    listed.push(id);
                }
            }
        }

        // ── Obstacles ─────────────────────────────────────────────────────
        let mut obstacles = Vec::with_capacity(raw_obstacles.len());
        for (i, raw) in raw_obstacles.iter().enumerate() {
            let id = ObstacleId(i as u32);
            check_index("vertex", raw.vertices[0].0, v_count)?;
            check_index("vertex", raw.vertices[1].0, v_count)?;
            if raw.node.is_valid() {
                check_index("node", raw.node.0, n_count)?;
            }
            if let Some(next) = raw.next {
                check_index("obstacle", next.0, raw_obstacles.len())?;
            }
            let p0 = vertices[raw.vertices[0].index()];
            let p1 = vertices[raw.vertices[1].index()];
            let mut o = Obstacle::segment(p0, p1, raw.node, DEFAULT_CLASS);
            if o.length <= EPS {
                return Err(MeshError::DegenerateObstacle(id));
            }
            o.next = raw.next;
            obstacles.push(o);
        }
        link_obstacles(&mut obstacles);
        for (i, o) in obstacles.iter().enumerate() {
            if o.node.is_valid() {
                let id = ObstacleId(i as u32);
                let listed = &mut nodes[o.node.index()].obstacles;
                if !listed.contains(&id) {
                    listed.push(id);
                }
            }
        }

        // ── Spatial index ─────────────────────────────────────────────────
        let entries: Vec<NodeEntry> = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| NodeEntry {
                min: n.bounds.min.to_array(),
                max: n.bounds.max.to_array(),
                id:  NodeId(i as u32),
            })
            .collect();
        let node_index = RTree::bulk_load(entries);

        let obstacle_vertices = raw_obstacles.iter().map(|o| o.vertices).collect();
        Ok(NavMesh { vertices, nodes, edges, obstacles, obstacle_vertices, groups, node_index })
    }
}

/// Derive `prev` links, closure and convexity from the `next` links.
fn link_obstacles(obstacles: &mut [Obstacle]) {
    for i in 0..obstacles.len() {
        if let Some(next) = obstacles[i].next {
            obstacles[next.index()].prev = Some(ObstacleId(i as u32));
        }
    }

    let count = obstacles.len();
    for i in 0..count {
        let mut cur = obstacles[i].next;
        let mut steps = 0;
        let closed = loop {
            match cur {
                Some(id) if id.index() == i => break true,
                Some(id) if steps < count => {
                    cur = obstacles[id.index()].next;
                    steps += 1;
                }
                _ => break false,
            }
        };
        obstacles[i].closed = closed;

        if let Some(prev) = obstacles[i].prev {
            let before = obstacles[prev.index()].p0();
            let o = &obstacles[i];
            let convex = left_of(before, o.p0(), o.p1()) >= 0.0;
            obstacles[i].convex = convex;
        }
    }
}
