//! Obstacle segments and obstacle sets.
//!
//! Obstacles are stored in an arena (`Vec<Obstacle>`) and linked to their
//! neighbors along a polyline by index.  A polyline is closed when following
//! `next` returns to the starting segment.

use nav_core::{EPS, NodeId, ObstacleId, Vec2, left_of};

use crate::{MeshError, MeshResult, NavMesh};

/// Class mask assigned to obstacles when the caller does not specify one.
pub const DEFAULT_CLASS: u32 = 1;

// ── Obstacle ──────────────────────────────────────────────────────────────────

/// One directed boundary segment `p0 → p1`.
///
/// Walkable space lies to the left of the segment.  `convex` is `true` when
/// the polyline turns left (or not at all) at `p0`, which is the case that
/// can pinch an agent against the corner.
#[derive(Clone, Debug, PartialEq)]
pub struct Obstacle {
    pub point:    Vec2,
    pub dir:      Vec2,
    pub length:   f32,
    /// Node the segment bounds, or `NodeId::INVALID` for free-standing sets.
    pub node:     NodeId,
    pub next:     Option<ObstacleId>,
    pub prev:     Option<ObstacleId>,
    pub closed:   bool,
    pub convex:   bool,
    pub class_id: u32,
}

impl Obstacle {
    /// Segment from `p0` to `p1`; links, convexity and closure are left for
    /// the owning set to fill in.
    pub fn segment(p0: Vec2, p1: Vec2, node: NodeId, class_id: u32) -> Self {
        let d = p1 - p0;
        let length = d.length();
        let dir = if length > 0.0 { d / length } else { Vec2::ZERO };
        Self {
            point: p0,
            dir,
            length,
            node,
            next: None,
            prev: None,
            closed: false,
            convex: true,
            class_id,
        }
    }

    #[inline]
    pub fn p0(&self) -> Vec2 {
        self.point
    }

    #[inline]
    pub fn p1(&self) -> Vec2 {
        self.point + self.dir * self.length
    }

    #[inline]
    pub fn midpoint(&self) -> Vec2 {
        self.point + self.dir * (0.5 * self.length)
    }

    /// `true` if this obstacle blocks agents whose class mask is `mask`.
    #[inline]
    pub fn blocks(&self, mask: u32) -> bool {
        self.class_id & mask != 0
    }

    /// Squared distance from `p` to the segment.
    pub fn distance_sq(&self, p: Vec2) -> f32 {
        let t = (p - self.point).dot(self.dir).clamp(0.0, self.length);
        (self.point + self.dir * t).distance_squared(p)
    }

    /// `true` if `p` is on the walkable (left) side of the segment's line.
    #[inline]
    pub fn point_outside(&self, p: Vec2) -> bool {
        left_of(self.p0(), self.p1(), p) > 0.0
    }
}

// ── ObstacleVertexList ────────────────────────────────────────────────────────

/// A polyline of obstacle vertices.  When `closed`, the last vertex
/// connects back to the first.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObstacleVertexList {
    pub vertices: Vec<Vec2>,
    pub closed:   bool,
}

// ── Chain walking ─────────────────────────────────────────────────────────────

/// Regroup linked obstacle segments into vertex lists.
///
/// Open chains (those with a head that has no `prev`) come first, followed
/// by closed loops.  Each segment is emitted exactly once, so malformed
/// links (a chain running into a loop) cannot cause an endless walk.
pub(crate) fn vertex_lists(obstacles: &[Obstacle]) -> Vec<ObstacleVertexList> {
    let mut visited = vec![false; obstacles.len()];
    let mut lists = Vec::new();

    let walk = |start: usize, visited: &mut Vec<bool>| -> (Vec<Vec2>, Option<usize>) {
        let mut verts = Vec::new();
        let mut cur = Some(start);
        let mut last = start;
        while let Some(i) = cur {
            if visited[i] {
                return (verts, Some(i));
            }
            visited[i] = true;
            verts.push(obstacles[i].p0());
            last = i;
            cur = obstacles[i].next.map(ObstacleId::index);
        }
        verts.push(obstacles[last].p1());
        (verts, None)
    };

    for (i, o) in obstacles.iter().enumerate() {
        if o.prev.is_none() && !visited[i] {
            let (mut vertices, stopped_at) = walk(i, &mut visited);
            if let Some(j) = stopped_at {
                vertices.push(obstacles[j].p0());
            }
            lists.push(ObstacleVertexList { vertices, closed: false });
        }
    }
    for i in 0..obstacles.len() {
        if !visited[i] {
            let (vertices, stopped_at) = walk(i, &mut visited);
            let closed = stopped_at == Some(i);
            lists.push(ObstacleVertexList { vertices, closed });
        }
    }
    lists
}

// ── ObstacleSet ───────────────────────────────────────────────────────────────

/// An arena of obstacles built from vertex lists.
///
/// Ids are assigned in insertion order.  A set created with
/// [`closed_only`](Self::closed_only) rejects open polylines at insertion
/// time, since consumers that sort obstacles by inside/outside cannot handle
/// them.
#[derive(Clone, Debug, Default)]
pub struct ObstacleSet {
    obstacles:   Vec<Obstacle>,
    class_id:    u32,
    closed_only: bool,
}

impl ObstacleSet {
    /// A set accepting open and closed polylines.
    pub fn new(class_id: u32) -> Self {
        Self { obstacles: Vec::new(), class_id, closed_only: false }
    }

    /// A set that treats open polylines as a configuration error.
    pub fn closed_only(class_id: u32) -> Self {
        Self { obstacles: Vec::new(), class_id, closed_only: true }
    }

    /// Build a set from the boundary of a finalized mesh.
    pub fn from_nav_mesh(mesh: &NavMesh, class_id: u32) -> MeshResult<Self> {
        let mut set = Self::new(class_id);
        for list in mesh.obstacle_vertex_lists() {
            set.add_vertex_list(&list)?;
        }
        Ok(set)
    }

    /// Append one polyline; returns the id of its first segment.
    pub fn add_vertex_list(&mut self, list: &ObstacleVertexList) -> MeshResult<ObstacleId> {
        let verts = &list.vertices;
        let count = verts.len();
        if count < 2 {
            return Err(MeshError::TooFewObstacleVertices(count));
        }
        if self.closed_only && !list.closed {
            return Err(MeshError::OpenObstacle);
        }

        let first = self.obstacles.len();
        let seg_count = if list.closed { count } else { count - 1 };
        if let Some(i) = (0..seg_count).find(|&i| verts[i].distance(verts[(i + 1) % count]) <= EPS) {
            return Err(MeshError::DegenerateObstacle(ObstacleId((first + i) as u32)));
        }
        for i in 0..seg_count {
            let p0 = verts[i];
            let p1 = verts[(i + 1) % count];
            let mut o = Obstacle::segment(p0, p1, NodeId::INVALID, self.class_id);
            o.closed = list.closed;
            let has_prev = i > 0 || list.closed;
            if has_prev && count > 2 {
                let before = verts[(i + count - 1) % count];
                o.convex = left_of(before, p0, p1) >= 0.0;
            }
            if i > 0 {
                o.prev = Some(ObstacleId((first + i - 1) as u32));
            }
            if i + 1 < seg_count {
                o.next = Some(ObstacleId((first + i + 1) as u32));
            }
            self.obstacles.push(o);
        }
        if list.closed {
            let last = self.obstacles.len() - 1;
            self.obstacles[last].next = Some(ObstacleId(first as u32));
            self.obstacles[first].prev = Some(ObstacleId(last as u32));
        }
        Ok(ObstacleId(first as u32))
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    pub fn get(&self, id: ObstacleId) -> Option<&Obstacle> {
        self.obstacles.get(id.index())
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    /// Obstacles within `range` of `p` that block class `mask`.
    pub fn near(&self, p: Vec2, range: f32, mask: u32) -> impl Iterator<Item = ObstacleId> + '_ {
        let range_sq = range * range;
        self.obstacles
            .iter()
            .enumerate()
            .filter(move |(_, o)| o.blocks(mask) && o.distance_sq(p) <= range_sq)
            .map(|(i, _)| ObstacleId(i as u32))
    }

    /// Reconstruct the polylines this set was built from.
    pub fn vertex_lists(&self) -> Vec<ObstacleVertexList> {
        vertex_lists(&self.obstacles)
    }
}
