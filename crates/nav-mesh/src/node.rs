//! Mesh nodes: convex polygons with a supporting plane.

use nav_core::{EPS, EdgeId, ObstacleId, Vec2, VertexId};

// ── Plane ─────────────────────────────────────────────────────────────────────

/// Supporting plane of a node: `elevation = a * x + b * y + c`.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Plane {
    pub a: f32,
    pub b: f32,
    pub c: f32,
}

impl Plane {
    /// The horizontal plane at elevation 0.
    pub const FLAT: Plane = Plane { a: 0.0, b: 0.0, c: 0.0 };

    pub fn new(a: f32, b: f32, c: f32) -> Self {
        Self { a, b, c }
    }

    /// Horizontal plane at a fixed elevation.
    pub fn level(elevation: f32) -> Self {
        Self { a: 0.0, b: 0.0, c: elevation }
    }

    #[inline]
    pub fn elevation(&self, p: Vec2) -> f32 {
        self.a * p.x + self.b * p.y + self.c
    }

    /// Ground-plane gradient of the elevation; zero for a horizontal plane.
    #[inline]
    pub fn gradient(&self) -> Vec2 {
        Vec2::new(self.a, self.b)
    }
}

// ── Bounds ────────────────────────────────────────────────────────────────────

/// Axis-aligned bounding rectangle on the ground plane.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Bounds {
    /// An inverted rectangle that any `include` call replaces.
    pub const EMPTY: Bounds = Bounds {
        min: Vec2::splat(f32::INFINITY),
        max: Vec2::splat(f32::NEG_INFINITY),
    };

    pub fn include(&mut self, p: Vec2) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    pub fn from_points(points: impl IntoIterator<Item = Vec2>) -> Self {
        let mut b = Self::EMPTY;
        for p in points {
            b.include(p);
        }
        b
    }

    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds { min: self.min.min(other.min), max: self.max.max(other.max) }
    }
}

// ── Node ──────────────────────────────────────────────────────────────────────

/// A convex polygon of the mesh.
///
/// Vertices are indices into the mesh vertex array, in boundary order.
/// `edges` and `obstacles` list the portals and boundary segments on the
/// polygon's perimeter.  `bounds` is filled in by `finalize`.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub center:    Vec2,
    pub vertices:  Vec<VertexId>,
    pub plane:     Plane,
    pub edges:     Vec<EdgeId>,
    pub obstacles: Vec<ObstacleId>,
    pub bounds:    Bounds,
}

impl Node {
    pub fn new(center: Vec2, vertices: Vec<VertexId>, plane: Plane) -> Self {
        Self {
            center,
            vertices,
            plane,
            edges: Vec::new(),
            obstacles: Vec::new(),
            bounds: Bounds::EMPTY,
        }
    }

    #[inline]
    pub fn elevation(&self, p: Vec2) -> f32 {
        self.plane.elevation(p)
    }

    #[inline]
    pub fn gradient(&self) -> Vec2 {
        self.plane.gradient()
    }

    /// The polygon's corner positions, resolved against the mesh vertices.
    pub fn polygon<'a>(&'a self, vertices: &'a [Vec2]) -> impl Iterator<Item = Vec2> + 'a {
        self.vertices.iter().map(move |v| vertices[v.index()])
    }

    /// Ray-crossing containment test in the ground plane.
    ///
    /// Counts crossings of the ray from `p` toward `-x`.  A crossing exactly
    /// at a vertex counts once, and only when the polygon actually passes
    /// through the ray there.  Points on the boundary (including vertices)
    /// are inside, so a point on a shared edge is inside both nodes.  The
    /// result depends only on the node and the point.
    pub fn contains_point(&self, vertices: &[Vec2], p: Vec2) -> bool {
        let n = self.vertices.len();
        let at = |i: usize| vertices[self.vertices[i].index()];

        let on_edge = (0..n).any(|e| {
            let (p0, p1) = (at(e), at((e + 1) % n));
            let d = p1 - p0;
            let len = d.length();
            let t = (p - p0).dot(d);
            len > 0.0 && d.perp_dot(p - p0).abs() <= EPS * len && t >= 0.0 && t <= len * len
        });
        if on_edge {
            return true;
        }

        let mut crossings = 0u32;
        for e in 0..n {
            let p0 = at(e);

            if p0.y == p.y && p0.x <= p.x {
                if p0.x == p.x {
                    return true;
                }
                let prev_y = at(if e == 0 { n - 1 } else { e - 1 }).y;
                let next_y = at((e + 1) % n).y;
                // Tangential touch: both neighbors on the same side of the ray.
                if (prev_y > p.y && next_y > p.y) || (prev_y < p.y && next_y < p.y) {
                    continue;
                }
                crossings += 1;
                continue;
            }

            let p1 = at((e + 1) % n);
            if (p0.y > p.y && p1.y >= p.y)
                || (p0.y < p.y && p1.y <= p.y)
                || (p0.x > p.x && p1.x > p.x)
                || p0.y == p1.y
            {
                continue;
            }
            let t = (p.y - p0.y) / (p1.y - p0.y);
            let x = p0.x + t * (p1.x - p0.x);
            if x <= p.x {
                crossings += 1;
            }
        }
        crossings % 2 == 1
    }

    /// Area-weighted centroid of the polygon; used when a center is not
    /// supplied explicitly.
    pub fn centroid(vertices: &[Vec2], ids: &[VertexId]) -> Vec2 {
        let pts: Vec<Vec2> = ids.iter().map(|v| vertices[v.index()]).collect();
        let n = pts.len();
        let mut area2 = 0.0;
        let mut acc = Vec2::ZERO;
        for i in 0..n {
            let a = pts[i];
            let b = pts[(i + 1) % n];
            let cross = a.perp_dot(b);
            area2 += cross;
            acc += (a + b) * cross;
        }
        if area2.abs() < EPS {
            pts.iter().copied().sum::<Vec2>() / n.max(1) as f32
        } else {
            acc / (3.0 * area2)
        }
    }
}
