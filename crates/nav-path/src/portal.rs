//! Portal geometry.
//!
//! A [`Portal`] is a bare segment with a clearance query.  A [`WayPortal`] is
//! one step of a route: a mesh edge seen from the node the agent crosses it
//! from, oriented so that `left` and `right` match the agent's view.

use nav_core::{EPS, EdgeId, NodeId, Vec2, det};
use nav_mesh::Edge;

use crate::{PathError, PathResult};

// ── Portal ────────────────────────────────────────────────────────────────────

/// A segment `p0 → p1` with precomputed unit direction and length.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Portal {
    pub p0:     Vec2,
    pub p1:     Vec2,
    pub dir:    Vec2,
    pub length: f32,
}

impl Portal {
    pub fn new(p0: Vec2, p1: Vec2) -> Self {
        let d = p1 - p0;
        let length = d.length();
        let dir = if length > 0.0 { d / length } else { Vec2::ZERO };
        Self { p0, p1, dir, length }
    }

    /// The portal of a mesh edge, in the edge's own orientation.
    pub fn from_edge(edge: &Edge) -> Self {
        Self { p0: edge.p0(), p1: edge.p1(), dir: edge.dir, length: edge.width }
    }

    #[inline]
    pub fn midpoint(&self) -> Vec2 {
        self.p0 + self.dir * (0.5 * self.length)
    }

    /// Closest point an agent of `radius` at `pos` can steer to without
    /// clipping either end of the portal.
    ///
    /// When `pos` projects onto the clearable interior (at least `radius`
    /// from both ends) the projection is returned.  Otherwise the result is
    /// the tangent point from `pos` onto the radius circle around the nearer
    /// end, on the side facing the portal interior.  An agent already inside
    /// that circle is pushed one unit along the portal, away from the end.
    ///
    /// Fails with [`PathError::PortalTooNarrow`] when `2 * radius` is not
    /// less than the portal length.
    pub fn nearest_point(&self, pos: Vec2, radius: f32) -> PathResult<Vec2> {
        if 2.0 * radius >= self.length {
            return Err(PathError::PortalTooNarrow { length: self.length, radius });
        }
        let dp = (pos - self.p0).dot(self.dir);
        let far = self.length - radius;
        if dp >= radius && dp <= far {
            return Ok(self.p0 + self.dir * dp);
        }

        let near_p0 = dp < radius;
        let (end, inward) = if near_p0 { (self.p0, self.dir) } else { (self.p1, -self.dir) };
        let disp = pos - end;
        let d2 = disp.length_squared();
        if d2 <= radius * radius {
            return Ok(pos + inward);
        }

        let d = d2.sqrt();
        let cos = radius / d;
        let sin = (d2 - radius * radius).sqrt() / d;
        let u = disp / d;
        let ccw = Vec2::new(cos * u.x - sin * u.y, sin * u.x + cos * u.y);
        let cw = Vec2::new(cos * u.x + sin * u.y, cos * u.y - sin * u.x);
        let tangent = if ccw.dot(inward) >= cw.dot(inward) { ccw } else { cw };
        Ok(end + tangent * radius)
    }
}

// ── WayPortal ─────────────────────────────────────────────────────────────────

/// The crossing of one mesh edge out of `node`.
///
/// `left` is the endpoint on the agent's left while crossing; `dir` points
/// from `left` toward the right endpoint.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct WayPortal {
    pub edge:  EdgeId,
    /// Node the agent is in before crossing.
    pub node:  NodeId,
    pub left:  Vec2,
    pub dir:   Vec2,
    pub width: f32,
}

impl WayPortal {
    /// Orient `edge` for an agent leaving `from`.
    pub fn new(edge: &Edge, id: EdgeId, from: NodeId) -> Self {
        debug_assert!(edge.touches(from), "way portal node must touch the edge");
        if edge.p0_is_left_from(from) {
            Self { edge: id, node: from, left: edge.p0(), dir: edge.dir, width: edge.width }
        } else {
            Self { edge: id, node: from, left: edge.p1(), dir: -edge.dir, width: edge.width }
        }
    }

    /// Left endpoint pulled `offset` toward the right one.
    #[inline]
    pub fn left(&self, offset: f32) -> Vec2 {
        self.left + self.dir * offset
    }

    /// Right endpoint pulled `offset` toward the left one.
    #[inline]
    pub fn right(&self, offset: f32) -> Vec2 {
        self.left + self.dir * (self.width - offset)
    }

    /// The portal as a left-to-right segment.
    pub fn portal(&self) -> Portal {
        Portal { p0: self.left, p1: self.right(0.0), dir: self.dir, length: self.width }
    }

    /// Distance along the portal from `left` to where the line through
    /// `point` with direction `dir` meets the portal line.  Falls back to the
    /// projection of `point` when the line runs parallel to the portal.
    fn line_parameter(&self, point: Vec2, dir: Vec2) -> f32 {
        let denom = det(self.dir, dir);
        if denom.abs() < EPS {
            (point - self.left).dot(self.dir)
        } else {
            det(point - self.left, dir) / denom
        }
    }

    /// Where the line through `point` along `dir` crosses the portal,
    /// clamped to the portal segment.
    pub fn intersection_point(&self, point: Vec2, dir: Vec2) -> Vec2 {
        let t = self.line_parameter(point, dir).clamp(0.0, self.width);
        self.left + self.dir * t
    }

    /// Position of `point` across the clearable span: 0 at `left(radius)`,
    /// 1 at `right(radius)`.  Values outside `[0, 1]` lie in the margins.
    pub fn clearance_parameter(&self, point: Vec2, radius: f32) -> f32 {
        let t = (point - self.left).dot(self.dir);
        self.to_clearance(t, radius)
    }

    /// Clearance parameter of the point where the segment `from → to`
    /// meets the portal line.
    pub fn clearance_parameter_line(&self, to: Vec2, from: Vec2, radius: f32) -> f32 {
        let t = self.line_parameter(from, to - from);
        self.to_clearance(t, radius)
    }

    /// The point at clearance parameter `s`.
    pub fn clear_point(&self, s: f32, radius: f32) -> Vec2 {
        self.left + self.dir * (radius + s * (self.width - 2.0 * radius))
    }

    fn to_clearance(&self, t: f32, radius: f32) -> f32 {
        let span = self.width - 2.0 * radius;
        if span <= EPS { 0.5 } else { (t - radius) / span }
    }
}
