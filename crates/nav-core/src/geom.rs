//! Planar geometry helpers.
//!
//! The mesh lives on the ground plane, so every position is a 2D `Vec2`
//! (single precision, from `glam`).  Elevation is not stored on positions; it
//! is a function of the node a point lies in (see `nav-mesh`).

pub use glam::Vec2;

/// Tolerance used for degenerate-length and orientation tests.
pub const EPS: f32 = 1e-5;

/// 2D cross product `a.x * b.y - a.y * b.x`.
///
/// Positive when `b` lies counter-clockwise (to the left) of `a`.
#[inline]
pub fn det(a: Vec2, b: Vec2) -> f32 {
    a.perp_dot(b)
}

/// Signed area test for the turn `a → b → c`.
///
/// Positive when `c` is left of the directed line `a → b`, negative when it
/// is right of it and zero when the three points are collinear.
#[inline]
pub fn left_of(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    det(b - a, c - a)
}

/// Normalize `v`, returning the zero vector when `v` is shorter than [`EPS`].
#[inline]
pub fn norm_or_zero(v: Vec2) -> Vec2 {
    let len = v.length();
    if len < EPS { Vec2::ZERO } else { v / len }
}
