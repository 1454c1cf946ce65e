//! Funnel (string-pulling) smoothing over a portal sequence.
//!
//! The funnel runs from an apex through the radius-inset portal endpoints.
//! Each time one side of the funnel crosses over the other, the crossed
//! corner becomes the new apex and every portal passed since the previous
//! apex gets its waypoint on the straight line between the two.  The goal is
//! treated as a final zero-width portal.

use nav_core::{EPS, Vec2, det, norm_or_zero};

use crate::WayPortal;

/// Per-portal steering data: where to cross portal `i` and the heading of
/// the straight segment that crosses it.
#[derive(Clone, Debug, Default)]
pub struct Crossing {
    pub waypoints: Vec<Vec2>,
    pub headings:  Vec<Vec2>,
}

impl Crossing {
    pub fn with_len(n: usize) -> Self {
        Self { waypoints: vec![Vec2::ZERO; n], headings: vec![Vec2::ZERO; n] }
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Point every portal in `range` along the line `apex → target`.
    fn set(&mut self, portals: &[WayPortal], range: std::ops::Range<usize>, apex: Vec2, target: Vec2) {
        let heading = norm_or_zero(target - apex);
        for i in range {
            self.waypoints[i] = portals[i].intersection_point(apex, heading);
            self.headings[i] = heading;
        }
    }
}

#[inline]
fn same(a: Vec2, b: Vec2) -> bool {
    a.distance_squared(b) < EPS * EPS
}

/// Recompute `crossing` for portals `first..` for an agent of `radius`
/// standing at `start`.  Entries before `first` are left untouched.
pub fn compute_crossing(
    portals: &[WayPortal],
    radius: f32,
    start: Vec2,
    goal: Vec2,
    first: usize,
    crossing: &mut Crossing,
) {
    let n = portals.len();
    debug_assert_eq!(crossing.len(), n);
    if first >= n {
        return;
    }

    // Portal `i` for i < n, the goal for i == n.
    let sides = |i: usize| -> (Vec2, Vec2) {
        if i < n { (portals[i].left(radius), portals[i].right(radius)) } else { (goal, goal) }
    };

    let mut apex = start;
    let mut apex_idx = first;
    let (mut left, mut right) = sides(first);
    let (mut left_idx, mut right_idx) = (first, first);

    let mut i = first + 1;
    while i <= n {
        let (pl, pr) = sides(i);

        // Right side of the funnel.
        if det(right - apex, pr - apex) >= 0.0 {
            if same(apex, right) || det(left - apex, pr - apex) < 0.0 {
                right = pr;
                right_idx = i;
            } else {
                // Right crossed over left: the left corner is the new apex.
                crossing.set(portals, apex_idx..(left_idx + 1).min(n), apex, left);
                apex = left;
                apex_idx = left_idx + 1;
                right = apex;
                right_idx = left_idx;
                i = left_idx + 1;
                continue;
            }
        }

        // Left side of the funnel.
        if det(left - apex, pl - apex) <= 0.0 {
            if same(apex, left) || det(right - apex, pl - apex) > 0.0 {
                left = pl;
                left_idx = i;
            } else {
                crossing.set(portals, apex_idx..(right_idx + 1).min(n), apex, right);
                apex = right;
                apex_idx = right_idx + 1;
                left = apex;
                left_idx = right_idx;
                i = right_idx + 1;
                continue;
            }
        }

        i += 1;
    }

    if apex_idx < n {
        crossing.set(portals, apex_idx..n, apex, goal);
    }
}
