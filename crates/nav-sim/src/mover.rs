//! Turning a steering direction into motion.

use nav_core::{Vec2, norm_or_zero};
use nav_path::Steering;

use crate::{SimError, SimResult};

// ── MoverConfig ───────────────────────────────────────────────────────────────

/// Per-agent motion parameters applied to every agent the builder creates.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MoverConfig {
    /// Agent radius in mesh units.  Portals narrower than twice this are
    /// not traversed.
    pub radius:           f32,
    /// Preferred speed in mesh units per second.
    pub pref_speed:       f32,
    /// Cosine of the largest heading deviation tolerated before the funnel
    /// is recomputed.
    pub heading_cos:      f32,
    /// Distance to the goal at which an agent counts as arrived.
    pub arrival_distance: f32,
}

impl MoverConfig {
    pub fn validate(&self) -> SimResult<()> {
        if !(self.radius > 0.0) {
            return Err(SimError::Config(format!("agent radius must be positive, got {}", self.radius)));
        }
        if !(self.pref_speed > 0.0) {
            return Err(SimError::Config(format!("preferred speed must be positive, got {}", self.pref_speed)));
        }
        if !(-1.0..=1.0).contains(&self.heading_cos) {
            return Err(SimError::Config(format!("heading cosine {} is outside [-1, 1]", self.heading_cos)));
        }
        if self.arrival_distance < 0.0 {
            return Err(SimError::Config(format!("arrival distance {} is negative", self.arrival_distance)));
        }
        Ok(())
    }
}

impl Default for MoverConfig {
    fn default() -> Self {
        Self {
            radius:           0.25,
            pref_speed:       1.3,
            heading_cos:      0.95,
            arrival_distance: 0.1,
        }
    }
}

// ── Mover ─────────────────────────────────────────────────────────────────────

/// Everything a mover sees about one agent for one step.
#[derive(Copy, Clone, Debug)]
pub struct MoveRequest {
    pub position:   Vec2,
    pub steering:   Steering,
    pub goal:       Vec2,
    pub pref_speed: f32,
    pub radius:     f32,
}

/// Advances one agent by one tick.
///
/// Implementations must be `Sync`: with the `parallel` feature the steering
/// phase calls `advance` from Rayon worker threads.
pub trait Mover: Send + Sync {
    /// New position after `dt` seconds.
    fn advance(&self, request: &MoveRequest, dt: f32) -> Vec2;
}

/// Moves at preferred speed along the steering direction, stopping on the
/// goal rather than overshooting it.
#[derive(Copy, Clone, Debug, Default)]
pub struct StraightLineMover;

impl Mover for StraightLineMover {
    fn advance(&self, request: &MoveRequest, dt: f32) -> Vec2 {
        let mut step = request.pref_speed * dt;
        if request.steering.target == request.goal {
            step = step.min(request.position.distance(request.goal));
        }
        request.position + request.steering.direction * step
    }
}

/// Steering straight at `goal`, for agents whose goal lies in their own node.
pub fn direct_steering(position: Vec2, goal: Vec2) -> Steering {
    Steering { target: goal, direction: norm_or_zero(goal - position) }
}
