//! `PortalPath`: one agent's corridor along a shared route.
//!
//! The path owns the per-agent state a route cannot hold: which portal is
//! next, the funnel-smoothed crossing points and the goal.  It is owned by
//! exactly one agent location and needs no locking of its own.
//!
//! # Tracking
//!
//! [`update_location`](PortalPath::update_location) is called after the
//! agent moves.  It advances or backs up one portal when the agent steps
//! into the next or previous node of the route, replans when the agent
//! drifts into a neighbor off the route, skips ahead when it jumps several
//! nodes forward, and falls back to a blind search when none of these hold.

use std::sync::Arc;

use nav_core::{EPS, NodeId, Vec2, norm_or_zero};
use nav_mesh::{HIGHEST, NavMesh};

use crate::funnel::{Crossing, compute_crossing};
use crate::{Goal, PathError, PathResult, Planner, PortalRoute, WayPortal};

/// Outcome of re-targeting a corridor at a goal's current position.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PathUpdate {
    /// The goal has not moved; the path is untouched.
    Unchanged,
    /// The goal moved within its node; only the final crossing changed.
    Adjusted,
    /// The goal changed node; the path follows a new route.
    Replanned,
    /// The goal left the mesh or cannot be reached.
    Unreachable,
}

/// Where to steer this step.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Steering {
    pub target:    Vec2,
    /// Unit direction toward `target`, or zero when already there.
    pub direction: Vec2,
}

#[derive(Clone, Debug)]
pub struct PortalPath {
    route:    Arc<PortalRoute>,
    goal:     Goal,
    current:  usize,
    crossing: Crossing,
}

impl PortalPath {
    /// A path along `route` for an agent of `radius` standing at `start`.
    pub fn new(start: Vec2, goal: Goal, route: Arc<PortalRoute>, radius: f32) -> Self {
        let mut path = Self { crossing: Crossing::default(), route, goal, current: 0 };
        path.reset_crossing(start, radius);
        path
    }

    /// Plan a route from `start_node` to `goal_node` and wrap it in a path.
    pub fn plan(
        start: Vec2,
        start_node: NodeId,
        goal: Goal,
        goal_node: NodeId,
        radius: f32,
        planner: &dyn Planner,
    ) -> PathResult<Self> {
        let route = planner.route(start_node, goal_node, 2.0 * radius)?;
        Ok(Self::new(start, goal, route, radius))
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn route(&self) -> &Arc<PortalRoute> {
        &self.route
    }

    pub fn goal(&self) -> &Goal {
        &self.goal
    }

    pub fn portal_count(&self) -> usize {
        self.route.portal_count()
    }

    /// Index of the next portal to cross; equals `portal_count()` once the
    /// agent is in the goal node.
    pub fn current_portal_index(&self) -> usize {
        self.current
    }

    pub fn current_portal(&self) -> Option<&WayPortal> {
        self.route.portal(self.current)
    }

    /// The node the agent is tracked in.
    pub fn node(&self) -> NodeId {
        self.route.node_at(self.current)
    }

    pub fn end_node(&self) -> NodeId {
        self.route.end
    }

    /// `true` once every portal has been crossed.
    pub fn is_finished(&self) -> bool {
        self.current >= self.route.portal_count()
    }

    pub fn waypoint(&self, i: usize) -> Option<Vec2> {
        self.crossing.waypoints.get(i).copied()
    }

    pub fn heading(&self, i: usize) -> Option<Vec2> {
        self.crossing.headings.get(i).copied()
    }

    /// Nearest clearable point of the next portal, or the goal once every
    /// portal is crossed.
    pub fn target_point(&self, pos: Vec2, radius: f32) -> PathResult<Vec2> {
        match self.current_portal() {
            Some(p) => p.portal().nearest_point(pos, radius),
            None => Ok(self.goal.position),
        }
    }

    // ── Steering ──────────────────────────────────────────────────────────

    /// Steering toward the current waypoint.
    ///
    /// When the direction to the waypoint deviates from the planned heading
    /// by more than `heading_cos` (cosine of the allowed angle), the funnel
    /// is recomputed from the agent's position.
    pub fn preferred_direction(&mut self, pos: Vec2, radius: f32, heading_cos: f32) -> Steering {
        let n = self.route.portal_count();
        if self.current >= n {
            let target = self.goal.position;
            return Steering { target, direction: norm_or_zero(target - pos) };
        }

        let cur = self.current;
        let mut dir = self.crossing.waypoints[cur] - pos;
        let mut dist = dir.length();
        if dist >= EPS {
            dir /= dist;
            if dir.dot(self.crossing.headings[cur]) < heading_cos {
                compute_crossing(&self.route.portals, radius, pos, self.goal.position, cur, &mut self.crossing);
                dir = self.crossing.waypoints[cur] - pos;
                dist = dir.length();
                if dist >= EPS {
                    dir /= dist;
                }
            }
        }
        if dist < EPS {
            // On the waypoint: look one step further.
            let next = self.crossing.waypoints.get(cur + 1).copied().unwrap_or(self.goal.position);
            dir = norm_or_zero(next - pos);
        }
        Steering { target: self.crossing.waypoints[cur], direction: dir }
    }

    // ── Tracking ──────────────────────────────────────────────────────────

    /// Re-track the agent at `pos` along the corridor.
    ///
    /// Returns the node the agent is now in, or `None` if it has left the
    /// mesh (the path is then left as it was).  Errors only if a required
    /// replan fails.
    pub fn update_location(
        &mut self,
        pos: Vec2,
        radius: f32,
        mesh: &NavMesh,
        planner: &dyn Planner,
    ) -> PathResult<Option<NodeId>> {
        let cur_node = self.node();
        if mesh.node_contains(cur_node, pos) {
            return Ok(Some(cur_node));
        }

        let n = self.route.portal_count();
        let end = self.route.end;

        let next_node = (self.current < n).then(|| self.route.node_at(self.current + 1));
        if next_node.is_some_and(|next| mesh.node_contains(next, pos)) {
            self.current += 1;
            return Ok(Some(self.node()));
        }

        let prev_node = (self.current > 0).then(|| self.route.node_at(self.current - 1));
        if prev_node.is_some_and(|prev| mesh.node_contains(prev, pos)) {
            self.current -= 1;
            return Ok(Some(self.node()));
        }

        // Pushed sideways into a neighbor that is not on the route.
        let sideways = mesh
            .neighbors(cur_node)
            .filter(|&nb| Some(nb) != next_node && Some(nb) != prev_node)
            .find(|&nb| mesh.node_contains(nb, pos));
        if let Some(nb) = sideways {
            self.replan(pos, nb, end, radius, planner)?;
            return Ok(Some(nb));
        }

        // Several nodes forward in one step (long thin nodes).
        if let Some(i) = (self.current + 2..n).find(|&i| mesh.node_contains(self.route.node_at(i), pos)) {
            self.current = i;
            return Ok(Some(self.node()));
        }
        if mesh.node_contains(end, pos) {
            self.current = n;
            return Ok(Some(end));
        }

        log::warn!("agent at {pos} left its corridor at {cur_node} for a non-adjacent node");
        let elevation = mesh.node(cur_node).elevation(pos);
        match mesh.find_node_blind(pos, elevation) {
            Some(node) => {
                self.replan(pos, node, end, radius, planner)?;
                Ok(Some(node))
            }
            None => Ok(None),
        }
    }

    /// Replace the route with one from `start` to `end` and recompute the
    /// crossing from `pos`.  On failure the path is unchanged.
    pub fn replan(
        &mut self,
        pos: Vec2,
        start: NodeId,
        end: NodeId,
        radius: f32,
        planner: &dyn Planner,
    ) -> PathResult<()> {
        let route = planner.route(start, end, 2.0 * radius)?;
        log::debug!("replanned corridor {start} -> {end}: {} portals", route.portal_count());
        self.route = route;
        self.reset_crossing(pos, radius);
        Ok(())
    }

    fn reset_crossing(&mut self, pos: Vec2, radius: f32) {
        self.current = 0;
        self.crossing = Crossing::with_len(self.route.portal_count());
        compute_crossing(&self.route.portals, radius, pos, self.goal.position, 0, &mut self.crossing);
    }

    // ── Moving goals ──────────────────────────────────────────────────────

    /// Follow the goal to `goal_pos`.
    ///
    /// Within the same goal node only the final crossing is adjusted;
    /// otherwise the corridor is replanned from the agent's current node.
    pub fn update_goal(
        &mut self,
        pos: Vec2,
        radius: f32,
        goal_pos: Vec2,
        mesh: &NavMesh,
        planner: &dyn Planner,
    ) -> PathResult<PathUpdate> {
        if goal_pos == self.goal.position {
            return Ok(PathUpdate::Unchanged);
        }
        let end = self.route.end;
        let Some(goal_node) = mesh.locate(goal_pos, Some(end), HIGHEST) else {
            return Ok(PathUpdate::Unreachable);
        };
        self.goal.position = goal_pos;

        if goal_node == end {
            self.update_crossing_from_moving_goal(pos, radius);
            return Ok(PathUpdate::Adjusted);
        }
        match self.replan(pos, self.node(), goal_node, radius, planner) {
            Ok(()) => Ok(PathUpdate::Replanned),
            Err(PathError::NoRoute { .. }) => Ok(PathUpdate::Unreachable),
            Err(e) => Err(e),
        }
    }

    /// Slide the last crossing along its portal toward the goal's new
    /// position, without re-running the funnel.
    ///
    /// With `s` the clearance parameter of the current last crossing and
    /// `s'` that of the line from the previous waypoint to the goal:
    ///
    /// | current `s` | new `s'`  | result            |
    /// |-------------|-----------|-------------------|
    /// | ≤ 0         | ≤ 0       | unchanged         |
    /// | ≤ 0         | > 0       | `min(s', 1)`      |
    /// | ≥ 1         | ≥ 1       | unchanged         |
    /// | ≥ 1         | < 1       | `max(s', 0)`      |
    /// | in (0, 1)   | any       | `s'` clamped      |
    pub fn update_crossing_from_moving_goal(&mut self, pos: Vec2, radius: f32) {
        let n = self.route.portal_count();
        if n == 0 || self.current >= n {
            return;
        }
        let last = n - 1;
        let portal = &self.route.portals[last];
        let prev = if last > self.current { self.crossing.waypoints[last - 1] } else { pos };

        let s_wp = portal.clearance_parameter(self.crossing.waypoints[last], radius);
        let s_new = portal.clearance_parameter_line(self.goal.position, prev, radius);
        let s = if s_wp <= 0.0 {
            if s_new <= 0.0 {
                return;
            }
            s_new.min(1.0)
        } else if s_wp >= 1.0 {
            if s_new >= 1.0 {
                return;
            }
            s_new.max(0.0)
        } else {
            s_new.clamp(0.0, 1.0)
        };

        let point = portal.clear_point(s, radius);
        self.crossing.waypoints[last] = point;
        self.crossing.headings[last] = norm_or_zero(point - prev);
    }
}
