//! The `Sim` struct and its tick loop.

use std::sync::Arc;

use nav_core::{AgentId, NodeId, SimConfig, Tick, Vec2};
use nav_localizer::NavMeshLocalizer;
use nav_path::{Goal, PathUpdate};

use crate::mover::direct_steering;
use crate::{AgentStore, MoveRequest, Mover, MoverConfig, SimError, SimObserver, SimResult, TickStats};

// ── Sim ───────────────────────────────────────────────────────────────────────

/// The main simulation runner.
///
/// `Sim<M>` holds all simulation state and drives the tick loop:
///
/// 1. **Plan**: agents with a new goal, or whose corridor was dropped, get a
///    corridor from the localizer.
/// 2. **Moving goals**: corridors toward goals moved with
///    [`move_goal`](Self::move_goal) are retargeted.
/// 3. **Steer and move** (parallel with the `parallel` feature): funnel
///    steering from each corridor, then one [`Mover`] step.
/// 4. **Re-localize** (parallel with the `parallel` feature): every agent is
///    handed to [`NavMeshLocalizer::update_location`].
/// 5. **Arrivals**: agents within the arrival distance of their goal stop
///    and drop their corridor.
/// 6. **Contacts** (parallel with the `parallel` feature): agents touching
///    another agent or a wall are counted from the localizer's occupant sets
///    and the mesh obstacles.
///
/// Every parallel phase only computes per-agent results that are applied in
/// ascending `AgentId` order, so runs are deterministic regardless of the
/// thread count.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim<M: Mover> {
    pub config: SimConfig,

    /// The tick about to be processed.
    pub now: Tick,

    pub agents: AgentStore,

    /// Shared with any other consumer of the same mesh resource.
    pub localizer: Arc<NavMeshLocalizer>,

    pub mover: M,

    pub mover_config: MoverConfig,

    /// Agents that need a corridor planned next tick.
    pub(crate) needs_plan: Vec<bool>,

    /// Agents whose last plan produced a corridor.
    pub(crate) following: Vec<bool>,

    /// Agents whose moving goal changed since the last tick.
    pub(crate) goal_moved: Vec<bool>,
}

impl<M: Mover> Sim<M> {
    // ── Public API ────────────────────────────────────────────────────────

    /// Run the simulation from the current tick to `config.end_tick()`.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        while self.now < self.config.end_tick() {
            self.step(observer)?;
        }
        observer.on_sim_end(self.now);
        Ok(())
    }

    /// Run exactly `n` ticks from the current position (ignores `end_tick`).
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<()> {
        for _ in 0..n {
            self.step(observer)?;
        }
        Ok(())
    }

    /// Give `agent` a new goal.  Any corridor toward the old goal is dropped
    /// and a new one is planned on the next tick.
    pub fn set_goal(&mut self, agent: AgentId, goal: Goal) {
        let i = agent.index();
        self.agents.goal[i] = Some(goal);
        self.agents.arrived[i] = false;
        self.localizer.clear_path(agent);
        self.following[i] = false;
        self.goal_moved[i] = false;
        self.needs_plan[i] = true;
    }

    /// Move the moving goal of `agent` to `position`.  Takes effect on the
    /// next tick.
    pub fn move_goal(&mut self, agent: AgentId, position: Vec2) -> SimResult<()> {
        let i = agent.index();
        match self.agents.goal.get_mut(i) {
            Some(Some(goal)) if goal.is_moving() => {
                goal.position = position;
                self.goal_moved[i] = true;
                Ok(())
            }
            _ => Err(SimError::NoMovingGoal(agent)),
        }
    }

    /// Mesh node of `agent`, `None` if it was never located.
    pub fn node_of(&self, agent: AgentId) -> Option<NodeId> {
        self.localizer.node_of(agent)
    }

    /// Agents within `range` of `agent`, nearest first, with their squared
    /// distances.  Only agents of this simulation are reported.
    pub fn neighbors(&self, agent: AgentId, range: f32) -> Vec<(AgentId, f32)> {
        let positions = &self.agents.position;
        self.localizer
            .agents_near(&self.agents.snapshot(agent), range, |a| positions.get(a.index()).copied())
    }

    // ── Core tick processing ──────────────────────────────────────────────

    fn step<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        let now = self.now;
        observer.on_tick_start(now);
        let stats = self.process_tick(now)?;
        observer.on_tick_end(&stats);
        if self.config.is_output_tick(now) {
            observer.on_snapshot(now, &self.agents, &self.localizer);
        }
        self.now = now + 1;
        Ok(())
    }

    fn process_tick(&mut self, now: Tick) -> SimResult<TickStats> {
        let mut stats = TickStats { tick: now, ..TickStats::default() };

        // ── Phase 1: plan missing corridors ───────────────────────────────
        for agent in self.agents.ids() {
            let i = agent.index();
            if !self.agents.is_active(agent) {
                continue;
            }
            let lost = self.following[i] && !self.localizer.has_path(agent);
            if lost {
                log::debug!("agent {agent} lost its corridor; replanning");
            }
            if self.needs_plan[i] || lost {
                self.plan(agent, &mut stats)?;
            }
        }

        // ── Phase 2: moving goals ─────────────────────────────────────────
        for agent in self.agents.ids() {
            let i = agent.index();
            if !std::mem::take(&mut self.goal_moved[i]) || !self.agents.is_active(agent) {
                continue;
            }
            self.retarget(agent, &mut stats)?;
        }

        // ── Phase 3: steer and move ───────────────────────────────────────
        let moves = self.compute_moves();
        for (i, next) in moves.into_iter().enumerate() {
            if let Some(p) = next {
                self.agents.position[i] = p;
                stats.moved += 1;
            }
        }

        // ── Phase 4: re-localize ──────────────────────────────────────────
        let nodes = self.relocalize();
        stats.off_mesh = nodes.iter().filter(|n| n.is_none()).count();

        // ── Phase 5: arrivals ─────────────────────────────────────────────
        let reach = self.mover_config.arrival_distance;
        for agent in self.agents.ids() {
            let i = agent.index();
            if !self.agents.is_active(agent) {
                continue;
            }
            let Some(goal) = self.agents.goal[i] else { continue };
            if self.agents.position[i].distance(goal.position) <= reach {
                self.agents.arrived[i] = true;
                self.localizer.clear_path(agent);
                self.following[i] = false;
                stats.arrivals += 1;
            }
        }

        // ── Phase 6: contacts ─────────────────────────────────────────────
        let (agent_contacts, wall_contacts) = self.contacts();
        stats.agent_contacts = agent_contacts;
        stats.wall_contacts = wall_contacts;

        stats.path_agents = self.localizer.path_agent_count();
        Ok(stats)
    }

    /// Plan a corridor for one agent.  A goal that cannot be reached is
    /// given up; the agent goes idle.
    fn plan(&mut self, agent: AgentId, stats: &mut TickStats) -> SimResult<()> {
        let i = agent.index();
        self.needs_plan[i] = false;
        let Some(goal) = self.agents.goal[i] else { return Ok(()) };
        let snap = self.agents.snapshot(agent);
        match self.localizer.plan_path(&snap, goal) {
            Ok(has_path) => self.following[i] = has_path,
            Err(e) if is_unreachable(&e) => {
                log::warn!("agent {agent} gives up goal {}: {e}", goal.position);
                self.agents.goal[i] = None;
                self.following[i] = false;
                stats.unreachable += 1;
            }
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }

    /// Apply a moved goal to one agent's corridor.
    fn retarget(&mut self, agent: AgentId, stats: &mut TickStats) -> SimResult<()> {
        let i = agent.index();
        let Some(goal) = self.agents.goal[i] else { return Ok(()) };
        if !self.localizer.has_path(agent) {
            // The goal was in the agent's node; it may have left it.
            return self.plan(agent, stats);
        }
        let snap = self.agents.snapshot(agent);
        match self.localizer.update_path_for_goal(&snap, goal.position) {
            Ok(PathUpdate::Unreachable) => {
                self.following[i] = false;
                self.plan(agent, stats)?;
            }
            Ok(update) => log::trace!("agent {agent} goal update: {update:?}"),
            Err(e) if is_unreachable(&e) => {
                log::debug!("agent {agent} cannot follow its goal: {e}");
                self.following[i] = false;
                self.plan(agent, stats)?;
            }
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }

    /// New position for every active agent, `None` for the rest.
    fn compute_moves(&self) -> Vec<Option<Vec2>> {
        let dt = self.config.time_step_secs;

        #[cfg(not(feature = "parallel"))]
        {
            self.agents.ids().map(|agent| self.next_position(agent, dt)).collect()
        }

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            (0..self.agents.count as u32)
                .into_par_iter()
                .map(|i| self.next_position(AgentId(i), dt))
                .collect()
        }
    }

    fn next_position(&self, agent: AgentId, dt: f32) -> Option<Vec2> {
        if !self.agents.is_active(agent) {
            return None;
        }
        let i = agent.index();
        let goal = self.agents.goal[i]?.position;
        let snap = self.agents.snapshot(agent);
        let steering = self
            .localizer
            .preferred_direction(&snap, self.mover_config.heading_cos)
            .unwrap_or_else(|| direct_steering(snap.position, goal));
        let request = MoveRequest {
            position:   snap.position,
            steering,
            goal,
            pref_speed: self.agents.pref_speed[i],
            radius:     snap.radius,
        };
        Some(self.mover.advance(&request, dt))
    }

    /// Hand every agent to the localizer; corridor agents always update,
    /// the rest only under track-all.
    fn relocalize(&self) -> Vec<Option<NodeId>> {
        let localizer = self.localizer.as_ref();

        #[cfg(not(feature = "parallel"))]
        {
            self.agents
                .ids()
                .map(|agent| localizer.update_location(&self.agents.snapshot(agent), false))
                .collect()
        }

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            (0..self.agents.count as u32)
                .into_par_iter()
                .map(|i| localizer.update_location(&self.agents.snapshot(AgentId(i)), false))
                .collect()
        }
    }

    /// Number of agents touching another agent, and touching a wall.
    fn contacts(&self) -> (usize, usize) {
        let max_radius = self.agents.radius.iter().copied().fold(0.0, f32::max);

        #[cfg(not(feature = "parallel"))]
        let flags: Vec<(bool, bool)> =
            self.agents.ids().map(|agent| self.touching(agent, max_radius)).collect();

        #[cfg(feature = "parallel")]
        let flags: Vec<(bool, bool)> = {
            use rayon::prelude::*;

            (0..self.agents.count as u32)
                .into_par_iter()
                .map(|i| self.touching(AgentId(i), max_radius))
                .collect()
        };

        let agents = flags.iter().filter(|f| f.0).count();
        let walls = flags.iter().filter(|f| f.1).count();
        (agents, walls)
    }

    fn touching(&self, agent: AgentId, max_radius: f32) -> (bool, bool) {
        let Some(node) = self.localizer.node_of(agent) else {
            return (false, false);
        };
        let snap = self.agents.snapshot(agent);
        let radius = &self.agents.radius;
        let other_agent = self
            .neighbors(agent, snap.radius + max_radius)
            .iter()
            .any(|&(other, dist_sq)| {
                let reach = snap.radius + radius[other.index()];
                dist_sq < reach * reach
            });
        let wall = self
            .localizer
            .mesh()
            .obstacles_near(node, snap.position, snap.radius)
            .next()
            .is_some();
        (other_agent, wall)
    }
}

/// Errors that mean "no corridor to this goal" rather than a broken setup.
fn is_unreachable(e: &nav_localizer::LocalizerError) -> bool {
    use nav_localizer::LocalizerError as E;
    matches!(e, E::GoalOffMesh(_) | E::NotLocated(_) | E::Path(_))
}
