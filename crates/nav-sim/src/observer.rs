//! Simulation observer trait for progress reporting and data collection.

use nav_core::Tick;
use nav_localizer::NavMeshLocalizer;

use crate::AgentStore;

/// Counters gathered while processing one tick.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TickStats {
    pub tick:        Tick,
    /// Agents that were steered and moved.
    pub moved:       usize,
    /// Agents following a corridor at the end of the tick.
    pub path_agents: usize,
    /// Agents that reached their goal this tick.
    pub arrivals:    usize,
    /// Agents the localizer could not place after moving.
    pub off_mesh:    usize,
    /// Goals given up this tick because no corridor reaches them.
    pub unreachable: usize,
    /// Agents overlapping at least one other agent at the end of the tick.
    pub agent_contacts: usize,
    /// Agents closer than their radius to a wall of their node.
    pub wall_contacts:  usize,
}

/// Callbacks invoked by [`Sim::run`][crate::Sim::run] at key points in the
/// tick loop.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
pub trait SimObserver {
    /// Called at the very start of each tick, before any processing.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called at the end of each tick with that tick's counters.
    fn on_tick_end(&mut self, _stats: &TickStats) {}

    /// Called at snapshot intervals (every `config.output_interval_ticks`
    /// ticks) with read-only access to agent state and mesh locations.
    fn on_snapshot(&mut self, _tick: Tick, _agents: &AgentStore, _localizer: &NavMeshLocalizer) {}

    /// Called once after the final tick completes.
    fn on_sim_end(&mut self, _final_tick: Tick) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
