//! Plain data rows written by output backends.

/// One agent's position and mesh location at a snapshot tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentSnapshotRow {
    pub tick:      u64,
    pub agent_id:  u32,
    pub x:         f32,
    pub y:         f32,
    /// Ground elevation under the agent; `None` while it has no node.
    pub elevation: Option<f32>,
    /// Current node; `u32::MAX` if the agent was never located.
    pub node:      u32,
    pub has_path:  bool,
}

/// Counters for one simulation tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickSummaryRow {
    pub tick:         u64,
    pub elapsed_secs: f64,
    pub path_agents:  u64,
    pub arrivals:     u64,
    pub off_mesh:     u64,
}
