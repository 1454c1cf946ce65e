//! What the localizer needs to know about an agent.

use nav_core::{AgentId, Vec2};

/// Read-only view of a moving agent.
///
/// Simulation agent types implement this so the localizer can track them
/// without owning them.
pub trait NavAgent {
    fn id(&self) -> AgentId;
    fn position(&self) -> Vec2;
    fn radius(&self) -> f32;
}

/// A plain agent record, handy for tests and for callers that keep agent
/// state in parallel arrays.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentSnapshot {
    pub id:       AgentId,
    pub position: Vec2,
    pub radius:   f32,
}

impl AgentSnapshot {
    pub fn new(id: AgentId, position: Vec2, radius: f32) -> Self {
        Self { id, position, radius }
    }
}

impl NavAgent for AgentSnapshot {
    #[inline]
    fn id(&self) -> AgentId {
        self.id
    }

    #[inline]
    fn position(&self) -> Vec2 {
        self.position
    }

    #[inline]
    fn radius(&self) -> f32 {
        self.radius
    }
}
