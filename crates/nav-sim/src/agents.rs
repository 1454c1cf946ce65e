//! Agent state in structure-of-arrays form.

use nav_core::{AgentId, Vec2};
use nav_localizer::AgentSnapshot;
use nav_path::Goal;

use crate::MoverConfig;

/// Structure-of-Arrays storage for all simulated agents.
///
/// Every `Vec` has exactly `count` elements and `AgentId` is the index into
/// all of them.  Mesh locations are not stored here; the localizer owns them.
#[derive(Clone, Debug, Default)]
pub struct AgentStore {
    /// Number of agents.  Equals the length of every SoA `Vec`.
    pub count: usize,

    pub position:   Vec<Vec2>,
    pub radius:     Vec<f32>,
    pub pref_speed: Vec<f32>,

    /// Current goal.  `None` for idle agents and agents whose goal could not
    /// be reached.
    pub goal: Vec<Option<Goal>>,

    /// Set once an agent comes within the arrival distance of its goal.
    pub arrived: Vec<bool>,
}

impl AgentStore {
    /// Agents at `positions`, all sharing the radius and speed of `params`.
    pub fn new(positions: Vec<Vec2>, params: &MoverConfig) -> Self {
        let count = positions.len();
        Self {
            count,
            position:   positions,
            radius:     vec![params.radius; count],
            pref_speed: vec![params.pref_speed; count],
            goal:       vec![None; count],
            arrived:    vec![false; count],
        }
    }

    pub fn ids(&self) -> impl Iterator<Item = AgentId> + use<> {
        (0..self.count as u32).map(AgentId)
    }

    /// The localizer's view of one agent.
    #[inline]
    pub fn snapshot(&self, agent: AgentId) -> AgentSnapshot {
        let i = agent.index();
        AgentSnapshot::new(agent, self.position[i], self.radius[i])
    }

    /// `true` while the agent has a goal it has not reached.
    #[inline]
    pub fn is_active(&self, agent: AgentId) -> bool {
        let i = agent.index();
        self.goal[i].is_some() && !self.arrived[i]
    }

    pub fn active_count(&self) -> usize {
        self.ids().filter(|&a| self.is_active(a)).count()
    }

    pub fn arrived_count(&self) -> usize {
        self.arrived.iter().filter(|&&a| a).count()
    }
}
