//! Node occupancy index: which agents are in each node.

use nav_core::{AgentId, NodeId};

#[cfg(feature = "fx-hash")]
pub(crate) type AgentSet = rustc_hash::FxHashSet<AgentId>;
#[cfg(not(feature = "fx-hash"))]
pub(crate) type AgentSet = std::collections::HashSet<AgentId>;

/// One occupant set per mesh node.
///
/// Not synchronized; the localizer guards it with the same lock as the
/// location map so that every move is one atomic step for readers.
#[derive(Debug, Default)]
pub struct OccupancyIndex {
    sets: Vec<AgentSet>,
}

impl OccupancyIndex {
    pub fn new(node_count: usize) -> Self {
        Self { sets: (0..node_count).map(|_| AgentSet::default()).collect() }
    }

    pub fn node_count(&self) -> usize {
        self.sets.len()
    }

    /// Agents in `node`, sorted by id.  Empty for an unknown node.
    pub fn occupants(&self, node: NodeId) -> Vec<AgentId> {
        let mut out: Vec<AgentId> = self.sets.get(node.index()).map(|s| s.iter().copied().collect()).unwrap_or_default();
        out.sort_unstable();
        out
    }

    /// Agents in `node`, in no particular order.
    pub(crate) fn iter(&self, node: NodeId) -> impl Iterator<Item = AgentId> + '_ {
        self.sets.get(node.index()).into_iter().flat_map(|s| s.iter().copied())
    }

    pub fn count(&self, node: NodeId) -> usize {
        self.sets.get(node.index()).map_or(0, AgentSet::len)
    }

    pub fn contains(&self, node: NodeId, agent: AgentId) -> bool {
        self.sets.get(node.index()).is_some_and(|s| s.contains(&agent))
    }

    /// Total number of placed agents.
    pub fn total(&self) -> usize {
        self.sets.iter().map(AgentSet::len).sum()
    }

    /// Move `agent` from `from` to `to`.  Either may be `NodeId::INVALID`
    /// (not placed / leaving the mesh).
    ///
    /// If the agent is not found in `from`, every set is scanned and the
    /// stray entry removed, so an agent never ends up in two nodes.
    pub fn relocate(&mut self, agent: AgentId, from: NodeId, to: NodeId) {
        if from == to {
            if let Some(set) = self.sets.get_mut(to.index()) {
                set.insert(agent);
            }
            return;
        }
        if from.is_valid() && !self.remove(from, agent) {
            log::warn!("agent {agent} was not an occupant of {from}; searching all nodes");
            self.evict(agent);
        }
        if let Some(set) = self.sets.get_mut(to.index()) {
            set.insert(agent);
        }
    }

    /// Remove `agent` from `node`.  Returns `false` if it was not there.
    pub fn remove(&mut self, node: NodeId, agent: AgentId) -> bool {
        self.sets.get_mut(node.index()).is_some_and(|s| s.remove(&agent))
    }

    /// Remove `agent` from whichever node holds it.
    pub fn evict(&mut self, agent: AgentId) -> Option<NodeId> {
        let i = self.sets.iter().position(|s| s.contains(&agent))?;
        self.sets[i].remove(&agent);
        Some(NodeId(i as u32))
    }

    /// Node of every placed agent, for consistency checks.
    pub(crate) fn assignments(&self) -> impl Iterator<Item = (AgentId, NodeId)> + '_ {
        self.sets
            .iter()
            .enumerate()
            .flat_map(|(i, s)| s.iter().map(move |&a| (a, NodeId(i as u32))))
    }
}
