//! Named, contiguous node ranges.

use nav_core::NodeId;

/// A named group of nodes occupying the inclusive id range `[first, last]`.
///
/// Groups scope point-location queries ("only search the second floor").
/// They never overlap; a node belongs to at most one group.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeGroup {
    pub name:  String,
    pub first: NodeId,
    pub last:  NodeId,
}

impl NodeGroup {
    pub fn new(name: impl Into<String>, first: NodeId, last: NodeId) -> Self {
        debug_assert!(first <= last, "node group range is reversed");
        Self { name: name.into(), first, last }
    }

    #[inline]
    pub fn contains(&self, node: NodeId) -> bool {
        self.first <= node && node <= self.last
    }

    /// Number of nodes in the group.
    #[inline]
    pub fn len(&self) -> usize {
        (self.last.0 - self.first.0) as usize + 1
    }

    /// Always `false`: a group covers at least one node.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Iterator over the group's node ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + use<> {
        (self.first.0..=self.last.0).map(NodeId)
    }
}
