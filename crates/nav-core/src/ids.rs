//! Strongly typed, zero-cost identifier wrappers.
//!
//! All IDs are `Copy + Ord + Hash` so they can be used as map keys and sorted
//! collection elements.  The inner integer is `pub` so mesh arrays can be
//! indexed with `id.0 as usize`, but callers should prefer `.index()`.
//!
//! The mesh arrays are addressed by position: `NodeId(3)` is the fourth node
//! in file order, `EdgeId(0)` the first edge, and so on.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID", equal to `u32::MAX`.
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            /// `false` only for the `INVALID` sentinel.
            #[inline(always)]
            pub fn is_valid(self) -> bool {
                self != Self::INVALID
            }
        }

        impl Default for $name {
            /// Returns the `INVALID` sentinel so uninitialized IDs are visibly invalid.
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$name> for usize {
            #[inline(always)]
            fn from(id: $name) -> usize {
                id.0 as usize
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// Identifier of a simulated agent.  Agents are tracked sparsely by the
    /// localizer, so ids need not be dense.
    pub struct AgentId(u32);
}

typed_id! {
    /// Index of a mesh node (convex polygon).
    pub struct NodeId(u32);
}

typed_id! {
    /// Index of a mesh edge (the portal shared by two nodes).
    pub struct EdgeId(u32);
}

typed_id! {
    /// Index of an obstacle segment in the mesh or an obstacle set.
    pub struct ObstacleId(u32);
}

typed_id! {
    /// Index of a mesh vertex.
    pub struct VertexId(u32);
}
