//! Goals followed by corridors.

use nav_core::Vec2;

/// Whether a goal can move after a corridor toward it is planned.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GoalKind {
    #[default]
    Static,
    Moving,
}

#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Goal {
    pub position: Vec2,
    pub kind:     GoalKind,
}

impl Goal {
    pub fn fixed(position: Vec2) -> Self {
        Self { position, kind: GoalKind::Static }
    }

    pub fn moving(position: Vec2) -> Self {
        Self { position, kind: GoalKind::Moving }
    }

    #[inline]
    pub fn is_moving(&self) -> bool {
        self.kind == GoalKind::Moving
    }
}
