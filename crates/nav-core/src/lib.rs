//! `nav-core` — foundational types for the `nav-*` navigation mesh workspace.
//!
//! This crate is a dependency of every other `nav-*` crate.  It has no
//! `nav-*` dependencies and few external ones (`glam` for planar vectors,
//! `rand`, `log` and `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module         | Contents                                                   |
//! |----------------|------------------------------------------------------------|
//! | [`ids`]        | `AgentId`, `NodeId`, `EdgeId`, `ObstacleId`, `VertexId`    |
//! | [`geom`]       | `Vec2` (from `glam`), `det`, `left_of`, `norm_or_zero`      |
//! | [`time`]       | `Tick`, `SimConfig`                                        |
//! | [`rng`]        | `SimRng`                                                   |
//! | [`resource`]   | `ResourceRegistry`, `ResourceKey`                          |
//! | [`error`]      | `CoreError`, `CoreResult`                                  |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to plain-data types and     |
//! |         | enables `glam/serde` so `Vec2` fields serialize too.       |

pub mod error;
pub mod geom;
pub mod ids;
pub mod resource;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{CoreError, CoreResult};
pub use geom::{EPS, Vec2, det, left_of, norm_or_zero};
pub use ids::{AgentId, EdgeId, NodeId, ObstacleId, VertexId};
pub use resource::{ResourceKey, ResourceRegistry};
pub use rng::SimRng;
pub use time::{SimConfig, Tick};
