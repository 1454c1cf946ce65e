//! `nav-localizer` — where every agent is on the navigation mesh.
//!
//! Each agent has a [`Location`]: a bare node, or a corridor
//! ([`PortalPath`](nav_path::PortalPath)) whose current node is the agent's
//! node.  [`NavMeshLocalizer`] keeps the agent → location map and the
//! node → occupants index consistent under concurrent access, and updates
//! agents once per simulation step.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                  |
//! |-----------------|-----------------------------------------------------------|
//! | [`agent`]       | `NavAgent` trait, `AgentSnapshot`                         |
//! | [`location`]    | `Location` (node or locked corridor), `Corridor`          |
//! | [`occupancy`]   | `OccupancyIndex` (per-node occupant sets)                 |
//! | [`localizer`]   | `NavMeshLocalizer`                                        |
//! | [`proximity`]   | `NavMeshLocalizer::agents_near` over the occupant sets    |
//! | [`resource`]    | `load_localizer` (shared, deduplicated handle)            |
//! | [`error`]       | `LocalizerError`, `LocalizerResult<T>`                    |
//!
//! # Feature flags
//!
//! | Flag      | Effect                                                    |
//! |-----------|-----------------------------------------------------------|
//! | `serde`   | Derives `Serialize`/`Deserialize` on `AgentSnapshot`.     |
//! | `fx-hash` | FxHash instead of SipHash for the location map and the    |
//! |           | occupant sets.                                            |

pub mod agent;
pub mod error;
pub mod localizer;
pub mod location;
pub mod occupancy;
pub mod proximity;
pub mod resource;

#[cfg(test)]
mod tests;

pub use agent::{AgentSnapshot, NavAgent};
pub use error::{LocalizerError, LocalizerResult};
pub use localizer::NavMeshLocalizer;
pub use location::{Corridor, Location, SharedPath};
pub use occupancy::OccupancyIndex;
pub use resource::{LOCALIZER_LABEL, load_localizer, load_localizer_in};
