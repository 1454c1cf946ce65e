//! `nav-path` — corridors through the navigation mesh.
//!
//! A planner turns a start and goal node into a [`PortalRoute`]: the
//! sequence of mesh edges (portals) an agent crosses.  Routes are immutable
//! and shared; each agent follows one through its own [`PortalPath`], which
//! tracks progress, smooths the crossing points with a funnel and reacts to
//! moving goals.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                   |
//! |---------------|------------------------------------------------------------|
//! | [`portal`]    | `Portal` (clearance query), `WayPortal` (oriented crossing) |
//! | [`route`]     | `PortalRoute`                                              |
//! | [`planner`]   | `Planner` trait, `AStarPlanner` with route cache           |
//! | [`funnel`]    | string-pulling crossing points                             |
//! | [`path`]      | `PortalPath`, `PathUpdate`, `Steering`                     |
//! | [`goal`]      | `Goal`, `GoalKind`                                         |
//! | [`error`]     | `PathError`, `PathResult<T>`                               |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on `Goal` and `GoalKind`.  |

pub mod error;
pub mod funnel;
pub mod goal;
pub mod path;
pub mod planner;
pub mod portal;
pub mod route;

#[cfg(test)]
mod tests;

pub use error::{PathError, PathResult};
pub use funnel::{Crossing, compute_crossing};
pub use goal::{Goal, GoalKind};
pub use path::{PathUpdate, PortalPath, Steering};
pub use planner::{AStarPlanner, Planner};
pub use portal::{Portal, WayPortal};
pub use route::PortalRoute;
