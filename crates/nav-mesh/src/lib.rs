//! `nav-mesh` — the static navigation mesh and point location.
//!
//! A mesh partitions walkable space into convex polygons (nodes).  Each node
//! carries a plane that gives elevation over its footprint, so overlapping
//! nodes (a ramp above a floor) are distinguishable.  Nodes share edges
//! (portals); the non-walkable boundary is described by obstacle segments.
//!
//! Meshes are assembled with [`NavMeshBuilder`] (directly or through the
//! ASCII [`loader`]) and become read-only once
//! [`finalize`](NavMeshBuilder::finalize) succeeds.  A finalized
//! [`NavMesh`] is `Send + Sync` and needs no locking for queries.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                  |
//! |----------------|-----------------------------------------------------------|
//! | [`node`]       | `Node`, `Plane`, `Bounds`, polygon containment            |
//! | [`edge`]       | `Edge` (portal between two nodes)                         |
//! | [`obstacle`]   | `Obstacle`, `ObstacleVertexList`, `ObstacleSet`           |
//! | [`group`]      | `NodeGroup` (named contiguous node range)                 |
//! | [`builder`]    | `NavMeshBuilder`, `finalize`                              |
//! | [`mesh`]       | `NavMesh` (finalized mesh + R-tree over node bounds)      |
//! | [`search`]     | blind, group-scoped and neighbor point location           |
//! | [`loader`]     | ASCII `.nav` reader and writer                            |
//! | [`resource`]   | `load_nav_mesh_resource` (shared, deduplicated handle)    |
//! | [`error`]      | `MeshError`, `MeshResult<T>`                              |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on plain-data types.       |

pub mod builder;
pub mod edge;
pub mod error;
pub mod group;
pub mod loader;
pub mod mesh;
pub mod node;
pub mod obstacle;
pub mod resource;
pub mod search;


pub use builder::NavMeshBuilder;
pub use edge::Edge;
pub use error::{MeshError, MeshResult};
pub use group::NodeGroup;
pub use loader::{load_nav_mesh, parse_nav_mesh, write_nav_mesh};
pub use mesh::NavMesh;
pub use node::{Bounds, Node, Plane};
pub use obstacle::{Obstacle, ObstacleSet, ObstacleVertexList};
pub use resource::{NAV_MESH_LABEL, load_nav_mesh_in, load_nav_mesh_resource};
pub use search::HIGHEST;
