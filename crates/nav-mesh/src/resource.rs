//! Shared mesh handles.

use std::path::Path;
use std::sync::Arc;

use nav_core::ResourceRegistry;

use crate::{MeshResult, NavMesh, load_nav_mesh};

/// Registry label for finalized meshes.
pub const NAV_MESH_LABEL: &str = "navmesh";

/// Load `path` once per process and share the finalized mesh.
///
/// Repeated calls with the same file (relative or absolute) return the same
/// `Arc` for as long as any handle is alive.
pub fn load_nav_mesh_resource(path: &Path) -> MeshResult<Arc<NavMesh>> {
    load_nav_mesh_in(ResourceRegistry::global(), path)
}

/// Like [`load_nav_mesh_resource`] with an explicit registry.
pub fn load_nav_mesh_in(registry: &ResourceRegistry, path: &Path) -> MeshResult<Arc<NavMesh>> {
    registry.get_or_load(path, NAV_MESH_LABEL, load_nav_mesh)
}
