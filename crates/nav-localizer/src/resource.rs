//! Shared localizer handles.

use std::path::Path;
use std::sync::Arc;

use nav_core::ResourceRegistry;
use nav_mesh::load_nav_mesh_in;

use crate::{LocalizerError, LocalizerResult, NavMeshLocalizer};

/// Registry label for localizers.
pub const LOCALIZER_LABEL: &str = "navmesh_localizer";

/// Load the localizer for the mesh file at `path`, sharing one instance per
/// file.  The mesh is loaded through the same registry, so a localizer and a
/// direct `load_nav_mesh_resource` call share the mesh too.
///
/// With `needs_planner` an A* planner is attached if the shared localizer
/// has none yet.
pub fn load_localizer(path: &Path, needs_planner: bool) -> LocalizerResult<Arc<NavMeshLocalizer>> {
    load_localizer_in(ResourceRegistry::global(), path, needs_planner)
}

/// Like [`load_localizer`] with an explicit registry.
pub fn load_localizer_in(
    registry:      &ResourceRegistry,
    path:          &Path,
    needs_planner: bool,
) -> LocalizerResult<Arc<NavMeshLocalizer>> {
    let localizer = registry.get_or_load(path, LOCALIZER_LABEL, |p| {
        let mesh = load_nav_mesh_in(registry, p)?;
        log::info!("localizer ready for {} ({} nodes)", p.display(), mesh.node_count());
        Ok::<_, LocalizerError>(NavMeshLocalizer::new(mesh))
    })?;
    if needs_planner {
        localizer.ensure_planner();
    }
    Ok(localizer)
}
