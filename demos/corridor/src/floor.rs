//! Synthetic warehouse floor shared by `corridor` (the sim) and
//! `export_mesh` (the sidecar).
//!
//! A grid of square cells with three rows of shelving blocking the floor,
//! plus a ramp column along the east wall that rises toward +x.

use nav_core::{NodeId, Vec2, VertexId};
use nav_mesh::{MeshResult, NavMesh, NavMeshBuilder, Node, Plane};

const CELL: f32 = 4.0;
const COLS: u32 = 12;
const ROWS: u32 = 8;

/// Rise per unit of x on the ramp column.
const RAMP_SLOPE: f32 = 0.25;

fn vid(c: u32, r: u32) -> VertexId {
    VertexId(r * (COLS + 1) + c)
}

fn cell(c: u32, r: u32) -> usize {
    (r * COLS + c) as usize
}

/// Shelving: every third column, leaving the first and last rows as
/// cross-aisles.
fn is_shelf(c: u32, r: u32) -> bool {
    c < COLS - 1 && c % 3 == 2 && r > 0 && r < ROWS - 1
}

fn cell_node(c: u32, r: u32, plane: Plane) -> Node {
    let center = Vec2::new((c as f32 + 0.5) * CELL, (r as f32 + 0.5) * CELL);
    Node::new(center, vec![vid(c, r), vid(c + 1, r), vid(c + 1, r + 1), vid(c, r + 1)], plane)
}

/// Build and finalize the floor mesh.
///
/// Groups: `"floor"` (every open cell west of the ramp) then `"ramp"`.
pub fn build_floor() -> MeshResult<NavMesh> {
    let mut b = NavMeshBuilder::new();
    for r in 0..=ROWS {
        for c in 0..=COLS {
            b.add_vertex(Vec2::new(c as f32 * CELL, r as f32 * CELL));
        }
    }

    let mut ids: Vec<Option<NodeId>> = vec![None; (COLS * ROWS) as usize];

    let floor_cells: Vec<(u32, u32)> = (0..ROWS)
        .flat_map(|r| (0..COLS - 1).map(move |c| (c, r)))
        .filter(|&(c, r)| !is_shelf(c, r))
        .collect();
    let first = b.add_group("floor", floor_cells.iter().map(|&(c, r)| cell_node(c, r, Plane::FLAT)))?;
    for (k, &(c, r)) in floor_cells.iter().enumerate() {
        ids[cell(c, r)] = Some(NodeId(first.0 + k as u32));
    }

    let ramp_x0 = (COLS - 1) as f32 * CELL;
    let ramp = Plane::new(RAMP_SLOPE, 0.0, -RAMP_SLOPE * ramp_x0);
    let first = b.add_group("ramp", (0..ROWS).map(|r| cell_node(COLS - 1, r, ramp)))?;
    for r in 0..ROWS {
        ids[cell(COLS - 1, r)] = Some(NodeId(first.0 + r));
    }

    // Portals to the east and north neighbors; walls everywhere else.
    for r in 0..ROWS {
        for c in 0..COLS {
            let Some(node) = ids[cell(c, r)] else { continue };
            let east = if c + 1 < COLS { ids[cell(c + 1, r)] } else { None };
            let north = if r + 1 < ROWS { ids[cell(c, r + 1)] } else { None };
            let west = if c > 0 { ids[cell(c - 1, r)] } else { None };
            let south = if r > 0 { ids[cell(c, r - 1)] } else { None };

            match east {
                Some(n) => {
                    b.add_edge(vid(c + 1, r), vid(c + 1, r + 1), node, n);
                }
                None => {
                    b.add_obstacle(vid(c + 1, r), vid(c + 1, r + 1), node, None);
                }
            }
            match north {
                Some(n) => {
                    b.add_edge(vid(c, r + 1), vid(c + 1, r + 1), node, n);
                }
                None => {
                    b.add_obstacle(vid(c + 1, r + 1), vid(c, r + 1), node, None);
                }
            }
            if west.is_none() {
                b.add_obstacle(vid(c, r + 1), vid(c, r), node, None);
            }
            if south.is_none() {
                b.add_obstacle(vid(c, r), vid(c + 1, r), node, None);
            }
        }
    }

    b.finalize()
}
