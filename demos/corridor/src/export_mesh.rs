//! export_mesh — write a navigation mesh as JSON for plotting.
//!
//! Usage: `export_mesh [mesh.nav] [out.json]`.  Without a mesh path the
//! synthesized warehouse floor is exported; the default output is
//! `output/corridor/mesh.json`.

mod floor;

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::Result;
use serde_json::{Value, json};

use nav_mesh::{NavMesh, load_nav_mesh};

fn xy(p: nav_core::Vec2) -> Value {
    json!([p.x, p.y])
}

fn mesh_json(mesh: &NavMesh) -> Value {
    let vertices = mesh.vertices();
    let groups: Vec<Value> = mesh
        .groups()
        .iter()
        .map(|g| json!({ "name": g.name, "first": g.first.0, "last": g.last.0 }))
        .collect();
    let nodes: Vec<Value> = mesh
        .node_ids()
        .map(|id| {
            let node = mesh.node(id);
            json!({
                "id":        id.0,
                "group":     mesh.group_of(id).map(|g| g.name.as_str()),
                "center":    xy(node.center),
                "elevation": node.elevation(node.center),
                "polygon":   node.polygon(vertices).map(xy).collect::<Vec<_>>(),
            })
        })
        .collect();
    let edges: Vec<Value> = mesh
        .edges()
        .iter()
        .enumerate()
        .map(|(i, e)| {
            json!({
                "id":    i,
                "nodes": [e.nodes[0].0, e.nodes[1].0],
                "p0":    xy(e.p0()),
                "p1":    xy(e.p1()),
                "width": e.width,
            })
        })
        .collect();
    let obstacles: Vec<Value> = mesh
        .obstacle_vertex_lists()
        .iter()
        .map(|list| json!({ "closed": list.closed, "points": list.vertices.iter().copied().map(xy).collect::<Vec<_>>() }))
        .collect();

    json!({ "groups": groups, "nodes": nodes, "edges": edges, "obstacles": obstacles })
}

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let mesh = match args.next() {
        Some(p) => load_nav_mesh(&PathBuf::from(p))?,
        None => floor::build_floor()?,
    };
    let out = args.next().map_or_else(|| PathBuf::from("output/corridor/mesh.json"), PathBuf::from);
    if let Some(dir) = out.parent() {
        fs::create_dir_all(dir)?;
    }

    serde_json::to_writer_pretty(BufWriter::new(File::create(&out)?), &mesh_json(&mesh))?;
    println!(
        "Exported {} nodes, {} edges, {} obstacles to {}",
        mesh.node_count(),
        mesh.edge_count(),
        mesh.obstacle_count(),
        out.display()
    );
    Ok(())
}
