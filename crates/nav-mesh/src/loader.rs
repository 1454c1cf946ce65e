//! ASCII navigation mesh reader and writer.
//!
//! # File format
//!
//! Whitespace-separated tokens; `#` starts a comment that runs to the end
//! of the line.
//!
//! ```text
//! <vertex count>
//!   x y                      (one pair per vertex)
//! <edge count>
//!   v0 v1 node0 node1        (node1 < 0 marks a boundary edge)
//! <obstacle count>
//!   v0 v1 node next          (next < 0: last segment of an open chain)
//! <group name> <node count>  (repeated until end of file)
//!   cx cy
//!   <vertex count> v...
//!   A B C                    (elevation = A*x + B*y + C)
//!   <edge count> e...
//!   <obstacle count> o...
//! ```
//!
//! Groups take consecutive node ids in file order.
//!
//! A small two-node mesh:
//!
//! ```text
//! 6
//! 0 0  10 0  10 10  0 10  -10 0  -10 10
//! 1
//! 0 3  0 1
//! 0
//! floor 2
//! 5 5    4 0 1 2 3    0 0 0   1 0   0
//! -5 5   4 4 0 3 5    0 0 0   1 0   0
//! ```

use std::fmt::Write as _;
use std::io::{self, Read, Write};
use std::path::Path;

use nav_core::{EdgeId, NodeId, ObstacleId, Vec2, VertexId};

use crate::{MeshError, MeshResult, NavMesh, NavMeshBuilder, Node, Plane};

// ── Tokenizer ─────────────────────────────────────────────────────────────────

/// Whitespace tokenizer that tracks line numbers for error messages.
struct Tokens<'a> {
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
    words: std::str::SplitWhitespace<'a>,
    line:  usize,
}

impl<'a> Tokens<'a> {
    fn new(text: &'a str) -> Self {
        Self { lines: text.lines().enumerate(), words: "".split_whitespace(), line: 0 }
    }

    fn next_token(&mut self) -> Option<&'a str> {
        loop {
            if let Some(w) = self.words.next() {
                return Some(w);
            }
            let (i, raw) = self.lines.next()?;
            self.line = i + 1;
            let content = raw.split('#').next().unwrap_or("");
            self.words = content.split_whitespace();
        }
    }

    fn error(&self, msg: impl Into<String>) -> MeshError {
        MeshError::Parse { line: self.line, msg: msg.into() }
    }

    fn expect(&mut self, what: &str) -> MeshResult<&'a str> {
        self.next_token()
            .ok_or_else(|| self.error(format!("unexpected end of file, expected {what}")))
    }

    fn parse<T: std::str::FromStr>(&mut self, what: &str) -> MeshResult<T> {
        let tok = self.expect(what)?;
        tok.parse::<T>()
            .map_err(|_| self.error(format!("invalid {what}: {tok:?}")))
    }

    fn count(&mut self, what: &str) -> MeshResult<usize> {
        self.parse::<usize>(what)
    }

    fn f32(&mut self, what: &str) -> MeshResult<f32> {
        let v = self.parse::<f32>(what)?;
        if v.is_finite() { Ok(v) } else { Err(self.error(format!("non-finite {what}"))) }
    }

    fn index(&mut self, what: &str) -> MeshResult<u32> {
        self.parse::<u32>(what)
    }

    /// Index where a negative value means "none".
    fn optional_index(&mut self, what: &str) -> MeshResult<Option<u32>> {
        let v = self.parse::<i64>(what)?;
        if v < 0 {
            return Ok(None);
        }
        u32::try_from(v)
            .map(Some)
            .map_err(|_| self.error(format!("{what} {v} too large")))
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load and finalize a mesh from a file.
///
/// Failures are logged and returned; nothing is cached.
pub fn load_nav_mesh(path: &Path) -> MeshResult<NavMesh> {
    let result = std::fs::File::open(path)
        .map_err(MeshError::Io)
        .and_then(parse_nav_mesh);
    match &result {
        Ok(mesh) => log::info!(
            "loaded nav mesh {}: {} vertices, {} nodes, {} edges, {} obstacles, {} groups",
            path.display(),
            mesh.vertex_count(),
            mesh.node_count(),
            mesh.edge_count(),
            mesh.obstacle_count(),
            mesh.group_count(),
        ),
        Err(e) => log::error!("failed to load nav mesh {}: {e}", path.display()),
    }
    result
}

/// Like [`load_nav_mesh`] but accepts any `Read` source.
pub fn parse_nav_mesh<R: Read>(mut reader: R) -> MeshResult<NavMesh> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    parse_str(&text)?.finalize()
}

/// Write `mesh` in the ASCII format read by [`parse_nav_mesh`].
///
/// Nodes outside every group are written under generated group names.
pub fn write_nav_mesh<W: Write>(mesh: &NavMesh, mut writer: W) -> MeshResult<()> {
    let mut out = String::new();
    write_str(mesh, &mut out).map_err(|_| io::Error::other("formatting nav mesh failed"))?;
    writer.write_all(out.as_bytes())?;
    writer.flush()?;
    Ok(())
}

// ── Reading ───────────────────────────────────────────────────────────────────

fn parse_str(text: &str) -> MeshResult<NavMeshBuilder> {
    let mut t = Tokens::new(text);
    let mut b = NavMeshBuilder::new();

    let v_count = t.count("vertex count")?;
    if v_count == 0 {
        return Err(t.error("vertex count must be positive"));
    }
    for _ in 0..v_count {
        let x = t.f32("vertex x")?;
        let y = t.f32("vertex y")?;
        b.add_vertex(Vec2::new(x, y));
    }

    let e_count = t.count("edge count")?;
    for _ in 0..e_count {
        let v0 = VertexId(t.index("edge vertex")?);
        let v1 = VertexId(t.index("edge vertex")?);
        let n0 = NodeId(t.index("edge node")?);
        let n1 = t.optional_index("edge node")?.map_or(NodeId::INVALID, NodeId);
        b.add_edge(v0, v1, n0, n1);
    }

    let o_count = t.count("obstacle count")?;
    for _ in 0..o_count {
        let v0 = VertexId(t.index("obstacle vertex")?);
        let v1 = VertexId(t.index("obstacle vertex")?);
        let node = t.optional_index("obstacle node")?.map_or(NodeId::INVALID, NodeId);
        let next = t.optional_index("next obstacle")?.map(ObstacleId);
        b.add_obstacle(v0, v1, node, next);
    }

    while let Some(name) = t.next_token() {
        let n_count = t.count("group node count")?;
        if n_count == 0 {
            return Err(t.error(format!("node group {name:?} is empty")));
        }
        let mut nodes = Vec::with_capacity(n_count);
        for _ in 0..n_count {
            nodes.push(parse_node(&mut t)?);
        }
        b.add_group(name, nodes)?;
    }
    Ok(b)
}

fn parse_node(t: &mut Tokens<'_>) -> MeshResult<Node> {
    let center = Vec2::new(t.f32("node center x")?, t.f32("node center y")?);

    let vc = t.count("node vertex count")?;
    let vertices = (0..vc)
        .map(|_| t.index("node vertex").map(VertexId))
        .collect::<MeshResult<Vec<_>>>()?;

    let plane = Plane::new(t.f32("plane A")?, t.f32("plane B")?, t.f32("plane C")?);

    let mut node = Node::new(center, vertices, plane);

    let ec = t.count("node edge count")?;
    node.edges = (0..ec)
        .map(|_| t.index("node edge").map(EdgeId))
        .collect::<MeshResult<Vec<_>>>()?;

    let oc = t.count("node obstacle count")?;
    node.obstacles = (0..oc)
        .map(|_| t.index("node obstacle").map(ObstacleId))
        .collect::<MeshResult<Vec<_>>>()?;

    Ok(node)
}

// ── Writing ───────────────────────────────────────────────────────────────────

fn write_str(mesh: &NavMesh, out: &mut String) -> std::fmt::Result {
    writeln!(out, "{}", mesh.vertex_count())?;
    for v in mesh.vertices() {
        writeln!(out, "{} {}", v.x, v.y)?;
    }

    writeln!(out, "{}", mesh.edge_count())?;
    for e in mesh.edges() {
        let n1 = if e.nodes[1].is_valid() { i64::from(e.nodes[1].0) } else { -1 };
        writeln!(out, "{} {} {} {}", e.vertices[0].0, e.vertices[1].0, e.nodes[0].0, n1)?;
    }

    writeln!(out, "{}", mesh.obstacle_count())?;
    for (o, [v0, v1]) in mesh.obstacles().iter().zip(&mesh.obstacle_vertices) {
        let (v0, v1) = (v0.0, v1.0);
        let node = if o.node.is_valid() { i64::from(o.node.0) } else { -1 };
        let next = o.next.map_or(-1, |n| i64::from(n.0));
        writeln!(out, "{v0} {v1} {node} {next}")?;
    }

    for (name, first, last) in group_runs(mesh) {
        writeln!(out, "{name} {}", last - first + 1)?;
        for id in first..=last {
            let n = mesh.node(NodeId(id));
            writeln!(out, "{} {}", n.center.x, n.center.y)?;
            write_list(out, n.vertices.iter().map(|v| v.0))?;
            writeln!(out, "{} {} {}", n.plane.a, n.plane.b, n.plane.c)?;
            write_list(out, n.edges.iter().map(|e| e.0))?;
            write_list(out, n.obstacles.iter().map(|o| o.0))?;
        }
    }
    Ok(())
}

fn write_list(out: &mut String, items: impl ExactSizeIterator<Item = u32>) -> std::fmt::Result {
    write!(out, "{}", items.len())?;
    for i in items {
        write!(out, " {i}")?;
    }
    writeln!(out)
}

/// Cover every node with a named run: declared groups plus generated names
/// for the gaps between them.
fn group_runs(mesh: &NavMesh) -> Vec<(String, u32, u32)> {
    let mut runs = Vec::new();
    let mut next = 0u32;
    let total = mesh.node_count() as u32;
    for g in mesh.groups() {
        if g.first.0 > next {
            runs.push((format!("ungrouped_{next}"), next, g.first.0 - 1));
        }
        runs.push((g.name.clone(), g.first.0, g.last.0));
        next = g.last.0 + 1;
    }
    if next < total {
        runs.push((format!("ungrouped_{next}"), next, total - 1));
    }
    runs
}
