//! corridor — agents crossing a warehouse floor through mesh corridors.
//!
//! Loads a mesh from the path given as the first argument, or synthesizes
//! a shelved warehouse floor and writes it to `output/corridor/floor.nav`.
//! Agents are scattered over the mesh with random goals; agent 0 chases
//! agent 1 with a moving goal.  Snapshots and tick summaries are written
//! as CSV.
//!
//! `RUST_LOG=debug` shows corridor replans.

mod floor;

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};

use nav_core::{AgentId, SimConfig, Tick};
use nav_localizer::{NavMeshLocalizer, load_localizer};
use nav_mesh::write_nav_mesh;
use nav_output::{CsvWriter, OutputWriter, SimOutputObserver};
use nav_path::Goal;
use nav_sim::{AgentStore, MoverConfig, SimBuilder, SimObserver, StraightLineMover, TickStats};

use floor::build_floor;

// ── Constants ─────────────────────────────────────────────────────────────────

const AGENT_COUNT:           usize = 200;
const SEED:                  u64   = 42;
const TIME_STEP_SECS:        f32   = 0.1;
const TOTAL_TICKS:           u64   = 900;  // 90 s
const OUTPUT_INTERVAL_TICKS: u64   = 10;   // one snapshot per simulated second
const OUT_DIR:               &str  = "output/corridor";

const CHASER: AgentId = AgentId(0);
const TARGET: AgentId = AgentId(1);

/// The chaser restarts once its target is this far away again.
const CHASE_RESUME: f32 = 2.0;

// ── Observer wrapper to count rows ───────────────────────────────────────────

struct CountingObserver<W: OutputWriter> {
    inner:         SimOutputObserver<W>,
    snapshot_rows: usize,
    arrivals:      usize,
    replans_lost:  usize,
    peak_crowd:    usize,
    peak_walls:    usize,
}

impl<W: OutputWriter> CountingObserver<W> {
    fn new(inner: SimOutputObserver<W>) -> Self {
        Self { inner, snapshot_rows: 0, arrivals: 0, replans_lost: 0, peak_crowd: 0, peak_walls: 0 }
    }
}

impl<W: OutputWriter> SimObserver for CountingObserver<W> {
    fn on_tick_end(&mut self, stats: &TickStats) {
        self.arrivals += stats.arrivals;
        self.replans_lost += stats.unreachable;
        self.peak_crowd = self.peak_crowd.max(stats.agent_contacts);
        self.peak_walls = self.peak_walls.max(stats.wall_contacts);
        self.inner.on_tick_end(stats);
    }

    fn on_snapshot(&mut self, tick: Tick, agents: &AgentStore, localizer: &NavMeshLocalizer) {
        self.snapshot_rows += agents.count;
        self.inner.on_snapshot(tick, agents, localizer);
    }

    fn on_sim_end(&mut self, final_tick: Tick) {
        self.inner.on_sim_end(final_tick);
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("=== corridor: navigation mesh localization ===");
    println!("Agents: {AGENT_COUNT}  |  Ticks: {TOTAL_TICKS}  |  Seed: {SEED}");
    println!();

    fs::create_dir_all(OUT_DIR)?;

    // 1. Mesh: from the command line or synthesized.
    let mesh_path = match std::env::args().nth(1) {
        Some(p) => PathBuf::from(p),
        None => {
            let mesh = build_floor()?;
            let path = Path::new(OUT_DIR).join("floor.nav");
            write_nav_mesh(&mesh, File::create(&path)?)?;
            log::info!("synthesized floor with {} nodes at {}", mesh.node_count(), path.display());
            path
        }
    };

    // 2. Localizer with planner, shared through the resource registry.
    let localizer = load_localizer(&mesh_path, true)
        .with_context(|| format!("loading {}", mesh_path.display()))?;
    let mesh = localizer.mesh();
    println!(
        "Mesh: {} nodes, {} edges, {} obstacles, {} groups",
        mesh.node_count(),
        mesh.edge_count(),
        mesh.obstacle_count(),
        mesh.group_count()
    );

    // 3. Sim config.
    let config = SimConfig {
        time_step_secs:        TIME_STEP_SECS,
        total_ticks:           TOTAL_TICKS,
        seed:                  SEED,
        num_threads:           None, // all logical cores
        output_interval_ticks: OUTPUT_INTERVAL_TICKS,
        track_all:             false,
    };
    if let Some(n) = config.num_threads {
        rayon::ThreadPoolBuilder::new().num_threads(n).build_global()?;
    }

    // 4. Build sim.
    let mover = MoverConfig { radius: 0.3, pref_speed: 1.4, ..MoverConfig::default() };
    let mut sim = SimBuilder::new(config.clone(), localizer, StraightLineMover)
        .mover_config(mover)
        .scatter(AGENT_COUNT)
        .build()?;
    let target_pos = sim.agents.position[TARGET.index()];
    sim.set_goal(CHASER, Goal::moving(target_pos));

    // 5. Output.
    let writer = CsvWriter::new(Path::new(OUT_DIR))?;
    let mut obs = CountingObserver::new(SimOutputObserver::new(writer, &config));

    // 6. Run, steering the chaser's goal onto its target every tick.
    let t0 = Instant::now();
    for _ in 0..config.total_ticks {
        let target = sim.agents.position[TARGET.index()];
        let chaser = CHASER.index();
        if sim.agents.arrived[chaser] {
            if sim.agents.position[chaser].distance(target) > CHASE_RESUME {
                sim.set_goal(CHASER, Goal::moving(target));
            }
        } else if sim.agents.goal[chaser].is_some() {
            sim.move_goal(CHASER, target)?;
        }
        sim.run_ticks(1, &mut obs)?;
    }
    obs.on_sim_end(sim.now);
    let elapsed = t0.elapsed();

    if let Some(e) = obs.inner.take_error() {
        eprintln!("output error: {e}");
    }

    // 7. Summary.
    println!("Simulation complete in {:.3} s", elapsed.as_secs_f64());
    println!("  arrivals            : {} / {}", obs.arrivals, AGENT_COUNT);
    println!("  goals given up      : {}", obs.replans_lost);
    println!("  still on a corridor : {}", sim.localizer.path_agent_count());
    println!("  peak agent contacts : {}", obs.peak_crowd);
    println!("  peak wall contacts  : {}", obs.peak_walls);
    let near: Vec<String> = sim
        .neighbors(CHASER, CHASE_RESUME * 2.0)
        .iter()
        .map(|(a, d_sq)| format!("{}@{:.2}", a.0, d_sq.sqrt()))
        .collect();
    println!("  near the chaser     : {}", if near.is_empty() { "-".to_owned() } else { near.join(" ") });
    println!("  agent_snapshots.csv : {} rows", obs.snapshot_rows);
    println!("  tick_summaries.csv  : {} rows", config.total_ticks);
    println!();

    // 8. First agents' final state.
    println!("{:<8} {:>8} {:>8} {:>8} {:>10} {:<8}", "Agent", "x", "y", "elev", "Node", "Arrived");
    println!("{}", "-".repeat(56));
    for agent in sim.agents.ids().take(10) {
        let snap = sim.agents.snapshot(agent);
        let node = sim.node_of(agent).map_or_else(|| "-".to_owned(), |n| n.0.to_string());
        let elev = sim.localizer.elevation(&snap).unwrap_or(f32::NAN);
        println!(
            "{:<8} {:>8.2} {:>8.2} {:>8.2} {:>10} {:<8}",
            agent.0,
            snap.position.x,
            snap.position.y,
            elev,
            node,
            if sim.agents.arrived[agent.index()] { "yes" } else { "no" },
        );
    }

    Ok(())
}
