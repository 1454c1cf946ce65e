//! Fluent builder for constructing a [`Sim`].

use std::sync::Arc;

use nav_core::{AgentId, SimConfig, SimRng, Tick, Vec2};
use nav_localizer::NavMeshLocalizer;
use nav_path::Goal;

use crate::{AgentStore, Mover, MoverConfig, Sim, SimError, SimResult};

/// Samples tried per scattered point before giving up.
const SCATTER_ATTEMPTS: usize = 1_000;

/// Fluent builder for [`Sim<M>`].
///
/// # Required inputs
///
/// - [`SimConfig`]: tick length, tick count, seed, track-all
/// - the shared [`NavMeshLocalizer`]
/// - `M: Mover`, e.g. [`StraightLineMover`][crate::StraightLineMover]
///
/// # Optional inputs (have defaults)
///
/// | Method               | Default                                 |
/// |----------------------|-----------------------------------------|
/// | `.mover_config(c)`   | `MoverConfig::default()`                |
/// | `.positions(v)`      | no agents                               |
/// | `.goals(v)`          | every agent idle                        |
/// | `.scatter(n)`        | `n` agents with random positions and static goals, seeded from `config.seed` |
///
/// # Example
///
/// ```rust,ignore
/// let localizer = load_localizer(Path::new("floor.nav"), true)?;
/// let mut sim = SimBuilder::new(config, localizer, StraightLineMover)
///     .scatter(500)
///     .build()?;
/// sim.run(&mut NoopObserver)?;
/// ```
pub struct SimBuilder<M: Mover> {
    config:       SimConfig,
    localizer:    Arc<NavMeshLocalizer>,
    mover:        M,
    mover_config: MoverConfig,
    positions:    Option<Vec<Vec2>>,
    goals:        Option<Vec<Option<Goal>>>,
    scatter:      Option<usize>,
}

impl<M: Mover> SimBuilder<M> {
    pub fn new(config: SimConfig, localizer: Arc<NavMeshLocalizer>, mover: M) -> Self {
        Self {
            config,
            localizer,
            mover,
            mover_config: MoverConfig::default(),
            positions:    None,
            goals:        None,
            scatter:      None,
        }
    }

    pub fn mover_config(mut self, mover_config: MoverConfig) -> Self {
        self.mover_config = mover_config;
        self
    }

    /// Explicit start positions, one per agent.
    pub fn positions(mut self, positions: Vec<Vec2>) -> Self {
        self.positions = Some(positions);
        self
    }

    /// Per-agent goals (must match the agent count).
    pub fn goals(mut self, goals: Vec<Option<Goal>>) -> Self {
        self.goals = Some(goals);
        self
    }

    /// Scatter `count` agents uniformly over the mesh, each with a static
    /// goal drawn the same way.  Exclusive with [`positions`](Self::positions).
    pub fn scatter(mut self, count: usize) -> Self {
        self.scatter = Some(count);
        self
    }

    /// Validate inputs, place every agent on the mesh and return a
    /// ready-to-run [`Sim`].
    pub fn build(self) -> SimResult<Sim<M>> {
        self.mover_config.validate()?;
        if !(self.config.time_step_secs > 0.0) {
            return Err(SimError::Config(format!(
                "time step must be positive, got {}",
                self.config.time_step_secs
            )));
        }

        // ── Resolve positions and goals ───────────────────────────────────
        let (positions, goals) = match (self.positions, self.scatter) {
            (Some(_), Some(_)) => {
                return Err(SimError::Config("explicit positions and scatter are exclusive".into()));
            }
            (Some(p), None) => {
                let n = p.len();
                let goals = match self.goals {
                    Some(g) if g.len() != n => {
                        return Err(SimError::AgentCountMismatch { expected: n, got: g.len(), what: "goals" });
                    }
                    Some(g) => g,
                    None => vec![None; n],
                };
                (p, goals)
            }
            (None, Some(n)) => {
                if self.goals.is_some() {
                    return Err(SimError::Config("scattered agents draw their own goals".into()));
                }
                let mut rng = SimRng::new(self.config.seed);
                let mut goal_rng = rng.child(1);
                let positions = scatter_points(&self.localizer, n, &mut rng)?;
                let goals = scatter_points(&self.localizer, n, &mut goal_rng)?
                    .into_iter()
                    .map(|p| Some(Goal::fixed(p)))
                    .collect();
                (positions, goals)
            }
            (None, None) => match self.goals {
                Some(g) if !g.is_empty() => {
                    return Err(SimError::AgentCountMismatch { expected: 0, got: g.len(), what: "goals" });
                }
                _ => (Vec::new(), Vec::new()),
            },
        };

        let mut agents = AgentStore::new(positions, &self.mover_config);
        agents.goal = goals;
        let count = agents.count;

        // ── Place agents ──────────────────────────────────────────────────
        self.localizer.set_track_all(self.config.track_all);
        for agent in agents.ids() {
            let snap = agents.snapshot(agent);
            if self.localizer.update_location(&snap, true).is_none() {
                return Err(SimError::AgentOffMesh { agent, position: snap.position });
            }
        }
        log::info!(
            "simulation ready: {count} agents, {} with goals, {} ticks",
            agents.active_count(),
            self.config.total_ticks
        );

        let needs_plan = agents.goal.iter().map(Option::is_some).collect();
        Ok(Sim {
            config:       self.config,
            now:          Tick::ZERO,
            agents,
            localizer:    self.localizer,
            mover:        self.mover,
            mover_config: self.mover_config,
            needs_plan,
            following:    vec![false; count],
            goal_moved:   vec![false; count],
        })
    }
}

/// `count` points drawn uniformly from the mesh bounding box, rejecting any
/// that miss every node.
fn scatter_points(localizer: &NavMeshLocalizer, count: usize, rng: &mut SimRng) -> SimResult<Vec<Vec2>> {
    let mesh = localizer.mesh();
    if mesh.node_count() == 0 {
        return Err(SimError::Config("cannot scatter agents over an empty mesh".into()));
    }
    let bounds = mesh.bounds();
    (0..count)
        .map(|i| {
            for _ in 0..SCATTER_ATTEMPTS {
                let p = Vec2::new(
                    rng.gen_range(bounds.min.x..=bounds.max.x),
                    rng.gen_range(bounds.min.y..=bounds.max.y),
                );
                if localizer.find_node(p).is_some() {
                    return Ok(p);
                }
            }
            Err(SimError::Config(format!(
                "no mesh point found for agent {} after {SCATTER_ATTEMPTS} samples",
                AgentId(i as u32)
            )))
        })
        .collect()
}
