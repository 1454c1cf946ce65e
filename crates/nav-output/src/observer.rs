//! `SimOutputObserver<W>` bridges `SimObserver` to an `OutputWriter`.

use nav_core::{NodeId, SimConfig, Tick};
use nav_localizer::NavMeshLocalizer;
use nav_sim::{AgentStore, SimObserver, TickStats};

use crate::row::{AgentSnapshotRow, TickSummaryRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`SimObserver`] that writes agent snapshots and tick summaries to an
/// [`OutputWriter`].
///
/// Writer errors are stored because observer callbacks return nothing;
/// check [`take_error`][Self::take_error] after `sim.run()` returns.
pub struct SimOutputObserver<W: OutputWriter> {
    writer:         W,
    time_step_secs: f32,
    last_error:     Option<OutputError>,
}

impl<W: OutputWriter> SimOutputObserver<W> {
    pub fn new(writer: W, config: &SimConfig) -> Self {
        Self { writer, time_step_secs: config.time_step_secs, last_error: None }
    }

    /// The first write error, if any.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            if self.last_error.is_none() {
                log::error!("simulation output failed: {e}");
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SimObserver for SimOutputObserver<W> {
    fn on_tick_end(&mut self, stats: &TickStats) {
        let row = TickSummaryRow {
            tick:         stats.tick.0,
            elapsed_secs: stats.tick.0 as f64 * self.time_step_secs as f64,
            path_agents:  stats.path_agents as u64,
            arrivals:     stats.arrivals as u64,
            off_mesh:     stats.off_mesh as u64,
        };
        let result = self.writer.write_tick_summary(&row);
        self.store_err(result);
    }

    fn on_snapshot(&mut self, tick: Tick, agents: &AgentStore, localizer: &NavMeshLocalizer) {
        let rows: Vec<AgentSnapshotRow> = agents
            .ids()
            .map(|agent| {
                let snap = agents.snapshot(agent);
                AgentSnapshotRow {
                    tick:      tick.0,
                    agent_id:  agent.0,
                    x:         snap.position.x,
                    y:         snap.position.y,
                    elevation: localizer.elevation(&snap),
                    node:      localizer.node_of(agent).unwrap_or(NodeId::INVALID).0,
                    has_path:  localizer.has_path(agent),
                }
            })
            .collect();

        if !rows.is_empty() {
            let result = self.writer.write_snapshots(&rows);
            self.store_err(result);
        }
    }

    fn on_sim_end(&mut self, _final_tick: Tick) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}
