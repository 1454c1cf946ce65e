//! `nav-output` — simulation output writers for `nav-sim` runs.
//!
//! | Writer        | Files created                                 |
//! |---------------|-----------------------------------------------|
//! | [`CsvWriter`] | `agent_snapshots.csv`, `tick_summaries.csv`   |
//!
//! Writers implement [`OutputWriter`] and are driven by
//! [`SimOutputObserver`], which implements `nav_sim::SimObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use nav_output::{CsvWriter, SimOutputObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output"))?;
//! let mut obs = SimOutputObserver::new(writer, &sim.config);
//! sim.run(&mut obs)?;
//! if let Some(e) = obs.take_error() {
//!     eprintln!("output error: {e}");
//! }
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;


pub use self::csv::{CsvWriter, SNAPSHOT_FILE, SUMMARY_FILE};
pub use error::{OutputError, OutputResult};
pub use observer::SimOutputObserver;
pub use row::{AgentSnapshotRow, TickSummaryRow};
pub use writer::OutputWriter;
