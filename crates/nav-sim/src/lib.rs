//! `nav-sim` — tick driver that moves agents through navigation-mesh
//! corridors.
//!
//! # Tick loop
//!
//! ```text
//! for tick in 0..config.total_ticks:
//!   ① Plan        — agents with a new goal (or a dropped corridor) get a
//!                   corridor from NavMeshLocalizer::plan_path.
//!   ② Goals       — moving goals are applied with update_path_for_goal.
//!   ③ Steer/move  — funnel steering per agent, then one Mover step
//!                   (parallel with the `parallel` feature).
//!   ④ Localize    — NavMeshLocalizer::update_location for every agent
//!                   (parallel with the `parallel` feature).
//!   ⑤ Arrivals    — agents near their goal stop and drop their corridor.
//!   ⑥ Contacts    — agents touching another agent (agents_near) or a
//!                   wall (obstacles_near) are counted into TickStats.
//!   ⑦ Observe     — SimObserver::on_tick_end / on_snapshot.
//! ```
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Runs phases ③, ④ and ⑥ on Rayon's thread pool.        |
//! | `fx-hash`  | FxHash occupancy sets in `nav-localizer`.              |
//! | `serde`    | Derives on `MoverConfig`, `TickStats` and lower crates. |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use nav_localizer::load_localizer;
//! use nav_sim::{NoopObserver, SimBuilder, StraightLineMover};
//!
//! let localizer = load_localizer(Path::new("floor.nav"), true)?;
//! let mut sim = SimBuilder::new(config, localizer, StraightLineMover)
//!     .scatter(1_000)
//!     .build()?;
//! sim.run(&mut NoopObserver)?;
//! ```

pub mod agents;
pub mod builder;
pub mod error;
pub mod mover;
pub mod observer;
pub mod sim;


pub use agents::AgentStore;
pub use builder::SimBuilder;
pub use error::{SimError, SimResult};
pub use mover::{MoveRequest, Mover, MoverConfig, StraightLineMover};
pub use observer::{NoopObserver, SimObserver, TickStats};
pub use sim::Sim;
