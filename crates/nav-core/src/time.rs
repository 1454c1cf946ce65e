//! Simulation time model.
//!
//! Time advances in fixed steps.  A `Tick` counts steps from the start of the
//! run; `SimConfig::time_step_secs` converts a tick count into simulated
//! seconds.  Keeping the canonical counter integral means tick comparisons
//! and output intervals are exact.

use std::fmt;

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute simulation step counter.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    /// Return the tick `n` steps after `self`.
    #[inline]
    pub fn offset(self, n: u64) -> Tick {
        Tick(self.0 + n)
    }

    /// Ticks elapsed from `earlier` to `self`.
    ///
    /// # Panics
    /// Panics in debug mode if `earlier > self`.
    #[inline]
    pub fn since(self, earlier: Tick) -> u64 {
        self.0 - earlier.0
    }
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    #[inline]
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl std::ops::Sub for Tick {
    type Output = u64;
    #[inline]
    fn sub(self, rhs: Tick) -> u64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Top-level simulation configuration.
///
/// Applications usually deserialize this (feature `serde`) and hand it to
/// the `nav-sim` builder.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimConfig {
    /// Simulated seconds per tick.  Default: 0.1.
    pub time_step_secs: f32,

    /// Total ticks to simulate.
    pub total_ticks: u64,

    /// Master RNG seed.  The same seed always produces identical results.
    pub seed: u64,

    /// Worker thread count passed to Rayon.  `None` uses all logical cores.
    pub num_threads: Option<usize>,

    /// Emit snapshots every N ticks.  1 = every tick.
    pub output_interval_ticks: u64,

    /// Re-localize every agent each tick, not only agents following a
    /// corridor.
    pub track_all: bool,
}

impl SimConfig {
    /// The tick at which the simulation ends (exclusive upper bound).
    #[inline]
    pub fn end_tick(&self) -> Tick {
        Tick(self.total_ticks)
    }

    /// Simulated seconds elapsed at the start of `tick`.
    #[inline]
    pub fn elapsed_secs(&self, tick: Tick) -> f64 {
        tick.0 as f64 * self.time_step_secs as f64
    }

    /// `true` when `tick` falls on an output boundary.
    #[inline]
    pub fn is_output_tick(&self, tick: Tick) -> bool {
        self.output_interval_ticks > 0 && tick.0 % self.output_interval_ticks == 0
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            time_step_secs:        0.1,
            total_ticks:           600,
            seed:                  0,
            num_threads:           None,
            output_interval_ticks: 1,
            track_all:             false,
        }
    }
}
