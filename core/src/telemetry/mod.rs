//! telemetry/mod.rs
//! Counters, stage timers, and the immutable per-run snapshot.
//!
//! - Each stage thread owns its counters; the supervisor merges them.
//! - Snapshots serialize with serde for `--stats` output.

pub mod counters;
pub mod timers;
pub mod snapshot;

pub use counters::*;
pub use timers::*;
pub use snapshot::*;
