//! telemetry/counters.rs
//! Mutable counters collected by each stage.
//!
//! Summary: every stage owns its own `TelemetryCounters` and hands it to the
//! supervisor when it exits. The supervisor merges them into one snapshot.
//! No locks or atomics inside the stages.

use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

#[derive(Default, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryCounters {
    // distributor
    pub bytes_read: u64,
    pub blocks_dispatched: u64,
    pub read_failures: u64,

    // encryptors
    pub blocks_encrypted: u64,
    pub bytes_encrypted: u64,

    // merger
    pub blocks_received: u64,
    pub blocks_emitted: u64,
    pub bytes_emitted: u64,
    pub blocks_reordered: u64,
    pub reorder_high_water: u64,

    /// Times any producer slept on a below-margin queue.
    pub admission_waits: u64,
}

impl TelemetryCounters {
    pub fn add_dispatched(&mut self, block_len: usize) {
        self.blocks_dispatched += 1;
        self.bytes_read += block_len as u64;
    }

    pub fn add_encrypted(&mut self, block_len: usize) {
        self.blocks_encrypted += 1;
        self.bytes_encrypted += block_len as u64;
    }

    pub fn add_emitted(&mut self, block_len: usize) {
        self.blocks_emitted += 1;
        self.bytes_emitted += block_len as u64;
    }

    /// Record a block parked in the reorder buffer with `depth` slots now in use.
    pub fn add_reordered(&mut self, depth: usize) {
        self.blocks_reordered += 1;
        self.reorder_high_water = self.reorder_high_water.max(depth as u64);
    }

    pub fn merge(&mut self, other: &TelemetryCounters) {
        self.bytes_read += other.bytes_read;
        self.blocks_dispatched += other.blocks_dispatched;
        self.read_failures += other.read_failures;

        self.blocks_encrypted += other.blocks_encrypted;
        self.bytes_encrypted += other.bytes_encrypted;

        self.blocks_received += other.blocks_received;
        self.blocks_emitted += other.blocks_emitted;
        self.bytes_emitted += other.bytes_emitted;
        self.blocks_reordered += other.blocks_reordered;
        self.reorder_high_water = self.reorder_high_water.max(other.reorder_high_water);

        self.admission_waits += other.admission_waits;
    }
}

impl AddAssign for TelemetryCounters {
    fn add_assign(&mut self, rhs: Self) {
        self.merge(&rhs);
    }
}
