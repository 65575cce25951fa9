//! telemetry/snapshot.rs
//! Immutable summary of one pipeline run.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::telemetry::counters::TelemetryCounters;
use crate::telemetry::timers::{StageTimes, TelemetryTimer};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub counters: TelemetryCounters,
    pub encryptor_threads: usize,
    pub block_size: usize,
    pub throughput_bytes_per_sec: f64,
    pub elapsed: Duration,
    pub stage_times: StageTimes,

    /// Captured output when the sink is in-memory.
    #[serde(skip)]
    pub output: Option<Vec<u8>>,
}

impl TelemetrySnapshot {
    pub fn from(
        counters: &TelemetryCounters,
        timer: &TelemetryTimer,
        encryptor_threads: usize,
        block_size: usize,
    ) -> Self {
        let elapsed = timer.elapsed();
        let throughput = if elapsed.as_secs_f64() > 0.0 {
            counters.bytes_emitted as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        };

        Self {
            counters: counters.clone(),
            encryptor_threads,
            block_size,
            throughput_bytes_per_sec: throughput,
            elapsed,
            stage_times: timer.stage_times.clone(),
            output: None,
        }
    }

    pub fn attach_output(&mut self, buf: Vec<u8>) {
        self.output = Some(buf);
    }

    pub fn output_bytes(&self) -> u64 {
        self.counters.bytes_emitted
    }

    /// Conservation checks that hold for every completed run:
    /// - every byte read was emitted exactly once,
    /// - every dispatched block was encrypted, received and emitted,
    /// - the reorder buffer never held more blocks than were reordered.
    pub fn sanity_check(&self) -> bool {
        let c = &self.counters;
        c.bytes_read == c.bytes_emitted
            && c.bytes_read == c.bytes_encrypted
            && c.blocks_dispatched == c.blocks_encrypted
            && c.blocks_dispatched == c.blocks_received
            && c.blocks_received == c.blocks_emitted
            && c.reorder_high_water <= c.blocks_reordered
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
