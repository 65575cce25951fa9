use std::fmt;

use bytes::Bytes;

use crate::telemetry::{StageTimes, TelemetryCounters};
use crate::types::StreamError;

/// Plaintext block produced by the distributor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub sequence: u32,
    pub payload: Bytes,
    /// Copy of the shared key taken when the block was queued.
    pub key_snapshot: Bytes,
}

/// Output of one encryptor, consumed exactly once by the merger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedBlock {
    pub sequence: u32,
    pub payload: Bytes,
}

impl EncryptedBlock {
    pub fn new(sequence: u32, payload: impl Into<Bytes>) -> Self {
        Self { sequence, payload: payload.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageId {
    Distributor,
    Encryptor(usize),
    Merger,
}

impl StageId {
    pub fn thread_name(&self) -> String {
        match self {
            StageId::Distributor => "ecu-distributor".into(),
            StageId::Encryptor(i) => format!("ecu-encryptor-{i}"),
            StageId::Merger => "ecu-merger".into(),
        }
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageId::Distributor => f.write_str("distributor"),
            StageId::Encryptor(i) => write!(f, "encryptor-{i}"),
            StageId::Merger => f.write_str("merger"),
        }
    }
}

/// What a stage hands back to the supervisor when it exits cleanly.
#[derive(Debug, Clone, Default)]
pub struct StageReport {
    pub counters: TelemetryCounters,
    pub stage_times: StageTimes,
}

#[derive(Debug)]
pub struct StageEvent {
    pub stage: StageId,
    pub outcome: Result<StageReport, StreamError>,
}
