// # 📂 `src/pipeline/merger.rs`
//
// Restores block order and writes the output stream.

use std::io::Write;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use tracing::{debug, error, info, trace};

use crate::{
    constants::MERGER_IDLE_WAIT,
    pipeline::{
        config::PipelineConfig,
        reorder::ReorderBuffer,
        types::{EncryptedBlock, StageReport},
    },
    queue::{BlockQueue, QueueError},
    telemetry::{Stage, StageTimes, TelemetryCounters},
    types::StreamError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStatus {
    Pending,
    Complete,
}

pub struct Merger<W: Write> {
    config: Arc<PipelineConfig>,
    input: Arc<BlockQueue<EncryptedBlock>>,
    out: W,
    next_expected: u32,
    received: u64,
    reorder: ReorderBuffer,
    counters: TelemetryCounters,
    stage_times: StageTimes,
}

impl<W: Write> Merger<W> {
    pub fn new(config: Arc<PipelineConfig>, input: Arc<BlockQueue<EncryptedBlock>>, out: W) -> Self {
        let reorder = ReorderBuffer::new(config.queues().reorder_capacity);
        Self {
            config,
            input,
            out,
            next_expected: 0,
            received: 0,
            reorder,
            counters: TelemetryCounters::default(),
            stage_times: StageTimes::default(),
        }
    }

    pub fn next_expected(&self) -> u32 {
        self.next_expected
    }

    pub fn received(&self) -> u64 {
        self.received
    }

    pub fn reorder(&self) -> &ReorderBuffer {
        &self.reorder
    }

    /// Pull from ENC until every block of the input has been written.
    ///
    /// When ENC is idle the merger sleeps for `MERGER_IDLE_WAIT` and then
    /// re-checks completion, since the total length may be published after
    /// the last block was already merged.
    pub fn run(mut self) -> Result<StageReport, StreamError> {
        info!("[MERGER] started, reorder capacity {}", self.reorder.capacity());

        loop {
            let step = match self.input.pop_timeout(MERGER_IDLE_WAIT) {
                Ok(Some(block)) => self.accept(block)?,
                Ok(None) => self.check_complete()?,
                Err(e @ QueueError::Closed { .. }) => {
                    debug!(
                        "[MERGER] ENC closed before completion at block {}",
                        self.next_expected
                    );
                    return Err(e.into());
                }
                Err(e) => return Err(e.into()),
            };
            if step == MergeStatus::Complete {
                break;
            }
        }

        info!(
            "[MERGER] complete: {} block(s), {} bytes written",
            self.counters.blocks_emitted, self.counters.bytes_emitted
        );
        Ok(StageReport {
            counters: self.counters,
            stage_times: self.stage_times,
        })
    }

    /// Take one encrypted block off the queue: write it if it is next in
    /// line, park it otherwise.
    pub fn accept(&mut self, block: EncryptedBlock) -> Result<MergeStatus, StreamError> {
        let sequence = block.sequence;

        if sequence == self.next_expected {
            self.emit(block.payload)?;
            self.drain()?;
        } else if sequence < self.next_expected {
            error!("[MERGER] block {} arrived after it was written", sequence);
            return Err(StreamError::Validation(format!(
                "block {sequence} already written (next expected {})",
                self.next_expected
            )));
        } else {
            let start = Instant::now();
            let depth = self.reorder.insert(block).map_err(|e| {
                error!("[MERGER] {}", e);
                e
            })?;
            self.stage_times.add(Stage::Reorder, start.elapsed());
            self.counters.add_reordered(depth);
            trace!(
                "[MERGER] parked block {} (waiting for {}, {} parked)",
                sequence, self.next_expected, depth
            );
            self.drain()?;
        }

        self.received += 1;
        self.counters.blocks_received += 1;
        self.check_complete()
    }

    /// Done once the total length is known and every block it implies has
    /// been received.
    pub fn check_complete(&mut self) -> Result<MergeStatus, StreamError> {
        let Some(expected) = self.config.expected_blocks() else {
            return Ok(MergeStatus::Pending);
        };
        if self.received < expected {
            return Ok(MergeStatus::Pending);
        }

        self.drain()?;
        if !self.reorder.is_empty() || u64::from(self.next_expected) != expected {
            return Err(StreamError::Validation(format!(
                "stream ended with gaps: wrote {} of {} block(s), parked {:?}",
                self.next_expected,
                expected,
                self.reorder.sequences()
            )));
        }

        let start = Instant::now();
        self.out.flush()?;
        self.stage_times.add(Stage::Write, start.elapsed());
        Ok(MergeStatus::Complete)
    }

    /// Write every parked block that has become contiguous.
    fn drain(&mut self) -> Result<(), StreamError> {
        loop {
            let start = Instant::now();
            let Some(payload) = self.reorder.take(self.next_expected) else {
                break;
            };
            self.stage_times.add(Stage::Reorder, start.elapsed());
            self.emit(payload)?;
        }
        Ok(())
    }

    fn emit(&mut self, payload: Bytes) -> Result<(), StreamError> {
        let start = Instant::now();
        self.out.write_all(&payload)?;
        self.stage_times.add(Stage::Write, start.elapsed());
        self.counters.add_emitted(payload.len());
        self.next_expected = self.next_expected.wrapping_add(1);
        Ok(())
    }
}
