// # 📂 `src/pipeline/distributor.rs`

use std::io::Read;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use tracing::{debug, error, info};

use crate::{
    constants::BLOCK_BUFFER_PREALLOC,
    pipeline::{
        config::PipelineConfig,
        io::{ByteReader, ReadStep},
        types::{Block, StageReport},
    },
    queue::{AdmissionMargin, BlockQueue, QueueError},
    telemetry::{Stage, StageTimes, TelemetryCounters},
    types::StreamError,
};

/// Splits the input into numbered blocks and feeds the DIST queue.
///
/// Full blocks need `available > 3` before they are queued, the trailing
/// partial block only `available > 1`. Sequence numbers start at 0 and are
/// assigned inside the queue's critical section.
pub struct Distributor<R: Read> {
    reader: ByteReader<R>,
    config: Arc<PipelineConfig>,
    queue: Arc<BlockQueue<Block>>,
    next_sequence: u32,
    counters: TelemetryCounters,
    stage_times: StageTimes,
}

impl<R: Read> Distributor<R> {
    pub fn new(reader: R, config: Arc<PipelineConfig>, queue: Arc<BlockQueue<Block>>) -> Self {
        Self::with_reader(ByteReader::new(reader), config, queue)
    }

    pub fn with_reader(
        reader: ByteReader<R>,
        config: Arc<PipelineConfig>,
        queue: Arc<BlockQueue<Block>>,
    ) -> Self {
        Self {
            reader,
            config,
            queue,
            next_sequence: 0,
            counters: TelemetryCounters::default(),
            stage_times: StageTimes::default(),
        }
    }

    /// Read until the input is exhausted, dispatch every block, then publish
    /// the total input length.
    pub fn run(mut self) -> Result<StageReport, StreamError> {
        let started = Instant::now();
        let block_size = self.config.block_size();
        let mut buffer: Vec<u8> = Vec::with_capacity(block_size.min(BLOCK_BUFFER_PREALLOC));
        let mut total: u64 = 0;

        info!("[DISTRIBUTOR] started, block size {} bytes", block_size);

        loop {
            match self.reader.next_byte() {
                ReadStep::Byte(b) => {
                    buffer.push(b);
                    total += 1;
                    if buffer.len() == block_size {
                        self.dispatch(&buffer, AdmissionMargin::FULL_BLOCK)?;
                        buffer.clear();
                    }
                }
                ReadStep::Retry => continue,
                ReadStep::Exhausted => break,
            }
        }

        if !buffer.is_empty() {
            debug!("[DISTRIBUTOR] flushing partial block of {} bytes", buffer.len());
            self.dispatch(&buffer, AdmissionMargin::PARTIAL_BLOCK)?;
        }

        self.counters.read_failures = self.reader.total_failures();
        self.config.set_total_input_length(total)?;
        info!(
            "[DISTRIBUTOR] input exhausted: {} bytes in {} block(s)",
            total, self.next_sequence
        );

        let waited = self.stage_times.get(Stage::Wait);
        self.stage_times.add(Stage::Read, started.elapsed().saturating_sub(waited));

        Ok(StageReport {
            counters: self.counters,
            stage_times: self.stage_times,
        })
    }

    fn dispatch(&mut self, data: &[u8], margin: AdmissionMargin) -> Result<(), StreamError> {
        let sequence = self.next_sequence;
        let next = sequence.checked_add(1).ok_or_else(|| {
            StreamError::Validation("block sequence space exhausted".into())
        })?;

        let config = &self.config;
        let start = Instant::now();
        let admitted = self
            .queue
            .push_with(margin, || Block {
                sequence,
                payload: Bytes::copy_from_slice(data),
                key_snapshot: config.key_snapshot(),
            })
            .map_err(|e| {
                if matches!(e, QueueError::Overflow { .. }) {
                    error!("[DISTRIBUTOR] {} while queuing block {}", e, sequence);
                }
                StreamError::from(e)
            })?;

        if admitted.waits > 0 {
            self.stage_times.add(Stage::Wait, start.elapsed());
            self.counters.admission_waits += u64::from(admitted.waits);
        }

        self.next_sequence = next;
        self.counters.add_dispatched(data.len());
        Ok(())
    }
}
