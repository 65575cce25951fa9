// # 📂 `src/pipeline/encryptor.rs`

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, trace};

use crate::{
    constants::ENCRYPTOR_RETRY_PAUSE,
    crypto::apply_keystream,
    pipeline::types::{Block, EncryptedBlock, StageReport},
    queue::{AdmissionMargin, BlockQueue, PushAttempt, QueueError},
    telemetry::{Stage, StageTimes, TelemetryCounters},
    types::StreamError,
};

/// Transform one block with its own key snapshot.
pub fn encrypt_block(block: Block) -> EncryptedBlock {
    let payload = apply_keystream(&block.payload, &block.key_snapshot);
    EncryptedBlock::new(block.sequence, payload)
}

/// One member of the encryptor pool: DIST -> cipher -> ENC.
pub struct EncryptorWorker {
    id: usize,
    input: Arc<BlockQueue<Block>>,
    output: Arc<BlockQueue<EncryptedBlock>>,
}

impl EncryptorWorker {
    pub fn new(
        id: usize,
        input: Arc<BlockQueue<Block>>,
        output: Arc<BlockQueue<EncryptedBlock>>,
    ) -> Self {
        Self { id, input, output }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// Runs until the DIST queue is closed by the supervisor.
    pub fn run(self) -> Result<StageReport, StreamError> {
        let mut counters = TelemetryCounters::default();
        let mut stage_times = StageTimes::default();

        debug!("[ENCRYPTOR-{}] started", self.id);

        loop {
            let block = match self.input.pop() {
                Ok(block) => block,
                Err(QueueError::Closed { .. }) => break,
                Err(e) => return Err(e.into()),
            };

            let sequence = block.sequence;
            let len = block.payload.len();
            let encrypted = stage_times.measure(Stage::Encrypt, || encrypt_block(block));
            counters.add_encrypted(len);
            trace!("[ENCRYPTOR-{}] block {} encrypted ({} bytes)", self.id, sequence, len);

            if !self.deliver(encrypted, &mut counters, &mut stage_times)? {
                break;
            }
        }

        debug!(
            "[ENCRYPTOR-{}] exiting after {} block(s)",
            self.id, counters.blocks_encrypted
        );
        Ok(StageReport { counters, stage_times })
    }

    /// Push into ENC, pausing while it sits below the full-block margin.
    /// Returns `false` when the queue was closed underneath us.
    fn deliver(
        &self,
        mut block: EncryptedBlock,
        counters: &mut TelemetryCounters,
        stage_times: &mut StageTimes,
    ) -> Result<bool, StreamError> {
        let start = Instant::now();
        let mut deferred = false;
        loop {
            match self.output.offer(block, AdmissionMargin::FULL_BLOCK, ENCRYPTOR_RETRY_PAUSE) {
                Ok(PushAttempt::Pushed) => break,
                Ok(PushAttempt::Deferred(back)) => {
                    counters.admission_waits += 1;
                    deferred = true;
                    block = back;
                }
                Err(QueueError::Closed { .. }) => return Ok(false),
                Err(e) => {
                    error!("[ENCRYPTOR-{}] {}", self.id, e);
                    return Err(e.into());
                }
            }
        }
        if deferred {
            stage_times.add(Stage::Wait, start.elapsed());
        }
        Ok(true)
    }
}

/// Build the `n` workers of the pool, numbered from 0.
pub fn encryptor_pool(
    n: usize,
    input: &Arc<BlockQueue<Block>>,
    output: &Arc<BlockQueue<EncryptedBlock>>,
) -> Vec<EncryptorWorker> {
    (0..n)
        .map(|id| EncryptorWorker::new(id, input.clone(), output.clone()))
        .collect()
}
