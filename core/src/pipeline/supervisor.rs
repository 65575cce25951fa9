// ## 📂 File: `src/pipeline/supervisor.rs`
// ## Pure pipeline wiring (no cipher logic)

use std::io::{Read, Write};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, Scope};

use crossbeam::channel::{unbounded, Sender};
use tracing::{debug, error, info, warn};

use crate::{
    pipeline::{
        config::PipelineConfig,
        distributor::Distributor,
        encryptor::encryptor_pool,
        merger::Merger,
        types::{Block, EncryptedBlock, StageEvent, StageId, StageReport},
    },
    queue::{BlockQueue, QueueError},
    telemetry::{TelemetryCounters, TelemetrySnapshot, TelemetryTimer},
    types::StreamError,
};

/// Run distributor -> encryptor pool -> merger over `reader` / `writer`.
///
/// Every stage reports back on one event channel. The run ends when the
/// merger reports completion or any stage fails; either way both queues are
/// closed so the remaining threads drain out before the scope joins them.
pub fn run_pipeline<R, W>(
    reader: R,
    mut writer: W,
    config: Arc<PipelineConfig>,
) -> Result<TelemetrySnapshot, StreamError>
where
    R: Read + Send,
    W: Write + Send,
{
    config.validate()?;

    let queues = config.queues();
    let dist = Arc::new(BlockQueue::<Block>::new("DIST", queues.dist_capacity)?);
    let enc = Arc::new(BlockQueue::<EncryptedBlock>::new("ENC", queues.enc_capacity)?);
    let threads = config.encryptor_threads();

    let mut timer = TelemetryTimer::new();
    let mut counters = TelemetryCounters::default();

    info!(
        "[PIPELINE] start: {} encryptor(s), block {} bytes, key {} bytes",
        threads,
        config.block_size(),
        config.key_size()
    );

    let merger = Merger::new(config.clone(), enc.clone(), &mut writer);
    let distributor = Distributor::new(reader, config.clone(), dist.clone());

    let (failure, merger_done) = thread::scope(|scope| {
        let (event_tx, event_rx) = unbounded::<StageEvent>();
        let mut failure: Option<StreamError> = None;
        let mut merger_done = false;

        // ---- Stages: consumers first so producers never outrun them ----
        let mut spawned = spawn_stage(scope, StageId::Merger, &event_tx, move || merger.run());

        if spawned.is_ok() {
            for worker in encryptor_pool(threads, &dist, &enc) {
                let id = StageId::Encryptor(worker.id());
                spawned = spawn_stage(scope, id, &event_tx, move || worker.run());
                if spawned.is_err() {
                    break;
                }
            }
        }

        if spawned.is_ok() {
            spawned = spawn_stage(scope, StageId::Distributor, &event_tx, move || distributor.run());
        }

        if let Err(e) = spawned {
            error!("[PIPELINE] {}", e);
            dist.close();
            enc.close();
            record_failure(&mut failure, e);
        }

        // Only stage threads hold senders from here on.
        drop(event_tx);

        // ---- Supervise ----
        for event in event_rx.iter() {
            match event.outcome {
                Ok(report) => {
                    debug!("[PIPELINE] {} finished", event.stage);
                    counters.merge(&report.counters);
                    timer.stage_times.merge(&report.stage_times);
                    if event.stage == StageId::Merger {
                        merger_done = true;
                        dist.close();
                        enc.close();
                    }
                }
                Err(e) => {
                    if is_closed(&e) {
                        debug!("[PIPELINE] {} stopped: {}", event.stage, e);
                    } else {
                        error!("[PIPELINE] {} failed: {}", event.stage, e);
                    }
                    dist.close();
                    enc.close();
                    record_failure(&mut failure, e);
                }
            }
        }

        (failure, merger_done)
    });

    timer.finish();

    if let Some(e) = failure {
        return Err(e);
    }
    if !merger_done {
        warn!("[PIPELINE] all stages exited but the merger never completed");
        return Err(StreamError::StageFailed(StageId::Merger.to_string()));
    }

    let snapshot = TelemetrySnapshot::from(&counters, &timer, threads, config.block_size());
    info!(
        "[PIPELINE] done: {} bytes in {:?} ({})",
        snapshot.output_bytes(),
        snapshot.elapsed,
        snapshot.stage_times.summary()
    );
    Ok(snapshot)
}

/// Spawn one named stage thread. Panics are caught and reported as
/// `StageFailed` so the supervisor always hears back.
fn spawn_stage<'scope, 'env, F>(
    scope: &'scope Scope<'scope, 'env>,
    stage: StageId,
    events: &Sender<StageEvent>,
    body: F,
) -> Result<(), StreamError>
where
    F: FnOnce() -> Result<StageReport, StreamError> + Send + 'scope,
{
    let events = events.clone();
    thread::Builder::new()
        .name(stage.thread_name())
        .spawn_scoped(scope, move || {
            let outcome = match panic::catch_unwind(AssertUnwindSafe(body)) {
                Ok(outcome) => outcome,
                Err(_) => {
                    error!("[PIPELINE] {} panicked", stage);
                    Err(StreamError::StageFailed(stage.to_string()))
                }
            };
            // Receiver outlives every stage inside the scope.
            let _ = events.send(StageEvent { stage, outcome });
        })
        .map(|_| ())
        .map_err(|source| StreamError::ThreadSpawn {
            stage: stage.to_string(),
            source,
        })
}

fn is_closed(e: &StreamError) -> bool {
    matches!(e, StreamError::Queue(QueueError::Closed { .. }))
}

/// Keep the first real failure; a closed-queue error is only a symptom of one.
fn record_failure(slot: &mut Option<StreamError>, e: StreamError) {
    let replace = match slot.as_ref() {
        None => true,
        Some(current) => is_closed(current) && !is_closed(&e),
    };
    if replace {
        *slot = Some(e);
    }
}
