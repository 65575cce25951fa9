use std::io;
use thiserror::Error;

use crate::{
    crypto::CryptoError,
    queue::QueueError,
};

/// Unified pipeline error covering I/O, queues, the cipher, and invariant violations.
/// - `From<T>` impls enable `?` across the stages.
/// - Stage threads return it to the supervisor instead of exiting the process.
#[derive(Debug, Error)]
pub enum StreamError {
    /// I/O error on the input or output stream.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Queue-level error (overflow after admission, or closed queue).
    #[error("queue error: {0}")]
    Queue(#[from] QueueError),

    /// Key material / cipher error.
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// Out-of-order window larger than the reorder buffer.
    #[error("reorder buffer overflowed: {capacity} slots in use, cannot hold sequence {sequence}")]
    ReorderOverflow { capacity: usize, sequence: u32 },

    /// A stage thread could not be created.
    #[error("failed to spawn {stage} thread: {source}")]
    ThreadSpawn {
        stage: String,
        #[source]
        source: io::Error,
    },

    /// A stage thread panicked or vanished without reporting.
    #[error("stage {0} failed")]
    StageFailed(String),

    /// Invalid configuration value.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Generic validation failure with a descriptive message.
    #[error("validation error: {0}")]
    Validation(String),
}

impl StreamError {
    /// Invariant violations: the run is aborted and the binary exits with a distinct code.
    pub fn is_fatal_invariant(&self) -> bool {
        matches!(
            self,
            StreamError::Queue(QueueError::Overflow { .. })
                | StreamError::ReorderOverflow { .. }
                | StreamError::ThreadSpawn { .. }
                | StreamError::StageFailed(_)
        )
    }
}
