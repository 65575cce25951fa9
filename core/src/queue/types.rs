use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    /// The write index caught up with the read index. The slot was still written.
    #[error("{queue} ring buffer overflow")]
    Overflow { queue: &'static str },

    /// The queue was shut down by the supervisor.
    #[error("{queue} queue closed")]
    Closed { queue: &'static str },

    #[error("queue capacity {capacity} too small, need at least {min}")]
    InvalidCapacity { capacity: usize, min: usize },
}

/// Free slots a producer requires beyond the one it is about to fill.
///
/// Admission succeeds only when `available() > margin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdmissionMargin(pub usize);

impl AdmissionMargin {
    pub const FULL_BLOCK: AdmissionMargin = AdmissionMargin(crate::constants::FULL_BLOCK_MARGIN);
    pub const PARTIAL_BLOCK: AdmissionMargin = AdmissionMargin(crate::constants::PARTIAL_BLOCK_MARGIN);

    pub fn admits(&self, available: usize) -> bool {
        available > self.0
    }
}
