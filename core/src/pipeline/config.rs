//! Shared, read-only run configuration.
//!
//! Everything is fixed before the stage threads start, except the total input
//! length: the distributor records it once when the input is exhausted and the
//! merger polls it from another thread.

use std::fmt;
use std::sync::OnceLock;

use bytes::Bytes;

use crate::constants::{
    DIST_QUEUE_CAPACITY, ENC_QUEUE_CAPACITY, MAX_BLOCK_SIZE, MAX_ENCRYPTOR_THREADS,
    MIN_ENCRYPTOR_THREADS, MIN_QUEUE_CAPACITY, REORDER_CAPACITY,
};
use crate::crypto::KeyMaterial;
use crate::types::StreamError;

/// Capacities of the two hand-off queues and of the reorder buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueProfile {
    pub dist_capacity: usize,
    pub enc_capacity: usize,
    pub reorder_capacity: usize,
}

impl Default for QueueProfile {
    fn default() -> Self {
        Self {
            dist_capacity: DIST_QUEUE_CAPACITY,
            enc_capacity: ENC_QUEUE_CAPACITY,
            reorder_capacity: REORDER_CAPACITY,
        }
    }
}

impl QueueProfile {
    pub fn validate(&self) -> Result<(), StreamError> {
        for (name, cap) in [("dist", self.dist_capacity), ("enc", self.enc_capacity)] {
            if cap < MIN_QUEUE_CAPACITY {
                return Err(StreamError::Config(format!(
                    "{name} queue capacity {cap} cannot admit a full block (min {MIN_QUEUE_CAPACITY})"
                )));
            }
        }
        if self.reorder_capacity == 0 {
            return Err(StreamError::Config("reorder capacity must be > 0".into()));
        }
        Ok(())
    }
}

pub struct PipelineConfig {
    key: KeyMaterial,
    key_bytes: Bytes,
    block_size: usize,
    encryptor_threads: usize,
    queues: QueueProfile,
    total_input_length: OnceLock<u64>,
}

// Key bytes stay out of `{:?}` output.
impl fmt::Debug for PipelineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineConfig")
            .field("key", &self.key)
            .field("block_size", &self.block_size)
            .field("encryptor_threads", &self.encryptor_threads)
            .field("queues", &self.queues)
            .field("total_input_length", &self.total_input_length.get())
            .finish()
    }
}

impl PipelineConfig {
    /// Block size defaults to `key_size * 8`.
    pub fn new(key: KeyMaterial, encryptor_threads: usize) -> Self {
        let block_size = key.block_size();
        let key_bytes = Bytes::copy_from_slice(key.as_bytes());
        Self {
            key,
            key_bytes,
            block_size,
            encryptor_threads,
            queues: QueueProfile::default(),
            total_input_length: OnceLock::new(),
        }
    }

    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    pub fn with_queues(mut self, queues: QueueProfile) -> Self {
        self.queues = queues;
        self
    }

    pub fn validate(&self) -> Result<(), StreamError> {
        if self.block_size == 0 {
            return Err(StreamError::Config("block size must be > 0".into()));
        }
        if self.block_size > MAX_BLOCK_SIZE {
            return Err(StreamError::Config(format!(
                "block size {} exceeds maximum {}",
                self.block_size, MAX_BLOCK_SIZE
            )));
        }
        if !(MIN_ENCRYPTOR_THREADS..=MAX_ENCRYPTOR_THREADS).contains(&self.encryptor_threads) {
            return Err(StreamError::Config(format!(
                "invalid encryptor thread count {}, must be {}..={}",
                self.encryptor_threads, MIN_ENCRYPTOR_THREADS, MAX_ENCRYPTOR_THREADS
            )));
        }
        self.queues.validate()
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn key_size(&self) -> usize {
        self.key.len()
    }

    pub fn key(&self) -> &KeyMaterial {
        &self.key
    }

    /// Copy the shared key into `dest` (up to `dest.len()` bytes).
    pub fn copy_key(&self, dest: &mut [u8]) -> usize {
        let n = dest.len().min(self.key_bytes.len());
        dest[..n].copy_from_slice(&self.key_bytes[..n]);
        n
    }

    /// Fresh handle on the shared key for a new block.
    pub fn key_snapshot(&self) -> Bytes {
        self.key_bytes.clone()
    }

    pub fn encryptor_threads(&self) -> usize {
        self.encryptor_threads
    }

    pub fn queues(&self) -> QueueProfile {
        self.queues
    }

    /// Record the total input length. Only the first call wins.
    pub fn set_total_input_length(&self, len: u64) -> Result<(), StreamError> {
        self.total_input_length.set(len).map_err(|_| {
            StreamError::Validation("total input length already recorded".into())
        })
    }

    /// `None` until the distributor has finished reading.
    pub fn total_input_length(&self) -> Option<u64> {
        self.total_input_length.get().copied()
    }

    /// Number of blocks the distributor produced for the recorded length.
    pub fn expected_blocks(&self) -> Option<u64> {
        let bs = self.block_size as u64;
        if bs == 0 {
            return None;
        }
        self.total_input_length().map(|len| len.div_ceil(bs))
    }
}
