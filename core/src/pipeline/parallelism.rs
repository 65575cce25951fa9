use crate::constants::{MAX_ENCRYPTOR_THREADS, MIN_ENCRYPTOR_THREADS};
use crate::types::StreamError;

/// How many encryptor threads to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParallelismProfile {
    pub encryptor_threads: usize,
}

impl ParallelismProfile {
    pub fn single_threaded() -> Self {
        Self { encryptor_threads: 1 }
    }

    pub fn fixed(encryptor_threads: usize) -> Result<Self, StreamError> {
        if !(MIN_ENCRYPTOR_THREADS..=MAX_ENCRYPTOR_THREADS).contains(&encryptor_threads) {
            return Err(StreamError::Config(format!(
                "error thread number: {encryptor_threads} (must be {MIN_ENCRYPTOR_THREADS}..={MAX_ENCRYPTOR_THREADS})"
            )));
        }
        Ok(Self { encryptor_threads })
    }

    /// One encryptor per core, capped at `MAX_ENCRYPTOR_THREADS`.
    pub fn dynamic() -> Self {
        let encryptor_threads = num_cpus::get().clamp(MIN_ENCRYPTOR_THREADS, MAX_ENCRYPTOR_THREADS);
        Self { encryptor_threads }
    }
}
