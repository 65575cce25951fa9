// ## 2️⃣ `core.rs` - stable public API

use std::sync::Arc;

use crate::{
    crypto::KeyMaterial,
    pipeline::{
        config::{PipelineConfig, QueueProfile},
        io::{open_input, open_output, InputSource, OutputSink},
        parallelism::ParallelismProfile,
        supervisor::run_pipeline,
    },
    telemetry::TelemetrySnapshot,
    types::StreamError,
};

/// Per-run overrides. `None` falls back to the defaults derived from the key
/// and the host.
#[derive(Clone, Debug, Default)]
pub struct EncryptParams {
    /// Encryptor count; defaults to `ParallelismProfile::dynamic()`.
    pub threads: Option<usize>,
    /// Block size in bytes; defaults to `key.len() * 8`.
    pub block_size: Option<usize>,
    pub queues: Option<QueueProfile>,
}

impl EncryptParams {
    pub fn with_threads(threads: usize) -> Self {
        Self { threads: Some(threads), ..Self::default() }
    }
}

/// Decryption takes the same knobs: block size and key must match the
/// encrypting run.
pub type DecryptParams = EncryptParams;

/// Build the run configuration for `key` + `params` and validate it.
pub fn validate_params(key: &KeyMaterial, params: &EncryptParams) -> Result<PipelineConfig, StreamError> {
    let threads = match params.threads {
        Some(n) => ParallelismProfile::fixed(n)?,
        None => ParallelismProfile::dynamic(),
    };

    let mut config = PipelineConfig::new(key.clone(), threads.encryptor_threads);
    if let Some(block_size) = params.block_size {
        config = config.with_block_size(block_size);
    }
    if let Some(queues) = params.queues {
        config = config.with_queues(queues);
    }
    config.validate()?;
    Ok(config)
}

/// 🔐 Encrypt stream
pub fn encrypt_stream(
    input: InputSource,
    output: OutputSink,
    key: &KeyMaterial,
    params: &EncryptParams,
) -> Result<TelemetrySnapshot, StreamError> {
    let config = Arc::new(validate_params(key, params)?);

    let reader = open_input(input)?;
    let (writer, maybe_buf) = open_output(output)?;

    let mut snapshot = run_pipeline(reader, writer, config)?;

    // --- Captured output for tests ---
    if let Some(buf) = maybe_buf {
        snapshot.attach_output(buf.lock().clone());
    }

    Ok(snapshot)
}

/// 🔓 Decrypt stream
///
/// Each block's transform is its own inverse, so this is the encrypt
/// pipeline run again with the same key and block size.
pub fn decrypt_stream(
    input: InputSource,
    output: OutputSink,
    key: &KeyMaterial,
    params: &DecryptParams,
) -> Result<TelemetrySnapshot, StreamError> {
    encrypt_stream(input, output, key, params)
}
