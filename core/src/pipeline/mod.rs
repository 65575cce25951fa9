// ## 1️⃣ `mod.rs` - public façade + re-exports

//! pipeline: distributor -> encryptor pool -> merger over two bounded queues.
//!
//! This module exposes a stable public API for Rust callers and the CLI.
//! Internals are layered: stages only talk through `BlockQueue`s and report
//! to the supervisor over a channel.

pub mod config;
pub mod core;
pub mod distributor;
pub mod encryptor;
pub mod io;
pub mod merger;
pub mod parallelism;
pub mod reorder;
pub mod supervisor;
pub mod types;

pub use config::{PipelineConfig, QueueProfile};
pub use distributor::Distributor;
pub use encryptor::{encrypt_block, encryptor_pool, EncryptorWorker};
pub use io::{open_input, open_output, InputSource, OutputSink};
pub use merger::{MergeStatus, Merger};
pub use parallelism::ParallelismProfile;
pub use reorder::ReorderBuffer;
pub use supervisor::run_pipeline;
pub use types::{Block, EncryptedBlock, StageEvent, StageId, StageReport};

pub use self::core::{decrypt_stream, encrypt_stream, validate_params, DecryptParams, EncryptParams};
