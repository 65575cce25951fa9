//! ecu-core
//!
//! Parallel rotating-key block encryption engine.
//! Pure Rust library; the CLI lives in its own crate.

#![forbid(unsafe_code)]

// Shared and top level
pub mod constants;
pub mod types;

pub mod crypto;
pub mod queue;
pub mod telemetry;

// Stage layer
pub mod pipeline;

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::crypto::{CryptoError, KeyMaterial, RotatingKeyCipher};
    pub use crate::pipeline::{
        decrypt_stream, encrypt_stream, run_pipeline, EncryptParams, InputSource, OutputSink,
        PipelineConfig, QueueProfile,
    };
    pub use crate::telemetry::TelemetrySnapshot;
    pub use crate::types::StreamError;
}
