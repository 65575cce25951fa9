// ## 📂 File: `src/crypto/types.rs`

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    /// Key material must contain at least one byte.
    #[error("key is empty")]
    EmptyKey,

    /// Key file larger than the supported maximum.
    #[error("key size is too big: {actual} bytes (max {max})")]
    KeyTooLarge { actual: usize, max: usize },

    /// Key file could not be read.
    #[error("cannot read key file {path}: {source}")]
    KeyFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Hex-encoded key could not be decoded.
    #[error("invalid hex key: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}
