// ## src/crypto/key.rs

//! crypto/key.rs
//! Key material for the rotating-key cipher.
//!
//! The whole key file is the key. Its length fixes both the cipher chunk
//! length and the pipeline block size (`key_size * 8`).

use std::fmt;
use std::path::Path;

use crate::constants::{BLOCK_SIZE_KEY_FACTOR, MAX_KEY_SIZE};
use crate::crypto::types::CryptoError;

#[derive(Clone, PartialEq, Eq)]
pub struct KeyMaterial {
    bytes: Vec<u8>,
}

impl KeyMaterial {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, CryptoError> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(CryptoError::EmptyKey);
        }
        if bytes.len() > MAX_KEY_SIZE {
            return Err(CryptoError::KeyTooLarge { actual: bytes.len(), max: MAX_KEY_SIZE });
        }
        Ok(Self { bytes })
    }

    /// Load a key file verbatim (no trimming, no decoding).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CryptoError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| CryptoError::KeyFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::new(bytes)
    }

    pub fn from_hex(encoded: &str) -> Result<Self, CryptoError> {
        Self::new(hex::decode(encoded.trim())?)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Default block size for this key.
    pub fn block_size(&self) -> usize {
        self.bytes.len() * BLOCK_SIZE_KEY_FACTOR
    }

    /// Space separated upper-case hex, for debug display.
    pub fn display_hex(&self) -> String {
        self.bytes
            .iter()
            .map(|b| format!("{:02X}", b))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

// Never print key bytes through `{:?}`.
impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial").field("len", &self.bytes.len()).finish()
    }
}
