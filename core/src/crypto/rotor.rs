// ## src/crypto/rotor.rs

//! crypto/rotor.rs
//! Rotating-key XOR block cipher.
//!
//! Per block:
//! - walk the payload in key-length chunks, XOR each chunk with the key;
//! - after each chunk rotate the key left by one bit.
//!
//! The rotation is local to one block. Every block starts from the same
//! initial key, so decryption is the same transform with the same block size.
//!
//! This is not a secure cipher. The bit layout is kept exactly so output stays
//! compatible with existing encrypted streams.

use crate::crypto::key::KeyMaterial;

/// Rotate `key` left by one bit.
///
/// The carry out of byte `j`'s MSB enters byte `j + 1`'s LSB; the carry out of
/// the last byte wraps into byte 0's LSB.
///
/// `[0x80, 0x00]` becomes `[0x00, 0x01]`; a single byte `0x80` becomes `0x01`.
pub fn rotate_key_left(key: &mut [u8]) {
    let Some(&last) = key.last() else {
        return;
    };
    let wrap = last >> 7;
    let mut carry = 0u8;

    for byte in key.iter_mut() {
        let out = *byte >> 7;
        *byte = (*byte << 1) | carry;
        carry = out;
    }
    key[0] |= wrap;
}

/// XOR `payload` against the rotating key stream seeded by `key_snapshot`.
///
/// A trailing chunk shorter than the key uses the first `len % key_len` key bytes.
pub fn apply_keystream(payload: &[u8], key_snapshot: &[u8]) -> Vec<u8> {
    if key_snapshot.is_empty() {
        return payload.to_vec();
    }

    let mut key = key_snapshot.to_vec();
    let mut out = Vec::with_capacity(payload.len());

    for chunk in payload.chunks(key.len()) {
        out.extend(chunk.iter().zip(key.iter()).map(|(p, k)| p ^ k));
        rotate_key_left(&mut key);
    }
    out
}

/// Key after `chunks` rotations, i.e. the key used for chunk index `chunks`.
pub fn key_after(key_snapshot: &[u8], chunks: usize) -> Vec<u8> {
    let mut key = key_snapshot.to_vec();
    // A key of n bytes returns to itself after 8n rotations.
    let period = key.len() * 8;
    if period == 0 {
        return key;
    }
    for _ in 0..(chunks % period) {
        rotate_key_left(&mut key);
    }
    key
}

#[derive(Debug, Clone)]
pub struct RotatingKeyCipher {
    key: KeyMaterial,
}

impl RotatingKeyCipher {
    pub fn new(key: KeyMaterial) -> Self {
        Self { key }
    }

    pub fn key(&self) -> &KeyMaterial {
        &self.key
    }

    pub fn encrypt_block(&self, payload: &[u8]) -> Vec<u8> {
        apply_keystream(payload, self.key.as_bytes())
    }

    /// XOR is its own inverse and the key stream restarts every block.
    pub fn decrypt_block(&self, ciphertext: &[u8]) -> Vec<u8> {
        apply_keystream(ciphertext, self.key.as_bytes())
    }

    /// Sequential reference: transform `data` block by block, as the pipeline does.
    pub fn apply_blocks(&self, data: &[u8], block_size: usize) -> Vec<u8> {
        if block_size == 0 {
            return data.to_vec();
        }
        data.chunks(block_size)
            .flat_map(|block| self.encrypt_block(block))
            .collect()
    }
}
