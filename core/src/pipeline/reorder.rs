use bytes::Bytes;

use crate::pipeline::types::EncryptedBlock;
use crate::types::StreamError;

/// Fixed-capacity holding area for blocks that arrived ahead of their turn.
///
/// Slots are scanned linearly; the window is bounded by queue depth and
/// worker count, so it stays small in practice.
#[derive(Debug)]
pub struct ReorderBuffer {
    slots: Vec<Option<EncryptedBlock>>,
    len: usize,
}

impl ReorderBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: (0..capacity).map(|_| None).collect(),
            len: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn contains(&self, sequence: u32) -> bool {
        self.slots.iter().flatten().any(|b| b.sequence == sequence)
    }

    /// Park `block` in the first free slot. Returns the number of occupied slots.
    pub fn insert(&mut self, block: EncryptedBlock) -> Result<usize, StreamError> {
        if self.contains(block.sequence) {
            return Err(StreamError::Validation(format!(
                "duplicate block {} in reorder buffer",
                block.sequence
            )));
        }
        let sequence = block.sequence;
        match self.slots.iter_mut().find(|slot| slot.is_none()) {
            Some(slot) => {
                *slot = Some(block);
                self.len += 1;
                Ok(self.len)
            }
            None => Err(StreamError::ReorderOverflow {
                capacity: self.capacity(),
                sequence,
            }),
        }
    }

    /// Remove and return the payload for `sequence`, if parked.
    pub fn take(&mut self, sequence: u32) -> Option<Bytes> {
        let slot = self
            .slots
            .iter_mut()
            .find(|slot| matches!(slot, Some(b) if b.sequence == sequence))?;
        let block = slot.take()?;
        self.len -= 1;
        Some(block.payload)
    }

    /// Parked sequence numbers, ascending.
    pub fn sequences(&self) -> Vec<u32> {
        let mut seqs: Vec<u32> = self.slots.iter().flatten().map(|b| b.sequence).collect();
        seqs.sort_unstable();
        seqs
    }
}
