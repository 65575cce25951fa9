//! queue/ring.rs
//! Fixed-capacity circular buffer with explicit read/write indices.
//!
//! One slot is always left unused so that `write == read` means empty and
//! never full. A ring of capacity `C` therefore holds at most `C - 1` items.
//!
//! The ring itself is not synchronized. Every method takes `&self`/`&mut self`,
//! so callers reach it only through the guard of [`super::BlockQueue`].

use tracing::error;

use super::types::QueueError;

#[derive(Debug)]
pub struct RingBuffer<T> {
    name: &'static str,
    slots: Vec<Option<T>>,
    write: usize,
    read: usize,
}

impl<T> RingBuffer<T> {
    pub fn new(name: &'static str, capacity: usize) -> Result<Self, QueueError> {
        if capacity < 2 {
            return Err(QueueError::InvalidCapacity { capacity, min: 2 });
        }
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Ok(Self { name, slots, write: 0, read: 0 })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.write == self.read
    }

    /// Write `item` at the write index, then advance it.
    ///
    /// Overflow is detected *after* the write: if the advanced index lands on
    /// the read index the slot is already filled and the ring now looks empty.
    /// Callers must never rely on a failed push being undone; admission control
    /// exists so this path is unreachable.
    pub fn push(&mut self, item: T) -> Result<(), QueueError> {
        self.slots[self.write] = Some(item);
        self.write = (self.write + 1) % self.capacity();

        if self.write == self.read {
            error!("[QUEUE] {} ring buffer full", self.name);
            return Err(QueueError::Overflow { queue: self.name });
        }
        Ok(())
    }

    /// Move the item at the read index out and advance it.
    pub fn pop(&mut self) -> Option<T> {
        if self.is_empty() {
            error!("[QUEUE] no data in {} circular queue", self.name);
            return None;
        }
        let item = self.slots[self.read].take();
        self.read = (self.read + 1) % self.capacity();
        item
    }

    /// Live items between read and write index.
    pub fn count(&self) -> usize {
        let cap = self.capacity();
        (self.write + cap - self.read) % cap
    }

    /// Free slots. Reports the full capacity when empty.
    pub fn available(&self) -> usize {
        if self.is_empty() {
            self.capacity()
        } else {
            self.capacity() - self.count()
        }
    }
}
