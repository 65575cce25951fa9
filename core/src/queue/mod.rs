//! Bounded hand-off queues between pipeline stages.
//!
//! - `RingBuffer<T>`: the raw circular buffer (indices + slots), unsynchronized.
//! - `BlockQueue<T>`: one mutex around the ring, plus condvars for admission
//!   and for waiting consumers.

pub mod types;
pub mod ring;
pub mod guarded;

pub use types::{AdmissionMargin, QueueError};
pub use ring::RingBuffer;
pub use guarded::{Admitted, BlockQueue, PushAttempt};
