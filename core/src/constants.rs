use std::time::Duration;

/// Largest key accepted from a key file (bytes).
pub const MAX_KEY_SIZE: usize = 100;

/// Block size is derived from the key: `key_size * BLOCK_SIZE_KEY_FACTOR`.
pub const BLOCK_SIZE_KEY_FACTOR: usize = 8;

/// Largest block size an override may request. Block sizes are reported as `u32`.
pub const MAX_BLOCK_SIZE: usize = u32::MAX as usize;

/// The distributor grows its block buffer past this size on demand.
pub const BLOCK_BUFFER_PREALLOC: usize = 64 * 1024;

/// Upper bound on encryptor threads.
pub const MAX_ENCRYPTOR_THREADS: usize = 10;
pub const MIN_ENCRYPTOR_THREADS: usize = 1;

/// Ring buffer between distributor and encryptors.
pub const DIST_QUEUE_CAPACITY: usize = 100;
/// Ring buffer between encryptors and merger.
pub const ENC_QUEUE_CAPACITY: usize = 100;
/// Slots in the merger's reorder buffer.
pub const REORDER_CAPACITY: usize = 1000;

/// Admission margins: a producer may write only when `available() > margin`.
/// Full blocks need more headroom than the final short block.
pub const FULL_BLOCK_MARGIN: usize = 3;
pub const PARTIAL_BLOCK_MARGIN: usize = 1;

/// More than this many consecutive failed reads ends the input stream.
pub const MAX_READ_FAILURES: u32 = 5;

/// Merger idle wait when its source queue is empty.
pub const MERGER_IDLE_WAIT: Duration = Duration::from_millis(1);

/// How long an encryptor holds a finished block before re-checking admission.
pub const ENCRYPTOR_RETRY_PAUSE: Duration = Duration::from_millis(5);

/// Smallest queue that can ever admit a full block.
pub const MIN_QUEUE_CAPACITY: usize = FULL_BLOCK_MARGIN + 2;
