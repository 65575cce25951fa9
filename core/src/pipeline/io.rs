// ## 📂 File: `src/pipeline/io.rs`
// ## Normalized I/O + byte-at-a-time input reader

use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::constants::MAX_READ_FAILURES;
use crate::types::StreamError;

/// Canonical input abstraction
pub enum InputSource {
    Reader(Box<dyn Read + Send>),
    File(PathBuf),
    Memory(Vec<u8>),
    Stdin,
}

/// Canonical output abstraction
pub enum OutputSink {
    Writer(Box<dyn Write + Send>),
    File(PathBuf),
    /// Captured into a shared buffer, returned with the telemetry snapshot.
    Memory,
    Stdout,
}

/// Normalize input source into a buffered reader
pub fn open_input(src: InputSource) -> Result<Box<dyn Read + Send>, StreamError> {
    let reader: Box<dyn Read + Send> = match src {
        InputSource::Reader(r) => Box::new(BufReader::new(r)),
        InputSource::File(p) => Box::new(BufReader::new(std::fs::File::open(p)?)),
        InputSource::Memory(b) => Box::new(io::Cursor::new(b)),
        InputSource::Stdin => Box::new(BufReader::new(io::stdin())),
    };
    Ok(reader)
}

pub type SharedBuffer = Arc<Mutex<Vec<u8>>>;

/// Normalize output sink into a boxed writer (plus the capture buffer for `Memory`)
pub fn open_output(sink: OutputSink) -> Result<(Box<dyn Write + Send>, Option<SharedBuffer>), StreamError> {
    match sink {
        OutputSink::Writer(w) => Ok((Box::new(BufWriter::new(w)), None)),
        OutputSink::File(p) => Ok((Box::new(BufWriter::new(std::fs::File::create(p)?)), None)),
        OutputSink::Stdout => Ok((Box::new(BufWriter::new(io::stdout())), None)),
        OutputSink::Memory => {
            let buf = Arc::new(Mutex::new(Vec::new()));
            let writer = SharedBufferWriter::new(buf.clone());
            Ok((Box::new(writer), Some(buf)))
        }
    }
}

pub struct SharedBufferWriter {
    buf: SharedBuffer,
}

impl SharedBufferWriter {
    pub fn new(buf: SharedBuffer) -> Self {
        Self { buf }
    }
}

impl Write for SharedBufferWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.lock().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// ================= Byte reader =================

/// Outcome of one single-byte read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadStep {
    Byte(u8),
    /// Read failed or returned nothing; still under the failure limit.
    Retry,
    /// More than `max_failures` consecutive failures: end of stream.
    Exhausted,
}

/// Reads one byte at a time and treats a run of failures as end of input.
///
/// EOF and I/O errors count the same way, so a closed input ends after
/// `max_failures + 1` attempts.
#[derive(Debug)]
pub struct ByteReader<R: Read> {
    inner: R,
    consecutive_failures: u32,
    max_failures: u32,
    total_failures: u64,
}

impl<R: Read> ByteReader<R> {
    pub fn new(inner: R) -> Self {
        Self::with_failure_limit(inner, MAX_READ_FAILURES)
    }

    pub fn with_failure_limit(inner: R, max_failures: u32) -> Self {
        Self {
            inner,
            consecutive_failures: 0,
            max_failures,
            total_failures: 0,
        }
    }

    pub fn next_byte(&mut self) -> ReadStep {
        let mut buf = [0u8; 1];
        match self.inner.read(&mut buf) {
            Ok(1) => {
                self.consecutive_failures = 0;
                ReadStep::Byte(buf[0])
            }
            Ok(_) => self.fail(None),
            Err(e) => self.fail(Some(e)),
        }
    }

    pub fn total_failures(&self) -> u64 {
        self.total_failures
    }

    fn fail(&mut self, err: Option<io::Error>) -> ReadStep {
        self.consecutive_failures += 1;
        self.total_failures += 1;
        if let Some(e) = err {
            debug!("[DISTRIBUTOR] read error #{}: {}", self.consecutive_failures, e);
        }
        if self.consecutive_failures > self.max_failures {
            ReadStep::Exhausted
        } else {
            ReadStep::Retry
        }
    }
}
