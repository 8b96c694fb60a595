use std::io::{ErrorKind, Read};

use bytes::{Bytes, BytesMut};

use crate::error::{Result, TransportError};
use crate::traits::Source;

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;
const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Default maximum line length: 16 MiB.
pub const DEFAULT_MAX_LINE_LENGTH: usize = 16 * 1024 * 1024;

/// Configuration for line splitting.
#[derive(Debug, Clone)]
pub struct LineConfig {
    /// Longest line (excluding the terminator) the reader will buffer. Default: 16 MiB.
    pub max_line_length: usize,
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
        }
    }
}

/// Reads `\n`-terminated lines from any `Read` stream.
///
/// Handles partial reads internally; callers always get complete lines,
/// with the terminator removed.
pub struct LineReader<T> {
    inner: T,
    buf: BytesMut,
    // Bytes of `buf` already known to contain no terminator.
    scanned: usize,
    config: LineConfig,
}

impl<T: Read> LineReader<T> {
    /// Create a new line reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, LineConfig::default())
    }

    /// Create a new line reader with explicit configuration.
    pub fn with_config(inner: T, config: LineConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            scanned: 0,
            config,
        }
    }

    /// Read the next complete line (blocking).
    ///
    /// Returns `Ok(None)` at end of stream. Bytes after the last terminator
    /// are not a line and are dropped.
    pub fn read_line(&mut self) -> Result<Option<Bytes>> {
        loop {
            if let Some(line) = self.split_line()? {
                return Ok(Some(line));
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(TransportError::Io(err)),
            };

            if read == 0 {
                if !self.buf.is_empty() {
                    tracing::warn!(
                        len = self.buf.len(),
                        "discarding unterminated line at end of stream"
                    );
                    self.buf.clear();
                    self.scanned = 0;
                }
                return Ok(None);
            }

            self.buf.extend_from_slice(&chunk[..read]);
        }
    }

    fn split_line(&mut self) -> Result<Option<Bytes>> {
        let max = self.config.max_line_length;
        match self.buf[self.scanned..].iter().position(|b| *b == b'\n') {
            Some(offset) => {
                let end = self.scanned + offset;
                if end > max {
                    return Err(TransportError::LineTooLong { len: end, max });
                }
                let mut line = self.buf.split_to(end + 1);
                line.truncate(end);
                self.scanned = 0;
                Ok(Some(line.freeze()))
            }
            None => {
                self.scanned = self.buf.len();
                if self.buf.len() > max {
                    return Err(TransportError::LineTooLong {
                        len: self.buf.len(),
                        max,
                    });
                }
                Ok(None)
            }
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current line reader configuration.
    pub fn config(&self) -> &LineConfig {
        &self.config
    }
}

impl<T: Read> Source for LineReader<T> {
    fn next_line(&mut self) -> Result<Option<Bytes>> {
        self.read_line()
    }
}
