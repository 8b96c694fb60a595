use std::io::{ErrorKind, Write};

use crate::error::{Result, TransportError};
use crate::traits::Sink;

/// Writes complete byte sequences to any `Write` stream.
///
/// Every [`write_all`](StreamWriter::write_all) either lands entirely or
/// fails; the stream is flushed after each call.
pub struct StreamWriter<T> {
    inner: T,
}

impl<T: Write> StreamWriter<T> {
    /// Create a new stream writer.
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    /// Write `bytes` completely and flush (blocking).
    pub fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        let mut offset = 0usize;
        while offset < bytes.len() {
            match self.inner.write(&bytes[offset..]) {
                Ok(0) => return Err(TransportError::Closed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) if err.kind() == ErrorKind::BrokenPipe => {
                    return Err(TransportError::Closed)
                }
                Err(err) => return Err(TransportError::Io(err)),
            }
        }

        self.flush()
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) if err.kind() == ErrorKind::BrokenPipe => {
                    return Err(TransportError::Closed)
                }
                Err(err) => return Err(TransportError::Io(err)),
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

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: Write> Sink for StreamWriter<T> {
    fn send_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.write_all(bytes)
    }
}
