use bytes::Bytes;

use crate::error::Result;

/// Delivers complete lines, one at a time, in arrival order.
///
/// Implementations strip the trailing `\n` and never hand out a partial
/// line. `Ok(None)` means the stream has ended; a source is not expected to
/// produce more lines after that.
pub trait Source {
    /// Block until the next line is available.
    fn next_line(&mut self) -> Result<Option<Bytes>>;
}

/// Accepts byte sequences for transmission.
///
/// Each call writes the whole slice before returning, so one call is one
/// uninterrupted unit on the wire.
pub trait Sink {
    /// Write `bytes` completely and flush.
    fn send_bytes(&mut self, bytes: &[u8]) -> Result<()>;
}

impl<S: Source + ?Sized> Source for &mut S {
    fn next_line(&mut self) -> Result<Option<Bytes>> {
        (**self).next_line()
    }
}

impl<S: Source + ?Sized> Source for Box<S> {
    fn next_line(&mut self) -> Result<Option<Bytes>> {
        (**self).next_line()
    }
}

impl<S: Sink + ?Sized> Sink for &mut S {
    fn send_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        (**self).send_bytes(bytes)
    }
}

impl<S: Sink + ?Sized> Sink for Box<S> {
    fn send_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        (**self).send_bytes(bytes)
    }
}
