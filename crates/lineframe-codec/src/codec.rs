//! `tokio_util::codec` adapter for async byte streams.
//!
//! Decoded items are `Result<Message, DecodeError>`: a bad line is handed to
//! the caller as an item and the stream keeps going. Only I/O failures and
//! oversized lines end the stream.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::decode::{DecodeOutcome, LineDecoder};
use crate::encode::encode_message;
use crate::error::{CodecError, DecodeError};
use crate::message::Message;
use crate::DEFAULT_MAX_LINE_LENGTH;

/// Configuration for [`LineFrameCodec`].
#[derive(Debug, Clone)]
pub struct CodecConfig {
    /// Longest line (excluding the terminator) the codec will buffer. Default: 16 MiB.
    pub max_line_length: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
        }
    }
}

/// Frames [`Message`]s over an `AsyncRead`/`AsyncWrite` pair.
#[derive(Debug, Default)]
pub struct LineFrameCodec {
    decoder: LineDecoder,
    // Bytes of the read buffer already known to contain no terminator.
    next_index: usize,
    config: CodecConfig,
}

impl LineFrameCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CodecConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Current codec configuration.
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }
}

impl Decoder for LineFrameCodec {
    type Item = Result<Message, DecodeError>;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let max = self.config.max_line_length;
        loop {
            let Some(offset) = src[self.next_index..].iter().position(|b| *b == b'\n') else {
                self.next_index = src.len();
                if src.len() > max {
                    return Err(CodecError::LineTooLong {
                        len: src.len(),
                        max,
                    });
                }
                return Ok(None);
            };

            let end = self.next_index + offset;
            self.next_index = 0;
            if end > max {
                return Err(CodecError::LineTooLong { len: end, max });
            }

            let line = src.split_to(end + 1);
            match self.decoder.feed(&line[..end]) {
                DecodeOutcome::Continue => continue,
                DecodeOutcome::Emit(message) => {
                    tracing::trace!(kind = message.kind(), size = message.len(), "decoded frame");
                    return Ok(Some(Ok(message)));
                }
                DecodeOutcome::Error(err) => return Ok(Some(Err(err))),
            }
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(item) = self.decode(src)? {
            return Ok(Some(item));
        }
        if !src.is_empty() {
            tracing::warn!(len = src.len(), "discarding unterminated line at end of stream");
            src.clear();
            self.next_index = 0;
        }
        if self.decoder.reset() {
            tracing::warn!("discarding unterminated multi-line message at end of stream");
        }
        Ok(None)
    }
}

impl Encoder<Message> for LineFrameCodec {
    type Error = CodecError;

    fn encode(&mut self, item: Message, dst: &mut BytesMut) -> Result<(), Self::Error> {
        encode_message(&item, dst);
        Ok(())
    }
}

impl Encoder<&Message> for LineFrameCodec {
    type Error = CodecError;

    fn encode(&mut self, item: &Message, dst: &mut BytesMut) -> Result<(), Self::Error> {
        encode_message(item, dst);
        Ok(())
    }
}
