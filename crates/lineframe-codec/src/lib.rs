//! Line-based message framing for text and binary payloads.
//!
//! Each logical [`Message`] travels as one or more `\n`-terminated lines, so
//! arbitrary text (embedded newlines included) and arbitrary bytes can cross
//! any transport that only understands lines. The first byte of a line
//! selects its meaning:
//!
//! ```text
//! plain text              ordinary single-line text
//! #<text>                 escaped text (payload itself starts with # $ or @)
//! $<base64>               binary payload, standard base64 with padding
//! @<line>                 opens a multi-line text message ...
//! <line>                  ... body lines, a leading . is doubled ...
//! .                       ... closed by a line holding exactly "."
//! ```
//!
//! Encoding is pure and total. Decoding is a small state machine
//! ([`LineDecoder`]) fed one line at a time.

pub mod decode;
pub mod encode;
pub mod error;
pub mod message;

#[cfg(feature = "async")]
pub mod codec;

#[cfg(feature = "async")]
pub use codec::{CodecConfig, LineFrameCodec};
pub use decode::{decode_all, decode_lines, DecodeOutcome, DecoderState, LineDecoder};
pub use encode::{
    encode, encode_binary, encode_binary_into, encode_message, encode_text, encode_text_into,
    BINARY_MARKER, ESCAPE_MARKER, MULTILINE_MARKER, TERMINATOR,
};
#[cfg(feature = "async")]
pub use error::CodecError;
pub use error::DecodeError;
pub use message::Message;

/// Default maximum line length accepted by stream decoders: 16 MiB.
pub const DEFAULT_MAX_LINE_LENGTH: usize = 16 * 1024 * 1024;
