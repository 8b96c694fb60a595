use base64::{engine::general_purpose::STANDARD, Engine};
use bytes::{BufMut, Bytes, BytesMut};

use crate::message::Message;

/// Escapes a single-line text message whose first byte is a marker.
pub const ESCAPE_MARKER: u8 = b'#';

/// Introduces a base64 binary payload.
pub const BINARY_MARKER: u8 = b'$';

/// Opens a multi-line text message.
pub const MULTILINE_MARKER: u8 = b'@';

/// Terminates a multi-line message; doubled at the start of body lines.
pub const TERMINATOR: u8 = b'.';

const LINE_BREAK: u8 = b'\n';

/// Append the frame for `message` to `dst`.
pub fn encode_message(message: &Message, dst: &mut BytesMut) {
    match message {
        Message::Text(text) => encode_text_into(text, dst),
        Message::Binary(payload) => encode_binary_into(payload, dst),
    }
}

/// Append the frame for a text message to `dst`.
///
/// Single-line text goes out verbatim unless it starts with `#`, `$` or `@`,
/// in which case a `#` is prepended. A lone `.` needs no escape: it only
/// terminates inside a multi-line body.
///
/// Text containing `\n` becomes `@` + body lines + a `.` terminator line,
/// with every body line that starts with `.` given one extra `.`.
pub fn encode_text_into(text: &str, dst: &mut BytesMut) {
    if !text.contains('\n') {
        let escape = matches!(
            text.as_bytes().first(),
            Some(&(ESCAPE_MARKER | BINARY_MARKER | MULTILINE_MARKER))
        );
        dst.reserve(text.len() + 2);
        if escape {
            dst.put_u8(ESCAPE_MARKER);
        }
        dst.put_slice(text.as_bytes());
        dst.put_u8(LINE_BREAK);
        return;
    }

    // `@` + body + `\n.\n`, plus one byte per stuffed line at most.
    dst.reserve(text.len() + 4 + text.matches("\n.").count() + 1);
    dst.put_u8(MULTILINE_MARKER);
    for (index, line) in text.split('\n').enumerate() {
        if index > 0 {
            dst.put_u8(LINE_BREAK);
        }
        if line.as_bytes().first() == Some(&TERMINATOR) {
            dst.put_u8(TERMINATOR);
        }
        dst.put_slice(line.as_bytes());
    }
    dst.put_slice(&[LINE_BREAK, TERMINATOR, LINE_BREAK]);
}

/// Append the frame for a binary payload to `dst`: `$` + base64 + `\n`.
pub fn encode_binary_into(payload: &[u8], dst: &mut BytesMut) {
    let encoded = STANDARD.encode(payload);
    dst.reserve(encoded.len() + 2);
    dst.put_u8(BINARY_MARKER);
    dst.put_slice(encoded.as_bytes());
    dst.put_u8(LINE_BREAK);
}

/// Encode a message into a fresh buffer.
pub fn encode(message: &Message) -> Bytes {
    let mut dst = BytesMut::new();
    encode_message(message, &mut dst);
    dst.freeze()
}

/// Encode a text message into a fresh buffer.
pub fn encode_text(text: &str) -> Bytes {
    let mut dst = BytesMut::new();
    encode_text_into(text, &mut dst);
    dst.freeze()
}

/// Encode a binary message into a fresh buffer.
pub fn encode_binary(payload: &[u8]) -> Bytes {
    let mut dst = BytesMut::new();
    encode_binary_into(payload, &mut dst);
    dst.freeze()
}
