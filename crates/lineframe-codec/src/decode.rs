use base64::{engine::general_purpose::STANDARD, Engine};

use crate::encode::{BINARY_MARKER, ESCAPE_MARKER, MULTILINE_MARKER, TERMINATOR};
use crate::error::DecodeError;
use crate::message::Message;

/// Where the decoder is between lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DecoderState {
    /// No multi-line message in progress.
    #[default]
    Idle,
    /// An `@` line opened a multi-line message; body lines so far, still stuffed.
    CollectingMultiline(Vec<Vec<u8>>),
}

/// Result of feeding one line to the decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeOutcome {
    /// A complete message.
    Emit(Message),
    /// Nothing to report yet.
    Continue,
    /// The line could not be decoded. The decoder is back in `Idle`.
    Error(DecodeError),
}

/// Reassembles messages from wire lines.
///
/// Lines must arrive without their `\n` and in stream order.
#[derive(Debug, Default)]
pub struct LineDecoder {
    state: DecoderState,
}

impl LineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume one line and advance the state machine.
    pub fn feed(&mut self, line: &[u8]) -> DecodeOutcome {
        match std::mem::take(&mut self.state) {
            DecoderState::Idle => self.feed_idle(line),
            DecoderState::CollectingMultiline(body) if line == [TERMINATOR] => {
                tracing::trace!(lines = body.len(), "multi-line message closed");
                join_body(body)
            }
            DecoderState::CollectingMultiline(mut body) => {
                body.push(line.to_vec());
                self.state = DecoderState::CollectingMultiline(body);
                DecodeOutcome::Continue
            }
        }
    }

    fn feed_idle(&mut self, line: &[u8]) -> DecodeOutcome {
        match line.split_first() {
            Some((&BINARY_MARKER, encoded)) => match STANDARD.decode(encoded) {
                Ok(payload) => DecodeOutcome::Emit(Message::Binary(payload.into())),
                Err(err) => DecodeOutcome::Error(DecodeError::InvalidBase64(err)),
            },
            Some((&MULTILINE_MARKER, first)) => {
                self.state = DecoderState::CollectingMultiline(vec![first.to_vec()]);
                DecodeOutcome::Continue
            }
            Some((&ESCAPE_MARKER, text)) => text_outcome(text),
            _ => text_outcome(line),
        }
    }

    /// Drop any multi-line message in progress.
    ///
    /// Returns `true` if a partial message was discarded.
    pub fn reset(&mut self) -> bool {
        let discarded = !self.is_idle();
        self.state = DecoderState::Idle;
        discarded
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, DecoderState::Idle)
    }

    /// Number of body lines collected for the open multi-line message.
    pub fn pending_lines(&self) -> usize {
        match &self.state {
            DecoderState::Idle => 0,
            DecoderState::CollectingMultiline(body) => body.len(),
        }
    }

    pub fn state(&self) -> &DecoderState {
        &self.state
    }
}

fn text_outcome(bytes: &[u8]) -> DecodeOutcome {
    match std::str::from_utf8(bytes) {
        Ok(text) => DecodeOutcome::Emit(Message::Text(text.to_owned())),
        Err(err) => DecodeOutcome::Error(DecodeError::InvalidUtf8(err)),
    }
}

fn join_body(body: Vec<Vec<u8>>) -> DecodeOutcome {
    let capacity = body.iter().map(|line| line.len() + 1).sum();
    let mut joined = Vec::with_capacity(capacity);
    for (index, line) in body.iter().enumerate() {
        if index > 0 {
            joined.push(b'\n');
        }
        let unstuffed = line.strip_prefix(&[TERMINATOR]).unwrap_or(line.as_slice());
        joined.extend_from_slice(unstuffed);
    }
    match String::from_utf8(joined) {
        Ok(text) => DecodeOutcome::Emit(Message::Text(text)),
        Err(err) => DecodeOutcome::Error(DecodeError::InvalidUtf8(err.utf8_error())),
    }
}

/// Decode a sequence of lines with a fresh decoder.
///
/// Returns every emitted message and every error, in order. A multi-line
/// message still open after the last line is dropped.
pub fn decode_lines<I, L>(lines: I) -> Vec<Result<Message, DecodeError>>
where
    I: IntoIterator<Item = L>,
    L: AsRef<[u8]>,
{
    let mut decoder = LineDecoder::new();
    lines
        .into_iter()
        .filter_map(|line| match decoder.feed(line.as_ref()) {
            DecodeOutcome::Emit(message) => Some(Ok(message)),
            DecodeOutcome::Error(err) => Some(Err(err)),
            DecodeOutcome::Continue => None,
        })
        .collect()
}

/// Decode a complete wire buffer.
///
/// Bytes after the final `\n` are not a line and are ignored.
pub fn decode_all(wire: &[u8]) -> Vec<Result<Message, DecodeError>> {
    let terminated = match wire.iter().rposition(|b| *b == b'\n') {
        Some(last) => &wire[..last],
        None => return Vec::new(),
    };
    decode_lines(terminated.split(|b| *b == b'\n'))
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::encode::{encode, encode_binary, encode_text};

    fn feed_all(decoder: &mut LineDecoder, lines: &[&[u8]]) -> Vec<DecodeOutcome> {
        lines.iter().map(|line| decoder.feed(line)).collect()
    }

    #[test]
    fn idle_plain_line_emits_text() {
        let mut decoder = LineDecoder::new();
        assert_eq!(
            decoder.feed(b"textMessage"),
            DecodeOutcome::Emit(Message::text("textMessage"))
        );
        assert!(decoder.is_idle());
    }

    #[test]
    fn idle_empty_line_emits_empty_text() {
        let mut decoder = LineDecoder::new();
        assert_eq!(decoder.feed(b""), DecodeOutcome::Emit(Message::text("")));
    }

    #[test]
    fn idle_bare_dot_emits_dot() {
        let mut decoder = LineDecoder::new();
        assert_eq!(decoder.feed(b"."), DecodeOutcome::Emit(Message::text(".")));
        assert!(decoder.is_idle());
    }

    #[test]
    fn idle_escaped_line_strips_one_marker() {
        let mut decoder = LineDecoder::new();
        let outcomes = feed_all(&mut decoder, &[b"##message", b"#$message", b"#@message", b"#"]);
        assert_eq!(
            outcomes,
            vec![
                DecodeOutcome::Emit(Message::text("#message")),
                DecodeOutcome::Emit(Message::text("$message")),
                DecodeOutcome::Emit(Message::text("@message")),
                DecodeOutcome::Emit(Message::text("")),
            ]
        );
    }

    #[test]
    fn idle_binary_line_emits_bytes() {
        let mut decoder = LineDecoder::new();
        assert_eq!(
            decoder.feed(b"$AQID"),
            DecodeOutcome::Emit(Message::Binary(Bytes::from_static(&[1, 2, 3])))
        );
        assert_eq!(
            decoder.feed(b"$"),
            DecodeOutcome::Emit(Message::Binary(Bytes::new()))
        );
    }

    #[test]
    fn invalid_base64_is_reported_and_decoder_recovers() {
        let mut decoder = LineDecoder::new();
        let outcome = decoder.feed(b"$not-valid-base64!");
        assert!(matches!(
            outcome,
            DecodeOutcome::Error(DecodeError::InvalidBase64(_))
        ));
        assert!(decoder.is_idle());
        assert_eq!(decoder.feed(b"next"), DecodeOutcome::Emit(Message::text("next")));
    }

    #[test]
    fn unpadded_base64_is_rejected() {
        let mut decoder = LineDecoder::new();
        assert!(matches!(
            decoder.feed(b"$//4"),
            DecodeOutcome::Error(DecodeError::InvalidBase64(_))
        ));
    }

    #[test]
    fn invalid_utf8_text_is_reported() {
        let mut decoder = LineDecoder::new();
        assert!(matches!(
            decoder.feed(&[0xff, 0xfe]),
            DecodeOutcome::Error(DecodeError::InvalidUtf8(_))
        ));
        assert!(matches!(
            decoder.feed(&[b'#', 0xc3]),
            DecodeOutcome::Error(DecodeError::InvalidUtf8(_))
        ));
        assert!(decoder.is_idle());
    }

    #[test]
    fn multiline_collects_until_terminator() {
        let mut decoder = LineDecoder::new();
        assert_eq!(decoder.feed(b"@MULTI"), DecodeOutcome::Continue);
        assert_eq!(
            decoder.state(),
            &DecoderState::CollectingMultiline(vec![b"MULTI".to_vec()])
        );
        assert_eq!(decoder.feed(b"LINE"), DecodeOutcome::Continue);
        assert_eq!(decoder.pending_lines(), 2);
        assert_eq!(
            decoder.feed(b"."),
            DecodeOutcome::Emit(Message::text("MULTI\nLINE"))
        );
        assert!(decoder.is_idle());
    }

    #[test]
    fn multiline_body_treats_markers_as_text() {
        let mut decoder = LineDecoder::new();
        let outcomes = feed_all(&mut decoder, &[b"@$AQID", b"#x", b"@y", b"", b"."]);
        assert_eq!(
            outcomes.last(),
            Some(&DecodeOutcome::Emit(Message::text("$AQID\n#x\n@y\n")))
        );
        assert!(outcomes[..4].iter().all(|o| *o == DecodeOutcome::Continue));
    }

    #[test]
    fn multiline_unstuffs_exactly_one_dot() {
        let mut decoder = LineDecoder::new();
        feed_all(&mut decoder, &[b"@..first", b"...", b"x.."]);
        assert_eq!(
            decoder.feed(b"."),
            DecodeOutcome::Emit(Message::text(".first\n..\nx.."))
        );
    }

    #[test]
    fn multiline_invalid_utf8_reported_at_terminator() {
        let mut decoder = LineDecoder::new();
        assert_eq!(decoder.feed(b"@ok"), DecodeOutcome::Continue);
        assert_eq!(decoder.feed(&[0xff]), DecodeOutcome::Continue);
        assert!(matches!(
            decoder.feed(b"."),
            DecodeOutcome::Error(DecodeError::InvalidUtf8(_))
        ));
        assert!(decoder.is_idle());
    }

    #[test]
    fn back_to_back_multiline_messages() {
        let results = decode_all(b"@a\nb\n.\n@c\n.\n");
        assert_eq!(
            results,
            vec![Ok(Message::text("a\nb")), Ok(Message::text("c"))]
        );
    }

    #[test]
    fn reset_discards_open_collection() {
        let mut decoder = LineDecoder::new();
        decoder.feed(b"@partial");
        decoder.feed(b"body");
        assert!(decoder.reset());
        assert!(decoder.is_idle());
        assert!(!decoder.reset());
        assert_eq!(decoder.feed(b"."), DecodeOutcome::Emit(Message::text(".")));
    }

    #[test]
    fn decode_all_ignores_trailing_partial_line() {
        assert_eq!(decode_all(b"one\ntw"), vec![Ok(Message::text("one"))]);
        assert!(decode_all(b"no newline").is_empty());
    }

    #[test]
    fn decode_all_keeps_empty_lines() {
        assert_eq!(
            decode_all(b"\n\n"),
            vec![Ok(Message::text("")), Ok(Message::text(""))]
        );
    }

    #[test]
    fn decode_lines_drops_unterminated_multiline() {
        let results = decode_lines(["first", "@open", "never closed"]);
        assert_eq!(results, vec![Ok(Message::text("first"))]);
    }

    fn tricky_messages() -> Vec<Message> {
        vec![
            Message::text(""),
            Message::text("textMessage"),
            Message::text("#message"),
            Message::text("$message"),
            Message::text("@message"),
            Message::text("."),
            Message::text(".."),
            Message::text("\n"),
            Message::text("\n."),
            Message::text("\n.."),
            Message::text("@\n"),
            Message::text(".\n."),
            Message::text("MULTI\nLINE\n"),
            Message::text("\n\n\n"),
            Message::text("héllo\nwörld ✓"),
            Message::binary(Vec::new()),
            Message::binary(vec![1u8, 2, 3]),
            Message::binary(vec![b'\n', b'.', b'@', 0, 255]),
        ]
    }

    #[test]
    fn every_message_round_trips_to_exactly_one_emit() {
        for message in tricky_messages() {
            let wire = encode(&message);
            assert_eq!(
                decode_all(&wire),
                vec![Ok(message.clone())],
                "wire: {:?}",
                String::from_utf8_lossy(&wire)
            );
        }
    }

    #[test]
    fn re_encoding_a_decoded_message_is_stable() {
        for message in tricky_messages() {
            let wire = encode(&message);
            let decoded = decode_all(&wire).remove(0).unwrap();
            assert_eq!(encode(&decoded), wire);
        }
    }

    #[test]
    fn concatenated_frames_decode_in_order() {
        let mut wire = Vec::new();
        for message in tricky_messages() {
            wire.extend_from_slice(&encode(&message));
        }
        let decoded: Vec<Message> = decode_all(&wire).into_iter().map(|r| r.unwrap()).collect();
        assert_eq!(decoded, tricky_messages());
    }

    #[test]
    fn documented_examples_decode_back() {
        assert_eq!(decode_all(&encode_text("\n.")), vec![Ok(Message::text("\n."))]);
        assert_eq!(decode_all(&encode_text("@\n")), vec![Ok(Message::text("@\n"))]);
        assert_eq!(
            decode_all(&encode_binary(&[])),
            vec![Ok(Message::binary(Vec::new()))]
        );
    }
}
