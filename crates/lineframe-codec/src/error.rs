/// Errors produced while decoding a single wire line.
///
/// All of these are local to the offending line: the decoder stays usable
/// and the next line is decoded normally.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// A `$` line whose remainder is not valid standard base64.
    #[error("invalid base64 in binary line: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    /// A text line, or a completed multi-line body, that is not valid UTF-8.
    #[error("text is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
}

/// Errors that end a framed byte stream.
#[cfg(feature = "async")]
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// An I/O error occurred on the underlying stream.
    #[error("codec I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A line grew past the configured maximum before its terminator arrived.
    #[error("line too long ({len} bytes, max {max})")]
    LineTooLong { len: usize, max: usize },
}
