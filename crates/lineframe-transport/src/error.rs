/// Errors that can occur while moving lines over a transport.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// An I/O error occurred on the underlying stream.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A line grew past the configured buffering limit before its terminator arrived.
    #[error("line too long ({len} bytes, max {max})")]
    LineTooLong { len: usize, max: usize },

    /// The peer stopped accepting bytes.
    #[error("transport closed")]
    Closed,

    /// Failed to spawn a child process for a pipe transport.
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, TransportError>;
