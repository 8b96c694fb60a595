/// Errors returned to callers of channel operations.
///
/// Decode failures are not here: they go to `Error` listeners.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    /// The operation requires a started channel.
    #[error("channel not started")]
    NotStarted,

    /// `start` was called on a channel that is already started.
    #[error("channel already started")]
    AlreadyStarted,

    /// Transport-level error while reading or writing.
    #[error("transport error: {0}")]
    Transport(#[from] lineframe_transport::TransportError),
}

pub type Result<T> = std::result::Result<T, ChannelError>;
