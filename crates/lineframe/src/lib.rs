//! Text and binary message framing over newline-delimited pipes.
//!
//! lineframe lets discrete messages, arbitrary text with embedded newlines
//! or raw bytes, travel over any transport that only delivers lines, such as
//! a child process's stdin/stdout.
//!
//! # Crate Structure
//!
//! - [`transport`]: Line `Source` / byte `Sink` abstraction over `std::io` streams
//! - [`codec`]: Wire grammar: encoder, decoder state machine, async codec (behind `async`)
//! - [`channel`]: Started/stopped duplex channel with listener dispatch

/// Re-export transport types.
pub mod transport {
    pub use lineframe_transport::*;
}

/// Re-export codec types.
pub mod codec {
    pub use lineframe_codec::*;
}

/// Re-export channel types.
pub mod channel {
    pub use lineframe_channel::*;
}
