//! Duplex message channel over line-oriented transports.
//!
//! A [`Channel`] joins a [`Source`](lineframe_transport::Source) of wire
//! lines and a [`Sink`](lineframe_transport::Sink) for outgoing frames:
//! `send` encodes and writes, `poll`/`run` decode incoming lines and hand
//! results to registered listeners.

pub mod channel;
pub mod error;
pub mod events;

pub use channel::{Channel, Sender, Step};
pub use error::{ChannelError, Result};
pub use events::{Event, EventKind, Unregister};
