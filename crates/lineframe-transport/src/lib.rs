//! Line-oriented transport abstraction.
//!
//! The framing layer only needs two capabilities from whatever carries its
//! bytes:
//! - a [`Source`] that hands over one complete line at a time (without its
//!   trailing `\n`), or reports end-of-stream
//! - a [`Sink`] that accepts a byte sequence and writes it out whole
//!
//! This crate defines both and implements them over any `std::io` stream,
//! the process's own standard streams, and a spawned child's pipes.

pub mod error;
pub mod reader;
pub mod stdio;
pub mod traits;
pub mod writer;

pub use error::{Result, TransportError};
pub use reader::{LineConfig, LineReader, DEFAULT_MAX_LINE_LENGTH};
pub use stdio::{stdio, ChildPipes};
pub use traits::{Sink, Source};
pub use writer::StreamWriter;
