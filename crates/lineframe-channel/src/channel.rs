use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bytes::BytesMut;
use lineframe_codec::{encode_message, DecodeError, DecodeOutcome, LineDecoder, Message};
use lineframe_transport::{Sink, Source};

use crate::error::{ChannelError, Result};
use crate::events::{Event, EventKind, Listeners, Unregister};

/// What one [`Channel::poll`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// One line was read and processed.
    Line,
    /// The source reported end-of-stream; the channel is now stopped.
    EndOfStream,
}

/// State shared between a channel and its [`Sender`]s.
struct Shared<K> {
    started: AtomicBool,
    sink: Mutex<K>,
}

impl<K: Sink> Shared<K> {
    fn lock_sink(&self) -> MutexGuard<'_, K> {
        self.sink.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // Flipped under the sink lock: once this returns, no send is mid-write
    // and every later send sees the new state.
    fn set_started(&self, started: bool) -> bool {
        let _sink = self.lock_sink();
        self.started.swap(started, Ordering::AcqRel)
    }

    fn is_started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }

    fn send(&self, message: &Message) -> Result<()> {
        let mut frame = BytesMut::new();
        encode_message(message, &mut frame);

        let mut sink = self.lock_sink();
        if !self.is_started() {
            return Err(ChannelError::NotStarted);
        }
        sink.send_bytes(&frame)?;
        tracing::trace!(
            kind = message.kind(),
            size = message.len(),
            wire_size = frame.len(),
            "sent frame"
        );
        Ok(())
    }
}

/// A duplex message channel over a line source and a byte sink.
///
/// The channel starts out stopped. While started, every line pulled from the
/// source is decoded and its outcome dispatched to listeners synchronously,
/// before the next line is read; `send` encodes a message and writes it to
/// the sink as one unit.
pub struct Channel<S, K> {
    source: S,
    decoder: LineDecoder,
    shared: Arc<Shared<K>>,
    listeners: Listeners,
}

impl<S: Source, K: Sink> Channel<S, K> {
    /// Create a stopped channel over `source` and `sink`.
    pub fn new(source: S, sink: K) -> Self {
        Self {
            source,
            decoder: LineDecoder::new(),
            shared: Arc::new(Shared {
                started: AtomicBool::new(false),
                sink: Mutex::new(sink),
            }),
            listeners: Listeners::default(),
        }
    }

    /// Begin accepting lines and sends.
    pub fn start(&mut self) -> Result<()> {
        if self.shared.set_started(true) {
            return Err(ChannelError::AlreadyStarted);
        }
        self.decoder.reset();
        tracing::debug!("channel started");
        Ok(())
    }

    /// Stop the channel. No-op if already stopped.
    ///
    /// A multi-line message still being collected is discarded. Lines that
    /// arrive afterwards produce no events until the next `start`.
    pub fn stop(&mut self) {
        if !self.shared.set_started(false) {
            return;
        }
        let pending = self.decoder.pending_lines();
        if self.decoder.reset() {
            tracing::debug!(
                lines = pending,
                "discarded unterminated multi-line message on stop"
            );
        }
        tracing::debug!("channel stopped");
    }

    pub fn is_started(&self) -> bool {
        self.shared.is_started()
    }

    /// Encode `message` and write it to the sink.
    pub fn send(&self, message: &Message) -> Result<()> {
        self.shared.send(message)
    }

    /// Send a text message.
    pub fn send_text(&self, text: &str) -> Result<()> {
        self.send(&Message::text(text))
    }

    /// Send a binary message.
    pub fn send_binary(&self, payload: &[u8]) -> Result<()> {
        self.send(&Message::binary(payload.to_vec()))
    }

    /// A cloneable handle for sending from other threads.
    pub fn sender(&self) -> Sender<K> {
        Sender {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Register `handler` for events of `kind`.
    pub fn add_listener<F>(&self, kind: EventKind, handler: F) -> Unregister
    where
        F: Fn(&Event<'_>) + Send + Sync + 'static,
    {
        self.listeners.add(kind, handler)
    }

    /// Register a handler for decoded messages.
    pub fn on_message<F>(&self, handler: F) -> Unregister
    where
        F: Fn(&Message) + Send + Sync + 'static,
    {
        self.add_listener(EventKind::Message, move |event| {
            if let Event::Message(message) = *event {
                handler(message);
            }
        })
    }

    /// Register a handler for decode failures.
    pub fn on_error<F>(&self, handler: F) -> Unregister
    where
        F: Fn(&DecodeError) + Send + Sync + 'static,
    {
        self.add_listener(EventKind::Error, move |event| {
            if let Event::Error(err) = *event {
                handler(err);
            }
        })
    }

    /// Register a handler for end-of-stream.
    pub fn on_closed<F>(&self, handler: F) -> Unregister
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.add_listener(EventKind::Closed, move |_| handler())
    }

    /// Number of listeners registered for `kind`.
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners.count(kind)
    }

    /// Read one line from the source and dispatch its outcome.
    ///
    /// Blocks until the source yields a line or ends. On end-of-stream,
    /// `Closed` listeners run and the channel stops.
    pub fn poll(&mut self) -> Result<Step> {
        if !self.is_started() {
            return Err(ChannelError::NotStarted);
        }
        match self.source.next_line()? {
            Some(line) => {
                self.deliver_line(&line);
                Ok(Step::Line)
            }
            None => {
                self.close();
                Ok(Step::EndOfStream)
            }
        }
    }

    /// Poll until end-of-stream.
    ///
    /// A transport error stops the channel and is returned.
    pub fn run(&mut self) -> Result<()> {
        loop {
            match self.poll() {
                Ok(Step::Line) => {}
                Ok(Step::EndOfStream) => return Ok(()),
                Err(err) => {
                    self.stop();
                    return Err(err);
                }
            }
        }
    }

    /// Feed a line obtained outside the channel's own source.
    ///
    /// Returns `false` if the channel is stopped and the line was discarded.
    pub fn deliver_line(&mut self, line: &[u8]) -> bool {
        if !self.is_started() {
            tracing::trace!(len = line.len(), "discarding line received while stopped");
            return false;
        }
        match self.decoder.feed(line) {
            DecodeOutcome::Continue => {}
            DecodeOutcome::Emit(message) => {
                tracing::trace!(kind = message.kind(), size = message.len(), "received frame");
                self.listeners.emit(&Event::Message(&message));
            }
            DecodeOutcome::Error(err) => {
                tracing::warn!(error = %err, "failed to decode line");
                self.listeners.emit(&Event::Error(&err));
            }
        }
        true
    }

    fn close(&mut self) {
        tracing::debug!("source reached end of stream");
        self.listeners.emit(&Event::Closed);
        self.stop();
    }

    /// The decoder, for inspecting in-progress state.
    pub fn decoder(&self) -> &LineDecoder {
        &self.decoder
    }
}

/// Sends on a channel from anywhere; clones share the same sink.
///
/// Sends from all handles and the channel itself are serialized, so frames
/// never interleave on the wire.
pub struct Sender<K> {
    shared: Arc<Shared<K>>,
}

impl<K> Clone for Sender<K> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<K: Sink> Sender<K> {
    /// Encode `message` and write it to the sink.
    pub fn send(&self, message: &Message) -> Result<()> {
        self.shared.send(message)
    }

    /// Send a text message.
    pub fn send_text(&self, text: &str) -> Result<()> {
        self.send(&Message::text(text))
    }

    /// Send a binary message.
    pub fn send_binary(&self, payload: &[u8]) -> Result<()> {
        self.send(&Message::binary(payload.to_vec()))
    }

    pub fn is_started(&self) -> bool {
        self.shared.is_started()
    }
}
