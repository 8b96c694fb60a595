//! Listener registry: event kind → handlers in registration order.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use lineframe_codec::{DecodeError, Message};

/// What a listener subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A message was decoded.
    Message,
    /// A line could not be decoded.
    Error,
    /// The source reached end-of-stream.
    Closed,
}

/// An event delivered to listeners.
#[derive(Debug, Clone, Copy)]
pub enum Event<'a> {
    Message(&'a Message),
    Error(&'a DecodeError),
    Closed,
}

impl Event<'_> {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Message(_) => EventKind::Message,
            Event::Error(_) => EventKind::Error,
            Event::Closed => EventKind::Closed,
        }
    }
}

type Handler = Arc<dyn Fn(&Event<'_>) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    handlers: HashMap<EventKind, Vec<(u64, Handler)>>,
}

#[derive(Clone, Default)]
pub(crate) struct Listeners {
    registry: Arc<Mutex<Registry>>,
}

impl Listeners {
    pub(crate) fn add<F>(&self, kind: EventKind, handler: F) -> Unregister
    where
        F: Fn(&Event<'_>) + Send + Sync + 'static,
    {
        let handler: Handler = Arc::new(handler);
        let mut registry = lock(&self.registry);
        registry.next_id += 1;
        let id = registry.next_id;
        registry.handlers.entry(kind).or_default().push((id, handler));
        Unregister {
            registry: Arc::downgrade(&self.registry),
            kind,
            id,
        }
    }

    /// Invoke every handler for the event's kind, in registration order.
    ///
    /// Handlers run on a snapshot, so they may add or remove listeners.
    pub(crate) fn emit(&self, event: &Event<'_>) {
        let snapshot: Vec<Handler> = {
            let registry = lock(&self.registry);
            registry
                .handlers
                .get(&event.kind())
                .map(|handlers| handlers.iter().map(|(_, h)| Arc::clone(h)).collect())
                .unwrap_or_default()
        };
        for handler in snapshot {
            handler(event);
        }
    }

    pub(crate) fn count(&self, kind: EventKind) -> usize {
        lock(&self.registry)
            .handlers
            .get(&kind)
            .map_or(0, Vec::len)
    }
}

/// Removes one registered listener.
///
/// Dropping this without calling [`unregister`](Unregister::unregister)
/// leaves the listener in place.
#[derive(Debug)]
pub struct Unregister {
    registry: Weak<Mutex<Registry>>,
    kind: EventKind,
    id: u64,
}

impl Unregister {
    /// Remove the listener. Returns `false` if it was already gone.
    pub fn unregister(self) -> bool {
        let Some(registry) = self.registry.upgrade() else {
            return false;
        };
        let mut registry = lock(&registry);
        let Some(handlers) = registry.handlers.get_mut(&self.kind) else {
            return false;
        };
        let before = handlers.len();
        handlers.retain(|(id, _)| *id != self.id);
        before != handlers.len()
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }
}

fn lock(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder(
        log: &Arc<Mutex<Vec<String>>>,
        tag: &'static str,
    ) -> impl Fn(&Event<'_>) + Send + Sync + 'static {
        let log = Arc::clone(log);
        move |event: &Event<'_>| {
            let entry = match event {
                Event::Message(message) => format!("{tag}:{}", message.as_text().unwrap_or("")),
                Event::Error(err) => format!("{tag}:error:{err}"),
                Event::Closed => format!("{tag}:closed"),
            };
            log.lock().unwrap().push(entry);
        }
    }

    #[test]
    fn handlers_run_in_registration_order() {
        let listeners = Listeners::default();
        let log = Arc::new(Mutex::new(Vec::new()));
        listeners.add(EventKind::Message, recorder(&log, "first"));
        listeners.add(EventKind::Message, recorder(&log, "second"));

        listeners.emit(&Event::Message(&Message::text("hi")));

        assert_eq!(*log.lock().unwrap(), vec!["first:hi", "second:hi"]);
    }

    #[test]
    fn events_only_reach_their_kind() {
        let listeners = Listeners::default();
        let log = Arc::new(Mutex::new(Vec::new()));
        listeners.add(EventKind::Closed, recorder(&log, "close"));

        listeners.emit(&Event::Message(&Message::text("ignored")));
        listeners.emit(&Event::Closed);

        assert_eq!(*log.lock().unwrap(), vec!["close:closed"]);
        assert_eq!(listeners.count(EventKind::Closed), 1);
        assert_eq!(listeners.count(EventKind::Message), 0);
    }

    #[test]
    fn unregister_removes_only_that_handler() {
        let listeners = Listeners::default();
        let log = Arc::new(Mutex::new(Vec::new()));
        let first = listeners.add(EventKind::Message, recorder(&log, "first"));
        listeners.add(EventKind::Message, recorder(&log, "second"));

        assert_eq!(first.kind(), EventKind::Message);
        assert!(first.unregister());
        listeners.emit(&Event::Message(&Message::text("x")));

        assert_eq!(*log.lock().unwrap(), vec!["second:x"]);
    }

    #[test]
    fn unregister_after_registry_dropped() {
        let listeners = Listeners::default();
        let handle = listeners.add(EventKind::Error, |_| {});
        drop(listeners);
        assert!(!handle.unregister());
    }

    #[test]
    fn handler_may_unregister_during_dispatch() {
        let listeners = Listeners::default();
        let log = Arc::new(Mutex::new(Vec::new()));
        let victim = Arc::new(Mutex::new(None::<Unregister>));

        let victim_slot = Arc::clone(&victim);
        listeners.add(EventKind::Message, move |_| {
            if let Some(handle) = victim_slot.lock().unwrap().take() {
                handle.unregister();
            }
        });
        *victim.lock().unwrap() = Some(listeners.add(EventKind::Message, recorder(&log, "victim")));

        listeners.emit(&Event::Message(&Message::text("one")));
        listeners.emit(&Event::Message(&Message::text("two")));

        // The snapshot for "one" still included the victim.
        assert_eq!(*log.lock().unwrap(), vec!["victim:one"]);
    }
}
