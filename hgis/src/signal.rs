//! Explicit observer lists used to notify about state changes of layers, the layer manager and
//! the map canvas.

use parking_lot::Mutex;
use std::fmt::{Debug, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Identifier of a subscription returned by [`Signal::subscribe`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Handler<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// List of event handlers.
///
/// Handlers are called in subscription order. The list is copied before the handlers are invoked,
/// so a handler may subscribe or unsubscribe other handlers (including itself) while being
/// called. Such changes take effect from the next emitted event.
pub struct Signal<E> {
    handlers: Mutex<Vec<(SubscriptionId, Handler<E>)>>,
    next_id: AtomicU64,
}

impl<E> Signal<E> {
    /// Creates a signal without handlers.
    pub fn new() -> Self {
        Self {
            handlers: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Adds a handler. The returned id can be used to remove it.
    pub fn subscribe(&self, handler: impl Fn(&E) + Send + Sync + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.handlers.lock().push((id, Arc::new(handler)));
        id
    }

    /// Removes a handler. Returns false if there is no handler with this id.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut handlers = self.handlers.lock();
        let count = handlers.len();
        handlers.retain(|(handler_id, _)| *handler_id != id);
        handlers.len() != count
    }

    /// Removes all handlers.
    pub fn clear(&self) {
        self.handlers.lock().clear();
    }

    /// Number of subscribed handlers.
    pub fn handler_count(&self) -> usize {
        self.handlers.lock().len()
    }

    /// Calls all handlers with the event.
    pub fn emit(&self, event: &E) {
        let handlers: Vec<Handler<E>> = self
            .handlers
            .lock()
            .iter()
            .map(|(_, handler)| handler.clone())
            .collect();

        for handler in handlers {
            handler(event);
        }
    }
}

impl<E> Default for Signal<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Debug for Signal<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("handlers", &self.handler_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::RwLock;

    #[test]
    fn handlers_are_called_in_order() {
        let signal = Signal::<u32>::new();
        let log = Arc::new(RwLock::new(vec![]));

        let first = log.clone();
        signal.subscribe(move |v| first.write().push(("first", *v)));
        let second = log.clone();
        signal.subscribe(move |v| second.write().push(("second", *v)));

        signal.emit(&7);
        assert_eq!(*log.read(), vec![("first", 7), ("second", 7)]);
    }

    #[test]
    fn unsubscribe() {
        let signal = Signal::<()>::new();
        let count = Arc::new(AtomicU64::new(0));
        let counter = count.clone();
        let id = signal.subscribe(move |_| {
            counter.fetch_add(1, Ordering::Relaxed);
        });

        signal.emit(&());
        assert!(signal.unsubscribe(id));
        assert!(!signal.unsubscribe(id));
        signal.emit(&());

        assert_eq!(count.load(Ordering::Relaxed), 1);
        assert_eq!(signal.handler_count(), 0);
    }

    #[test]
    fn handler_can_subscribe_during_emit() {
        let signal = Arc::new(Signal::<()>::new());
        let inner = signal.clone();
        signal.subscribe(move |_| {
            inner.subscribe(|_| {});
        });

        signal.emit(&());
        assert_eq!(signal.handler_count(), 2);
    }
}
