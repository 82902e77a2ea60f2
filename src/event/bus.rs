//! Event subscription registry and dispatch.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc;
use tracing::trace;

use super::{Event, EventKind};

type Handler = Arc<dyn Fn(&Event) + Send + Sync>;

/// Handle returned by a subscription, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Registry of event handlers.
///
/// Handlers for a kind run in registration order, followed by catch-all
/// handlers in registration order. Handlers run on the publishing task
/// (the reader, for wire events) with no lock held, so they may subscribe,
/// unsubscribe or send commands.
#[derive(Default)]
pub struct EventBus {
    next_id: AtomicU64,
    handlers: RwLock<HashMap<EventKind, Vec<(SubscriptionId, Handler)>>>,
    catch_all: RwLock<Vec<(SubscriptionId, Handler)>>,
    /// Receivers handed out by [`EventBus::stream`]; closed ones are
    /// dropped on the next publish.
    streams: Mutex<Vec<mpsc::UnboundedSender<Event>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self) -> SubscriptionId {
        SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Run `handler` for every event of `kind`.
    pub fn subscribe<F>(&self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.handlers
            .write()
            .entry(kind)
            .or_default()
            .push((id, Arc::new(handler)));
        id
    }

    /// Run `handler` for every event.
    pub fn subscribe_all<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.catch_all.write().push((id, Arc::new(handler)));
        id
    }

    /// Receive every event on a channel instead of a callback.
    ///
    /// Streams are fed after all handlers. Dropping the receiver ends the
    /// subscription.
    pub fn stream(&self) -> mpsc::UnboundedReceiver<Event> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.streams.lock().push(tx);
        rx
    }

    /// Remove a subscription. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut catch_all = self.catch_all.write();
        if let Some(pos) = catch_all.iter().position(|(i, _)| *i == id) {
            catch_all.remove(pos);
            return true;
        }
        drop(catch_all);

        let mut handlers = self.handlers.write();
        for list in handlers.values_mut() {
            if let Some(pos) = list.iter().position(|(i, _)| *i == id) {
                list.remove(pos);
                return true;
            }
        }
        false
    }

    /// Deliver `event` to its subscribers.
    pub fn publish(&self, event: &Event) {
        let mut targets: Vec<Handler> = self
            .handlers
            .read()
            .get(&event.kind())
            .map(|list| list.iter().map(|(_, h)| Arc::clone(h)).collect())
            .unwrap_or_default();
        targets.extend(self.catch_all.read().iter().map(|(_, h)| Arc::clone(h)));

        trace!(event = event.name(), handlers = targets.len(), "publishing event");
        for handler in targets {
            handler(event);
        }
        self.streams
            .lock()
            .retain(|tx| tx.send(event.clone()).is_ok());
    }

    /// Number of registered handlers and open streams.
    pub fn len(&self) -> usize {
        self.handlers.read().values().map(Vec::len).sum::<usize>()
            + self.catch_all.read().len()
            + self.streams.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use azmate_proto::Role;
    use parking_lot::Mutex;

    fn motd(text: &str) -> Event {
        Event::Motd { text: text.into() }
    }

    #[test]
    fn kind_handlers_run_in_order_before_catch_all() {
        let bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        let l = Arc::clone(&log);
        bus.subscribe_all(move |_| l.lock().push("all"));
        let l = Arc::clone(&log);
        bus.subscribe(EventKind::Motd, move |_| l.lock().push("first"));
        let l = Arc::clone(&log);
        bus.subscribe(EventKind::Motd, move |_| l.lock().push("second"));
        let l = Arc::clone(&log);
        bus.subscribe(EventKind::Disconnected, move |_| l.lock().push("never"));

        bus.publish(&motd("hi"));
        assert_eq!(*log.lock(), vec!["first", "second", "all"]);
    }

    #[test]
    fn unsubscribe() {
        let bus = EventBus::new();
        let count = Arc::new(AtomicU64::new(0));

        let c = Arc::clone(&count);
        let id = bus.subscribe(EventKind::Motd, move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });
        bus.publish(&motd("a"));
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.publish(&motd("b"));

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(bus.is_empty());
    }

    #[test]
    fn role_kinds_are_distinct() {
        let bus = EventBus::new();
        let hits = Arc::new(AtomicU64::new(0));
        let h = Arc::clone(&hits);
        bus.subscribe(EventKind::RoleGranted(Role::Voice), move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        });

        let chan = Arc::new(crate::state::Channel::joined("#c"));
        let target = crate::state::User::new("alice");
        for role in [Role::Voice, Role::Operator] {
            bus.publish(&Event::RoleGranted {
                role,
                channel: Arc::clone(&chan),
                setter: None,
                target: target.clone(),
            });
        }
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn handler_may_subscribe_while_publishing() {
        let bus = Arc::new(EventBus::new());
        let b = Arc::clone(&bus);
        bus.subscribe(EventKind::Motd, move |_| {
            b.subscribe(EventKind::Motd, |_| {});
        });
        bus.publish(&motd("x"));
        assert_eq!(bus.len(), 2);
    }

    #[tokio::test]
    async fn stream_receives_events() {
        let bus = EventBus::new();
        let mut rx = bus.stream();
        bus.publish(&motd("hello"));
        match rx.recv().await {
            Some(Event::Motd { text }) => assert_eq!(text, "hello"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn dropped_stream_is_released() {
        let bus = EventBus::new();
        let rx = bus.stream();
        let _kept = bus.stream();
        assert_eq!(bus.len(), 2);

        drop(rx);
        bus.publish(&motd("after drop"));
        assert_eq!(bus.len(), 1);
    }
}
