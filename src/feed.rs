//! Feed and publisher abstractions (`spec.md` section 6 "External interfaces").
//!
//! The core consumes a stream of decoded events from a [`Feed`] and publishes through a
//! [`Publisher`]; transport, authentication, and endpoint configuration are not this crate's
//! concern (`spec.md` section 1, Non-goals) — only the shape of the boundary is. [`InMemoryFeed`]
//! is a deterministic test double that replays a fixed list of batches to every attached
//! subscription, standing in for a real network feed in tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::event::Event;
use crate::subscription::{EventTypeTag, Subscription};

/// A source of decoded market events, consumed by the core.
///
/// Implementors own the transport; this trait only describes how the core attaches
/// subscriptions to it and asks about already-known lasting events.
pub trait Feed: Send + Sync {
    /// Creates a subscription filtered to the given event kinds. The subscription is not yet
    /// receiving events until [`attach`](Feed::attach) is called with it.
    fn create_subscription(&self, event_kinds: &[EventTypeTag]) -> Subscription;

    /// Registers a subscription to receive events delivered by this feed.
    fn attach(&self, subscription: &Subscription);

    /// Stops a subscription from receiving further events. Does not close it.
    fn detach(&self, subscription: &Subscription);

    fn add_symbols(&self, subscription: &Subscription, symbols: &[String]);
    fn remove_symbols(&self, subscription: &Subscription, symbols: &[String]);
    fn set_symbols(&self, subscription: &Subscription, symbols: &[String]);

    /// Returns the most recently seen lasting event of `kind` for `symbol`, if any has arrived.
    fn get_last_event(&self, kind: EventTypeTag, symbol: &str) -> Option<Event>;
}

/// A sink that accepts published events, consumed by producers.
pub trait Publisher: Send + Sync {
    fn publish(&self, events: Vec<Event>);

    /// Attaches an observable listener that is notified of symbol add/remove/close activity
    /// across every subscription this publisher feeds.
    fn subscribe_observable(
        &self,
        listener: crate::subscription::ObservableListener,
    ) -> crate::subscription::ListenerGuard;
}

struct AttachedSubscription {
    subscription: Subscription,
}

/// A deterministic [`Feed`] test double. Holds a fixed list of event batches; replaying them
/// (via [`InMemoryFeed::replay_all`]) dispatches each batch, in order, to every attached
/// subscription via [`Subscription::dispatch_events`].
#[derive(Default)]
pub struct InMemoryFeed {
    batches: Vec<Vec<Event>>,
    last_events: Mutex<HashMap<(EventTypeTag, String), Event>>,
    attached: Mutex<Vec<AttachedSubscription>>,
}

impl InMemoryFeed {
    pub fn new(batches: Vec<Vec<Event>>) -> Self {
        Self {
            batches,
            last_events: Mutex::new(HashMap::new()),
            attached: Mutex::new(Vec::new()),
        }
    }

    /// Dispatches every configured batch, in order, to every currently attached subscription,
    /// updating the last-event cache as it goes.
    pub fn replay_all(&self) {
        for batch in &self.batches {
            self.replay_one(batch.clone());
        }
    }

    fn replay_one(&self, batch: Vec<Event>) {
        {
            let mut last_events = self.last_events.lock().unwrap();
            for event in &batch {
                let key = (EventTypeTag::of(event), event.event_symbol().to_string());
                last_events.insert(key, event.clone());
            }
        }
        let attached = self.attached.lock().unwrap();
        for entry in attached.iter() {
            entry.subscription.dispatch_events(batch.clone());
        }
    }
}

impl Feed for InMemoryFeed {
    fn create_subscription(&self, event_kinds: &[EventTypeTag]) -> Subscription {
        let subscription = Subscription::with_inline_executor();
        subscription.add_event_types(event_kinds.iter().copied());
        subscription
    }

    fn attach(&self, subscription: &Subscription) {
        let mut attached = self.attached.lock().unwrap();
        attached.push(AttachedSubscription {
            subscription: subscription.clone(),
        });
    }

    fn detach(&self, subscription: &Subscription) {
        let mut attached = self.attached.lock().unwrap();
        attached.retain(|entry| !Arc::ptr_eq(entry.subscription.identity(), subscription.identity()));
    }

    fn add_symbols(&self, subscription: &Subscription, symbols: &[String]) {
        subscription.add_symbols(symbols.iter().cloned());
    }

    fn remove_symbols(&self, subscription: &Subscription, symbols: &[String]) {
        subscription.remove_symbols(symbols.iter().cloned());
    }

    fn set_symbols(&self, subscription: &Subscription, symbols: &[String]) {
        subscription.set_symbols(symbols.iter().cloned());
    }

    fn get_last_event(&self, kind: EventTypeTag, symbol: &str) -> Option<Event> {
        self.last_events
            .lock()
            .unwrap()
            .get(&(kind, symbol.to_string()))
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::TextMessage;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn text_message(symbol: &str, text: &str) -> Event {
        Event::TextMessage(TextMessage {
            event_symbol: symbol.into(),
            event_time: 0,
            text: text.into(),
        })
    }

    #[test]
    fn attached_subscription_receives_replayed_batches() {
        let feed = InMemoryFeed::new(vec![
            vec![text_message("AAPL", "one")],
            vec![text_message("AAPL", "two")],
        ]);
        let sub = feed.create_subscription(&[EventTypeTag::TextMessage]);
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let _guard = sub.add_event_listener(Arc::new(move |events| {
            c.fetch_add(events.len(), Ordering::SeqCst);
        }));
        feed.attach(&sub);
        feed.replay_all();
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn detached_subscription_stops_receiving() {
        let feed = InMemoryFeed::new(vec![vec![text_message("AAPL", "one")]]);
        let sub = feed.create_subscription(&[EventTypeTag::TextMessage]);
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let _guard = sub.add_event_listener(Arc::new(move |events| {
            c.fetch_add(events.len(), Ordering::SeqCst);
        }));
        feed.attach(&sub);
        feed.detach(&sub);
        feed.replay_all();
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn get_last_event_reflects_most_recent_replay() {
        let feed = InMemoryFeed::new(vec![
            vec![text_message("AAPL", "one")],
            vec![text_message("AAPL", "two")],
        ]);
        feed.replay_all();
        let last = feed.get_last_event(EventTypeTag::TextMessage, "AAPL");
        match last {
            Some(Event::TextMessage(t)) => assert_eq!(t.text, "two"),
            other => panic!("expected a cached text message, got {other:?}"),
        }
    }
}
