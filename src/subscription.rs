//! Subscription & listener plumbing (`spec.md` section 4.7).
//!
//! A [`Subscription`] tracks a symbol set, an event-type filter, and three independent kinds of
//! listener. Per-subscription state sits behind a `parking_lot::ReentrantMutex` wrapping a
//! `RefCell` — the standard pattern for "same thread may re-enter, other threads serialize"
//! (`spec.md` section 5: "re-entry from listener callbacks into the same subscription is
//! permitted but discouraged"). Listener attachment returns a [`ListenerGuard`]; dropping it (or
//! calling [`ListenerGuard::detach`] explicitly) removes the listener.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::ReentrantMutex;

use crate::event::Event;
use crate::executor::{Executor, InlineExecutor};
use crate::itm::Commit;

/// The concrete event kinds a subscription can filter on.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum EventTypeTag {
    Quote,
    Profile,
    Summary,
    Trade,
    TradeETH,
    TimeAndSale,
    Order,
    Greeks,
    Underlying,
    TheoPrice,
    Series,
    Candle,
    TextMessage,
    OptionSale,
}

impl EventTypeTag {
    pub fn of(event: &Event) -> Self {
        match event {
            Event::Quote(_) => EventTypeTag::Quote,
            Event::Profile(_) => EventTypeTag::Profile,
            Event::Summary(_) => EventTypeTag::Summary,
            Event::Trade(_) => EventTypeTag::Trade,
            Event::TradeETH(_) => EventTypeTag::TradeETH,
            Event::TimeAndSale(_) => EventTypeTag::TimeAndSale,
            Event::Order(_) => EventTypeTag::Order,
            Event::Greeks(_) => EventTypeTag::Greeks,
            Event::Underlying(_) => EventTypeTag::Underlying,
            Event::TheoPrice(_) => EventTypeTag::TheoPrice,
            Event::Series(_) => EventTypeTag::Series,
            Event::Candle(_) => EventTypeTag::Candle,
            Event::TextMessage(_) => EventTypeTag::TextMessage,
            Event::OptionSale(_) => EventTypeTag::OptionSale,
        }
    }
}

/// Symbol add/remove/close notifications, delivered to observable subscription listeners.
#[derive(Clone, PartialEq, Debug)]
pub enum ObservableEvent {
    SymbolAdded(String),
    SymbolRemoved(String),
    Closed,
}

pub type EventListener = Arc<dyn Fn(&[Event]) + Send + Sync>;
pub type TransactionListener = Arc<dyn Fn(&Commit) + Send + Sync>;
pub type ObservableListener = Arc<dyn Fn(&ObservableEvent) + Send + Sync>;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
enum ListenerKind {
    Event,
    Transaction,
    Observable,
}

struct SubscriptionState {
    symbols: HashSet<String>,
    event_types: HashSet<EventTypeTag>,
    event_listeners: HashMap<u64, EventListener>,
    transaction_listeners: HashMap<u64, TransactionListener>,
    observable_listeners: HashMap<u64, ObservableListener>,
    closed: bool,
}

struct Inner {
    state: ReentrantMutex<RefCell<SubscriptionState>>,
    executor: Arc<dyn Executor>,
    next_listener_id: AtomicU64,
}

/// A live subscription. Cheaply cloneable; clones share the same underlying state.
#[derive(Clone)]
pub struct Subscription {
    inner: Arc<Inner>,
}

impl Subscription {
    pub fn new(executor: Arc<dyn Executor>) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: ReentrantMutex::new(RefCell::new(SubscriptionState {
                    symbols: HashSet::new(),
                    event_types: HashSet::new(),
                    event_listeners: HashMap::new(),
                    transaction_listeners: HashMap::new(),
                    observable_listeners: HashMap::new(),
                    closed: false,
                })),
                executor,
                next_listener_id: AtomicU64::new(0),
            }),
        }
    }

    /// A subscription with no configured executor runs listener callbacks inline, on whatever
    /// thread calls [`Subscription::dispatch_events`]/[`Subscription::dispatch_commit`].
    pub fn with_inline_executor() -> Self {
        Self::new(Arc::new(InlineExecutor))
    }

    pub fn add_symbols(&self, symbols: impl IntoIterator<Item = String>) {
        let guard = self.inner.state.lock();
        let mut state = guard.borrow_mut();
        if state.closed {
            return;
        }
        for symbol in symbols {
            state.symbols.insert(symbol.clone());
            self.notify_observable_locked(&state, &ObservableEvent::SymbolAdded(symbol));
        }
    }

    pub fn remove_symbols(&self, symbols: impl IntoIterator<Item = String>) {
        let guard = self.inner.state.lock();
        let mut state = guard.borrow_mut();
        if state.closed {
            return;
        }
        for symbol in symbols {
            if state.symbols.remove(&symbol) {
                self.notify_observable_locked(&state, &ObservableEvent::SymbolRemoved(symbol));
            }
        }
    }

    pub fn set_symbols(&self, symbols: impl IntoIterator<Item = String>) {
        let guard = self.inner.state.lock();
        let mut state = guard.borrow_mut();
        if state.closed {
            return;
        }
        let new_set: HashSet<String> = symbols.into_iter().collect();
        let removed: Vec<String> = state.symbols.difference(&new_set).cloned().collect();
        let added: Vec<String> = new_set.difference(&state.symbols).cloned().collect();
        state.symbols = new_set;
        for symbol in removed {
            self.notify_observable_locked(&state, &ObservableEvent::SymbolRemoved(symbol));
        }
        for symbol in added {
            self.notify_observable_locked(&state, &ObservableEvent::SymbolAdded(symbol));
        }
    }

    pub fn symbols(&self) -> HashSet<String> {
        self.inner.state.lock().borrow().symbols.clone()
    }

    pub fn add_event_types(&self, types: impl IntoIterator<Item = EventTypeTag>) {
        let guard = self.inner.state.lock();
        let mut state = guard.borrow_mut();
        state.event_types.extend(types);
    }

    pub fn remove_event_types(&self, types: impl IntoIterator<Item = EventTypeTag>) {
        let guard = self.inner.state.lock();
        let mut state = guard.borrow_mut();
        for t in types {
            state.event_types.remove(&t);
        }
    }

    pub fn add_event_listener(&self, listener: EventListener) -> ListenerGuard {
        self.attach(ListenerKind::Event, move |state, id| {
            state.event_listeners.insert(id, listener);
        })
    }

    pub fn add_transaction_listener(&self, listener: TransactionListener) -> ListenerGuard {
        self.attach(ListenerKind::Transaction, move |state, id| {
            state.transaction_listeners.insert(id, listener);
        })
    }

    pub fn add_observable_listener(&self, listener: ObservableListener) -> ListenerGuard {
        self.attach(ListenerKind::Observable, move |state, id| {
            state.observable_listeners.insert(id, listener);
        })
    }

    fn attach(
        &self,
        kind: ListenerKind,
        insert: impl FnOnce(&mut SubscriptionState, u64),
    ) -> ListenerGuard {
        let id = self.inner.next_listener_id.fetch_add(1, Ordering::Relaxed);
        let guard = self.inner.state.lock();
        let mut state = guard.borrow_mut();
        if !state.closed {
            insert(&mut state, id);
        }
        ListenerGuard {
            subscription: Arc::downgrade(&self.inner),
            id,
            kind,
            detached: false,
        }
    }

    fn notify_observable_locked(&self, state: &SubscriptionState, event: &ObservableEvent) {
        for listener in state.observable_listeners.values() {
            let listener = listener.clone();
            let listener_event = event.clone();
            self.inner
                .executor
                .submit(Box::new(move || listener(&listener_event)));
        }
    }

    /// Feeds a batch of events to every event listener whose type filter (if any) matches at
    /// least one event present. An empty filter set means "all types".
    pub fn dispatch_events(&self, events: Vec<Event>) {
        let guard = self.inner.state.lock();
        let state = guard.borrow();
        if state.closed {
            return;
        }
        let filtered: Vec<Event> = if state.event_types.is_empty() {
            events
        } else {
            events
                .into_iter()
                .filter(|e| state.event_types.contains(&EventTypeTag::of(e)))
                .collect()
        };
        if filtered.is_empty() {
            return;
        }
        let filtered = Arc::new(filtered);
        for listener in state.event_listeners.values() {
            let listener = listener.clone();
            let events = filtered.clone();
            self.inner.executor.submit(Box::new(move || listener(&events)));
        }
    }

    /// Delivers one committed transaction-model batch to every transaction listener.
    pub fn dispatch_commit(&self, commit: Commit) {
        let guard = self.inner.state.lock();
        let state = guard.borrow();
        if state.closed {
            return;
        }
        let commit = Arc::new(commit);
        for listener in state.transaction_listeners.values() {
            let listener = listener.clone();
            let commit = commit.clone();
            self.inner.executor.submit(Box::new(move || listener(&commit)));
        }
    }

    /// Closes the subscription. Idempotent: a second call is a no-op. After this returns, no
    /// listener attached to this subscription will be invoked again.
    pub fn close(&self) {
        let guard = self.inner.state.lock();
        let mut state = guard.borrow_mut();
        if state.closed {
            return;
        }
        state.closed = true;
        let observers: Vec<&ObservableListener> = state.observable_listeners.values().collect();
        for listener in &observers {
            listener(&ObservableEvent::Closed);
        }
        state.event_listeners.clear();
        state.transaction_listeners.clear();
        state.observable_listeners.clear();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.state.lock().borrow().closed
    }

    /// A stable per-subscription identity, usable for pointer-equality comparisons (e.g. a
    /// feed matching a subscription passed to [`detach`](Self::detach) against its attached
    /// list). Clones of the same subscription share the same identity.
    pub fn identity(&self) -> &Arc<Inner> {
        &self.inner
    }
}

/// RAII handle for an attached listener. Dropping it detaches the listener; [`detach`](Self::detach)
/// does the same thing explicitly and is idempotent with respect to drop.
pub struct ListenerGuard {
    subscription: Weak<Inner>,
    id: u64,
    kind: ListenerKind,
    detached: bool,
}

impl ListenerGuard {
    pub fn detach(mut self) {
        self.detach_inner();
    }

    fn detach_inner(&mut self) {
        if self.detached {
            return;
        }
        self.detached = true;
        let Some(inner) = self.subscription.upgrade() else {
            return;
        };
        let guard = inner.state.lock();
        let mut state = guard.borrow_mut();
        match self.kind {
            ListenerKind::Event => {
                state.event_listeners.remove(&self.id);
            }
            ListenerKind::Transaction => {
                state.transaction_listeners.remove(&self.id);
            }
            ListenerKind::Observable => {
                state.observable_listeners.remove(&self.id);
            }
        }
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        self.detach_inner();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::InPlaceExecutor;
    use crate::event::TextMessage;
    use std::sync::atomic::{AtomicUsize, Ordering as AOrdering};

    fn text_message(text: &str) -> Event {
        Event::TextMessage(TextMessage {
            event_symbol: "AAPL".into(),
            event_time: 0,
            text: text.into(),
        })
    }

    #[test]
    fn listener_receives_dispatched_events() {
        let executor = Arc::new(InPlaceExecutor::new());
        let sub = Subscription::new(executor.clone());
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let _guard = sub.add_event_listener(Arc::new(move |events| {
            c.fetch_add(events.len(), AOrdering::SeqCst);
        }));
        sub.dispatch_events(vec![text_message("hi")]);
        executor.process_all_pending_tasks();
        assert_eq!(count.load(AOrdering::SeqCst), 1);
    }

    #[test]
    fn dropping_guard_detaches_listener() {
        let executor = Arc::new(InPlaceExecutor::new());
        let sub = Subscription::new(executor.clone());
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let guard = sub.add_event_listener(Arc::new(move |_events| {
            c.fetch_add(1, AOrdering::SeqCst);
        }));
        drop(guard);
        sub.dispatch_events(vec![text_message("hi")]);
        executor.process_all_pending_tasks();
        assert_eq!(count.load(AOrdering::SeqCst), 0);
    }

    #[test]
    fn close_is_idempotent_and_stops_delivery() {
        let executor = Arc::new(InPlaceExecutor::new());
        let sub = Subscription::new(executor.clone());
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let _guard = sub.add_event_listener(Arc::new(move |_events| {
            c.fetch_add(1, AOrdering::SeqCst);
        }));
        sub.close();
        sub.close();
        sub.dispatch_events(vec![text_message("hi")]);
        executor.process_all_pending_tasks();
        assert_eq!(count.load(AOrdering::SeqCst), 0);
        assert!(sub.is_closed());
    }

    #[test]
    fn event_type_filter_drops_unrequested_kinds() {
        let executor = Arc::new(InPlaceExecutor::new());
        let sub = Subscription::new(executor.clone());
        sub.add_event_types([EventTypeTag::Quote]);
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let _guard = sub.add_event_listener(Arc::new(move |events| {
            c.fetch_add(events.len(), AOrdering::SeqCst);
        }));
        sub.dispatch_events(vec![text_message("hi")]);
        executor.process_all_pending_tasks();
        assert_eq!(count.load(AOrdering::SeqCst), 0);
    }

    #[test]
    fn set_symbols_reports_additions_and_removals() {
        let executor = Arc::new(InPlaceExecutor::new());
        let sub = Subscription::new(executor.clone());
        sub.add_symbols(["AAPL".to_string()]);
        let events = Arc::new(std::sync::Mutex::new(Vec::new()));
        let e = events.clone();
        let _guard = sub.add_observable_listener(Arc::new(move |event| {
            e.lock().unwrap().push(event.clone());
        }));
        sub.set_symbols(["MSFT".to_string()]);
        let recorded = events.lock().unwrap().clone();
        assert!(recorded.contains(&ObservableEvent::SymbolRemoved("AAPL".into())));
        assert!(recorded.contains(&ObservableEvent::SymbolAdded("MSFT".into())));
    }
}
