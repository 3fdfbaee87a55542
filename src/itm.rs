//! Indexed Transaction Model (`spec.md` section 4.4).
//!
//! Reassembles a per-`(symbol, source)` stream of indexed events into committed batches, hiding
//! torn transactions and partially loaded snapshots from the listener. One [`IndexedTxModel`]
//! tracks one symbol across however many sources are currently observed; each source carries its
//! own independent [`SourceState`].

use std::collections::HashMap;

use tracing::warn;

use crate::event::Event;
use crate::flags::EventFlags;

/// What to do with a commit once it is ready: deliver on every commit, or only the commit that
/// completes a snapshot (`spec.md` section 4.4 "Configuration").
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BatchPolicy {
    EveryCommit,
    SnapshotOnly,
}

impl Default for BatchPolicy {
    fn default() -> Self {
        BatchPolicy::EveryCommit
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Phase {
    Idle,
    InSnapshot,
    InTx,
}

struct SourceState {
    phase: Phase,
    pending: Vec<Event>,
    snapshot_pending: bool,
    tx_pending: bool,
    saw_snapshot_end: bool,
}

impl SourceState {
    fn new() -> Self {
        Self {
            phase: Phase::Idle,
            pending: Vec::new(),
            snapshot_pending: false,
            tx_pending: false,
            saw_snapshot_end: false,
        }
    }
}

/// A committed, never-torn batch for one source.
#[derive(Clone, Debug)]
pub struct Commit {
    pub source: i32,
    pub events: Vec<Event>,
    pub is_snapshot: bool,
}

fn flags_of(event: &Event) -> EventFlags {
    event.event_flags().unwrap_or_else(EventFlags::empty)
}

/// Per-source snapshot/transaction reassembly for indexed events belonging to one symbol.
///
/// `spec.md` section 4.4 step-by-step transition table is implemented verbatim in
/// [`IndexedTxModel::process`]; this type owns no listener itself — callers drain [`Commit`]s
/// from the returned `Vec` and dispatch them however their subscription is configured
/// (see [`crate::subscription`]).
pub struct IndexedTxModel {
    symbol: String,
    policy: BatchPolicy,
    sources: HashMap<i32, SourceState>,
}

impl IndexedTxModel {
    pub fn new(symbol: impl Into<String>, policy: BatchPolicy) -> Self {
        Self {
            symbol: symbol.into(),
            policy,
            sources: HashMap::new(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Feeds one received list of indexed events through the state machine, grouped by source.
    /// The listener is invoked at most once per source per call (`spec.md` section 4.4
    /// "Multi-source coupling"); events lacking `source_id()`/`event_flags()` entirely
    /// (non-indexed kinds) are ignored — this model only reassembles indexed streams.
    pub fn process(&mut self, events: Vec<Event>) -> Vec<Commit> {
        let mut by_source: HashMap<i32, Vec<Event>> = HashMap::new();
        for event in events {
            if let Some(source) = event.source_id() {
                by_source.entry(source).or_default().push(event);
            }
        }
        let mut commits = Vec::new();
        for (source, events) in by_source {
            let state = self.sources.entry(source).or_insert_with(SourceState::new);
            for event in events {
                apply_transition(state, event);
                if let Some(commit) = maybe_commit(state, source, self.policy) {
                    commits.push(commit);
                }
            }
        }
        commits
    }

    /// Discards all in-flight state for every source without emitting a commit, used when a
    /// subscription closes mid-transaction (`spec.md` S2: the listener must never see a torn
    /// batch, including one that was never completed because of a close).
    pub fn reset(&mut self) {
        self.sources.clear();
    }

    /// Forcibly ends whatever is pending for `source`, as if the event stream itself had
    /// delivered `SNAPSHOT_END`. Used by [`crate::tsm::TimeSeriesModel`] when an out-of-range
    /// event implicitly terminates a descending-order snapshot (`spec.md` section 4.5).
    pub(crate) fn force_commit(&mut self, source: i32) -> Option<Commit> {
        let state = self.sources.get_mut(&source)?;
        if state.pending.is_empty() {
            return None;
        }
        let is_snapshot = state.snapshot_pending || state.saw_snapshot_end;
        state.snapshot_pending = false;
        state.tx_pending = false;
        state.saw_snapshot_end = false;
        state.phase = Phase::Idle;
        let events = std::mem::take(&mut state.pending);
        Some(Commit {
            source,
            events,
            is_snapshot,
        })
    }
}

fn apply_transition(state: &mut SourceState, event: Event) {
    let flags = flags_of(&event);

    if state.phase == Phase::Idle && state.pending.is_empty() {
        state.phase = if flags.contains(EventFlags::SNAPSHOT_BEGIN) {
            Phase::InSnapshot
        } else {
            Phase::Idle
        };
        state.snapshot_pending = flags.contains(EventFlags::SNAPSHOT_BEGIN);
    }

    if flags.contains(EventFlags::SNAPSHOT_BEGIN) && !state.pending.is_empty() {
        warn!("SNAPSHOT_BEGIN mid-stream, discarding torn prior snapshot state");
        state.pending.clear();
        state.phase = Phase::InSnapshot;
        state.snapshot_pending = true;
        state.saw_snapshot_end = false;
    }

    state.pending.push(event);
    state.tx_pending = flags.tx_pending();

    if flags.ends_snapshot() {
        state.snapshot_pending = false;
        state.saw_snapshot_end = true;
    }

    state.phase = if state.snapshot_pending {
        Phase::InSnapshot
    } else if state.tx_pending {
        Phase::InTx
    } else {
        Phase::Idle
    };
}

fn maybe_commit(state: &mut SourceState, source: i32, policy: BatchPolicy) -> Option<Commit> {
    if state.snapshot_pending || state.tx_pending {
        return None;
    }
    let is_snapshot = state.saw_snapshot_end;
    state.saw_snapshot_end = false;
    state.phase = Phase::Idle;
    if policy == BatchPolicy::SnapshotOnly && !is_snapshot {
        state.pending.clear();
        return None;
    }
    let events = std::mem::take(&mut state.pending);
    Some(Commit {
        source,
        events,
        is_snapshot,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{IndexedEventHeader, OrderBase, OrderKind, Side};

    fn order(index: i64, flags: EventFlags, price: f64, size: f64) -> Event {
        Event::Order(OrderBase {
            event_symbol: "AAPL".into(),
            event_time: 0,
            header: IndexedEventHeader::new(index, flags),
            time: 0,
            sequence: 0,
            exchange_code: '\0',
            side: Side::Buy,
            price,
            size,
            kind: OrderKind::Order,
            action: None,
            order_id: None,
            exec_price: None,
            exec_size: None,
            iceberg_peak_size: None,
            market_maker: None,
            spread_symbol: None,
        })
    }

    // S1: snapshot with a transaction folded inside it commits once, as a snapshot.
    #[test]
    fn s1_snapshot_with_transaction_inside() {
        let mut itm = IndexedTxModel::new("AAPL", BatchPolicy::EveryCommit);
        let e1 = order(5, EventFlags::SNAPSHOT_BEGIN | EventFlags::TX_PENDING, 100.0, 10.0);
        let e2 = order(4, EventFlags::TX_PENDING, 99.0, 5.0);
        let e3 = order(3, EventFlags::SNAPSHOT_END, 98.0, 3.0);
        let commits = itm.process(vec![e1, e2, e3]);
        assert_eq!(commits.len(), 1);
        assert!(commits[0].is_snapshot);
        assert_eq!(commits[0].events.len(), 3);
    }

    // S2: a torn transaction followed by a close must never be delivered.
    #[test]
    fn s2_torn_transaction_then_close_never_delivers() {
        let mut itm = IndexedTxModel::new("AAPL", BatchPolicy::EveryCommit);
        let e1 = order(1, EventFlags::TX_PENDING, 100.0, 1.0);
        let e2 = order(2, EventFlags::TX_PENDING, 101.0, 1.0);
        let commits = itm.process(vec![e1, e2]);
        assert!(commits.is_empty());
        itm.reset();
        assert!(itm.process(Vec::new()).is_empty());
    }

    #[test]
    fn singleton_commits_when_no_flags_set() {
        let mut itm = IndexedTxModel::new("AAPL", BatchPolicy::EveryCommit);
        let e1 = order(1, EventFlags::empty(), 100.0, 1.0);
        let commits = itm.process(vec![e1]);
        assert_eq!(commits.len(), 1);
        assert!(!commits[0].is_snapshot);
        assert_eq!(commits[0].events.len(), 1);
    }

    #[test]
    fn malformed_snapshot_end_without_begin_commits_as_singleton() {
        let mut itm = IndexedTxModel::new("AAPL", BatchPolicy::EveryCommit);
        let e1 = order(1, EventFlags::SNAPSHOT_END, 100.0, 1.0);
        let commits = itm.process(vec![e1]);
        assert_eq!(commits.len(), 1);
        assert!(commits[0].is_snapshot);
    }

    #[test]
    fn snapshot_begin_mid_stream_discards_prior_pending() {
        let mut itm = IndexedTxModel::new("AAPL", BatchPolicy::EveryCommit);
        let e1 = order(1, EventFlags::TX_PENDING, 100.0, 1.0);
        let e2 = order(2, EventFlags::SNAPSHOT_BEGIN, 100.0, 1.0);
        let e3 = order(3, EventFlags::SNAPSHOT_END, 100.0, 1.0);
        let commits = itm.process(vec![e1, e2, e3]);
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].events.len(), 2);
    }

    #[test]
    fn snapshot_only_policy_suppresses_ordinary_transactions() {
        let mut itm = IndexedTxModel::new("AAPL", BatchPolicy::SnapshotOnly);
        let e1 = order(1, EventFlags::TX_PENDING, 100.0, 1.0);
        let e2 = order(2, EventFlags::empty(), 101.0, 1.0);
        assert!(itm.process(vec![e1, e2]).is_empty());

        let snap = order(3, EventFlags::SNAPSHOT_BEGIN | EventFlags::SNAPSHOT_END, 100.0, 1.0);
        let commits = itm.process(vec![snap]);
        assert_eq!(commits.len(), 1);
        assert!(commits[0].is_snapshot);
    }

    #[test]
    fn independent_sources_commit_independently() {
        let ntv = crate::source::source_by_name("NTV").unwrap();
        let nfx = crate::source::source_by_name("NFX").unwrap();
        let mut a = order(1, EventFlags::empty(), 100.0, 1.0);
        if let Event::Order(o) = &mut a {
            o.set_source(&ntv);
        }
        let mut b = order(1, EventFlags::empty(), 200.0, 1.0);
        if let Event::Order(o) = &mut b {
            o.set_source(&nfx);
        }
        let mut itm = IndexedTxModel::new("AAPL", BatchPolicy::EveryCommit);
        let commits = itm.process(vec![a, b]);
        assert_eq!(commits.len(), 2);
        let sources: Vec<i32> = commits.iter().map(|c| c.source).collect();
        assert!(sources.contains(&ntv.id()));
        assert!(sources.contains(&nfx.id()));
    }
}
