//! Time-Series Model (`spec.md` section 4.5).
//!
//! A thin specialization of [`IndexedTxModel`]: exactly one implicit source
//! ([`DEFAULT_SOURCE_ID`]), a `from_time` subscription floor, and descending-order snapshots that
//! can be implicitly closed by an out-of-range event rather than only by `SNAPSHOT_END`.

use crate::event::{Event, TimeSeriesIndex};
use crate::itm::{BatchPolicy, Commit, IndexedTxModel};
use crate::source::DEFAULT_SOURCE_ID;

/// Time-series specialization of the indexed transaction model.
pub struct TimeSeriesModel {
    itm: IndexedTxModel,
    from_time: i64,
}

impl TimeSeriesModel {
    pub fn new(symbol: impl Into<String>, from_time: i64) -> Self {
        Self {
            itm: IndexedTxModel::new(symbol, BatchPolicy::EveryCommit),
            from_time,
        }
    }

    pub fn symbol(&self) -> &str {
        self.itm.symbol()
    }

    pub fn from_time(&self) -> i64 {
        self.from_time
    }

    /// Updates the subscription floor. Does not retroactively affect events already committed.
    pub fn set_from_time(&mut self, from_time: i64) {
        self.from_time = from_time;
    }

    /// Feeds one received list of time-series events through the state machine. An event whose
    /// time falls below `from_time` is processed normally by the underlying model and then, per
    /// `spec.md` section 4.5, implicitly ends any snapshot still open for the default source —
    /// exactly as `SNAPSHOT_END` would.
    pub fn process(&mut self, events: Vec<Event>) -> Vec<Commit> {
        let mut saw_out_of_range = false;
        for event in &events {
            if let Some(index) = event.index() {
                if TimeSeriesIndex::new(index).time_millis() < self.from_time {
                    saw_out_of_range = true;
                }
            }
        }
        let mut commits = self.itm.process(events);
        if saw_out_of_range {
            if let Some(commit) = self.itm.force_commit(DEFAULT_SOURCE_ID) {
                commits.push(commit);
            }
        }
        commits
    }

    pub fn reset(&mut self) {
        self.itm.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::TimeAndSale;
    use crate::flags::EventFlags;

    fn tas(index: i64, flags: EventFlags) -> Event {
        Event::TimeAndSale(TimeAndSale {
            event_symbol: "AAPL".into(),
            event_time: 0,
            ts_index: TimeSeriesIndex::new(index),
            event_flags: flags,
            exchange_code: '\0',
            price: 1.0,
            size: 1.0,
            bid_price: 1.0,
            ask_price: 1.0,
            exchange_sale_conditions: None,
            is_trade: true,
            is_cancel: false,
            is_correction: false,
        })
    }

    #[test]
    fn default_source_is_used_implicitly() {
        let mut tsm = TimeSeriesModel::new("AAPL", 0);
        let e = tas(TimeSeriesIndex::from_time_millis(1000).0, EventFlags::empty());
        let commits = tsm.process(vec![e]);
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].source, DEFAULT_SOURCE_ID);
    }

    #[test]
    fn out_of_range_event_implicitly_closes_open_snapshot() {
        let mut tsm = TimeSeriesModel::new("AAPL", 5000);
        let begin = tas(
            TimeSeriesIndex::from_time_millis(9000).0,
            EventFlags::SNAPSHOT_BEGIN,
        );
        let below_floor = tas(TimeSeriesIndex::from_time_millis(1000).0, EventFlags::empty());
        let commits = tsm.process(vec![begin, below_floor]);
        assert_eq!(commits.len(), 1);
        assert!(commits[0].is_snapshot);
        assert_eq!(commits[0].events.len(), 2);
    }

    #[test]
    fn from_time_is_mutable() {
        let mut tsm = TimeSeriesModel::new("AAPL", 0);
        tsm.set_from_time(500);
        assert_eq!(tsm.from_time(), 500);
    }
}
