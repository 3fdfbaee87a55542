//! Shared header embedded by value in every indexed / time-series event variant.
//!
//! `spec.md` section 9 flags the original's `MarketEvent`/`IndexedEvent`/`TimeSeriesEvent`
//! virtual-inheritance tree as something to avoid in Rust. This module is the replacement:
//! capability traits (below) plus one small `Copy` struct holding the packed fields, composed
//! into each variant instead of inherited.

use crate::error::{Error, Result};
use crate::flags::EventFlags;
use crate::source::{self, Source, DEFAULT_SOURCE_ID};

const SEQUENCE_BITS: u32 = 22;
const SEQUENCE_MASK: i64 = (1i64 << SEQUENCE_BITS) - 1;
const MILLIS_BITS: u32 = 10;
const MILLIS_MASK: i64 = (1i64 << MILLIS_BITS) - 1;

const SPECIAL_SOURCE_SHIFT: u32 = 48;
const REGULAR_SOURCE_SHIFT: u32 = 32;
const EXCHANGE_MID_MASK: i64 = 0xFFFF << 32;
const EVENT_ID_MASK: i64 = 0xFFFF_FFFF;

/// The packed `(index, event_flags)` pair carried by every indexed event (`spec.md` section 3.3/3.4).
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct IndexedEventHeader {
    pub index: i64,
    pub event_flags: EventFlags,
}

impl IndexedEventHeader {
    pub fn new(index: i64, event_flags: EventFlags) -> Self {
        Self { index, event_flags }
    }

    /// Derives the source id purely from `index`, per the `source_of(e) = source_of(index_of(e))`
    /// invariant (`spec.md` section 8). Tries the special-source (48-bit) layout first; falls
    /// back to the regular-source (32-bit) layout.
    pub fn source_id(&self) -> i32 {
        let top16 = ((self.index >> SPECIAL_SOURCE_SHIFT) & 0xFFFF) as i32;
        if top16 != 0 && source::is_special(top16) {
            top16
        } else {
            ((self.index >> REGULAR_SOURCE_SHIFT) & EVENT_ID_MASK) as i32
        }
    }

    /// Rewrites the source component of `index`, preserving whatever sits in the exchange-code
    /// mid-field and the low event-id bits (`spec.md` section 4.1 `set_source`).
    pub fn set_source(&mut self, source: &Source) {
        let event_id = self.index & EVENT_ID_MASK;
        self.index = if source.is_special() {
            let exchange_mid = self.index & EXCHANGE_MID_MASK;
            ((source.id() as i64) << SPECIAL_SOURCE_SHIFT) | exchange_mid | event_id
        } else {
            ((source.id() as i64) << REGULAR_SOURCE_SHIFT) | event_id
        };
    }

    /// Rejects a negative index, per `spec.md` section 3.4.
    pub fn validate_order_index(index: i64) -> Result<()> {
        if index < 0 {
            return Err(Error::InvalidArgument(format!(
                "order index must be non-negative, got {index}"
            )));
        }
        Ok(())
    }
}

/// A time-series index packs `(seconds, millis, sequence)` into 64 bits (`spec.md` section 3.4).
/// The source component of a time-series event's index is always [`DEFAULT_SOURCE_ID`].
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct TimeSeriesIndex(pub i64);

impl TimeSeriesIndex {
    pub fn new(index: i64) -> Self {
        Self(index)
    }

    /// Builds an index from millisecond `time` and a zero `sequence`.
    pub fn from_time_millis(time_millis: i64) -> Self {
        let seconds = time_millis.div_euclid(1000);
        let millis = time_millis.rem_euclid(1000);
        Self((seconds << 32) | (millis << 22))
    }

    pub fn time_millis(self) -> i64 {
        let seconds = self.0 >> 32; // arithmetic (signed) shift
        let millis = (self.0 >> SEQUENCE_BITS) & MILLIS_MASK;
        seconds * 1000 + millis
    }

    pub fn sequence(self) -> i32 {
        (self.0 & SEQUENCE_MASK) as i32
    }

    pub fn source_id(self) -> i32 {
        DEFAULT_SOURCE_ID
    }

    /// Rewrites the time component, preserving `sequence` (`spec.md` section 4.1 `set_time`).
    pub fn with_time_millis(self, time_millis: i64) -> Self {
        let seq = self.sequence() as i64;
        let seconds = time_millis.div_euclid(1000);
        let millis = time_millis.rem_euclid(1000);
        Self((seconds << 32) | (millis << SEQUENCE_BITS) | seq)
    }

    /// Rewrites the sequence component, preserving `time` (`spec.md` section 4.1 `set_sequence`).
    pub fn with_sequence(self, sequence: i32) -> Result<Self> {
        if !(0..=(SEQUENCE_MASK as i32)).contains(&sequence) {
            return Err(Error::InvalidArgument(format!(
                "sequence {sequence} out of range 0..{SEQUENCE_MASK}"
            )));
        }
        Ok(Self((self.0 & !SEQUENCE_MASK) | i64::from(sequence)))
    }
}

/// Capability shared by every event kind: a symbol and an event time.
pub trait MarketEvent {
    fn event_symbol(&self) -> &str;
    fn event_time(&self) -> i64;
}

/// Marker for events the feed conflates per-symbol, delivering only the most recent value.
pub trait Lasting: MarketEvent {}

/// Capability for events carrying an [`IndexedEventHeader`].
pub trait Indexed: MarketEvent {
    fn header(&self) -> IndexedEventHeader;
    fn header_mut(&mut self) -> &mut IndexedEventHeader;

    fn index(&self) -> i64 {
        self.header().index
    }
    fn event_flags(&self) -> EventFlags {
        self.header().event_flags
    }
    fn set_event_flags(&mut self, flags: EventFlags) {
        self.header_mut().event_flags = flags;
    }
    fn source_id(&self) -> i32 {
        self.header().source_id()
    }
}

/// Capability for the time-series specialization of [`Indexed`] (`spec.md` section 3.1/3.4).
/// Time-series events carry the same transactional `event_flags` as order-like indexed events —
/// the snapshot/transaction machinery in [`crate::itm`] treats both uniformly.
pub trait TimeSeries: MarketEvent {
    fn ts_index(&self) -> TimeSeriesIndex;
    fn set_ts_index(&mut self, index: TimeSeriesIndex);
    fn event_flags(&self) -> EventFlags;
    fn set_event_flags(&mut self, flags: EventFlags);

    fn sequence(&self) -> i32 {
        self.ts_index().sequence()
    }
    fn source_id(&self) -> i32 {
        DEFAULT_SOURCE_ID
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_time_then_set_sequence_is_idempotent() {
        let idx = TimeSeriesIndex::from_time_millis(1_700_000_123_456).with_sequence(7).unwrap();
        let t = idx.time_millis();
        let s = idx.sequence();
        let idx2 = idx.with_time_millis(t).with_sequence(s).unwrap();
        assert_eq!(idx, idx2);
    }

    #[test]
    fn sequence_out_of_range_rejected() {
        let idx = TimeSeriesIndex::new(0);
        assert!(idx.with_sequence(-1).is_err());
        assert!(idx.with_sequence(1 << 22).is_err());
        assert!(idx.with_sequence((1 << 22) - 1).is_ok());
    }

    #[test]
    fn lex_order_of_index_agrees_with_time_then_sequence() {
        let a = TimeSeriesIndex::from_time_millis(1000).with_sequence(5).unwrap();
        let b = TimeSeriesIndex::from_time_millis(1000).with_sequence(6).unwrap();
        let c = TimeSeriesIndex::from_time_millis(1001).with_sequence(0).unwrap();
        assert!(a.0 < b.0);
        assert!(b.0 < c.0);
    }

    #[test]
    fn order_index_rejects_negative() {
        assert!(IndexedEventHeader::validate_order_index(-1).is_err());
        assert!(IndexedEventHeader::validate_order_index(0).is_ok());
    }

    #[test]
    fn set_source_preserves_exchange_mid_field_for_special() {
        let special = source::source_by_id(1).unwrap(); // COMPOSITE_BID
        let mut header = IndexedEventHeader::new(0x0000_0000_ABCD_0042, EventFlags::empty());
        // Seed an exchange code into bits [32,48) before repacking.
        header.index |= 0x5A5A << 32;
        header.set_source(&special);
        assert_eq!(header.source_id(), special.id());
        assert_eq!((header.index >> 32) & 0xFFFF, 0x5A5A);
        assert_eq!(header.index & 0xFFFF_FFFF, 0x0000_0042);
    }

    #[test]
    fn set_source_regular_uses_32_bit_shift() {
        let ntv = source::source_by_name("NTV").unwrap();
        let mut header = IndexedEventHeader::new(99, EventFlags::empty());
        header.set_source(&ntv);
        assert_eq!(header.source_id(), ntv.id());
        assert_eq!(header.index & 0xFFFF_FFFF, 99);
    }
}
