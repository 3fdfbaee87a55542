use super::header::{Indexed, IndexedEventHeader, MarketEvent};
use crate::error::Result;
use crate::source::Source;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Side {
    Buy,
    Sell,
    None,
}

/// One level of a multi-source book. `spec.md` groups `Order`, `AnalyticOrder`,
/// `OtcMarketsOrder`, and `SpreadOrder` under the `OrderBase` umbrella; this crate keeps them as
/// a single struct tagged by [`OrderKind`] plus kind-specific optional fields, rather than four
/// near-duplicate structs, since they share every field but a handful of extras.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum OrderKind {
    Order,
    AnalyticOrder,
    OtcMarketsOrder,
    SpreadOrder,
}

/// Full Order Book action, present only when the publishing [`Source`] supports FOB
/// (`spec.md` glossary "Full Order Book").
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum OrderAction {
    New,
    Replace,
    Modify,
    Delete,
    Partial,
    Execute,
    Trade,
    Bust,
}

#[derive(Clone, PartialEq, Debug)]
pub struct OrderBase {
    pub event_symbol: String,
    pub event_time: i64,
    pub header: IndexedEventHeader,
    pub time: i64,
    pub sequence: i32,
    pub exchange_code: char,
    pub side: Side,
    pub price: f64,
    pub size: f64,
    pub kind: OrderKind,
    /// FOB-only fields (`spec.md` glossary). `None` when the source is not a Full Order Book.
    pub action: Option<OrderAction>,
    pub order_id: Option<i64>,
    pub exec_price: Option<f64>,
    pub exec_size: Option<f64>,
    /// `AnalyticOrder`-only: implied iceberg size and market-maker id.
    pub iceberg_peak_size: Option<f64>,
    pub market_maker: Option<String>,
    /// `SpreadOrder`-only: the spread leg symbol.
    pub spread_symbol: Option<String>,
}

impl OrderBase {
    pub fn new(
        event_symbol: impl Into<String>,
        index: i64,
        kind: OrderKind,
        side: Side,
        price: f64,
        size: f64,
    ) -> Result<Self> {
        IndexedEventHeader::validate_order_index(index)?;
        Ok(Self {
            event_symbol: event_symbol.into(),
            event_time: 0,
            header: IndexedEventHeader::new(index, crate::flags::EventFlags::empty()),
            time: 0,
            sequence: 0,
            exchange_code: '\0',
            side,
            price,
            size,
            kind,
            action: None,
            order_id: None,
            exec_price: None,
            exec_size: None,
            iceberg_peak_size: None,
            market_maker: None,
            spread_symbol: None,
        })
    }

    /// Sets this order's source, repacking `index` in place (`spec.md` section 4.1).
    pub fn set_source(&mut self, source: &Source) {
        self.header.set_source(source);
    }

    /// `spec.md` section 3.3: `REMOVE_EVENT` implies `size == 0` (or NaN) for order-like events.
    pub fn is_removal(&self) -> bool {
        self.event_flags().contains(crate::flags::EventFlags::REMOVE_EVENT)
            || self.size == 0.0
            || self.size.is_nan()
    }
}

impl MarketEvent for OrderBase {
    fn event_symbol(&self) -> &str {
        &self.event_symbol
    }
    fn event_time(&self) -> i64 {
        self.event_time
    }
}

impl Indexed for OrderBase {
    fn header(&self) -> IndexedEventHeader {
        self.header
    }
    fn header_mut(&mut self) -> &mut IndexedEventHeader {
        &mut self.header
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source;

    #[test]
    fn negative_index_rejected() {
        assert!(OrderBase::new("AAPL", -1, OrderKind::Order, Side::Buy, 1.0, 1.0).is_err());
    }

    #[test]
    fn source_derivable_from_index_alone() {
        let ntv = source::source_by_name("NTV").unwrap();
        let mut order = OrderBase::new("AAPL", 42, OrderKind::Order, Side::Buy, 1.0, 1.0).unwrap();
        order.set_source(&ntv);
        assert_eq!(order.header().source_id(), ntv.id());
    }

    #[test]
    fn removal_when_size_zero() {
        let order = OrderBase::new("AAPL", 1, OrderKind::Order, Side::Buy, 1.0, 0.0).unwrap();
        assert!(order.is_removal());
    }
}
