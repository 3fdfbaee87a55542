use super::header::{Indexed, IndexedEventHeader, MarketEvent};

/// Per-expiration option-series statistics (implied volatility, put/call ratio, ...).
#[derive(Clone, PartialEq, Debug)]
pub struct Series {
    pub event_symbol: String,
    pub event_time: i64,
    pub header: IndexedEventHeader,
    pub expiration: i32,
    pub volatility: f64,
    pub put_call_ratio: f64,
    pub forward_price: f64,
    pub dividend: f64,
    pub interest: f64,
}

impl MarketEvent for Series {
    fn event_symbol(&self) -> &str {
        &self.event_symbol
    }
    fn event_time(&self) -> i64 {
        self.event_time
    }
}

impl Indexed for Series {
    fn header(&self) -> IndexedEventHeader {
        self.header
    }
    fn header_mut(&mut self) -> &mut IndexedEventHeader {
        &mut self.header
    }
}
