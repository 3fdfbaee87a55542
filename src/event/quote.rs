use super::header::{Lasting, MarketEvent};

/// Best bid/ask, with independent per-side exchange codes, prices, sizes, and times.
#[derive(Clone, PartialEq, Debug)]
pub struct Quote {
    pub event_symbol: String,
    pub event_time: i64,
    pub bid_time: i64,
    pub bid_exchange_code: char,
    pub bid_price: f64,
    pub bid_size: f64,
    pub ask_time: i64,
    pub ask_exchange_code: char,
    pub ask_price: f64,
    pub ask_size: f64,
}

impl MarketEvent for Quote {
    fn event_symbol(&self) -> &str {
        &self.event_symbol
    }
    fn event_time(&self) -> i64 {
        self.event_time
    }
}

impl Lasting for Quote {}
