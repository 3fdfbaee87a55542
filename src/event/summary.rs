use super::header::{Lasting, MarketEvent};

/// Day OHLC, previous day close, and open interest.
#[derive(Clone, PartialEq, Debug)]
pub struct Summary {
    pub event_symbol: String,
    pub event_time: i64,
    pub day_open_price: f64,
    pub day_high_price: f64,
    pub day_low_price: f64,
    pub day_close_price: f64,
    pub prev_day_close_price: f64,
    pub prev_day_volume: f64,
    pub open_interest: i64,
}

impl MarketEvent for Summary {
    fn event_symbol(&self) -> &str {
        &self.event_symbol
    }
    fn event_time(&self) -> i64 {
        self.event_time
    }
}

impl Lasting for Summary {}
