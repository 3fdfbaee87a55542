use super::header::{Lasting, MarketEvent};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TradingStatus {
    Undefined,
    Halted,
    Active,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ShortSaleRestriction {
    Undefined,
    Active,
    Inactive,
}

/// Instrument descriptor: description, status, and short-sale restriction.
#[derive(Clone, PartialEq, Debug)]
pub struct Profile {
    pub event_symbol: String,
    pub event_time: i64,
    pub description: String,
    pub status_reason: Option<String>,
    pub halt_start_time: i64,
    pub halt_end_time: i64,
    pub high_limit_price: f64,
    pub low_limit_price: f64,
    pub trading_status: TradingStatus,
    pub short_sale_restriction: ShortSaleRestriction,
}

impl MarketEvent for Profile {
    fn event_symbol(&self) -> &str {
        &self.event_symbol
    }
    fn event_time(&self) -> i64 {
        self.event_time
    }
}

impl Lasting for Profile {}
