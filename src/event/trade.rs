use super::header::{Lasting, MarketEvent};

/// Last trade plus day volume/turnover.
#[derive(Clone, PartialEq, Debug)]
pub struct Trade {
    pub event_symbol: String,
    pub event_time: i64,
    pub time: i64,
    pub exchange_code: char,
    pub price: f64,
    pub size: f64,
    pub day_volume: f64,
    pub day_turnover: f64,
}

impl MarketEvent for Trade {
    fn event_symbol(&self) -> &str {
        &self.event_symbol
    }
    fn event_time(&self) -> i64 {
        self.event_time
    }
}

impl Lasting for Trade {}

/// Like [`Trade`], but splits regular-hours volume/turnover from extended-hours.
#[derive(Clone, PartialEq, Debug)]
pub struct TradeETH {
    pub event_symbol: String,
    pub event_time: i64,
    pub time: i64,
    pub exchange_code: char,
    pub price: f64,
    pub size: f64,
    pub day_volume: f64,
    pub day_turnover: f64,
    pub eth_volume: f64,
    pub eth_turnover: f64,
}

impl MarketEvent for TradeETH {
    fn event_symbol(&self) -> &str {
        &self.event_symbol
    }
    fn event_time(&self) -> i64 {
        self.event_time
    }
}

impl Lasting for TradeETH {}
