use super::header::{Lasting, MarketEvent, TimeSeries, TimeSeriesIndex};
use crate::flags::EventFlags;

/// Per-symbol option Greeks analytics time series.
#[derive(Clone, PartialEq, Debug)]
pub struct Greeks {
    pub event_symbol: String,
    pub event_time: i64,
    pub ts_index: TimeSeriesIndex,
    pub event_flags: EventFlags,
    pub price: f64,
    pub volatility: f64,
    pub delta: f64,
    pub gamma: f64,
    pub theta: f64,
    pub rho: f64,
    pub vega: f64,
}

impl MarketEvent for Greeks {
    fn event_symbol(&self) -> &str {
        &self.event_symbol
    }
    fn event_time(&self) -> i64 {
        self.event_time
    }
}
impl Lasting for Greeks {}
impl TimeSeries for Greeks {
    fn ts_index(&self) -> TimeSeriesIndex {
        self.ts_index
    }
    fn set_ts_index(&mut self, index: TimeSeriesIndex) {
        self.ts_index = index;
    }
    fn event_flags(&self) -> EventFlags {
        self.event_flags
    }
    fn set_event_flags(&mut self, flags: EventFlags) {
        self.event_flags = flags;
    }
}

/// Per-symbol underlying analytics (volatility indices, etc.) time series.
#[derive(Clone, PartialEq, Debug)]
pub struct Underlying {
    pub event_symbol: String,
    pub event_time: i64,
    pub ts_index: TimeSeriesIndex,
    pub event_flags: EventFlags,
    pub volatility: f64,
    pub front_volatility: f64,
    pub back_volatility: f64,
    pub call_volume: f64,
    pub put_volume: f64,
    pub put_call_ratio: f64,
}

impl MarketEvent for Underlying {
    fn event_symbol(&self) -> &str {
        &self.event_symbol
    }
    fn event_time(&self) -> i64 {
        self.event_time
    }
}
impl Lasting for Underlying {}
impl TimeSeries for Underlying {
    fn ts_index(&self) -> TimeSeriesIndex {
        self.ts_index
    }
    fn set_ts_index(&mut self, index: TimeSeriesIndex) {
        self.ts_index = index;
    }
    fn event_flags(&self) -> EventFlags {
        self.event_flags
    }
    fn set_event_flags(&mut self, flags: EventFlags) {
        self.event_flags = flags;
    }
}

/// Theoretical price analytics time series.
#[derive(Clone, PartialEq, Debug)]
pub struct TheoPrice {
    pub event_symbol: String,
    pub event_time: i64,
    pub ts_index: TimeSeriesIndex,
    pub event_flags: EventFlags,
    pub price: f64,
    pub underlying_price: f64,
    pub delta: f64,
    pub gamma: f64,
    pub dividend: f64,
    pub interest: f64,
}

impl MarketEvent for TheoPrice {
    fn event_symbol(&self) -> &str {
        &self.event_symbol
    }
    fn event_time(&self) -> i64 {
        self.event_time
    }
}
impl Lasting for TheoPrice {}
impl TimeSeries for TheoPrice {
    fn ts_index(&self) -> TimeSeriesIndex {
        self.ts_index
    }
    fn set_ts_index(&mut self, index: TimeSeriesIndex) {
        self.ts_index = index;
    }
    fn event_flags(&self) -> EventFlags {
        self.event_flags
    }
    fn set_event_flags(&mut self, flags: EventFlags) {
        self.event_flags = flags;
    }
}
