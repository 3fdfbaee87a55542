use super::header::{MarketEvent, TimeSeries, TimeSeriesIndex};
use crate::flags::EventFlags;

/// A historical print; correctable and cancellable (`spec.md` section 3.1).
#[derive(Clone, PartialEq, Debug)]
pub struct TimeAndSale {
    pub event_symbol: String,
    pub event_time: i64,
    pub ts_index: TimeSeriesIndex,
    pub event_flags: EventFlags,
    pub exchange_code: char,
    pub price: f64,
    pub size: f64,
    pub bid_price: f64,
    pub ask_price: f64,
    pub exchange_sale_conditions: Option<String>,
    pub is_trade: bool,
    pub is_cancel: bool,
    pub is_correction: bool,
}

impl MarketEvent for TimeAndSale {
    fn event_symbol(&self) -> &str {
        &self.event_symbol
    }
    fn event_time(&self) -> i64 {
        self.event_time
    }
}

impl TimeSeries for TimeAndSale {
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
