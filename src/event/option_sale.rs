use super::header::{Indexed, IndexedEventHeader, MarketEvent};

/// An option-market print.
#[derive(Clone, PartialEq, Debug)]
pub struct OptionSale {
    pub event_symbol: String,
    pub event_time: i64,
    pub header: IndexedEventHeader,
    pub time: i64,
    pub exchange_code: char,
    pub price: f64,
    pub size: f64,
    pub underlying_price: f64,
    pub option_symbol: String,
}

impl MarketEvent for OptionSale {
    fn event_symbol(&self) -> &str {
        &self.event_symbol
    }
    fn event_time(&self) -> i64 {
        self.event_time
    }
}

impl Indexed for OptionSale {
    fn header(&self) -> IndexedEventHeader {
        self.header
    }
    fn header_mut(&mut self) -> &mut IndexedEventHeader {
        &mut self.header
    }
}
