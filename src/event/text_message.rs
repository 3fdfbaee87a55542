use super::header::MarketEvent;

/// An unordered notification. Never conflated by the feed — every instance is delivered.
#[derive(Clone, PartialEq, Debug)]
pub struct TextMessage {
    pub event_symbol: String,
    pub event_time: i64,
    pub text: String,
}

impl MarketEvent for TextMessage {
    fn event_symbol(&self) -> &str {
        &self.event_symbol
    }
    fn event_time(&self) -> i64 {
        self.event_time
    }
}
