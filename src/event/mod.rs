//! The typed event model (`spec.md` section 3/4.1).
//!
//! Rather than the original's `MarketEvent`/`LastingEvent`/`IndexedEvent`/`TimeSeriesEvent`
//! virtual-inheritance tree, capabilities are modeled as small traits (see [`header`]) that each
//! concrete kind implements as needed, composed into a single sealed sum type, [`Event`].

pub mod header;

mod analytics;
mod candle;
mod option_sale;
mod order;
mod profile;
mod quote;
mod series;
mod summary;
mod text_message;
mod time_and_sale;
mod trade;

pub use analytics::{Greeks, TheoPrice, Underlying};
pub use candle::{Candle, CandleAlignment, CandlePeriod, CandlePrice, CandleSymbol, PeriodUnit};
pub use header::{Indexed, IndexedEventHeader, Lasting, MarketEvent, TimeSeries, TimeSeriesIndex};
pub use option_sale::OptionSale;
pub use order::{OrderAction, OrderBase, OrderKind, Side};
pub use profile::{Profile, ShortSaleRestriction, TradingStatus};
pub use quote::Quote;
pub use series::Series;
pub use summary::Summary;
pub use text_message::TextMessage;
pub use time_and_sale::TimeAndSale;
pub use trade::{Trade, TradeETH};

/// The sealed set of event variants this crate knows how to decode, reassemble, and aggregate.
#[derive(Clone, PartialEq, Debug)]
pub enum Event {
    Quote(Quote),
    Profile(Profile),
    Summary(Summary),
    Trade(Trade),
    TradeETH(TradeETH),
    TimeAndSale(TimeAndSale),
    Order(OrderBase),
    Greeks(Greeks),
    Underlying(Underlying),
    TheoPrice(TheoPrice),
    Series(Series),
    Candle(Box<Candle>),
    TextMessage(TextMessage),
    OptionSale(OptionSale),
}

impl Event {
    pub fn event_symbol(&self) -> &str {
        match self {
            Event::Quote(e) => e.event_symbol(),
            Event::Profile(e) => e.event_symbol(),
            Event::Summary(e) => e.event_symbol(),
            Event::Trade(e) => e.event_symbol(),
            Event::TradeETH(e) => e.event_symbol(),
            Event::TimeAndSale(e) => e.event_symbol(),
            Event::Order(e) => e.event_symbol(),
            Event::Greeks(e) => e.event_symbol(),
            Event::Underlying(e) => e.event_symbol(),
            Event::TheoPrice(e) => e.event_symbol(),
            Event::Series(e) => e.event_symbol(),
            Event::Candle(e) => e.event_symbol(),
            Event::TextMessage(e) => e.event_symbol(),
            Event::OptionSale(e) => e.event_symbol(),
        }
    }

    pub fn event_time(&self) -> i64 {
        match self {
            Event::Quote(e) => e.event_time(),
            Event::Profile(e) => e.event_time(),
            Event::Summary(e) => e.event_time(),
            Event::Trade(e) => e.event_time(),
            Event::TradeETH(e) => e.event_time(),
            Event::TimeAndSale(e) => e.event_time(),
            Event::Order(e) => e.event_time(),
            Event::Greeks(e) => e.event_time(),
            Event::Underlying(e) => e.event_time(),
            Event::TheoPrice(e) => e.event_time(),
            Event::Series(e) => e.event_time(),
            Event::Candle(e) => e.event_time(),
            Event::TextMessage(e) => e.event_time(),
            Event::OptionSale(e) => e.event_time(),
        }
    }

    /// The packed index of this event, if it carries one (`Order` and `Series` are [`Indexed`];
    /// `TimeAndSale`, `Greeks`, `Underlying`, `TheoPrice`, and `Candle` are [`TimeSeries`]).
    pub fn index(&self) -> Option<i64> {
        match self {
            Event::Order(e) => Some(e.header().index),
            Event::Series(e) => Some(e.header().index),
            Event::TimeAndSale(e) => Some(e.ts_index().0),
            Event::Greeks(e) => Some(e.ts_index().0),
            Event::Underlying(e) => Some(e.ts_index().0),
            Event::TheoPrice(e) => Some(e.ts_index().0),
            Event::Candle(e) => Some(e.ts_index().0),
            _ => None,
        }
    }

    pub fn event_flags(&self) -> Option<crate::flags::EventFlags> {
        match self {
            Event::Order(e) => Some(Indexed::event_flags(e)),
            Event::Series(e) => Some(Indexed::event_flags(e)),
            Event::TimeAndSale(e) => Some(TimeSeries::event_flags(e)),
            Event::Greeks(e) => Some(TimeSeries::event_flags(e)),
            Event::Underlying(e) => Some(TimeSeries::event_flags(e)),
            Event::TheoPrice(e) => Some(TimeSeries::event_flags(e)),
            Event::Candle(e) => Some(TimeSeries::event_flags(e.as_ref())),
            _ => None,
        }
    }

    /// The publishing source id, for events that carry one. Time-series events are always
    /// [`crate::source::DEFAULT_SOURCE_ID`].
    pub fn source_id(&self) -> Option<i32> {
        match self {
            Event::Order(e) => Some(Indexed::source_id(e)),
            Event::Series(e) => Some(Indexed::source_id(e)),
            Event::TimeAndSale(_)
            | Event::Greeks(_)
            | Event::Underlying(_)
            | Event::TheoPrice(_)
            | Event::Candle(_) => Some(crate::source::DEFAULT_SOURCE_ID),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::EventFlags;

    #[test]
    fn order_event_exposes_index_and_flags() {
        let order = OrderBase::new("AAPL", 5, OrderKind::Order, Side::Buy, 100.0, 10.0).unwrap();
        let event = Event::Order(order);
        assert_eq!(event.index(), Some(5));
        assert_eq!(event.event_flags(), Some(EventFlags::empty()));
    }
}
