//! Event mapping layer (`spec.md` section 4.3).
//!
//! `WireEvent` is the on-wire representation: a plain, owned, serde-serializable DTO per kind.
//! Because every field is owned (no borrowed pointers, no foreign handles), there is no
//! `free`/double-free hazard to manage here — the redesign flagged in `spec.md` section 9
//! ("pointer-held handles to a foreign runtime") is resolved simply by not introducing a handle
//! in the first place. `decode`/`encode` are total, fallible conversions, implemented for every
//! concrete event kind so the round-trip law in `spec.md` section 8 holds for all of them.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::event::*;
use crate::flags::EventFlags;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
enum WireOrderKind {
    Order,
    AnalyticOrder,
    OtcMarketsOrder,
    SpreadOrder,
}

impl From<OrderKind> for WireOrderKind {
    fn from(k: OrderKind) -> Self {
        match k {
            OrderKind::Order => WireOrderKind::Order,
            OrderKind::AnalyticOrder => WireOrderKind::AnalyticOrder,
            OrderKind::OtcMarketsOrder => WireOrderKind::OtcMarketsOrder,
            OrderKind::SpreadOrder => WireOrderKind::SpreadOrder,
        }
    }
}

impl From<WireOrderKind> for OrderKind {
    fn from(k: WireOrderKind) -> Self {
        match k {
            WireOrderKind::Order => OrderKind::Order,
            WireOrderKind::AnalyticOrder => OrderKind::AnalyticOrder,
            WireOrderKind::OtcMarketsOrder => OrderKind::OtcMarketsOrder,
            WireOrderKind::SpreadOrder => OrderKind::SpreadOrder,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
enum WireOrderAction {
    New,
    Replace,
    Modify,
    Delete,
    Partial,
    Execute,
    Trade,
    Bust,
}

impl From<OrderAction> for WireOrderAction {
    fn from(a: OrderAction) -> Self {
        match a {
            OrderAction::New => WireOrderAction::New,
            OrderAction::Replace => WireOrderAction::Replace,
            OrderAction::Modify => WireOrderAction::Modify,
            OrderAction::Delete => WireOrderAction::Delete,
            OrderAction::Partial => WireOrderAction::Partial,
            OrderAction::Execute => WireOrderAction::Execute,
            OrderAction::Trade => WireOrderAction::Trade,
            OrderAction::Bust => WireOrderAction::Bust,
        }
    }
}

impl From<WireOrderAction> for OrderAction {
    fn from(a: WireOrderAction) -> Self {
        match a {
            WireOrderAction::New => OrderAction::New,
            WireOrderAction::Replace => OrderAction::Replace,
            WireOrderAction::Modify => OrderAction::Modify,
            WireOrderAction::Delete => OrderAction::Delete,
            WireOrderAction::Partial => OrderAction::Partial,
            WireOrderAction::Execute => OrderAction::Execute,
            WireOrderAction::Trade => OrderAction::Trade,
            WireOrderAction::Bust => OrderAction::Bust,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
enum WireTradingStatus {
    Undefined,
    Halted,
    Active,
}

impl From<TradingStatus> for WireTradingStatus {
    fn from(s: TradingStatus) -> Self {
        match s {
            TradingStatus::Undefined => WireTradingStatus::Undefined,
            TradingStatus::Halted => WireTradingStatus::Halted,
            TradingStatus::Active => WireTradingStatus::Active,
        }
    }
}

impl From<WireTradingStatus> for TradingStatus {
    fn from(s: WireTradingStatus) -> Self {
        match s {
            WireTradingStatus::Undefined => TradingStatus::Undefined,
            WireTradingStatus::Halted => TradingStatus::Halted,
            WireTradingStatus::Active => TradingStatus::Active,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
enum WireShortSaleRestriction {
    Undefined,
    Active,
    Inactive,
}

impl From<ShortSaleRestriction> for WireShortSaleRestriction {
    fn from(s: ShortSaleRestriction) -> Self {
        match s {
            ShortSaleRestriction::Undefined => WireShortSaleRestriction::Undefined,
            ShortSaleRestriction::Active => WireShortSaleRestriction::Active,
            ShortSaleRestriction::Inactive => WireShortSaleRestriction::Inactive,
        }
    }
}

impl From<WireShortSaleRestriction> for ShortSaleRestriction {
    fn from(s: WireShortSaleRestriction) -> Self {
        match s {
            WireShortSaleRestriction::Undefined => ShortSaleRestriction::Undefined,
            WireShortSaleRestriction::Active => ShortSaleRestriction::Active,
            WireShortSaleRestriction::Inactive => ShortSaleRestriction::Inactive,
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(tag = "kind")]
pub enum WireEvent {
    Quote {
        event_symbol: String,
        event_time: i64,
        bid_time: i64,
        bid_exchange_code: char,
        bid_price: f64,
        bid_size: f64,
        ask_time: i64,
        ask_exchange_code: char,
        ask_price: f64,
        ask_size: f64,
    },
    Profile {
        event_symbol: String,
        event_time: i64,
        description: String,
        status_reason: Option<String>,
        halt_start_time: i64,
        halt_end_time: i64,
        high_limit_price: f64,
        low_limit_price: f64,
        trading_status: WireTradingStatus,
        short_sale_restriction: WireShortSaleRestriction,
    },
    Summary {
        event_symbol: String,
        event_time: i64,
        day_open_price: f64,
        day_high_price: f64,
        day_low_price: f64,
        day_close_price: f64,
        prev_day_close_price: f64,
        prev_day_volume: f64,
        open_interest: i64,
    },
    Trade {
        event_symbol: String,
        event_time: i64,
        time: i64,
        exchange_code: char,
        price: f64,
        size: f64,
        day_volume: f64,
        day_turnover: f64,
    },
    TradeETH {
        event_symbol: String,
        event_time: i64,
        time: i64,
        exchange_code: char,
        price: f64,
        size: f64,
        day_volume: f64,
        day_turnover: f64,
        eth_volume: f64,
        eth_turnover: f64,
    },
    TimeAndSale {
        event_symbol: String,
        event_time: i64,
        index: i64,
        event_flags: u8,
        exchange_code: char,
        price: f64,
        size: f64,
        bid_price: f64,
        ask_price: f64,
        exchange_sale_conditions: Option<String>,
        is_trade: bool,
        is_cancel: bool,
        is_correction: bool,
    },
    Order {
        event_symbol: String,
        event_time: i64,
        index: i64,
        event_flags: u8,
        time: i64,
        sequence: i32,
        exchange_code: char,
        side: i8, // 1 = Buy, -1 = Sell, 0 = None
        price: f64,
        size: f64,
        order_kind: WireOrderKind,
        action: Option<WireOrderAction>,
        order_id: Option<i64>,
        exec_price: Option<f64>,
        exec_size: Option<f64>,
        iceberg_peak_size: Option<f64>,
        market_maker: Option<String>,
        spread_symbol: Option<String>,
    },
    Greeks {
        event_symbol: String,
        event_time: i64,
        index: i64,
        event_flags: u8,
        price: f64,
        volatility: f64,
        delta: f64,
        gamma: f64,
        theta: f64,
        rho: f64,
        vega: f64,
    },
    Underlying {
        event_symbol: String,
        event_time: i64,
        index: i64,
        event_flags: u8,
        volatility: f64,
        front_volatility: f64,
        back_volatility: f64,
        call_volume: f64,
        put_volume: f64,
        put_call_ratio: f64,
    },
    TheoPrice {
        event_symbol: String,
        event_time: i64,
        index: i64,
        event_flags: u8,
        price: f64,
        underlying_price: f64,
        delta: f64,
        gamma: f64,
        dividend: f64,
        interest: f64,
    },
    Series {
        event_symbol: String,
        event_time: i64,
        index: i64,
        event_flags: u8,
        expiration: i32,
        volatility: f64,
        put_call_ratio: f64,
        forward_price: f64,
        dividend: f64,
        interest: f64,
    },
    Candle {
        event_symbol: String,
        event_time: i64,
        index: i64,
        event_flags: u8,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
        vwap: f64,
        bid_volume: f64,
        ask_volume: f64,
        open_interest: i64,
    },
    TextMessage {
        event_symbol: String,
        event_time: i64,
        text: String,
    },
    OptionSale {
        event_symbol: String,
        event_time: i64,
        index: i64,
        event_flags: u8,
        time: i64,
        exchange_code: char,
        price: f64,
        size: f64,
        underlying_price: f64,
        option_symbol: String,
    },
    Unknown {
        kind: String,
    },
}

fn side_to_wire(side: Side) -> i8 {
    match side {
        Side::Buy => 1,
        Side::Sell => -1,
        Side::None => 0,
    }
}

fn side_from_wire(v: i8) -> Side {
    match v {
        1 => Side::Buy,
        -1 => Side::Sell,
        _ => Side::None,
    }
}

/// Converts an in-memory [`Event`] into its on-wire form.
pub fn encode(event: &Event) -> Result<WireEvent> {
    Ok(match event {
        Event::Quote(q) => WireEvent::Quote {
            event_symbol: q.event_symbol.clone(),
            event_time: q.event_time,
            bid_time: q.bid_time,
            bid_exchange_code: q.bid_exchange_code,
            bid_price: q.bid_price,
            bid_size: q.bid_size,
            ask_time: q.ask_time,
            ask_exchange_code: q.ask_exchange_code,
            ask_price: q.ask_price,
            ask_size: q.ask_size,
        },
        Event::Profile(p) => WireEvent::Profile {
            event_symbol: p.event_symbol.clone(),
            event_time: p.event_time,
            description: p.description.clone(),
            status_reason: p.status_reason.clone(),
            halt_start_time: p.halt_start_time,
            halt_end_time: p.halt_end_time,
            high_limit_price: p.high_limit_price,
            low_limit_price: p.low_limit_price,
            trading_status: p.trading_status.into(),
            short_sale_restriction: p.short_sale_restriction.into(),
        },
        Event::Summary(s) => WireEvent::Summary {
            event_symbol: s.event_symbol.clone(),
            event_time: s.event_time,
            day_open_price: s.day_open_price,
            day_high_price: s.day_high_price,
            day_low_price: s.day_low_price,
            day_close_price: s.day_close_price,
            prev_day_close_price: s.prev_day_close_price,
            prev_day_volume: s.prev_day_volume,
            open_interest: s.open_interest,
        },
        Event::Trade(t) => WireEvent::Trade {
            event_symbol: t.event_symbol.clone(),
            event_time: t.event_time,
            time: t.time,
            exchange_code: t.exchange_code,
            price: t.price,
            size: t.size,
            day_volume: t.day_volume,
            day_turnover: t.day_turnover,
        },
        Event::TradeETH(t) => WireEvent::TradeETH {
            event_symbol: t.event_symbol.clone(),
            event_time: t.event_time,
            time: t.time,
            exchange_code: t.exchange_code,
            price: t.price,
            size: t.size,
            day_volume: t.day_volume,
            day_turnover: t.day_turnover,
            eth_volume: t.eth_volume,
            eth_turnover: t.eth_turnover,
        },
        Event::TimeAndSale(ts) => WireEvent::TimeAndSale {
            event_symbol: ts.event_symbol.clone(),
            event_time: ts.event_time,
            index: ts.ts_index.0,
            event_flags: ts.event_flags.bits(),
            exchange_code: ts.exchange_code,
            price: ts.price,
            size: ts.size,
            bid_price: ts.bid_price,
            ask_price: ts.ask_price,
            exchange_sale_conditions: ts.exchange_sale_conditions.clone(),
            is_trade: ts.is_trade,
            is_cancel: ts.is_cancel,
            is_correction: ts.is_correction,
        },
        Event::Order(o) => WireEvent::Order {
            event_symbol: o.event_symbol.clone(),
            event_time: o.event_time,
            index: o.header.index,
            event_flags: o.header.event_flags.bits(),
            time: o.time,
            sequence: o.sequence,
            exchange_code: o.exchange_code,
            side: side_to_wire(o.side),
            price: o.price,
            size: o.size,
            order_kind: o.kind.into(),
            action: o.action.map(Into::into),
            order_id: o.order_id,
            exec_price: o.exec_price,
            exec_size: o.exec_size,
            iceberg_peak_size: o.iceberg_peak_size,
            market_maker: o.market_maker.clone(),
            spread_symbol: o.spread_symbol.clone(),
        },
        Event::Greeks(g) => WireEvent::Greeks {
            event_symbol: g.event_symbol.clone(),
            event_time: g.event_time,
            index: g.ts_index.0,
            event_flags: g.event_flags.bits(),
            price: g.price,
            volatility: g.volatility,
            delta: g.delta,
            gamma: g.gamma,
            theta: g.theta,
            rho: g.rho,
            vega: g.vega,
        },
        Event::Underlying(u) => WireEvent::Underlying {
            event_symbol: u.event_symbol.clone(),
            event_time: u.event_time,
            index: u.ts_index.0,
            event_flags: u.event_flags.bits(),
            volatility: u.volatility,
            front_volatility: u.front_volatility,
            back_volatility: u.back_volatility,
            call_volume: u.call_volume,
            put_volume: u.put_volume,
            put_call_ratio: u.put_call_ratio,
        },
        Event::TheoPrice(t) => WireEvent::TheoPrice {
            event_symbol: t.event_symbol.clone(),
            event_time: t.event_time,
            index: t.ts_index.0,
            event_flags: t.event_flags.bits(),
            price: t.price,
            underlying_price: t.underlying_price,
            delta: t.delta,
            gamma: t.gamma,
            dividend: t.dividend,
            interest: t.interest,
        },
        Event::Series(s) => WireEvent::Series {
            event_symbol: s.event_symbol.clone(),
            event_time: s.event_time,
            index: s.header.index,
            event_flags: s.header.event_flags.bits(),
            expiration: s.expiration,
            volatility: s.volatility,
            put_call_ratio: s.put_call_ratio,
            forward_price: s.forward_price,
            dividend: s.dividend,
            interest: s.interest,
        },
        Event::Candle(c) => WireEvent::Candle {
            event_symbol: c.event_symbol.to_string(),
            event_time: c.event_time,
            index: c.ts_index.0,
            event_flags: c.event_flags.bits(),
            open: c.open,
            high: c.high,
            low: c.low,
            close: c.close,
            volume: c.volume,
            vwap: c.vwap,
            bid_volume: c.bid_volume,
            ask_volume: c.ask_volume,
            open_interest: c.open_interest,
        },
        Event::TextMessage(m) => WireEvent::TextMessage {
            event_symbol: m.event_symbol.clone(),
            event_time: m.event_time,
            text: m.text.clone(),
        },
        Event::OptionSale(o) => WireEvent::OptionSale {
            event_symbol: o.event_symbol.clone(),
            event_time: o.event_time,
            index: o.header.index,
            event_flags: o.header.event_flags.bits(),
            time: o.time,
            exchange_code: o.exchange_code,
            price: o.price,
            size: o.size,
            underlying_price: o.underlying_price,
            option_symbol: o.option_symbol.clone(),
        },
    })
}

/// Converts a wire event into its typed in-memory form.
pub fn decode(wire: WireEvent) -> Result<Event> {
    Ok(match wire {
        WireEvent::Quote {
            event_symbol,
            event_time,
            bid_time,
            bid_exchange_code,
            bid_price,
            bid_size,
            ask_time,
            ask_exchange_code,
            ask_price,
            ask_size,
        } => Event::Quote(Quote {
            event_symbol,
            event_time,
            bid_time,
            bid_exchange_code,
            bid_price,
            bid_size,
            ask_time,
            ask_exchange_code,
            ask_price,
            ask_size,
        }),
        WireEvent::Profile {
            event_symbol,
            event_time,
            description,
            status_reason,
            halt_start_time,
            halt_end_time,
            high_limit_price,
            low_limit_price,
            trading_status,
            short_sale_restriction,
        } => Event::Profile(Profile {
            event_symbol,
            event_time,
            description,
            status_reason,
            halt_start_time,
            halt_end_time,
            high_limit_price,
            low_limit_price,
            trading_status: trading_status.into(),
            short_sale_restriction: short_sale_restriction.into(),
        }),
        WireEvent::Summary {
            event_symbol,
            event_time,
            day_open_price,
            day_high_price,
            day_low_price,
            day_close_price,
            prev_day_close_price,
            prev_day_volume,
            open_interest,
        } => Event::Summary(Summary {
            event_symbol,
            event_time,
            day_open_price,
            day_high_price,
            day_low_price,
            day_close_price,
            prev_day_close_price,
            prev_day_volume,
            open_interest,
        }),
        WireEvent::Trade {
            event_symbol,
            event_time,
            time,
            exchange_code,
            price,
            size,
            day_volume,
            day_turnover,
        } => Event::Trade(Trade {
            event_symbol,
            event_time,
            time,
            exchange_code,
            price,
            size,
            day_volume,
            day_turnover,
        }),
        WireEvent::TradeETH {
            event_symbol,
            event_time,
            time,
            exchange_code,
            price,
            size,
            day_volume,
            day_turnover,
            eth_volume,
            eth_turnover,
        } => Event::TradeETH(TradeETH {
            event_symbol,
            event_time,
            time,
            exchange_code,
            price,
            size,
            day_volume,
            day_turnover,
            eth_volume,
            eth_turnover,
        }),
        WireEvent::TimeAndSale {
            event_symbol,
            event_time,
            index,
            event_flags,
            exchange_code,
            price,
            size,
            bid_price,
            ask_price,
            exchange_sale_conditions,
            is_trade,
            is_cancel,
            is_correction,
        } => Event::TimeAndSale(TimeAndSale {
            event_symbol,
            event_time,
            ts_index: TimeSeriesIndex::new(index),
            event_flags: EventFlags::from_bits_retain(event_flags),
            exchange_code,
            price,
            size,
            bid_price,
            ask_price,
            exchange_sale_conditions,
            is_trade,
            is_cancel,
            is_correction,
        }),
        WireEvent::Order {
            event_symbol,
            event_time,
            index,
            event_flags,
            time,
            sequence,
            exchange_code,
            side,
            price,
            size,
            order_kind,
            action,
            order_id,
            exec_price,
            exec_size,
            iceberg_peak_size,
            market_maker,
            spread_symbol,
        } => Event::Order(OrderBase {
            event_symbol,
            event_time,
            header: IndexedEventHeader::new(index, EventFlags::from_bits_retain(event_flags)),
            time,
            sequence,
            exchange_code,
            side: side_from_wire(side),
            price,
            size,
            kind: order_kind.into(),
            action: action.map(Into::into),
            order_id,
            exec_price,
            exec_size,
            iceberg_peak_size,
            market_maker,
            spread_symbol,
        }),
        WireEvent::Greeks {
            event_symbol,
            event_time,
            index,
            event_flags,
            price,
            volatility,
            delta,
            gamma,
            theta,
            rho,
            vega,
        } => Event::Greeks(Greeks {
            event_symbol,
            event_time,
            ts_index: TimeSeriesIndex::new(index),
            event_flags: EventFlags::from_bits_retain(event_flags),
            price,
            volatility,
            delta,
            gamma,
            theta,
            rho,
            vega,
        }),
        WireEvent::Underlying {
            event_symbol,
            event_time,
            index,
            event_flags,
            volatility,
            front_volatility,
            back_volatility,
            call_volume,
            put_volume,
            put_call_ratio,
        } => Event::Underlying(Underlying {
            event_symbol,
            event_time,
            ts_index: TimeSeriesIndex::new(index),
            event_flags: EventFlags::from_bits_retain(event_flags),
            volatility,
            front_volatility,
            back_volatility,
            call_volume,
            put_volume,
            put_call_ratio,
        }),
        WireEvent::TheoPrice {
            event_symbol,
            event_time,
            index,
            event_flags,
            price,
            underlying_price,
            delta,
            gamma,
            dividend,
            interest,
        } => Event::TheoPrice(TheoPrice {
            event_symbol,
            event_time,
            ts_index: TimeSeriesIndex::new(index),
            event_flags: EventFlags::from_bits_retain(event_flags),
            price,
            underlying_price,
            delta,
            gamma,
            dividend,
            interest,
        }),
        WireEvent::Series {
            event_symbol,
            event_time,
            index,
            event_flags,
            expiration,
            volatility,
            put_call_ratio,
            forward_price,
            dividend,
            interest,
        } => Event::Series(Series {
            event_symbol,
            event_time,
            header: IndexedEventHeader::new(index, EventFlags::from_bits_retain(event_flags)),
            expiration,
            volatility,
            put_call_ratio,
            forward_price,
            dividend,
            interest,
        }),
        WireEvent::Candle {
            event_symbol,
            event_time,
            index,
            event_flags,
            open,
            high,
            low,
            close,
            volume,
            vwap,
            bid_volume,
            ask_volume,
            open_interest,
        } => Event::Candle(Box::new(Candle {
            event_symbol: CandleSymbol::parse(&event_symbol)?,
            event_time,
            ts_index: TimeSeriesIndex::new(index),
            event_flags: EventFlags::from_bits_retain(event_flags),
            open,
            high,
            low,
            close,
            volume,
            vwap,
            bid_volume,
            ask_volume,
            open_interest,
        })),
        WireEvent::TextMessage {
            event_symbol,
            event_time,
            text,
        } => Event::TextMessage(TextMessage {
            event_symbol,
            event_time,
            text,
        }),
        WireEvent::OptionSale {
            event_symbol,
            event_time,
            index,
            event_flags,
            time,
            exchange_code,
            price,
            size,
            underlying_price,
            option_symbol,
        } => Event::OptionSale(OptionSale {
            event_symbol,
            event_time,
            header: IndexedEventHeader::new(index, EventFlags::from_bits_retain(event_flags)),
            time,
            exchange_code,
            price,
            size,
            underlying_price,
            option_symbol,
        }),
        WireEvent::Unknown { kind } => return Err(Error::UnknownEvent(kind)),
    })
}

/// Decodes a list of wire events, preserving order. An individual unsupported entry is dropped
/// (and logged by the caller on the dispatch path, per `spec.md` section 7); this function
/// itself simply surfaces a `Vec` of whatever decoded successfully, via a lazy iterator adapter.
pub fn decode_all(wire_events: Vec<WireEvent>) -> impl Iterator<Item = Result<Event>> {
    wire_events.into_iter().map(decode)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_quote() {
        let q = Event::Quote(Quote {
            event_symbol: "AAPL".into(),
            event_time: 1,
            bid_time: 2,
            bid_exchange_code: 'Q',
            bid_price: 100.0,
            bid_size: 10.0,
            ask_time: 3,
            ask_exchange_code: 'Q',
            ask_price: 100.5,
            ask_size: 20.0,
        });
        let wire = encode(&q).unwrap();
        assert_eq!(decode(wire).unwrap(), q);
    }

    #[test]
    fn round_trip_order_preserves_flags_and_index() {
        let order = OrderBase::new("AAPL", 5, OrderKind::Order, Side::Buy, 100.0, 10.0).unwrap();
        let e = Event::Order(order);
        let wire = encode(&e).unwrap();
        assert_eq!(decode(wire).unwrap(), e);
    }

    #[test]
    fn round_trip_order_preserves_fob_fields() {
        let mut order = OrderBase::new("AAPL", 5, OrderKind::AnalyticOrder, Side::Sell, 1.0, 1.0).unwrap();
        order.action = Some(OrderAction::Replace);
        order.order_id = Some(42);
        order.exec_price = Some(1.5);
        order.exec_size = Some(0.5);
        order.iceberg_peak_size = Some(3.0);
        order.market_maker = Some("MM1".into());
        let e = Event::Order(order);
        let wire = encode(&e).unwrap();
        assert_eq!(decode(wire).unwrap(), e);
    }

    #[test]
    fn round_trip_time_and_sale() {
        let ts = Event::TimeAndSale(TimeAndSale {
            event_symbol: "AAPL".into(),
            event_time: 1,
            ts_index: TimeSeriesIndex::new(7),
            event_flags: EventFlags::SNAPSHOT_BEGIN,
            exchange_code: 'Q',
            price: 1.0,
            size: 1.0,
            bid_price: 1.0,
            ask_price: 1.0,
            exchange_sale_conditions: Some("XYZ".into()),
            is_trade: true,
            is_cancel: false,
            is_correction: false,
        });
        let wire = encode(&ts).unwrap();
        assert_eq!(decode(wire).unwrap(), ts);
    }

    #[test]
    fn round_trip_candle_normalizes_symbol() {
        let candle = Event::Candle(Box::new(Candle {
            event_symbol: CandleSymbol::parse("IBM{=5m}").unwrap(),
            event_time: 0,
            ts_index: TimeSeriesIndex::new(0),
            event_flags: EventFlags::empty(),
            open: 1.0,
            high: 2.0,
            low: 0.5,
            close: 1.5,
            volume: 10.0,
            vwap: 1.2,
            bid_volume: 4.0,
            ask_volume: 6.0,
            open_interest: 0,
        }));
        let wire = encode(&candle).unwrap();
        assert_eq!(decode(wire).unwrap(), candle);
    }

    #[test]
    fn round_trip_profile() {
        let profile = Event::Profile(Profile {
            event_symbol: "AAPL".into(),
            event_time: 0,
            description: "Apple Inc.".into(),
            status_reason: None,
            halt_start_time: 0,
            halt_end_time: 0,
            high_limit_price: 150.0,
            low_limit_price: 50.0,
            trading_status: TradingStatus::Active,
            short_sale_restriction: ShortSaleRestriction::Inactive,
        });
        let wire = encode(&profile).unwrap();
        assert_eq!(decode(wire).unwrap(), profile);
    }

    #[test]
    fn unknown_wire_kind_is_an_error() {
        let err = decode(WireEvent::Unknown {
            kind: "Bogus".into(),
        });
        assert!(err.is_err());
    }

    #[test]
    fn decode_all_preserves_order() {
        let wires = vec![
            WireEvent::TextMessage {
                event_symbol: "A".into(),
                event_time: 1,
                text: "one".into(),
            },
            WireEvent::TextMessage {
                event_symbol: "A".into(),
                event_time: 2,
                text: "two".into(),
            },
        ];
        let decoded: Vec<Event> = decode_all(wires).map(Result::unwrap).collect();
        match (&decoded[0], &decoded[1]) {
            (Event::TextMessage(a), Event::TextMessage(b)) => {
                assert_eq!(a.text, "one");
                assert_eq!(b.text, "two");
            }
            _ => panic!("unexpected variants"),
        }
    }
}
