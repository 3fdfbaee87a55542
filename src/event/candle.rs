//! Candle event and the candle symbol string sublanguage (`spec.md` section 6).
//!
//! Full tokenization of every period unit combination is out of scope (`spec.md` section 1); this
//! covers the grammar given in section 6 and the normalization rules exercised by scenario S6.

use std::fmt;

use super::header::{Lasting, MarketEvent, TimeSeries, TimeSeriesIndex};
use crate::error::{Error, Result};
use crate::flags::EventFlags;

#[derive(Clone, PartialEq, Debug)]
pub struct Candle {
    pub event_symbol: CandleSymbol,
    pub event_time: i64,
    pub ts_index: TimeSeriesIndex,
    pub event_flags: EventFlags,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub vwap: f64,
    pub bid_volume: f64,
    pub ask_volume: f64,
    pub open_interest: i64,
}

impl MarketEvent for Candle {
    fn event_symbol(&self) -> &str {
        self.event_symbol.base_symbol.as_str()
    }
    fn event_time(&self) -> i64 {
        self.event_time
    }
}
impl Lasting for Candle {}
impl TimeSeries for Candle {
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

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CandlePrice {
    Last,
    Bid,
    Ask,
    Mark,
    Settlement,
}

impl CandlePrice {
    const DEFAULT: CandlePrice = CandlePrice::Last;

    fn canonical(self) -> &'static str {
        match self {
            CandlePrice::Last => "last",
            CandlePrice::Bid => "bid",
            CandlePrice::Ask => "ask",
            CandlePrice::Mark => "mark",
            CandlePrice::Settlement => "s",
        }
    }

    fn parse(value: &str) -> Result<Self> {
        let lower = value.to_ascii_lowercase();
        let matches: Vec<CandlePrice> = [
            CandlePrice::Last,
            CandlePrice::Bid,
            CandlePrice::Ask,
            CandlePrice::Mark,
            CandlePrice::Settlement,
        ]
        .into_iter()
        .filter(|p| p.full_name().starts_with(&lower))
        .collect();
        match matches.as_slice() {
            [only] => Ok(*only),
            _ => Err(Error::InvalidArgument(format!(
                "ambiguous or unknown candle price value {value:?}"
            ))),
        }
    }

    fn full_name(self) -> &'static str {
        match self {
            CandlePrice::Last => "last",
            CandlePrice::Bid => "bid",
            CandlePrice::Ask => "ask",
            CandlePrice::Mark => "mark",
            CandlePrice::Settlement => "settlement",
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CandleAlignment {
    Midnight,
    Session,
}

impl CandleAlignment {
    const DEFAULT: CandleAlignment = CandleAlignment::Midnight;

    fn canonical(self) -> &'static str {
        match self {
            CandleAlignment::Midnight => "m",
            CandleAlignment::Session => "s",
        }
    }

    fn parse(value: &str) -> Result<Self> {
        let lower = value.to_ascii_lowercase();
        if "midnight".starts_with(&lower) && !lower.is_empty() {
            Ok(CandleAlignment::Midnight)
        } else if "session".starts_with(&lower) && !lower.is_empty() {
            Ok(CandleAlignment::Session)
        } else {
            Err(Error::InvalidArgument(format!(
                "unknown candle alignment value {value:?}"
            )))
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PeriodUnit {
    Tick,
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    OptExpiration,
    Year,
    Volume,
    Price,
    PriceMomentum,
    PriceRenko,
}

impl PeriodUnit {
    fn suffix(self) -> &'static str {
        match self {
            PeriodUnit::Tick => "t",
            PeriodUnit::Second => "s",
            PeriodUnit::Minute => "m",
            PeriodUnit::Hour => "h",
            PeriodUnit::Day => "d",
            PeriodUnit::Week => "w",
            PeriodUnit::Month => "mo",
            PeriodUnit::OptExpiration => "o",
            PeriodUnit::Year => "y",
            PeriodUnit::Volume => "v",
            PeriodUnit::Price => "p",
            PeriodUnit::PriceMomentum => "pm",
            PeriodUnit::PriceRenko => "pr",
        }
    }

    fn parse(unit: &str) -> Result<Self> {
        // Longer suffixes ("mo", "pm", "pr") must be tried before their single-char prefixes.
        for candidate in [
            PeriodUnit::Month,
            PeriodUnit::PriceMomentum,
            PeriodUnit::PriceRenko,
            PeriodUnit::Tick,
            PeriodUnit::Second,
            PeriodUnit::Minute,
            PeriodUnit::Hour,
            PeriodUnit::Day,
            PeriodUnit::Week,
            PeriodUnit::OptExpiration,
            PeriodUnit::Year,
            PeriodUnit::Volume,
            PeriodUnit::Price,
        ] {
            if candidate.suffix() == unit {
                return Ok(candidate);
            }
        }
        Err(Error::InvalidArgument(format!("unknown period unit {unit:?}")))
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct CandlePeriod {
    pub value: u32,
    pub unit: PeriodUnit,
}

impl CandlePeriod {
    const DEFAULT: CandlePeriod = CandlePeriod {
        value: 1,
        unit: PeriodUnit::Tick,
    };

    fn parse(s: &str) -> Result<Self> {
        let split_at = s
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| Error::InvalidArgument(format!("period value missing unit: {s:?}")))?;
        let (num, unit) = s.split_at(split_at);
        let value = if num.is_empty() {
            1
        } else {
            num.parse::<u32>()
                .map_err(|_| Error::InvalidArgument(format!("invalid period count: {num:?}")))?
        };
        Ok(CandlePeriod {
            value,
            unit: PeriodUnit::parse(unit)?,
        })
    }
}

impl fmt::Display for CandlePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.value == 1 {
            write!(f, "{}", self.unit.suffix())
        } else {
            write!(f, "{}{}", self.value, self.unit.suffix())
        }
    }
}

/// A parsed, structured candle symbol (`spec.md` section 6).
#[derive(Clone, PartialEq, Debug)]
pub struct CandleSymbol {
    pub base_symbol: String,
    pub exchange_code: Option<char>,
    pub period: CandlePeriod,
    pub price: CandlePrice,
    pub session: bool, // "tho": trading-hours-only restriction
    pub alignment: CandleAlignment,
    pub price_level: Option<f64>,
}

impl CandleSymbol {
    pub fn parse(s: &str) -> Result<Self> {
        let (head, attrs_str) = match s.find('{') {
            Some(idx) => {
                if !s.ends_with('}') {
                    return Err(Error::InvalidArgument(format!(
                        "unterminated attribute list in {s:?}"
                    )));
                }
                (&s[..idx], Some(&s[idx + 1..s.len() - 1]))
            }
            None => (s, None),
        };

        let (base_symbol, exchange_code) = match head.rfind('&') {
            Some(idx) => {
                let rest = &head[idx + 1..];
                let mut chars = rest.chars();
                let c = chars
                    .next()
                    .ok_or_else(|| Error::InvalidArgument(format!("empty exchange code in {s:?}")))?;
                if chars.next().is_some() || !c.is_ascii() {
                    return Err(Error::InvalidArgument(format!(
                        "exchange code must be a single 7-bit ASCII char, got {rest:?}"
                    )));
                }
                (head[..idx].to_string(), Some(c))
            }
            None => (head.to_string(), None),
        };
        if base_symbol.is_empty() {
            return Err(Error::InvalidArgument(format!("empty base symbol in {s:?}")));
        }

        let mut symbol = CandleSymbol {
            base_symbol,
            exchange_code,
            period: CandlePeriod::DEFAULT,
            price: CandlePrice::DEFAULT,
            session: false,
            alignment: CandleAlignment::DEFAULT,
            price_level: None,
        };

        if let Some(attrs_str) = attrs_str {
            if !attrs_str.is_empty() {
                for attr in attrs_str.split(',') {
                    let (key, value) = attr.split_once('=').ok_or_else(|| {
                        Error::InvalidArgument(format!("malformed attribute {attr:?} in {s:?}"))
                    })?;
                    symbol.apply_attr(key, value)?;
                }
            }
        }
        Ok(symbol)
    }

    fn apply_attr(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "" => self.period = CandlePeriod::parse(value)?,
            "price" => self.price = CandlePrice::parse(value)?,
            "tho" => {
                self.session = value
                    .parse::<bool>()
                    .map_err(|_| Error::InvalidArgument(format!("invalid tho value {value:?}")))?
            }
            "a" => self.alignment = CandleAlignment::parse(value)?,
            "pl" => {
                self.price_level = Some(value.parse::<f64>().map_err(|_| {
                    Error::InvalidArgument(format!("invalid price level {value:?}"))
                })?)
            }
            other => {
                return Err(Error::InvalidArgument(format!("unknown candle attribute key {other:?}")))
            }
        }
        Ok(())
    }
}

impl fmt::Display for CandleSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base_symbol)?;
        if let Some(c) = self.exchange_code {
            write!(f, "&{c}")?;
        }
        let mut attrs: Vec<(&str, String)> = Vec::new();
        if self.period != CandlePeriod::DEFAULT {
            attrs.push(("", self.period.to_string()));
        }
        if self.price != CandlePrice::DEFAULT {
            attrs.push(("price", self.price.canonical().to_string()));
        }
        if self.session {
            attrs.push(("tho", "true".to_string()));
        }
        if self.alignment != CandleAlignment::DEFAULT {
            attrs.push(("a", self.alignment.canonical().to_string()));
        }
        if let Some(pl) = self.price_level {
            attrs.push(("pl", pl.to_string()));
        }
        attrs.sort_by(|a, b| a.0.cmp(b.0));
        if !attrs.is_empty() {
            write!(f, "{{")?;
            for (i, (k, v)) in attrs.iter().enumerate() {
                if i > 0 {
                    write!(f, ",")?;
                }
                write!(f, "{k}={v}")?;
            }
            write!(f, "}}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s6_candle_symbol_normalization() {
        let parsed = CandleSymbol::parse("IBM{a=s,=5m,price=bid,tho=true}").unwrap();
        assert_eq!(parsed.to_string(), "IBM{=5m,a=s,price=bid,tho=true}");
    }

    #[test]
    fn parse_of_normalize_is_stable() {
        let s = "IBM{a=s,=5m,price=bid,tho=true}";
        let parsed = CandleSymbol::parse(s).unwrap();
        let normalized = parsed.to_string();
        let reparsed = CandleSymbol::parse(&normalized).unwrap();
        assert_eq!(parsed, reparsed);
        assert_eq!(CandleSymbol::parse(&normalized).unwrap().to_string(), normalized);
    }

    #[test]
    fn bare_symbol_has_no_braces() {
        let parsed = CandleSymbol::parse("AAPL").unwrap();
        assert_eq!(parsed.to_string(), "AAPL");
    }

    #[test]
    fn exchange_code_round_trips() {
        let parsed = CandleSymbol::parse("AAPL&Q").unwrap();
        assert_eq!(parsed.exchange_code, Some('Q'));
        assert_eq!(parsed.to_string(), "AAPL&Q");
    }

    #[test]
    fn settlement_abbreviates_to_s() {
        let parsed = CandleSymbol::parse("IBM{price=settlement}").unwrap();
        assert_eq!(parsed.to_string(), "IBM{price=s}");
    }

    #[test]
    fn unknown_attribute_key_rejected() {
        assert!(CandleSymbol::parse("IBM{zz=1}").is_err());
    }
}
