//! Order source registry (`spec.md` section 3.2 / 4.2).
//!
//! An order source is an interned record identifying one of the (possibly many) concurrent
//! providers of indexed events for a given symbol. Special sources are reserved, small-integer,
//! non-alphanumeric-named synthetic composites (`COMPOSITE_BID`, ...); regular sources are
//! exchange/venue identifiers whose id is the big-endian packing of up to 4 ASCII characters of
//! their name.

use std::collections::HashMap;
use std::fmt;

use bitflags::bitflags;
use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::error::{Error, Result};

bitflags! {
    /// Which concrete `OrderBase` kinds a source is allowed to publish.
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PublishKinds: u8 {
        const ORDER             = 0b0001;
        const ANALYTIC_ORDER    = 0b0010;
        const OTC_MARKETS_ORDER = 0b0100;
        const SPREAD_ORDER      = 0b1000;
    }
}

/// A concrete `OrderBase` event kind, used to test a source's [`PublishKinds`] capability mask.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum OrderEventKind {
    Order,
    AnalyticOrder,
    OtcMarketsOrder,
    SpreadOrder,
}

impl OrderEventKind {
    fn mask(self) -> PublishKinds {
        match self {
            OrderEventKind::Order => PublishKinds::ORDER,
            OrderEventKind::AnalyticOrder => PublishKinds::ANALYTIC_ORDER,
            OrderEventKind::OtcMarketsOrder => PublishKinds::OTC_MARKETS_ORDER,
            OrderEventKind::SpreadOrder => PublishKinds::SPREAD_ORDER,
        }
    }
}

/// An interned order source.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Source {
    /// A reserved, small-integer synthetic source such as `COMPOSITE_BID`.
    Special {
        id: i32,
        name: &'static str,
        publishes: PublishKinds,
        full_order_book: bool,
    },
    /// A regular venue/exchange source, id composed from up to 4 ASCII chars of `name`.
    Regular {
        id: i32,
        name: String,
        publishes: PublishKinds,
        full_order_book: bool,
    },
}

impl Source {
    pub fn id(&self) -> i32 {
        match self {
            Source::Special { id, .. } | Source::Regular { id, .. } => *id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Source::Special { name, .. } => name,
            Source::Regular { name, .. } => name.as_str(),
        }
    }

    pub fn publishes(&self, kind: OrderEventKind) -> bool {
        let mask = match self {
            Source::Special { publishes, .. } | Source::Regular { publishes, .. } => *publishes,
        };
        mask.contains(kind.mask())
    }

    pub fn full_order_book(&self) -> bool {
        match self {
            Source::Special {
                full_order_book, ..
            }
            | Source::Regular {
                full_order_book, ..
            } => *full_order_book,
        }
    }

    pub fn is_special(&self) -> bool {
        matches!(self, Source::Special { .. })
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The implicit source of time-series events (`spec.md` section 3.1).
pub const DEFAULT_SOURCE_ID: i32 = 0;

// Special sources are interned up front with small ids; `is_special` only needs to check
// whether a predefined entry with this id happens to be the Special variant.
const SPECIAL_RANGE_END: i32 = 0xff;

static PREDEFINED: Lazy<HashMap<i32, Source>> = Lazy::new(|| {
    let full = PublishKinds::all();
    let order_only = PublishKinds::ORDER;
    let mut m = HashMap::new();
    let mut put = |s: Source| {
        m.insert(s.id(), s);
    };
    put(Source::Regular {
        id: DEFAULT_SOURCE_ID,
        name: String::new(),
        publishes: order_only,
        full_order_book: false,
    });
    for name in ["NTV", "NFX", "ISE", "GLBX", "pink", "BATE", "CEDX", "DEAL"] {
        put(Source::Regular {
            id: regular_id(name),
            name: name.to_string(),
            publishes: full,
            full_order_book: true,
        });
    }
    for (id, name) in [
        (1, "COMPOSITE_BID"),
        (2, "COMPOSITE_ASK"),
        (3, "REGIONAL_BID"),
        (4, "REGIONAL_ASK"),
        (5, "AGGREGATE_BID"),
        (6, "AGGREGATE_ASK"),
    ] {
        put(Source::Special {
            id,
            name,
            publishes: order_only,
            full_order_book: false,
        });
    }
    m
});

static USER_SOURCES: Lazy<RwLock<HashMap<i32, Source>>> = Lazy::new(|| RwLock::new(HashMap::new()));

fn regular_id(name: &str) -> i32 {
    let mut id: i32 = 0;
    for b in name.bytes() {
        id = (id << 8) | i32::from(b);
    }
    id
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name.len() > 4 {
        return Err(Error::InvalidArgument(format!(
            "source name must be 1-4 chars, got {name:?}"
        )));
    }
    if !name.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Err(Error::InvalidArgument(format!(
            "source name must be alphanumeric, got {name:?}"
        )));
    }
    Ok(())
}

/// Looks up (and interns on first sight) the source with the given id.
pub fn source_by_id(id: i32) -> Result<Source> {
    if let Some(s) = PREDEFINED.get(&id) {
        return Ok(s.clone());
    }
    if let Some(s) = USER_SOURCES.read().get(&id) {
        return Ok(s.clone());
    }
    if id < 0 {
        return Err(Error::InvalidArgument(format!("negative source id {id}")));
    }
    let name = decode_name(id)?;
    let source = Source::Regular {
        id,
        name,
        publishes: PublishKinds::all(),
        full_order_book: false,
    };
    USER_SOURCES.write().insert(id, source.clone());
    Ok(source)
}

/// Looks up (and interns on first sight) the source with the given name.
pub fn source_by_name(name: &str) -> Result<Source> {
    validate_name(name)?;
    let id = regular_id(name);
    source_by_id(id)
}

pub fn is_special(id: i32) -> bool {
    (0..=SPECIAL_RANGE_END).contains(&id) && PREDEFINED.get(&id).is_some_and(Source::is_special)
}

fn decode_name(id: i32) -> Result<String> {
    let bytes = id.to_be_bytes();
    let mut name = String::new();
    let mut seen_nonzero = false;
    for b in bytes {
        if b == 0 {
            if seen_nonzero {
                return Err(Error::InvalidArgument(format!(
                    "embedded NUL in source id {id}"
                )));
            }
            continue;
        }
        seen_nonzero = true;
        if !b.is_ascii_alphanumeric() {
            return Err(Error::InvalidArgument(format!(
                "source id {id} decodes to non-alphanumeric byte {b:#x}"
            )));
        }
        name.push(b as char);
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ntv_id_round_trips() {
        // S5: source_by_name("NTV").id encodes as 'N'<<16 | 'T'<<8 | 'V'.
        let expected = (b'N' as i32) << 16 | (b'T' as i32) << 8 | b'V' as i32;
        assert_eq!(expected, 0x4E5456);
        let ntv = source_by_name("NTV").unwrap();
        assert_eq!(ntv.id(), expected);
        let back = source_by_id(expected).unwrap();
        assert_eq!(back.name(), "NTV");
    }

    #[test]
    fn user_source_round_trip() {
        let s = source_by_name("XZQ1").unwrap();
        let back = source_by_id(s.id()).unwrap();
        assert_eq!(back.name(), "XZQ1");
    }

    #[test]
    fn invalid_name_rejected() {
        assert!(source_by_name("").is_err());
        assert!(source_by_name("TOOLONG").is_err());
        assert!(source_by_name("N!X").is_err());
    }

    #[test]
    fn default_source_is_zero_and_not_special() {
        let d = source_by_id(DEFAULT_SOURCE_ID).unwrap();
        assert_eq!(d.name(), "");
        assert!(!is_special(DEFAULT_SOURCE_ID));
    }

    #[test]
    fn composite_bid_is_special() {
        let s = source_by_id(1).unwrap();
        assert!(s.is_special());
        assert_eq!(s.name(), "COMPOSITE_BID");
    }
}
