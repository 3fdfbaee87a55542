//! Market-depth / price-level engine (`spec.md` section 4.6).
//!
//! A [`PriceLevelBook`] consumes committed [`Commit`]s from the indexed transaction model for one
//! symbol and one (or, generalized slightly beyond the letter of the spec, a caller-selected set
//! of) source(s), and maintains a sorted, depth-limited view of aggregate size per price per side.
//! Grounded on the teacher's `depth/hashmapmarketdepth.rs`: plain owned fields, a hash map keyed by
//! order id, and per-side aggregate maps updated incrementally rather than rebuilt per event.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::warn;

use crate::event::{Event, Indexed, Side};
use crate::flags::EventFlags;
use crate::itm::Commit;

/// One aggregated price level.
#[derive(Clone, PartialEq, Debug)]
pub struct PriceLevel {
    pub symbol: String,
    pub source: i32,
    pub side: Side,
    pub price: f64,
    pub size: f64,
}

/// `f64` wrapper giving prices a total order, so they can key a `BTreeMap`. Prices arriving
/// through this engine are always finite (feed-produced, never user-computed), so `total_cmp`'s
/// distinction between -0.0/+0.0 and NaN ordering never bites in practice.
#[derive(Clone, Copy, PartialEq, Debug)]
struct PriceKey(f64);

impl Eq for PriceKey {}
impl Ord for PriceKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}
impl PartialOrd for PriceKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

struct TrackedOrder {
    side: Side,
    price: f64,
    size: f64,
}

/// Validating builder for [`PriceLevelBook`] (`spec.md` section 9: fluent-`self` builders that
/// validate only in `build()`, not on every intermediate call).
#[derive(Default)]
pub struct PriceLevelBookBuilder {
    symbol: Option<String>,
    sources: Vec<i32>,
    depth_limit: usize,
    agg_ms: i64,
}

impl PriceLevelBookBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    pub fn with_sources(mut self, sources: impl IntoIterator<Item = i32>) -> Self {
        self.sources = sources.into_iter().collect();
        self
    }

    pub fn with_depth_limit(mut self, depth_limit: usize) -> Self {
        self.depth_limit = depth_limit;
        self
    }

    pub fn with_aggregation_period_ms(mut self, agg_ms: i64) -> Self {
        self.agg_ms = agg_ms;
        self
    }

    pub fn build(self) -> crate::error::Result<PriceLevelBook> {
        let symbol = self.symbol.ok_or_else(|| {
            crate::error::Error::InvalidArgument("price level book requires a symbol".into())
        })?;
        if self.sources.is_empty() {
            return Err(crate::error::Error::InvalidArgument(
                "price level book requires at least one source".into(),
            ));
        }
        if self.agg_ms < 0 {
            return Err(crate::error::Error::InvalidArgument(format!(
                "aggregation period must be non-negative, got {}",
                self.agg_ms
            )));
        }
        Ok(PriceLevelBook {
            symbol,
            sources: self.sources.into_iter().collect(),
            depth_limit: self.depth_limit,
            agg_ms: self.agg_ms,
            orders_by_index: HashMap::new(),
            buy_levels: BTreeMap::new(),
            sell_levels: BTreeMap::new(),
            buy_dirty: false,
            sell_dirty: false,
        })
    }
}

/// Whether processing a batch produced a side that needs re-emitting, and whether emission should
/// happen now (snapshot or `agg_ms == 0`) or be deferred to an aggregation timer.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Emission {
    None,
    Immediate,
    Deferred,
}

pub struct PriceLevelBook {
    symbol: String,
    sources: HashSet<i32>,
    depth_limit: usize,
    agg_ms: i64,
    orders_by_index: HashMap<i64, TrackedOrder>,
    buy_levels: BTreeMap<PriceKey, f64>,
    sell_levels: BTreeMap<PriceKey, f64>,
    buy_dirty: bool,
    sell_dirty: bool,
}

impl PriceLevelBook {
    pub fn builder() -> PriceLevelBookBuilder {
        PriceLevelBookBuilder::new()
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn depth_limit(&self) -> usize {
        self.depth_limit
    }

    pub fn agg_ms(&self) -> i64 {
        self.agg_ms
    }

    /// Changing `depth_limit` triggers an immediate emission (`spec.md` section 4.6).
    pub fn set_depth_limit(&mut self, depth_limit: usize) {
        self.depth_limit = depth_limit;
        self.buy_dirty = true;
        self.sell_dirty = true;
    }

    /// Changing `agg_ms` does not by itself mark anything dirty; it only affects how the next
    /// dirty batch is scheduled. Rescheduling any timer already armed is the caller's
    /// responsibility (see [`crate::timer`]).
    pub fn set_agg_ms(&mut self, agg_ms: i64) {
        self.agg_ms = agg_ms;
    }

    /// Applies one committed batch (`spec.md` section 4.6 "Update algorithm"). Returns how the
    /// caller should schedule emission.
    pub fn apply(&mut self, commit: &Commit) -> Emission {
        if !self.sources.contains(&commit.source) {
            return Emission::None;
        }
        if commit.is_snapshot {
            self.orders_by_index.clear();
            self.buy_levels.clear();
            self.sell_levels.clear();
        }
        for event in &commit.events {
            let Event::Order(order) = event else {
                warn!("price level book received a non-order indexed event, ignoring");
                continue;
            };
            let index = order.header.index;
            if let Some(prev) = self.orders_by_index.remove(&index) {
                self.erase_or_decrement(prev.side, prev.price, prev.size);
            }
            let removal = order.size <= 0.0 || order.event_flags().contains(EventFlags::REMOVE_EVENT);
            if !removal && order.side != Side::None {
                self.orders_by_index.insert(
                    index,
                    TrackedOrder {
                        side: order.side,
                        price: order.price,
                        size: order.size,
                    },
                );
                self.insert_or_increment(order.side, order.price, order.size);
            }
        }
        if commit.is_snapshot || self.agg_ms == 0 {
            if self.buy_dirty || self.sell_dirty {
                self.buy_dirty = false;
                self.sell_dirty = false;
                Emission::Immediate
            } else {
                Emission::None
            }
        } else if self.buy_dirty || self.sell_dirty {
            Emission::Deferred
        } else {
            Emission::None
        }
    }

    fn insert_or_increment(&mut self, side: Side, price: f64, size: f64) {
        let levels = self.side_levels_mut(side);
        let key = PriceKey(price);
        *levels.entry(key).or_insert(0.0) += size;
        self.mark_dirty_if_visible(side, price);
    }

    fn erase_or_decrement(&mut self, side: Side, price: f64, size: f64) {
        let levels = self.side_levels_mut(side);
        let key = PriceKey(price);
        if let Some(existing) = levels.get_mut(&key) {
            *existing -= size;
            if *existing <= 0.0 {
                levels.remove(&key);
            }
        }
        self.mark_dirty_if_visible(side, price);
    }

    fn side_levels_mut(&mut self, side: Side) -> &mut BTreeMap<PriceKey, f64> {
        match side {
            Side::Buy => &mut self.buy_levels,
            Side::Sell => &mut self.sell_levels,
            Side::None => unreachable!("callers filter out Side::None before mutating levels"),
        }
    }

    fn mark_dirty_if_visible(&mut self, side: Side, price: f64) {
        if self.depth_limit == 0 {
            match side {
                Side::Buy => self.buy_dirty = true,
                Side::Sell => self.sell_dirty = true,
                Side::None => {}
            }
            return;
        }
        let rank = match side {
            // Buy levels sort descending by price: a level is better if its price is higher.
            Side::Buy => self.buy_levels.keys().filter(|k| k.0 > price).count(),
            // Sell levels sort ascending by price: a level is better if its price is lower.
            Side::Sell => self.sell_levels.keys().filter(|k| k.0 < price).count(),
            Side::None => return,
        };
        if rank < self.depth_limit {
            match side {
                Side::Buy => self.buy_dirty = true,
                Side::Sell => self.sell_dirty = true,
                Side::None => {}
            }
        }
    }

    /// The current buy/sell slices, each truncated to `depth_limit` (`spec.md` section 4.6
    /// "Emission"). Buy levels are sorted descending by price; sell levels ascending.
    pub fn slices(&self) -> (Vec<PriceLevel>, Vec<PriceLevel>) {
        let limit = if self.depth_limit == 0 {
            usize::MAX
        } else {
            self.depth_limit
        };
        let buy = self
            .buy_levels
            .iter()
            .rev()
            .take(limit)
            .map(|(k, size)| PriceLevel {
                symbol: self.symbol.clone(),
                source: *self.sources.iter().next().unwrap_or(&0),
                side: Side::Buy,
                price: k.0,
                size: *size,
            })
            .collect();
        let sell = self
            .sell_levels
            .iter()
            .take(limit)
            .map(|(k, size)| PriceLevel {
                symbol: self.symbol.clone(),
                source: *self.sources.iter().next().unwrap_or(&0),
                side: Side::Sell,
                price: k.0,
                size: *size,
            })
            .collect();
        (buy, sell)
    }

    /// Σ size currently tracked on each side, for the invariant in `spec.md` section 8.
    pub fn total_sizes(&self) -> (f64, f64) {
        (
            self.buy_levels.values().sum(),
            self.sell_levels.values().sum(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{IndexedEventHeader, OrderBase, OrderKind};
    use crate::source::DEFAULT_SOURCE_ID;

    fn order(index: i64, side: Side, price: f64, size: f64, flags: EventFlags) -> Event {
        Event::Order(OrderBase {
            event_symbol: "AAPL".into(),
            event_time: 0,
            header: IndexedEventHeader::new(index, flags),
            time: 0,
            sequence: 0,
            exchange_code: '\0',
            side,
            price,
            size,
            kind: OrderKind::Order,
            action: None,
            order_id: None,
            exec_price: None,
            exec_size: None,
            iceberg_peak_size: None,
            market_maker: None,
            spread_symbol: None,
        })
    }

    fn commit(events: Vec<Event>, is_snapshot: bool) -> Commit {
        Commit {
            source: DEFAULT_SOURCE_ID,
            events,
            is_snapshot,
        }
    }

    // S3: depth with aggregation truncates to depth_limit and orders by price.
    #[test]
    fn s3_depth_with_aggregation_truncates_and_orders() {
        let mut book = PriceLevelBook::builder()
            .with_symbol("AAPL")
            .with_sources([DEFAULT_SOURCE_ID])
            .with_depth_limit(2)
            .with_aggregation_period_ms(10)
            .build()
            .unwrap();
        let events = vec![
            order(1, Side::Buy, 100.0, 1.0, EventFlags::empty()),
            order(2, Side::Buy, 101.0, 2.0, EventFlags::empty()),
            order(3, Side::Buy, 99.0, 5.0, EventFlags::empty()),
        ];
        let emission = book.apply(&commit(events, false));
        assert_eq!(emission, Emission::Deferred);
        let (buy, _sell) = book.slices();
        assert_eq!(buy.len(), 2);
        assert_eq!((buy[0].price, buy[0].size), (101.0, 2.0));
        assert_eq!((buy[1].price, buy[1].size), (100.0, 1.0));
    }

    // S4: REMOVE_EVENT deletes the prior order and decrements its level.
    #[test]
    fn s4_remove_event_deletes_prior_order_and_decrements_level() {
        let mut book = PriceLevelBook::builder()
            .with_symbol("AAPL")
            .with_sources([DEFAULT_SOURCE_ID])
            .build()
            .unwrap();
        book.apply(&commit(
            vec![order(1, Side::Buy, 100.0, 5.0, EventFlags::empty())],
            false,
        ));
        let (buy, _) = book.slices();
        assert_eq!(buy[0].size, 5.0);

        book.apply(&commit(
            vec![order(1, Side::Buy, 100.0, 0.0, EventFlags::REMOVE_EVENT)],
            false,
        ));
        let (buy, _) = book.slices();
        assert!(buy.is_empty());
    }

    #[test]
    fn snapshot_clears_prior_state_for_the_source() {
        let mut book = PriceLevelBook::builder()
            .with_symbol("AAPL")
            .with_sources([DEFAULT_SOURCE_ID])
            .build()
            .unwrap();
        book.apply(&commit(
            vec![order(1, Side::Buy, 100.0, 5.0, EventFlags::empty())],
            false,
        ));
        book.apply(&commit(
            vec![order(2, Side::Buy, 200.0, 1.0, EventFlags::SNAPSHOT_BEGIN | EventFlags::SNAPSHOT_END)],
            true,
        ));
        let (buy, _) = book.slices();
        assert_eq!(buy.len(), 1);
        assert_eq!(buy[0].price, 200.0);
    }

    #[test]
    fn total_size_invariant_tracks_stored_orders() {
        let mut book = PriceLevelBook::builder()
            .with_symbol("AAPL")
            .with_sources([DEFAULT_SOURCE_ID])
            .build()
            .unwrap();
        book.apply(&commit(
            vec![
                order(1, Side::Buy, 100.0, 3.0, EventFlags::empty()),
                order(2, Side::Buy, 100.0, 4.0, EventFlags::empty()),
                order(3, Side::Sell, 101.0, 2.0, EventFlags::empty()),
            ],
            false,
        ));
        let (buy_total, sell_total) = book.total_sizes();
        assert_eq!(buy_total, 7.0);
        assert_eq!(sell_total, 2.0);
    }

    #[test]
    fn build_without_symbol_fails() {
        assert!(PriceLevelBook::builder()
            .with_sources([DEFAULT_SOURCE_ID])
            .build()
            .is_err());
    }

    #[test]
    fn build_without_sources_fails() {
        assert!(PriceLevelBook::builder().with_symbol("AAPL").build().is_err());
    }
}
