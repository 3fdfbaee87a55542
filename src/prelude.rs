//! Re-exports of the types most applications need, so that `use tickstream::prelude::*;` is
//! usually enough.

pub use crate::depth::{Emission, PriceLevel, PriceLevelBook, PriceLevelBookBuilder};
pub use crate::error::{Error, Result};
pub use crate::event::{
    Candle, Event, Greeks, Indexed, Lasting, MarketEvent, OptionSale, OrderBase, Profile, Quote,
    Series, Side, Summary, TextMessage, TheoPrice, TimeAndSale, TimeSeries, TimeSeriesIndex,
    Trade, Underlying,
};
pub use crate::feed::{Feed, InMemoryFeed, Publisher};
pub use crate::flags::EventFlags;
pub use crate::itm::{BatchPolicy, Commit, IndexedTxModel};
pub use crate::mapping::{decode, decode_all, encode, WireEvent};
pub use crate::source::{Source, DEFAULT_SOURCE_ID};
pub use crate::subscription::{
    EventListener, EventTypeTag, ListenerGuard, ObservableEvent, ObservableListener, Subscription,
    TransactionListener,
};
pub use crate::tsm::TimeSeriesModel;
