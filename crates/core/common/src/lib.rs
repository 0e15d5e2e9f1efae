//! Common types for the exchange REST clients
//!
//! Everything that more than one layer needs lives here: the exchange
//! identifiers, canonical trading pairs, ordered request parameters, the
//! normalized response shapes and the error taxonomy shared by the signing,
//! transport and interface layers.

#![warn(clippy::all)]

pub mod errors;
pub mod pair;
pub mod params;
pub mod types;

pub use errors::{Error, Result, TransportErrorKind};
pub use pair::{Pair, canonical_currency};
pub use params::{Encoding, Method, Params};
pub use types::{
    Balances, ExchangeId, FeeSchedule, Fees, LedgerEntry, Order, OrderBook, OrderReceipt,
    OrderRequest, OrderType, PriceLevel, Side, Ticker, Trade,
};
