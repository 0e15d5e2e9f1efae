//! Unified exchange interface
//!
//! Built on the `rest` client layer:
//! - [`PairFormatter`]: canonical pairs to exchange symbols and back
//! - [`Interface`]: ticker, order book, trades, balance, orders, ledger,
//!   order placement and cancellation, fees
//! - [`Normalizer`]: exact decimal and timestamp parsing of responses
//!
//! ```no_run
//! use common::{ExchangeId, Params};
//! use connector::connect;
//! use rest::ApiClient;
//!
//! # fn main() -> common::Result<()> {
//! let kraken = connect(ApiClient::new(ExchangeId::Kraken, None)?);
//! let book = kraken.order_book(&"BTC/EUR".parse()?, &Params::new())?;
//! println!("best bid {:?}", book.best_bid());
//! # Ok(())
//! # }
//! ```

#![deny(clippy::all)]
#![allow(clippy::multiple_crate_versions)]

pub mod exchanges;
pub mod interface;
pub mod normalize;
pub mod pairs;

pub use interface::{Interface, connect, connect_all, from_config};
pub use normalize::{Normalizer, percent_to_fraction};
pub use pairs::{
    ConcatenatedFormatter, KrakenFormatter, PairFormatter, SeparatedFormatter, formatter_for,
    kraken_asset_to_canonical, kraken_currency,
};
