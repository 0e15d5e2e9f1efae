//! Unified exchange interface
//!
//! One implementation per exchange maps the canonical operations onto that
//! exchange's endpoints. Some operations need several calls (symbol to
//! product id lookups, per-account ledgers); those are noted on the
//! implementing type. Lower-layer errors propagate unchanged; this layer only
//! adds `Normalization` errors, `ExchangeApi` errors for error payloads sent
//! with a 2xx status, and `UnsupportedOperation`.

use crate::exchanges::{Bitfinex, Bitstamp, Bittrex, Gdax, Gemini, Kraken, Poloniex, Quoine};
use crate::pairs::PairFormatter;
use common::{
    Balances, Error, ExchangeId, Fees, LedgerEntry, Order, OrderBook, OrderReceipt, OrderRequest,
    Pair, Params, Result, Ticker, Trade,
};
use rest::{ApiClient, ClientsConfig, ExchangeConfig, RawResponse};

/// Canonical operations over one exchange
pub trait Interface: Send + Sync {
    /// Exchange served
    fn exchange(&self) -> ExchangeId;

    /// Underlying low-level client
    fn client(&self) -> &ApiClient;

    /// Symbol convention of the exchange
    fn pairs(&self) -> &dyn PairFormatter;

    /// Unauthenticated request using the exchange's public verb and path
    ///
    /// # Errors
    /// Propagates client errors
    fn public_query(&self, endpoint: &str, params: &Params) -> Result<RawResponse>;

    /// Signed request using the exchange's private verb and path
    ///
    /// # Errors
    /// Propagates client errors
    fn private_query(&self, endpoint: &str, params: &Params) -> Result<RawResponse>;

    /// Pairs listed by the exchange; symbols that do not map to a canonical
    /// pair are skipped
    ///
    /// # Errors
    /// Propagates client and normalization errors
    fn supported_pairs(&self) -> Result<Vec<Pair>>;

    /// True if the exchange lists `pair`
    ///
    /// # Errors
    /// See [`Interface::supported_pairs`]
    fn is_supported(&self, pair: &Pair) -> Result<bool> {
        Ok(self.supported_pairs()?.contains(pair))
    }

    /// Top of book and 24h volume
    ///
    /// # Errors
    /// Propagates client and normalization errors
    fn ticker(&self, pair: &Pair) -> Result<Ticker>;

    /// Aggregated order book; `params` are passed to the exchange (depth, level, ...)
    ///
    /// # Errors
    /// Propagates client and normalization errors
    fn order_book(&self, pair: &Pair, params: &Params) -> Result<OrderBook>;

    /// Recent public trades; `params` are passed to the exchange
    ///
    /// # Errors
    /// Propagates client and normalization errors
    fn trades(&self, pair: &Pair, params: &Params) -> Result<Vec<Trade>>;

    /// Total balance per currency
    ///
    /// # Errors
    /// Propagates client and normalization errors
    fn balance(&self) -> Result<Balances>;

    /// Open orders
    ///
    /// # Errors
    /// Propagates client and normalization errors
    fn orders(&self) -> Result<Vec<Order>>;

    /// State of one order
    ///
    /// # Errors
    /// Returns `UnsupportedOperation` unless the exchange offers a lookup
    fn order_status(&self, _order_id: &str) -> Result<Order> {
        Err(self.unsupported("order_status"))
    }

    /// Account movements
    ///
    /// # Errors
    /// Propagates client and normalization errors
    fn ledger(&self) -> Result<Vec<LedgerEntry>>;

    /// Place an order
    ///
    /// # Errors
    /// Returns `UnsupportedOperation` for order types the exchange lacks,
    /// otherwise propagates client and normalization errors
    fn add_order(&self, order: &OrderRequest) -> Result<OrderReceipt>;

    /// Cancel an order; `true` when the exchange confirmed the cancellation
    ///
    /// # Errors
    /// Propagates client and normalization errors
    fn cancel_order(&self, order_id: &str) -> Result<bool>;

    /// Maker and taker fees per pair
    ///
    /// # Errors
    /// Propagates client and normalization errors
    fn fees(&self) -> Result<Fees>;

    /// `UnsupportedOperation` for this exchange
    fn unsupported(&self, operation: &'static str) -> Error {
        Error::UnsupportedOperation {
            exchange: self.exchange(),
            operation,
        }
    }
}

/// Wrap a client in the interface of its exchange
#[must_use]
pub fn connect(client: ApiClient) -> Box<dyn Interface> {
    match client.exchange() {
        ExchangeId::Kraken => Box::new(Kraken::new(client)),
        ExchangeId::Bitstamp => Box::new(Bitstamp::new(client)),
        ExchangeId::Bitfinex => Box::new(Bitfinex::new(client)),
        ExchangeId::Bittrex => Box::new(Bittrex::new(client)),
        ExchangeId::Gdax => Box::new(Gdax::new(client)),
        ExchangeId::Poloniex => Box::new(Poloniex::new(client)),
        ExchangeId::Gemini => Box::new(Gemini::new(client)),
        ExchangeId::Quoine => Box::new(Quoine::new(client)),
    }
}

/// Interface built from a configuration section
///
/// # Errors
/// See [`ApiClient::from_config`]
pub fn from_config(exchange: ExchangeId, config: &ExchangeConfig) -> Result<Box<dyn Interface>> {
    ApiClient::from_config(exchange, config).map(connect)
}

/// One interface per configured exchange
///
/// # Errors
/// Fails on the first exchange whose client cannot be built
pub fn connect_all(config: &ClientsConfig) -> Result<Vec<Box<dyn Interface>>> {
    config
        .exchanges()
        .map(|exchange| from_config(exchange, &config.get(exchange)))
        .collect()
}
