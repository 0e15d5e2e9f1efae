//! Core types for the exchange REST clients
//!
//! Numeric fields are `Decimal` parsed from the exact text an exchange sent,
//! so normalized values never pick up floating-point rounding drift.

use crate::errors::Error;
use crate::pair::Pair;
use crate::params::Params;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Supported exchanges
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExchangeId {
    /// Kraken spot
    Kraken,
    /// Bitstamp (v2 API)
    Bitstamp,
    /// Bitfinex (v1 API)
    Bitfinex,
    /// Bittrex (v1.1 API)
    Bittrex,
    /// GDAX / Coinbase Exchange
    Gdax,
    /// Poloniex
    Poloniex,
    /// Gemini
    Gemini,
    /// Quoine
    Quoine,
}

impl ExchangeId {
    /// Every supported exchange
    pub const ALL: [Self; 8] = [
        Self::Kraken,
        Self::Bitstamp,
        Self::Bitfinex,
        Self::Bittrex,
        Self::Gdax,
        Self::Poloniex,
        Self::Gemini,
        Self::Quoine,
    ];

    /// Lowercase name used in configuration and logs
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Kraken => "kraken",
            Self::Bitstamp => "bitstamp",
            Self::Bitfinex => "bitfinex",
            Self::Bittrex => "bittrex",
            Self::Gdax => "gdax",
            Self::Poloniex => "poloniex",
            Self::Gemini => "gemini",
            Self::Quoine => "quoine",
        }
    }

    /// Prefix of the environment variables holding this exchange's credentials
    #[must_use]
    pub fn env_prefix(&self) -> String {
        self.name().to_uppercase()
    }
}

impl fmt::Display for ExchangeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ExchangeId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|id| id.name() == wanted)
            .ok_or_else(|| Error::Config {
                path: "<exchange name>".to_string(),
                reason: format!("unknown exchange '{s}'"),
            })
    }
}

/// Order side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Bid side
    Buy,
    /// Ask side
    Sell,
}

impl Side {
    /// Lowercase wire name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
        }
    }

    /// Parse the common spellings exchanges use for a side
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "buy" | "b" | "bid" | "0" => Some(Self::Buy),
            "sell" | "s" | "ask" | "1" => Some(Self::Sell),
            _ => None,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    /// Executes immediately at the best available price
    Market,
    /// Rests on the book at a given price
    Limit,
}

impl OrderType {
    /// Lowercase wire name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Market => "market",
            Self::Limit => "limit",
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Top-of-book snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticker {
    /// Best bid price
    pub bid: Decimal,
    /// Best ask price
    pub ask: Decimal,
    /// Last traded price
    pub last: Decimal,
    /// Rolling 24h volume in base currency
    pub volume: Decimal,
    /// Exchange timestamp, or receive time when the exchange sends none
    pub timestamp: DateTime<Utc>,
}

/// One aggregated price level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceLevel {
    /// Level price
    pub price: Decimal,
    /// Volume resting at this price
    pub volume: Decimal,
}

impl PriceLevel {
    /// Create a new price level
    #[must_use]
    pub const fn new(price: Decimal, volume: Decimal) -> Self {
        Self { price, volume }
    }
}

/// Order book with bids best-first (descending) and asks best-first (ascending)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBook {
    /// Bid levels
    pub bids: Vec<PriceLevel>,
    /// Ask levels
    pub asks: Vec<PriceLevel>,
}

impl OrderBook {
    /// Best bid level
    #[must_use]
    pub fn best_bid(&self) -> Option<&PriceLevel> {
        self.bids.first()
    }

    /// Best ask level
    #[must_use]
    pub fn best_ask(&self) -> Option<&PriceLevel> {
        self.asks.first()
    }
}

/// Public trade print
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    /// Execution price
    pub price: Decimal,
    /// Executed volume
    pub volume: Decimal,
    /// Taker side
    pub side: Side,
    /// Execution time
    pub timestamp: DateTime<Utc>,
}

/// Available balance per canonical currency code
pub type Balances = BTreeMap<String, Decimal>;

/// Open order owned by the account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Exchange order id
    pub id: String,
    /// Exchange-native symbol
    pub symbol: String,
    /// Canonical pair when the symbol could be mapped
    pub pair: Option<Pair>,
    /// Order side
    pub side: Side,
    /// Order type
    pub order_type: OrderType,
    /// Limit price (absent for market orders)
    pub price: Option<Decimal>,
    /// Original volume
    pub volume: Decimal,
    /// Volume filled so far
    pub filled: Decimal,
    /// Placement time, when reported
    pub opened_at: Option<DateTime<Utc>>,
}

/// Account ledger movement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Exchange ledger id
    pub id: String,
    /// Canonical currency code
    pub currency: String,
    /// Signed amount (negative for debits)
    pub amount: Decimal,
    /// Fee charged on the movement
    pub fee: Decimal,
    /// Exchange classification (trade, deposit, withdrawal, ...)
    pub kind: String,
    /// Time of the movement
    pub timestamp: DateTime<Utc>,
}

/// Canonical order placement request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRequest {
    /// Pair to trade
    pub pair: Pair,
    /// Order side
    pub side: Side,
    /// Order type
    pub order_type: OrderType,
    /// Limit price, required for limit orders
    pub price: Option<Decimal>,
    /// Volume in base currency
    pub volume: Decimal,
    /// Exchange-specific extra parameters appended to the request
    pub extra: Params,
}

impl OrderRequest {
    /// Limit order
    #[must_use]
    pub fn limit(pair: Pair, side: Side, price: Decimal, volume: Decimal) -> Self {
        Self {
            pair,
            side,
            order_type: OrderType::Limit,
            price: Some(price),
            volume,
            extra: Params::new(),
        }
    }

    /// Market order
    #[must_use]
    pub fn market(pair: Pair, side: Side, volume: Decimal) -> Self {
        Self {
            pair,
            side,
            order_type: OrderType::Market,
            price: None,
            volume,
            extra: Params::new(),
        }
    }

    /// Attach an exchange-specific parameter
    #[must_use]
    pub fn with_extra(mut self, key: &str, value: &str) -> Self {
        self.extra.insert(key, value);
        self
    }
}

/// Acknowledgement of a placed order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderReceipt {
    /// Exchange order id
    pub order_id: String,
    /// Pair traded
    pub pair: Pair,
    /// Order side
    pub side: Side,
    /// Order type
    pub order_type: OrderType,
    /// Limit price, if any
    pub price: Option<Decimal>,
    /// Requested volume
    pub volume: Decimal,
}

/// Maker and taker fee as fractions of notional (0.0026 == 0.26%)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedule {
    /// Fee for liquidity-adding orders
    pub maker: Decimal,
    /// Fee for liquidity-taking orders
    pub taker: Decimal,
}

/// Fee schedule per canonical pair
pub type Fees = BTreeMap<Pair, FeeSchedule>;
