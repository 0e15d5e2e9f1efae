//! Canonical trading pairs
//!
//! A canonical pair is a base and a quote currency code, upper case, with
//! exchange aliases folded onto one spelling (`XBT` becomes `BTC`). Exchange
//! symbol conventions are layered on top of this by the connector crate.

use crate::errors::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Quote currencies recognised when splitting a concatenated symbol,
/// longest first so `USDT` wins over `USD`
pub const KNOWN_QUOTES: [&str; 14] = [
    "USDT", "USDC", "BTC", "XBT", "ETH", "EUR", "USD", "GBP", "JPY", "CAD", "CHF", "AUD",
    "SGD", "DAI",
];

/// Fold exchange aliases onto the canonical currency code
#[must_use]
pub fn canonical_currency(code: &str) -> String {
    let upper = code.trim().to_uppercase();
    match upper.as_str() {
        "XBT" => "BTC".to_string(),
        "XDG" => "DOGE".to_string(),
        _ => upper,
    }
}

/// Canonical base/quote pair
///
/// Serialized as `BASE/QUOTE`, so it can key JSON maps.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Pair {
    base: String,
    quote: String,
}

impl Pair {
    /// Create a pair from two currency codes
    ///
    /// # Errors
    /// Returns `InvalidPair` if either code is empty or not alphanumeric
    pub fn new(base: &str, quote: &str) -> Result<Self, Error> {
        let base = canonical_currency(base);
        let quote = canonical_currency(quote);
        let valid = |code: &str| !code.is_empty() && code.chars().all(|c| c.is_ascii_alphanumeric());
        if !valid(&base) || !valid(&quote) {
            return Err(Error::InvalidPair {
                input: format!("{base}/{quote}"),
            });
        }
        Ok(Self { base, quote })
    }

    /// Base currency code
    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Quote currency code
    #[must_use]
    pub fn quote(&self) -> &str {
        &self.quote
    }

    /// Split a symbol without separator (`BTCEUR`, `ltcbtc`) on a known quote
    ///
    /// # Errors
    /// Returns `InvalidPair` when no known quote currency ends the symbol
    pub fn from_concatenated(symbol: &str) -> Result<Self, Error> {
        let upper = symbol.trim().to_uppercase();
        let mut quotes = KNOWN_QUOTES;
        quotes.sort_by_key(|q| std::cmp::Reverse(q.len()));
        quotes
            .iter()
            .find(|quote| upper.len() > quote.len() && upper.ends_with(*quote))
            .map(|quote| Self::new(&upper[..upper.len() - quote.len()], quote))
            .unwrap_or_else(|| {
                Err(Error::InvalidPair {
                    input: symbol.to_string(),
                })
            })
    }
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

impl FromStr for Pair {
    type Err = Error;

    /// Accepts `BTC/EUR`, `btc_eur`, `BTC-EUR`, `BTC:EUR` and concatenated
    /// symbols that end in a known quote currency
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.split_once(|c: char| matches!(c, '/' | '_' | '-' | ':')) {
            Some((base, quote)) => Self::new(base, quote).map_err(|_| Error::InvalidPair {
                input: s.to_string(),
            }),
            None => Self::from_concatenated(trimmed),
        }
    }
}

impl TryFrom<String> for Pair {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Pair> for String {
    fn from(pair: Pair) -> Self {
        pair.to_string()
    }
}
