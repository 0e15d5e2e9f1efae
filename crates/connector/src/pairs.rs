//! Exchange symbol formatting
//!
//! Translates canonical pairs to the symbol strings each exchange uses and
//! back. Three families cover the supported exchanges: Kraken's prefixed
//! asset codes, plain concatenation (`btcusd`) and separator-joined symbols
//! whose order varies (`BTC-USD` vs `BTC-LTC`).

use common::{Error, ExchangeId, Pair, Result, canonical_currency};
use common::pair::KNOWN_QUOTES;

/// Canonical pair to exchange symbol and back
pub trait PairFormatter: Send + Sync {
    /// Exchange whose convention this is
    fn exchange(&self) -> ExchangeId;

    /// Exchange-native symbol for `pair`
    fn to_exchange(&self, pair: &Pair) -> String;

    /// Canonical pair for an exchange-native symbol
    ///
    /// # Errors
    /// Returns `InvalidPair` if the symbol does not follow the convention
    fn to_canonical(&self, symbol: &str) -> Result<Pair>;
}

/// Formatter for an exchange
#[must_use]
pub fn formatter_for(exchange: ExchangeId) -> Box<dyn PairFormatter> {
    match exchange {
        ExchangeId::Kraken => Box::new(KrakenFormatter),
        ExchangeId::Bitstamp | ExchangeId::Bitfinex | ExchangeId::Gemini => {
            Box::new(ConcatenatedFormatter::lower(exchange))
        }
        ExchangeId::Quoine => Box::new(ConcatenatedFormatter::upper(exchange)),
        ExchangeId::Bittrex => Box::new(SeparatedFormatter::quote_first(exchange, '-')),
        ExchangeId::Poloniex => Box::new(SeparatedFormatter::quote_first(exchange, '_')),
        ExchangeId::Gdax => Box::new(SeparatedFormatter::base_first(exchange, '-')),
    }
}

// Assets Kraken lists with a one-letter class prefix
const KRAKEN_LEGACY: [&str; 16] = [
    "XBT", "ETH", "LTC", "XRP", "XMR", "ETC", "ZEC", "XLM", "REP", "MLN", "XDG", "EUR", "USD",
    "GBP", "JPY", "CAD",
];

const KRAKEN_FIAT: [&str; 5] = ["EUR", "USD", "GBP", "JPY", "CAD"];

/// Kraken spelling of a canonical currency
#[must_use]
pub fn kraken_currency(code: &str) -> String {
    match code {
        "BTC" => "XBT".to_string(),
        "DOGE" => "XDG".to_string(),
        other => other.to_string(),
    }
}

/// Canonical currency for a Kraken asset code (`XXBT`, `ZEUR`, `XBT`, `DASH`)
#[must_use]
pub fn kraken_asset_to_canonical(asset: &str) -> String {
    let upper = asset.trim().to_uppercase();
    let stripped = upper
        .strip_prefix(|c: char| matches!(c, 'X' | 'Z'))
        .filter(|rest| upper.len() == 4 && KRAKEN_LEGACY.contains(rest));
    canonical_currency(stripped.unwrap_or(&upper))
}

/// `XXBT`, `ZEUR`: a legacy asset with its class prefix
fn is_prefixed_asset(code: &str) -> bool {
    code.len() == 4
        && code
            .strip_prefix(|c: char| matches!(c, 'X' | 'Z'))
            .is_some_and(|rest| KRAKEN_LEGACY.contains(&rest))
}

fn kraken_asset(code: &str) -> String {
    if KRAKEN_FIAT.contains(&code) {
        format!("Z{code}")
    } else {
        format!("X{code}")
    }
}

/// Kraken: `XXBTZEUR` for legacy assets, plain concatenation otherwise
#[derive(Debug, Clone, Copy, Default)]
pub struct KrakenFormatter;

impl PairFormatter for KrakenFormatter {
    fn exchange(&self) -> ExchangeId {
        ExchangeId::Kraken
    }

    fn to_exchange(&self, pair: &Pair) -> String {
        let base = kraken_currency(pair.base());
        let quote = kraken_currency(pair.quote());
        if KRAKEN_LEGACY.contains(&base.as_str()) && KRAKEN_LEGACY.contains(&quote.as_str()) {
            format!("{}{}", kraken_asset(&base), kraken_asset(&quote))
        } else {
            format!("{base}{quote}")
        }
    }

    fn to_canonical(&self, symbol: &str) -> Result<Pair> {
        let upper = symbol.trim().to_uppercase();
        let mut suffixes: Vec<String> = KNOWN_QUOTES
            .iter()
            .map(|q| kraken_currency(q))
            .flat_map(|q| {
                let prefixed = KRAKEN_LEGACY.contains(&q.as_str()).then(|| kraken_asset(&q));
                prefixed.into_iter().chain(std::iter::once(q))
            })
            .collect();
        suffixes.sort_by_key(|s| std::cmp::Reverse(s.len()));

        suffixes
            .iter()
            .find(|suffix| {
                let Some(base) = upper.strip_suffix(suffix.as_str()).filter(|b| !b.is_empty()) else {
                    return false;
                };
                // A prefixed quote only pairs with a prefixed base (`XXBTZEUR`);
                // `XTZEUR` is XTZ + EUR
                !is_prefixed_asset(suffix) || is_prefixed_asset(base)
            })
            .map(|suffix| {
                let base = &upper[..upper.len() - suffix.len()];
                Pair::new(
                    &kraken_asset_to_canonical(base),
                    &kraken_asset_to_canonical(suffix),
                )
            })
            .unwrap_or_else(|| {
                Err(Error::InvalidPair {
                    input: symbol.to_string(),
                })
            })
    }
}

/// Base and quote joined without separator
#[derive(Debug, Clone, Copy)]
pub struct ConcatenatedFormatter {
    exchange: ExchangeId,
    lowercase: bool,
}

impl ConcatenatedFormatter {
    /// `btcusd`
    #[must_use]
    pub const fn lower(exchange: ExchangeId) -> Self {
        Self {
            exchange,
            lowercase: true,
        }
    }

    /// `BTCUSD`
    #[must_use]
    pub const fn upper(exchange: ExchangeId) -> Self {
        Self {
            exchange,
            lowercase: false,
        }
    }
}

impl PairFormatter for ConcatenatedFormatter {
    fn exchange(&self) -> ExchangeId {
        self.exchange
    }

    fn to_exchange(&self, pair: &Pair) -> String {
        let symbol = format!("{}{}", pair.base(), pair.quote());
        if self.lowercase {
            symbol.to_lowercase()
        } else {
            symbol
        }
    }

    fn to_canonical(&self, symbol: &str) -> Result<Pair> {
        Pair::from_concatenated(symbol)
    }
}

/// Two codes joined by a separator
#[derive(Debug, Clone, Copy)]
pub struct SeparatedFormatter {
    exchange: ExchangeId,
    separator: char,
    quote_first: bool,
}

impl SeparatedFormatter {
    /// `BTC-USD` (base first)
    #[must_use]
    pub const fn base_first(exchange: ExchangeId, separator: char) -> Self {
        Self {
            exchange,
            separator,
            quote_first: false,
        }
    }

    /// `BTC-LTC` meaning LTC priced in BTC (quote first)
    #[must_use]
    pub const fn quote_first(exchange: ExchangeId, separator: char) -> Self {
        Self {
            exchange,
            separator,
            quote_first: true,
        }
    }
}

impl PairFormatter for SeparatedFormatter {
    fn exchange(&self) -> ExchangeId {
        self.exchange
    }

    fn to_exchange(&self, pair: &Pair) -> String {
        let (first, second) = if self.quote_first {
            (pair.quote(), pair.base())
        } else {
            (pair.base(), pair.quote())
        };
        format!("{first}{}{second}", self.separator)
    }

    fn to_canonical(&self, symbol: &str) -> Result<Pair> {
        let invalid = || Error::InvalidPair {
            input: symbol.to_string(),
        };
        let (first, second) = symbol.trim().split_once(self.separator).ok_or_else(invalid)?;
        let pair = if self.quote_first {
            Pair::new(second, first)
        } else {
            Pair::new(first, second)
        };
        pair.map_err(|_| invalid())
    }
}
