//! Gemini
//!
//! Signed calls carry their whole payload in headers and send no body.
//! Errors come back as `{"result": "error", "reason", "message"}`. Only
//! limit orders are offered through this interface.

use super::{require_limit, uniform_fees};
use crate::interface::Interface;
use crate::normalize::Normalizer;
use crate::pairs::{ConcatenatedFormatter, PairFormatter};
use common::{
    Balances, ExchangeId, FeeSchedule, Fees, LedgerEntry, Method, Order, OrderBook, OrderReceipt,
    OrderRequest, OrderType, Pair, Params, Result, Ticker, Trade, canonical_currency,
};
use rest::{ApiClient, RawResponse};
use rust_decimal::Decimal;
use serde_json::Value;

const BPS_PER_UNIT: i64 = 10_000;

/// Gemini interface
#[derive(Debug)]
pub struct Gemini {
    client: ApiClient,
    pairs: ConcatenatedFormatter,
}

impl Gemini {
    /// Wrap a Gemini client
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self {
            client,
            pairs: ConcatenatedFormatter::lower(ExchangeId::Gemini),
        }
    }

    fn checked(n: &Normalizer, endpoint: &str, response: &RawResponse) -> Result<Value> {
        let body = n.json(response)?;
        if body.get("result").and_then(Value::as_str) == Some("error") {
            let reason = body.get("reason").and_then(Value::as_str).unwrap_or("error");
            let message = body.get("message").and_then(Value::as_str).unwrap_or_default();
            return Err(n.api_error(endpoint, response.status, format!("{reason}: {message}")));
        }
        Ok(body)
    }

    fn public(&self, operation: &'static str, endpoint: &str, params: &Params) -> Result<(Normalizer, Value)> {
        let n = Normalizer::new(ExchangeId::Gemini, operation);
        let response = self.public_query(endpoint, params)?;
        let body = Self::checked(&n, endpoint, &response)?;
        Ok((n, body))
    }

    fn private(&self, operation: &'static str, endpoint: &str, params: &Params) -> Result<(Normalizer, Value)> {
        let n = Normalizer::new(ExchangeId::Gemini, operation);
        let response = self.private_query(endpoint, params)?;
        let body = Self::checked(&n, endpoint, &response)?;
        Ok((n, body))
    }

    fn order(&self, n: &Normalizer, value: &Value) -> Result<Order> {
        let symbol = n.text_field(value, "symbol")?;
        Ok(Order {
            id: n.text_field(value, "order_id")?,
            pair: self.pairs.to_canonical(&symbol).ok(),
            symbol,
            side: n.side(n.field(value, "side")?)?,
            order_type: OrderType::Limit,
            price: n.optional_decimal(value, "price")?,
            volume: n.decimal_field(value, "original_amount")?,
            filled: n.decimal_field(value, "executed_amount")?,
            opened_at: value.get("timestampms").map(|t| n.millis(t)).transpose()?,
        })
    }

    /// Basis points to a fraction, preferring the API-specific rate
    fn bps(n: &Normalizer, body: &Value, keys: [&str; 2]) -> Result<Decimal> {
        let value = keys
            .iter()
            .find_map(|key| body.get(*key))
            .ok_or_else(|| n.error(format!("missing field '{}'", keys[1])))?;
        Ok(n.decimal(value)? / Decimal::from(BPS_PER_UNIT))
    }
}

impl Interface for Gemini {
    fn exchange(&self) -> ExchangeId {
        ExchangeId::Gemini
    }

    fn client(&self) -> &ApiClient {
        &self.client
    }

    fn pairs(&self) -> &dyn PairFormatter {
        &self.pairs
    }

    fn public_query(&self, endpoint: &str, params: &Params) -> Result<RawResponse> {
        self.client.query(Method::Get, endpoint, params, false)
    }

    fn private_query(&self, endpoint: &str, params: &Params) -> Result<RawResponse> {
        self.client.query(Method::Post, endpoint, params, true)
    }

    fn supported_pairs(&self) -> Result<Vec<Pair>> {
        let (n, body) = self.public("supported_pairs", "symbols", &Params::new())?;
        Ok(n.array(&body)?
            .iter()
            .filter_map(Value::as_str)
            .filter_map(|symbol| self.pairs.to_canonical(symbol).ok())
            .collect())
    }

    /// Volume is keyed by currency; the base currency's entry is used
    fn ticker(&self, pair: &Pair) -> Result<Ticker> {
        let endpoint = format!("pubticker/{}", self.pairs.to_exchange(pair));
        let (n, body) = self.public("ticker", &endpoint, &Params::new())?;
        let volume = n.field(&body, "volume")?;
        Ok(Ticker {
            bid: n.decimal_field(&body, "bid")?,
            ask: n.decimal_field(&body, "ask")?,
            last: n.decimal_field(&body, "last")?,
            volume: n.decimal_field(volume, pair.base())?,
            timestamp: n.millis(n.field(volume, "timestamp")?)?,
        })
    }

    fn order_book(&self, pair: &Pair, params: &Params) -> Result<OrderBook> {
        let endpoint = format!("book/{}", self.pairs.to_exchange(pair));
        let (n, body) = self.public("order_book", &endpoint, params)?;
        Ok(OrderBook {
            bids: n.levels(n.field(&body, "bids")?, "price", "amount")?,
            asks: n.levels(n.field(&body, "asks")?, "price", "amount")?,
        })
    }

    fn trades(&self, pair: &Pair, params: &Params) -> Result<Vec<Trade>> {
        let endpoint = format!("trades/{}", self.pairs.to_exchange(pair));
        let (n, body) = self.public("trades", &endpoint, params)?;
        n.array(&body)?
            .iter()
            .map(|t| {
                Ok(Trade {
                    price: n.decimal_field(t, "price")?,
                    volume: n.decimal_field(t, "amount")?,
                    side: n.side(n.field(t, "type")?)?,
                    timestamp: match t.get("timestampms") {
                        Some(ms) => n.millis(ms)?,
                        None => n.seconds(n.field(t, "timestamp")?)?,
                    },
                })
            })
            .collect()
    }

    fn balance(&self) -> Result<Balances> {
        let (n, body) = self.private("balance", "balances", &Params::new())?;
        let mut balances = Balances::new();
        for wallet in n.array(&body)? {
            let currency = canonical_currency(&n.text_field(wallet, "currency")?);
            *balances.entry(currency).or_default() += n.decimal_field(wallet, "amount")?;
        }
        Ok(balances)
    }

    fn orders(&self) -> Result<Vec<Order>> {
        let (n, body) = self.private("orders", "orders", &Params::new())?;
        n.array(&body)?.iter().map(|o| self.order(&n, o)).collect()
    }

    fn order_status(&self, order_id: &str) -> Result<Order> {
        let params = Params::new().with_raw("order_id", order_id);
        let (n, body) = self.private("order_status", "order/status", &params)?;
        self.order(&n, &body)
    }

    /// Deposits and withdrawals
    fn ledger(&self) -> Result<Vec<LedgerEntry>> {
        let (n, body) = self.private("ledger", "transfers", &Params::new())?;
        let mut entries = n
            .array(&body)?
            .iter()
            .map(|transfer| {
                let kind = n.text_field(transfer, "type")?.to_lowercase();
                let amount = n.decimal_field(transfer, "amount")?;
                Ok(LedgerEntry {
                    id: n.text_field(transfer, "eid")?,
                    currency: canonical_currency(&n.text_field(transfer, "currency")?),
                    amount: if kind == "withdrawal" { -amount } else { amount },
                    fee: Decimal::ZERO,
                    kind,
                    timestamp: n.millis(n.field(transfer, "timestampms")?)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        entries.sort_by_key(|entry| entry.timestamp);
        Ok(entries)
    }

    fn add_order(&self, order: &OrderRequest) -> Result<OrderReceipt> {
        let price = require_limit(self.exchange(), order)?;
        let mut params = Params::new()
            .with("symbol", self.pairs.to_exchange(&order.pair))
            .with("amount", order.volume.to_string())
            .with("price", price.to_string())
            .with("side", order.side.as_str())
            .with("type", "exchange limit");
        params.extend(&order.extra);

        let (n, body) = self.private("add_order", "order/new", &params)?;
        Ok(OrderReceipt {
            order_id: n.text_field(&body, "order_id")?,
            pair: order.pair.clone(),
            side: order.side,
            order_type: OrderType::Limit,
            price: Some(price),
            volume: order.volume,
        })
    }

    fn cancel_order(&self, order_id: &str) -> Result<bool> {
        let params = Params::new().with_raw("order_id", order_id);
        let (n, body) = self.private("cancel_order", "order/cancel", &params)?;
        n.field(&body, "is_cancelled")?
            .as_bool()
            .ok_or_else(|| n.error("'is_cancelled' is not a bool"))
    }

    /// 30-day notional volume tier, applied to every symbol
    fn fees(&self) -> Result<Fees> {
        let (n, body) = self.private("fees", "notionalvolume", &Params::new())?;
        let schedule = FeeSchedule {
            maker: Self::bps(&n, &body, ["api_maker_fee_bps", "maker_fee_bps"])?,
            taker: Self::bps(&n, &body, ["api_taker_fee_bps", "taker_fee_bps"])?,
        };
        Ok(uniform_fees(self.supported_pairs()?, schedule))
    }
}
