//! Bitstamp (v2)
//!
//! Errors arrive with HTTP 200 as either `{"error": ...}` or
//! `{"status": "error", "reason": ...}`. Sides are encoded as `0` (buy) and
//! `1` (sell). There is no single-order lookup in the v2 surface used here.

use super::limit_price;
use crate::interface::Interface;
use crate::normalize::{Normalizer, percent_to_fraction};
use crate::pairs::{ConcatenatedFormatter, PairFormatter};
use common::{
    Balances, ExchangeId, FeeSchedule, Fees, LedgerEntry, Method, Order, OrderBook, OrderReceipt,
    OrderRequest, OrderType, Pair, Params, Result, Ticker, Trade, canonical_currency,
};
use rest::{ApiClient, RawResponse};
use rust_decimal::Decimal;
use serde_json::Value;

// Non-currency columns of a user transaction
const TRANSACTION_FIELDS: [&str; 5] = ["id", "datetime", "type", "fee", "order_id"];

/// Bitstamp interface
#[derive(Debug)]
pub struct Bitstamp {
    client: ApiClient,
    pairs: ConcatenatedFormatter,
}

impl Bitstamp {
    /// Wrap a Bitstamp client
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self {
            client,
            pairs: ConcatenatedFormatter::lower(ExchangeId::Bitstamp),
        }
    }

    fn checked(&self, n: &Normalizer, endpoint: &str, response: &RawResponse) -> Result<Value> {
        let body = n.json(response)?;
        let reason = match (body.get("error"), body.get("status").and_then(Value::as_str)) {
            (Some(error), _) => Some(error),
            (None, Some("error")) => body.get("reason"),
            _ => None,
        };
        match reason {
            Some(Value::String(message)) => Err(n.api_error(endpoint, response.status, message.clone())),
            Some(other) => Err(n.api_error(endpoint, response.status, other.to_string())),
            None => Ok(body),
        }
    }

    fn public(&self, operation: &'static str, endpoint: &str, params: &Params) -> Result<(Normalizer, Value)> {
        let n = Normalizer::new(ExchangeId::Bitstamp, operation);
        let response = self.public_query(endpoint, params)?;
        let body = self.checked(&n, endpoint, &response)?;
        Ok((n, body))
    }

    fn private(&self, operation: &'static str, endpoint: &str, params: &Params) -> Result<(Normalizer, Value)> {
        let n = Normalizer::new(ExchangeId::Bitstamp, operation);
        let response = self.private_query(endpoint, params)?;
        let body = self.checked(&n, endpoint, &response)?;
        Ok((n, body))
    }

    fn symbol(&self, pair: &Pair) -> String {
        self.pairs.to_exchange(pair)
    }

    /// `currency_pair` is `BTC/USD` in order listings
    fn order(&self, n: &Normalizer, value: &Value) -> Result<Order> {
        let symbol = n.text_field(value, "currency_pair")?;
        Ok(Order {
            id: n.text_field(value, "id")?,
            pair: symbol.parse().ok(),
            symbol,
            side: n.side(n.field(value, "type")?)?,
            order_type: OrderType::Limit,
            price: n.optional_decimal(value, "price")?,
            volume: n.decimal_field(value, "amount")?,
            filled: Decimal::ZERO,
            opened_at: value.get("datetime").map(|t| n.datetime(t)).transpose()?,
        })
    }

    fn transaction_kind(code: &str) -> &'static str {
        match code {
            "0" => "deposit",
            "1" => "withdrawal",
            "2" => "trade",
            "14" => "transfer",
            _ => "other",
        }
    }

    /// One ledger entry per non-zero currency column of a user transaction
    fn ledger_entries(n: &Normalizer, tx: &Value) -> Result<Vec<LedgerEntry>> {
        let id = n.text_field(tx, "id")?;
        let kind = Self::transaction_kind(&n.text_field(tx, "type")?);
        let timestamp = n.datetime(n.field(tx, "datetime")?)?;
        let fee = n.optional_decimal(tx, "fee")?.unwrap_or_default();
        let columns = n.object(tx)?;
        let fee_currency = columns
            .keys()
            .filter(|key| !TRANSACTION_FIELDS.contains(&key.as_str()))
            .find_map(|key| key.split_once('_').map(|(_, quote)| quote.to_string()));

        let mut entries = Vec::new();
        for (key, value) in columns {
            if TRANSACTION_FIELDS.contains(&key.as_str()) || key.contains('_') {
                continue;
            }
            let amount = n.decimal(value)?;
            if amount.is_zero() {
                continue;
            }
            entries.push(LedgerEntry {
                id: id.clone(),
                currency: canonical_currency(key),
                amount,
                fee: Decimal::ZERO,
                kind: kind.to_string(),
                timestamp,
            });
        }

        let fee_index = fee_currency
            .and_then(|quote| {
                let quote = canonical_currency(&quote);
                entries.iter().position(|entry| entry.currency == quote)
            })
            .or_else(|| (!entries.is_empty()).then_some(0));
        if let Some(index) = fee_index {
            entries[index].fee = fee;
        }
        Ok(entries)
    }
}

impl Interface for Bitstamp {
    fn exchange(&self) -> ExchangeId {
        ExchangeId::Bitstamp
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
        let (n, body) = self.public("supported_pairs", "trading-pairs-info/", &Params::new())?;
        Ok(n.array(&body)?
            .iter()
            .filter_map(|info| info.get("url_symbol").and_then(Value::as_str))
            .filter_map(|symbol| self.pairs.to_canonical(symbol).ok())
            .collect())
    }

    fn ticker(&self, pair: &Pair) -> Result<Ticker> {
        let endpoint = format!("ticker/{}/", self.symbol(pair));
        let (n, body) = self.public("ticker", &endpoint, &Params::new())?;
        Ok(Ticker {
            bid: n.decimal_field(&body, "bid")?,
            ask: n.decimal_field(&body, "ask")?,
            last: n.decimal_field(&body, "last")?,
            volume: n.decimal_field(&body, "volume")?,
            timestamp: n.seconds(n.field(&body, "timestamp")?)?,
        })
    }

    fn order_book(&self, pair: &Pair, params: &Params) -> Result<OrderBook> {
        let endpoint = format!("order_book/{}/", self.symbol(pair));
        let (n, body) = self.public("order_book", &endpoint, params)?;
        Ok(OrderBook {
            bids: n.levels(n.field(&body, "bids")?, "price", "amount")?,
            asks: n.levels(n.field(&body, "asks")?, "price", "amount")?,
        })
    }

    fn trades(&self, pair: &Pair, params: &Params) -> Result<Vec<Trade>> {
        let endpoint = format!("transactions/{}/", self.symbol(pair));
        let (n, body) = self.public("trades", &endpoint, params)?;
        n.array(&body)?
            .iter()
            .map(|t| {
                Ok(Trade {
                    price: n.decimal_field(t, "price")?,
                    volume: n.decimal_field(t, "amount")?,
                    side: n.side(n.field(t, "type")?)?,
                    timestamp: n.seconds(n.field(t, "date")?)?,
                })
            })
            .collect()
    }

    fn balance(&self) -> Result<Balances> {
        let (n, body) = self.private("balance", "balance/", &Params::new())?;
        n.object(&body)?
            .iter()
            .filter_map(|(key, value)| {
                key.strip_suffix("_balance")
                    .map(|currency| Ok((canonical_currency(currency), n.decimal(value)?)))
            })
            .collect()
    }

    fn orders(&self) -> Result<Vec<Order>> {
        let (n, body) = self.private("orders", "open_orders/all/", &Params::new())?;
        n.array(&body)?.iter().map(|o| self.order(&n, o)).collect()
    }

    fn ledger(&self) -> Result<Vec<LedgerEntry>> {
        let (n, body) = self.private("ledger", "user_transactions/", &Params::new())?;
        let mut entries = Vec::new();
        for tx in n.array(&body)? {
            entries.extend(Self::ledger_entries(&n, tx)?);
        }
        entries.sort_by_key(|entry| entry.timestamp);
        Ok(entries)
    }

    fn add_order(&self, order: &OrderRequest) -> Result<OrderReceipt> {
        let price = limit_price(self.exchange(), order)?;
        let side = order.side.as_str();
        let symbol = self.symbol(&order.pair);
        let mut params = Params::new().with("amount", order.volume.to_string());
        let endpoint = match price {
            Some(price) => {
                params.insert("price", price.to_string());
                format!("{side}/{symbol}/")
            }
            None => format!("{side}/market/{symbol}/"),
        };
        params.extend(&order.extra);

        let (n, body) = self.private("add_order", &endpoint, &params)?;
        Ok(OrderReceipt {
            order_id: n.text_field(&body, "id")?,
            pair: order.pair.clone(),
            side: order.side,
            order_type: order.order_type,
            price,
            volume: order.volume,
        })
    }

    fn cancel_order(&self, order_id: &str) -> Result<bool> {
        let params = Params::new().with("id", order_id);
        let (n, body) = self.private("cancel_order", "cancel_order/", &params)?;
        match &body {
            Value::Bool(done) => Ok(*done),
            Value::Object(_) => Ok(n.text_field(&body, "id")? == order_id),
            other => Err(n.error(format!("unexpected cancel response {other}"))),
        }
    }

    /// Per-pair `<pair>_fee` percentages from the balance call
    fn fees(&self) -> Result<Fees> {
        let (n, body) = self.private("fees", "balance/", &Params::new())?;
        let mut fees = Fees::new();
        for (key, value) in n.object(&body)? {
            let Some(symbol) = key.strip_suffix("_fee") else {
                continue;
            };
            let Ok(pair) = self.pairs.to_canonical(symbol) else {
                continue;
            };
            let fee = percent_to_fraction(n.decimal(value)?);
            fees.insert(pair, FeeSchedule { maker: fee, taker: fee });
        }
        Ok(fees)
    }
}
