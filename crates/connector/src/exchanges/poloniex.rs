//! Poloniex
//!
//! Two endpoints: `public` (GET) and `tradingApi` (signed POST); the
//! operation is the `command` parameter. Pairs are quote-first
//! (`BTC_XMR`). Only limit orders, and no single-order lookup.

use super::{require_limit, uniform_fees};
use crate::interface::Interface;
use crate::normalize::Normalizer;
use crate::pairs::{PairFormatter, SeparatedFormatter};
use chrono::Utc;
use common::{
    Balances, ExchangeId, FeeSchedule, Fees, LedgerEntry, Method, Order, OrderBook, OrderReceipt,
    OrderRequest, OrderType, Pair, Params, Result, Ticker, Trade, canonical_currency,
};
use rest::{ApiClient, RawResponse};
use serde_json::Value;

/// Poloniex interface
#[derive(Debug)]
pub struct Poloniex {
    client: ApiClient,
    pairs: SeparatedFormatter,
}

impl Poloniex {
    /// Wrap a Poloniex client
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self {
            client,
            pairs: SeparatedFormatter::quote_first(ExchangeId::Poloniex, '_'),
        }
    }

    fn checked(n: &Normalizer, command: &str, response: &RawResponse) -> Result<Value> {
        let body = n.json(response)?;
        match body.get("error") {
            Some(error) => {
                let text = n.text(error).unwrap_or_else(|_| error.to_string());
                Err(n.api_error(command, response.status, text))
            }
            None => Ok(body),
        }
    }

    fn public(&self, operation: &'static str, command: &str, params: &Params) -> Result<(Normalizer, Value)> {
        let n = Normalizer::new(ExchangeId::Poloniex, operation);
        let response = self.public_query(command, params)?;
        let body = Self::checked(&n, command, &response)?;
        Ok((n, body))
    }

    fn private(&self, operation: &'static str, command: &str, params: &Params) -> Result<(Normalizer, Value)> {
        let n = Normalizer::new(ExchangeId::Poloniex, operation);
        let response = self.private_query(command, params)?;
        let body = Self::checked(&n, command, &response)?;
        Ok((n, body))
    }

    fn currency_pair(&self, pair: &Pair) -> Params {
        Params::new().with("currencyPair", self.pairs.to_exchange(pair))
    }

    /// `amount` is what remains; `startingAmount` is reported by newer API versions
    fn order(&self, n: &Normalizer, symbol: &str, value: &Value) -> Result<Order> {
        let remaining = n.decimal_field(value, "amount")?;
        let volume = n.optional_decimal(value, "startingAmount")?.unwrap_or(remaining);
        Ok(Order {
            id: n.text_field(value, "orderNumber")?,
            symbol: symbol.to_string(),
            pair: self.pairs.to_canonical(symbol).ok(),
            side: n.side(n.field(value, "type")?)?,
            order_type: OrderType::Limit,
            price: Some(n.decimal_field(value, "rate")?),
            volume,
            filled: volume - remaining,
            opened_at: value.get("date").map(|t| n.datetime(t)).transpose()?,
        })
    }

    fn transfers(n: &Normalizer, items: Option<&Value>, kind: &str, id_key: &str) -> Result<Vec<LedgerEntry>> {
        let Some(items) = items else {
            return Ok(Vec::new());
        };
        n.array(items)?
            .iter()
            .map(|item| {
                let amount = n.decimal_field(item, "amount")?;
                Ok(LedgerEntry {
                    id: n.text_field(item, id_key)?,
                    currency: canonical_currency(&n.text_field(item, "currency")?),
                    amount: if kind == "withdrawal" { -amount } else { amount },
                    fee: n.optional_decimal(item, "fee")?.unwrap_or_default(),
                    kind: kind.to_string(),
                    timestamp: n.seconds(n.field(item, "timestamp")?)?,
                })
            })
            .collect()
    }
}

impl Interface for Poloniex {
    fn exchange(&self) -> ExchangeId {
        ExchangeId::Poloniex
    }

    fn client(&self) -> &ApiClient {
        &self.client
    }

    fn pairs(&self) -> &dyn PairFormatter {
        &self.pairs
    }

    /// `endpoint` is the public command
    fn public_query(&self, endpoint: &str, params: &Params) -> Result<RawResponse> {
        let mut query = Params::new().with("command", endpoint);
        query.extend(params);
        self.client.query(Method::Get, "public", &query, false)
    }

    /// `endpoint` is the trading command
    fn private_query(&self, endpoint: &str, params: &Params) -> Result<RawResponse> {
        let mut query = Params::new().with("command", endpoint);
        query.extend(params);
        self.client.query(Method::Post, "tradingApi", &query, true)
    }

    fn supported_pairs(&self) -> Result<Vec<Pair>> {
        let (n, body) = self.public("supported_pairs", "returnTicker", &Params::new())?;
        Ok(n.object(&body)?
            .keys()
            .filter_map(|symbol| self.pairs.to_canonical(symbol).ok())
            .collect())
    }

    /// `quoteVolume` is denominated in the canonical base currency
    fn ticker(&self, pair: &Pair) -> Result<Ticker> {
        let (n, body) = self.public("ticker", "returnTicker", &Params::new())?;
        let symbol = self.pairs.to_exchange(pair);
        let entry = n.field(&body, &symbol)?;
        Ok(Ticker {
            bid: n.decimal_field(entry, "highestBid")?,
            ask: n.decimal_field(entry, "lowestAsk")?,
            last: n.decimal_field(entry, "last")?,
            volume: n.decimal_field(entry, "quoteVolume")?,
            timestamp: Utc::now(),
        })
    }

    fn order_book(&self, pair: &Pair, params: &Params) -> Result<OrderBook> {
        let mut query = self.currency_pair(pair);
        query.extend(params);
        let (n, body) = self.public("order_book", "returnOrderBook", &query)?;
        Ok(OrderBook {
            bids: n.levels(n.field(&body, "bids")?, "rate", "amount")?,
            asks: n.levels(n.field(&body, "asks")?, "rate", "amount")?,
        })
    }

    fn trades(&self, pair: &Pair, params: &Params) -> Result<Vec<Trade>> {
        let mut query = self.currency_pair(pair);
        query.extend(params);
        let (n, body) = self.public("trades", "returnTradeHistory", &query)?;
        n.array(&body)?
            .iter()
            .map(|t| {
                Ok(Trade {
                    price: n.decimal_field(t, "rate")?,
                    volume: n.decimal_field(t, "amount")?,
                    side: n.side(n.field(t, "type")?)?,
                    timestamp: n.datetime(n.field(t, "date")?)?,
                })
            })
            .collect()
    }

    /// Available plus the amount locked in open orders
    fn balance(&self) -> Result<Balances> {
        let (n, body) = self.private("balance", "returnCompleteBalances", &Params::new())?;
        n.object(&body)?
            .iter()
            .map(|(currency, entry)| {
                let total = n.decimal_field(entry, "available")? + n.decimal_field(entry, "onOrders")?;
                Ok((canonical_currency(currency), total))
            })
            .collect()
    }

    fn orders(&self) -> Result<Vec<Order>> {
        let params = Params::new().with("currencyPair", "all");
        let (n, body) = self.private("orders", "returnOpenOrders", &params)?;
        let mut orders = Vec::new();
        for (symbol, open) in n.object(&body)? {
            for order in n.array(open)? {
                orders.push(self.order(&n, symbol, order)?);
            }
        }
        Ok(orders)
    }

    fn ledger(&self) -> Result<Vec<LedgerEntry>> {
        let params = Params::new()
            .with("start", "0")
            .with("end", Utc::now().timestamp().to_string());
        let (n, body) = self.private("ledger", "returnDepositsWithdrawals", &params)?;
        let mut entries = Self::transfers(&n, body.get("deposits"), "deposit", "txid")?;
        entries.extend(Self::transfers(
            &n,
            body.get("withdrawals"),
            "withdrawal",
            "withdrawalNumber",
        )?);
        entries.sort_by_key(|entry| entry.timestamp);
        Ok(entries)
    }

    fn add_order(&self, order: &OrderRequest) -> Result<OrderReceipt> {
        let price = require_limit(self.exchange(), order)?;
        let mut params = self
            .currency_pair(&order.pair)
            .with("rate", price.to_string())
            .with("amount", order.volume.to_string());
        params.extend(&order.extra);

        let (n, body) = self.private("add_order", order.side.as_str(), &params)?;
        Ok(OrderReceipt {
            order_id: n.text_field(&body, "orderNumber")?,
            pair: order.pair.clone(),
            side: order.side,
            order_type: OrderType::Limit,
            price: Some(price),
            volume: order.volume,
        })
    }

    fn cancel_order(&self, order_id: &str) -> Result<bool> {
        let params = Params::new().with("orderNumber", order_id);
        let (n, body) = self.private("cancel_order", "cancelOrder", &params)?;
        Ok(n.text_field(&body, "success")? == "1")
    }

    /// Account-wide fractions applied to every pair
    fn fees(&self) -> Result<Fees> {
        let (n, body) = self.private("fees", "returnFeeInfo", &Params::new())?;
        let schedule = FeeSchedule {
            maker: n.decimal_field(&body, "makerFee")?,
            taker: n.decimal_field(&body, "takerFee")?,
        };
        Ok(uniform_fees(self.supported_pairs()?, schedule))
    }
}
