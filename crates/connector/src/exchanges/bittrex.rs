//! Bittrex (v1.1)
//!
//! Every call is a GET and every response is `{"success", "message",
//! "result"}`. Markets are named quote-first (`BTC-LTC`). Only limit orders
//! exist and the API publishes no fee schedule.

use super::require_limit;
use crate::interface::Interface;
use crate::normalize::Normalizer;
use crate::pairs::{PairFormatter, SeparatedFormatter};
use common::{
    Balances, ExchangeId, Fees, LedgerEntry, Method, Order, OrderBook, OrderReceipt, OrderRequest,
    OrderType, Pair, Params, Result, Side, Ticker, Trade, canonical_currency,
};
use rest::{ApiClient, RawResponse};
use serde_json::Value;

/// Bittrex interface
#[derive(Debug)]
pub struct Bittrex {
    client: ApiClient,
    pairs: SeparatedFormatter,
}

impl Bittrex {
    /// Wrap a Bittrex client
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self {
            client,
            pairs: SeparatedFormatter::quote_first(ExchangeId::Bittrex, '-'),
        }
    }

    fn result(n: &Normalizer, endpoint: &str, response: &RawResponse) -> Result<Value> {
        let mut body = n.json(response)?;
        if body.get("success").and_then(Value::as_bool) != Some(true) {
            let message = body
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("request failed")
                .to_string();
            return Err(n.api_error(endpoint, response.status, message));
        }
        Ok(body.get_mut("result").map(Value::take).unwrap_or(Value::Null))
    }

    fn call(&self, operation: &'static str, endpoint: &str, params: &Params, private: bool) -> Result<(Normalizer, Value)> {
        let n = Normalizer::new(ExchangeId::Bittrex, operation);
        let response = if private {
            self.private_query(endpoint, params)?
        } else {
            self.public_query(endpoint, params)?
        };
        let result = Self::result(&n, endpoint, &response)?;
        Ok((n, result))
    }

    fn market(&self, pair: &Pair) -> Params {
        Params::new().with("market", self.pairs.to_exchange(pair))
    }

    /// `LIMIT_BUY` / `LIMIT_SELL`
    fn order_side(n: &Normalizer, kind: &str) -> Result<Side> {
        if kind.ends_with("BUY") {
            Ok(Side::Buy)
        } else if kind.ends_with("SELL") {
            Ok(Side::Sell)
        } else {
            Err(n.error(format!("unknown order type '{kind}'")))
        }
    }

    /// Open orders say `OrderType`, single lookups say `Type`
    fn order(&self, n: &Normalizer, value: &Value) -> Result<Order> {
        let symbol = n.text_field(value, "Exchange")?;
        let kind = value
            .get("OrderType")
            .or_else(|| value.get("Type"))
            .ok_or_else(|| n.error("missing field 'OrderType'"))?;
        let volume = n.decimal_field(value, "Quantity")?;
        Ok(Order {
            id: n.text_field(value, "OrderUuid")?,
            pair: self.pairs.to_canonical(&symbol).ok(),
            symbol,
            side: Self::order_side(n, &n.text(kind)?)?,
            order_type: OrderType::Limit,
            price: n.optional_decimal(value, "Limit")?,
            filled: volume - n.decimal_field(value, "QuantityRemaining")?,
            volume,
            opened_at: value.get("Opened").map(|t| n.datetime(t)).transpose()?,
        })
    }

    fn transfers(&self, endpoint: &str, kind: &str, id_key: &str, time_key: &str) -> Result<Vec<LedgerEntry>> {
        let (n, result) = self.call("ledger", endpoint, &Params::new(), true)?;
        n.array(&result)?
            .iter()
            .map(|item| {
                let amount = n.decimal_field(item, "Amount")?;
                Ok(LedgerEntry {
                    id: n.text_field(item, id_key)?,
                    currency: canonical_currency(&n.text_field(item, "Currency")?),
                    amount: if kind == "withdrawal" { -amount } else { amount },
                    fee: n.optional_decimal(item, "TxCost")?.unwrap_or_default(),
                    kind: kind.to_string(),
                    timestamp: n.datetime(n.field(item, time_key)?)?,
                })
            })
            .collect()
    }
}

impl Interface for Bittrex {
    fn exchange(&self) -> ExchangeId {
        ExchangeId::Bittrex
    }

    fn client(&self) -> &ApiClient {
        &self.client
    }

    fn pairs(&self) -> &dyn PairFormatter {
        &self.pairs
    }

    fn public_query(&self, endpoint: &str, params: &Params) -> Result<RawResponse> {
        self.client
            .query(Method::Get, &format!("public/{endpoint}"), params, false)
    }

    /// `endpoint` carries its group (`account/...` or `market/...`)
    fn private_query(&self, endpoint: &str, params: &Params) -> Result<RawResponse> {
        self.client.query(Method::Get, endpoint, params, true)
    }

    fn supported_pairs(&self) -> Result<Vec<Pair>> {
        let (n, result) = self.call("supported_pairs", "getmarkets", &Params::new(), false)?;
        Ok(n.array(&result)?
            .iter()
            .filter_map(|market| market.get("MarketName").and_then(Value::as_str))
            .filter_map(|name| self.pairs.to_canonical(name).ok())
            .collect())
    }

    fn ticker(&self, pair: &Pair) -> Result<Ticker> {
        let (n, result) = self.call("ticker", "getmarketsummary", &self.market(pair), false)?;
        let summary = n.index(&result, 0)?;
        Ok(Ticker {
            bid: n.decimal_field(summary, "Bid")?,
            ask: n.decimal_field(summary, "Ask")?,
            last: n.decimal_field(summary, "Last")?,
            volume: n.decimal_field(summary, "Volume")?,
            timestamp: n.datetime(n.field(summary, "TimeStamp")?)?,
        })
    }

    fn order_book(&self, pair: &Pair, params: &Params) -> Result<OrderBook> {
        let mut query = self.market(pair).with("type", "both");
        query.extend(params);
        let (n, result) = self.call("order_book", "getorderbook", &query, false)?;
        Ok(OrderBook {
            bids: n.levels(n.field(&result, "buy")?, "Rate", "Quantity")?,
            asks: n.levels(n.field(&result, "sell")?, "Rate", "Quantity")?,
        })
    }

    fn trades(&self, pair: &Pair, params: &Params) -> Result<Vec<Trade>> {
        let mut query = self.market(pair);
        query.extend(params);
        let (n, result) = self.call("trades", "getmarkethistory", &query, false)?;
        n.array(&result)?
            .iter()
            .map(|t| {
                Ok(Trade {
                    price: n.decimal_field(t, "Price")?,
                    volume: n.decimal_field(t, "Quantity")?,
                    side: n.side(n.field(t, "OrderType")?)?,
                    timestamp: n.datetime(n.field(t, "TimeStamp")?)?,
                })
            })
            .collect()
    }

    fn balance(&self) -> Result<Balances> {
        let (n, result) = self.call("balance", "account/getbalances", &Params::new(), true)?;
        n.array(&result)?
            .iter()
            .map(|item| {
                let balance = n.optional_decimal(item, "Balance")?.unwrap_or_default();
                Ok((canonical_currency(&n.text_field(item, "Currency")?), balance))
            })
            .collect()
    }

    fn orders(&self) -> Result<Vec<Order>> {
        let (n, result) = self.call("orders", "market/getopenorders", &Params::new(), true)?;
        n.array(&result)?.iter().map(|o| self.order(&n, o)).collect()
    }

    fn order_status(&self, order_id: &str) -> Result<Order> {
        let params = Params::new().with("uuid", order_id);
        let (n, result) = self.call("order_status", "account/getorder", &params, true)?;
        self.order(&n, &result)
    }

    /// Deposits and withdrawals, two calls
    fn ledger(&self) -> Result<Vec<LedgerEntry>> {
        let mut entries =
            self.transfers("account/getdeposithistory", "deposit", "TxId", "LastUpdated")?;
        entries.extend(self.transfers(
            "account/getwithdrawalhistory",
            "withdrawal",
            "PaymentUuid",
            "Opened",
        )?);
        entries.sort_by_key(|entry| entry.timestamp);
        Ok(entries)
    }

    fn add_order(&self, order: &OrderRequest) -> Result<OrderReceipt> {
        let price = require_limit(self.exchange(), order)?;
        let endpoint = format!("market/{}limit", order.side.as_str());
        let mut params = self
            .market(&order.pair)
            .with("quantity", order.volume.to_string())
            .with("rate", price.to_string());
        params.extend(&order.extra);

        let (n, result) = self.call("add_order", &endpoint, &params, true)?;
        Ok(OrderReceipt {
            order_id: n.text_field(&result, "uuid")?,
            pair: order.pair.clone(),
            side: order.side,
            order_type: OrderType::Limit,
            price: Some(price),
            volume: order.volume,
        })
    }

    /// A successful envelope is the confirmation; the result is empty
    fn cancel_order(&self, order_id: &str) -> Result<bool> {
        let params = Params::new().with("uuid", order_id);
        self.call("cancel_order", "market/cancel", &params, true)?;
        Ok(true)
    }

    fn fees(&self) -> Result<Fees> {
        Err(self.unsupported("fees"))
    }
}
