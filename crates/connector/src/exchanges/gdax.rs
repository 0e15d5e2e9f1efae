//! GDAX
//!
//! REST verbs map directly onto resources; signed reads go as query strings
//! and writes as JSON bodies. Public trade prints report the maker's side,
//! so it is flipped to give the taker side.

use super::{limit_price, uniform_fees};
use crate::interface::Interface;
use crate::normalize::Normalizer;
use crate::pairs::{PairFormatter, SeparatedFormatter};
use common::{
    Balances, ExchangeId, FeeSchedule, Fees, LedgerEntry, Method, Order, OrderBook, OrderReceipt,
    OrderRequest, OrderType, Pair, Params, Result, Side, Ticker, Trade, canonical_currency,
};
use rest::{ApiClient, RawResponse};
use rust_decimal::Decimal;
use serde_json::Value;

/// GDAX interface
#[derive(Debug)]
pub struct Gdax {
    client: ApiClient,
    pairs: SeparatedFormatter,
}

impl Gdax {
    /// Wrap a GDAX client
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self {
            client,
            pairs: SeparatedFormatter::base_first(ExchangeId::Gdax, '-'),
        }
    }

    fn checked(n: &Normalizer, endpoint: &str, response: &RawResponse) -> Result<Value> {
        let body = n.json(response)?;
        match body.get("message").and_then(Value::as_str) {
            Some(message) => Err(n.api_error(endpoint, response.status, message.to_string())),
            None => Ok(body),
        }
    }

    fn call(
        &self,
        operation: &'static str,
        method: Method,
        endpoint: &str,
        params: &Params,
        authenticate: bool,
    ) -> Result<(Normalizer, Value)> {
        let n = Normalizer::new(ExchangeId::Gdax, operation);
        let response = self.client.query(method, endpoint, params, authenticate)?;
        let body = Self::checked(&n, endpoint, &response)?;
        Ok((n, body))
    }

    fn get(&self, operation: &'static str, endpoint: &str, params: &Params) -> Result<(Normalizer, Value)> {
        self.call(operation, Method::Get, endpoint, params, false)
    }

    fn signed_get(&self, operation: &'static str, endpoint: &str) -> Result<(Normalizer, Value)> {
        self.call(operation, Method::Get, endpoint, &Params::new(), true)
    }

    fn product(&self, pair: &Pair) -> String {
        self.pairs.to_exchange(pair)
    }

    fn order(&self, n: &Normalizer, value: &Value) -> Result<Order> {
        let symbol = n.text_field(value, "product_id")?;
        let order_type = if n.text_field(value, "type")? == "market" {
            OrderType::Market
        } else {
            OrderType::Limit
        };
        Ok(Order {
            id: n.text_field(value, "id")?,
            pair: self.pairs.to_canonical(&symbol).ok(),
            symbol,
            side: n.side(n.field(value, "side")?)?,
            order_type,
            price: n.optional_decimal(value, "price")?,
            volume: n.optional_decimal(value, "size")?.unwrap_or_default(),
            filled: n.optional_decimal(value, "filled_size")?.unwrap_or_default(),
            opened_at: value.get("created_at").map(|t| n.datetime(t)).transpose()?,
        })
    }

    const fn taker_side(maker: Side) -> Side {
        match maker {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

impl Interface for Gdax {
    fn exchange(&self) -> ExchangeId {
        ExchangeId::Gdax
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
        self.client.query(Method::Get, endpoint, params, true)
    }

    fn supported_pairs(&self) -> Result<Vec<Pair>> {
        let (n, body) = self.get("supported_pairs", "products", &Params::new())?;
        Ok(n.array(&body)?
            .iter()
            .filter_map(|product| product.get("id").and_then(Value::as_str))
            .filter_map(|id| self.pairs.to_canonical(id).ok())
            .collect())
    }

    fn ticker(&self, pair: &Pair) -> Result<Ticker> {
        let endpoint = format!("products/{}/ticker", self.product(pair));
        let (n, body) = self.get("ticker", &endpoint, &Params::new())?;
        Ok(Ticker {
            bid: n.decimal_field(&body, "bid")?,
            ask: n.decimal_field(&body, "ask")?,
            last: n.decimal_field(&body, "price")?,
            volume: n.decimal_field(&body, "volume")?,
            timestamp: n.datetime(n.field(&body, "time")?)?,
        })
    }

    /// Level 2 (aggregated) unless `params` asks otherwise
    fn order_book(&self, pair: &Pair, params: &Params) -> Result<OrderBook> {
        let endpoint = format!("products/{}/book", self.product(pair));
        let mut query = params.clone();
        if query.get("level").is_none() {
            query.insert("level", "2");
        }
        let (n, body) = self.get("order_book", &endpoint, &query)?;
        Ok(OrderBook {
            bids: n.levels(n.field(&body, "bids")?, "price", "size")?,
            asks: n.levels(n.field(&body, "asks")?, "price", "size")?,
        })
    }

    fn trades(&self, pair: &Pair, params: &Params) -> Result<Vec<Trade>> {
        let endpoint = format!("products/{}/trades", self.product(pair));
        let (n, body) = self.get("trades", &endpoint, params)?;
        n.array(&body)?
            .iter()
            .map(|t| {
                Ok(Trade {
                    price: n.decimal_field(t, "price")?,
                    volume: n.decimal_field(t, "size")?,
                    side: Self::taker_side(n.side(n.field(t, "side")?)?),
                    timestamp: n.datetime(n.field(t, "time")?)?,
                })
            })
            .collect()
    }

    fn balance(&self) -> Result<Balances> {
        let (n, body) = self.signed_get("balance", "accounts")?;
        let mut balances = Balances::new();
        for account in n.array(&body)? {
            let currency = canonical_currency(&n.text_field(account, "currency")?);
            *balances.entry(currency).or_default() += n.decimal_field(account, "balance")?;
        }
        Ok(balances)
    }

    fn orders(&self) -> Result<Vec<Order>> {
        let (n, body) = self.signed_get("orders", "orders")?;
        n.array(&body)?.iter().map(|o| self.order(&n, o)).collect()
    }

    fn order_status(&self, order_id: &str) -> Result<Order> {
        let (n, body) = self.signed_get("order_status", &format!("orders/{order_id}"))?;
        self.order(&n, &body)
    }

    /// One ledger call per account
    fn ledger(&self) -> Result<Vec<LedgerEntry>> {
        let (n, accounts) = self.signed_get("ledger", "accounts")?;
        let mut entries = Vec::new();
        for account in n.array(&accounts)? {
            let id = n.text_field(account, "id")?;
            let currency = canonical_currency(&n.text_field(account, "currency")?);
            let (n, movements) = self.signed_get("ledger", &format!("accounts/{id}/ledger"))?;
            for movement in n.array(&movements)? {
                entries.push(LedgerEntry {
                    id: n.text_field(movement, "id")?,
                    currency: currency.clone(),
                    amount: n.decimal_field(movement, "amount")?,
                    fee: Decimal::ZERO,
                    kind: n.text_field(movement, "type")?,
                    timestamp: n.datetime(n.field(movement, "created_at")?)?,
                });
            }
        }
        entries.sort_by_key(|entry| entry.timestamp);
        Ok(entries)
    }

    fn add_order(&self, order: &OrderRequest) -> Result<OrderReceipt> {
        let price = limit_price(self.exchange(), order)?;
        let mut params = Params::new()
            .with("product_id", self.product(&order.pair))
            .with("side", order.side.as_str())
            .with("type", order.order_type.as_str())
            .with("size", order.volume.to_string());
        if let Some(price) = price {
            params.insert("price", price.to_string());
        }
        params.extend(&order.extra);

        let (n, body) = self.call("add_order", Method::Post, "orders", &params, true)?;
        Ok(OrderReceipt {
            order_id: n.text_field(&body, "id")?,
            pair: order.pair.clone(),
            side: order.side,
            order_type: order.order_type,
            price,
            volume: order.volume,
        })
    }

    /// GDAX answers a cancellation with the list of cancelled ids
    fn cancel_order(&self, order_id: &str) -> Result<bool> {
        let endpoint = format!("orders/{order_id}");
        let (n, body) = self.call("cancel_order", Method::Delete, &endpoint, &Params::new(), true)?;
        match &body {
            Value::Array(ids) => Ok(ids.iter().any(|id| id.as_str() == Some(order_id))),
            Value::String(id) => Ok(id == order_id),
            other => Err(n.error(format!("unexpected cancel response {other}"))),
        }
    }

    /// Account-wide rates applied to every product
    fn fees(&self) -> Result<Fees> {
        let (n, body) = self.signed_get("fees", "fees")?;
        let schedule = FeeSchedule {
            maker: n.decimal_field(&body, "maker_fee_rate")?,
            taker: n.decimal_field(&body, "taker_fee_rate")?,
        };
        Ok(uniform_fees(self.supported_pairs()?, schedule))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trade_side_is_taker_side() {
        assert_eq!(Gdax::taker_side(Side::Buy), Side::Sell);
        assert_eq!(Gdax::taker_side(Side::Sell), Side::Buy);
    }

    #[test]
    fn test_message_body_is_an_error() {
        let n = Normalizer::new(ExchangeId::Gdax, "orders");
        let response = RawResponse::new(200, r#"{"message":"invalid signature"}"#);
        assert!(Gdax::checked(&n, "orders", &response).is_err());

        let listing = RawResponse::new(200, r#"[{"id":"BTC-USD"}]"#);
        assert!(Gdax::checked(&n, "products", &listing).is_ok());
    }
}
