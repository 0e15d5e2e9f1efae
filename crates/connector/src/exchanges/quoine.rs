//! Quoine
//!
//! Market data is addressed by numeric product id, so pair-based calls first
//! look the id up in the product listing (two calls). Order placement nests
//! its fields under an `order` object. No ledger endpoint is offered.

use super::limit_price;
use crate::interface::Interface;
use crate::normalize::Normalizer;
use crate::pairs::{ConcatenatedFormatter, PairFormatter};
use chrono::Utc;
use common::{
    Balances, ExchangeId, FeeSchedule, Fees, LedgerEntry, Method, Order, OrderBook, OrderReceipt,
    OrderRequest, OrderType, Pair, Params, Result, Ticker, Trade, canonical_currency,
};
use rest::{ApiClient, RawResponse};
use serde_json::{Value, json};

/// Quoine interface
#[derive(Debug)]
pub struct Quoine {
    client: ApiClient,
    pairs: ConcatenatedFormatter,
}

impl Quoine {
    /// Wrap a Quoine client
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self {
            client,
            pairs: ConcatenatedFormatter::upper(ExchangeId::Quoine),
        }
    }

    fn checked(n: &Normalizer, endpoint: &str, response: &RawResponse) -> Result<Value> {
        let body = n.json(response)?;
        let failure = body
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| body.get("errors").map(Value::to_string));
        match failure {
            Some(message) => Err(n.api_error(endpoint, response.status, message)),
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
        let n = Normalizer::new(ExchangeId::Quoine, operation);
        let response = self.client.query(method, endpoint, params, authenticate)?;
        let body = Self::checked(&n, endpoint, &response)?;
        Ok((n, body))
    }

    fn products(&self, operation: &'static str) -> Result<(Normalizer, Value)> {
        self.call(operation, Method::Get, "products", &Params::new(), false)
    }

    /// Product listing entry for `pair`
    fn product(&self, operation: &'static str, pair: &Pair) -> Result<(Normalizer, Value)> {
        let (n, mut products) = self.products(operation)?;
        let code = self.pairs.to_exchange(pair);
        let index = n
            .array(&products)?
            .iter()
            .position(|p| p.get("currency_pair_code").and_then(Value::as_str) == Some(code.as_str()));
        let product = index
            .and_then(|index| products.get_mut(index))
            .map(Value::take)
            .ok_or_else(|| n.error(format!("no product for {code}")))?;
        Ok((n, product))
    }

    fn product_id(&self, operation: &'static str, pair: &Pair) -> Result<String> {
        let (n, product) = self.product(operation, pair)?;
        n.text_field(&product, "id")
    }

    fn order(&self, n: &Normalizer, value: &Value) -> Result<Order> {
        let symbol = n.text_field(value, "currency_pair_code")?;
        let order_type = if n.text_field(value, "order_type")? == "market" {
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
            price: match order_type {
                OrderType::Limit => n.optional_decimal(value, "price")?,
                OrderType::Market => None,
            },
            volume: n.decimal_field(value, "quantity")?,
            filled: n.decimal_field(value, "filled_quantity")?,
            opened_at: value.get("created_at").map(|t| n.seconds(t)).transpose()?,
        })
    }
}

impl Interface for Quoine {
    fn exchange(&self) -> ExchangeId {
        ExchangeId::Quoine
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
        let (n, products) = self.products("supported_pairs")?;
        Ok(n.array(&products)?
            .iter()
            .filter_map(|p| p.get("currency_pair_code").and_then(Value::as_str))
            .filter_map(|code| self.pairs.to_canonical(code).ok())
            .collect())
    }

    /// Taken from the product listing entry
    fn ticker(&self, pair: &Pair) -> Result<Ticker> {
        let (n, product) = self.product("ticker", pair)?;
        Ok(Ticker {
            bid: n.decimal_field(&product, "market_bid")?,
            ask: n.decimal_field(&product, "market_ask")?,
            last: n.decimal_field(&product, "last_traded_price")?,
            volume: n.decimal_field(&product, "volume_24h")?,
            timestamp: Utc::now(),
        })
    }

    fn order_book(&self, pair: &Pair, params: &Params) -> Result<OrderBook> {
        let id = self.product_id("order_book", pair)?;
        let endpoint = format!("products/{id}/price_levels");
        let (n, body) = self.call("order_book", Method::Get, &endpoint, params, false)?;
        Ok(OrderBook {
            bids: n.levels(n.field(&body, "buy_price_levels")?, "price", "quantity")?,
            asks: n.levels(n.field(&body, "sell_price_levels")?, "price", "quantity")?,
        })
    }

    fn trades(&self, pair: &Pair, params: &Params) -> Result<Vec<Trade>> {
        let mut query = Params::new().with("product_id", self.product_id("trades", pair)?);
        query.extend(params);
        let (n, body) = self.call("trades", Method::Get, "executions", &query, false)?;
        n.array(n.field(&body, "models")?)?
            .iter()
            .map(|t| {
                Ok(Trade {
                    price: n.decimal_field(t, "price")?,
                    volume: n.decimal_field(t, "quantity")?,
                    side: n.side(n.field(t, "taker_side")?)?,
                    timestamp: n.seconds(n.field(t, "created_at")?)?,
                })
            })
            .collect()
    }

    fn balance(&self) -> Result<Balances> {
        let (n, body) = self.call("balance", Method::Get, "accounts/balance", &Params::new(), true)?;
        n.array(&body)?
            .iter()
            .map(|account| {
                Ok((
                    canonical_currency(&n.text_field(account, "currency")?),
                    n.decimal_field(account, "balance")?,
                ))
            })
            .collect()
    }

    fn orders(&self) -> Result<Vec<Order>> {
        let params = Params::new().with("status", "live");
        let (n, body) = self.call("orders", Method::Get, "orders", &params, true)?;
        n.array(n.field(&body, "models")?)?
            .iter()
            .map(|o| self.order(&n, o))
            .collect()
    }

    fn order_status(&self, order_id: &str) -> Result<Order> {
        let endpoint = format!("orders/{order_id}");
        let (n, body) = self.call("order_status", Method::Get, &endpoint, &Params::new(), true)?;
        self.order(&n, &body)
    }

    fn ledger(&self) -> Result<Vec<LedgerEntry>> {
        Err(self.unsupported("ledger"))
    }

    fn add_order(&self, order: &OrderRequest) -> Result<OrderReceipt> {
        let price = limit_price(self.exchange(), order)?;
        let (n, product) = self.product("add_order", &order.pair)?;
        let product_id = n.field(&product, "id")?;
        let mut fields = json!({
            "order_type": order.order_type.as_str(),
            "product_id": product_id,
            "side": order.side.as_str(),
            "quantity": order.volume.to_string(),
        });
        if let (Some(price), Some(object)) = (price, fields.as_object_mut()) {
            object.insert("price".to_string(), Value::String(price.to_string()));
        }
        let mut params = Params::new().with_raw("order", fields.to_string());
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

    fn cancel_order(&self, order_id: &str) -> Result<bool> {
        let endpoint = format!("orders/{order_id}/cancel");
        let (n, body) = self.call("cancel_order", Method::Put, &endpoint, &Params::new(), true)?;
        Ok(n.text_field(&body, "status")? == "cancelled")
    }

    /// Per-product rates from the listing, already fractions
    fn fees(&self) -> Result<Fees> {
        let (n, products) = self.products("fees")?;
        let mut fees = Fees::new();
        for product in n.array(&products)? {
            let Some(Ok(pair)) = product
                .get("currency_pair_code")
                .and_then(Value::as_str)
                .map(|code| self.pairs.to_canonical(code))
            else {
                continue;
            };
            fees.insert(
                pair,
                FeeSchedule {
                    maker: n.decimal_field(product, "maker_fee")?,
                    taker: n.decimal_field(product, "taker_fee")?,
                },
            );
        }
        Ok(fees)
    }
}
