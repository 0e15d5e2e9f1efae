//! Bitfinex (v1)
//!
//! Signed calls are POSTs whose parameters travel inside the signed JSON
//! payload. Order ids must be sent as JSON numbers, so they are inserted as
//! raw values. Failures carry `{"message": ...}`.

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
use std::collections::BTreeSet;

// Bitfinex requires a price on market orders and ignores it
const MARKET_ORDER_PRICE: &str = "1";

/// Bitfinex interface
#[derive(Debug)]
pub struct Bitfinex {
    client: ApiClient,
    pairs: ConcatenatedFormatter,
}

impl Bitfinex {
    /// Wrap a Bitfinex client
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self {
            client,
            pairs: ConcatenatedFormatter::lower(ExchangeId::Bitfinex),
        }
    }

    fn checked(n: &Normalizer, endpoint: &str, response: &RawResponse) -> Result<Value> {
        let body = n.json(response)?;
        match body.get("message") {
            Some(message) => {
                let text = n.text(message).unwrap_or_else(|_| message.to_string());
                Err(n.api_error(endpoint, response.status, text))
            }
            None => Ok(body),
        }
    }

    fn public(&self, operation: &'static str, endpoint: &str, params: &Params) -> Result<(Normalizer, Value)> {
        let n = Normalizer::new(ExchangeId::Bitfinex, operation);
        let response = self.public_query(endpoint, params)?;
        let body = Self::checked(&n, endpoint, &response)?;
        Ok((n, body))
    }

    fn private(&self, operation: &'static str, endpoint: &str, params: &Params) -> Result<(Normalizer, Value)> {
        let n = Normalizer::new(ExchangeId::Bitfinex, operation);
        let response = self.private_query(endpoint, params)?;
        let body = Self::checked(&n, endpoint, &response)?;
        Ok((n, body))
    }

    fn order(&self, n: &Normalizer, value: &Value) -> Result<Order> {
        let symbol = n.text_field(value, "symbol")?;
        let order_type = if n.text_field(value, "type")?.contains("market") {
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
            volume: n.decimal_field(value, "original_amount")?,
            filled: n.decimal_field(value, "executed_amount")?,
            opened_at: value.get("timestamp").map(|t| n.seconds(t)).transpose()?,
        })
    }

    /// Currencies held in any wallet
    fn currencies(&self) -> Result<BTreeSet<String>> {
        let (n, body) = self.private("ledger", "balances", &Params::new())?;
        n.array(&body)?
            .iter()
            .map(|wallet| n.text_field(wallet, "currency"))
            .collect()
    }

    /// Fee group (`pairs` is the base currency) matching `pair`
    fn fee_group(n: &Normalizer, info: &Value, pair: &Pair) -> Result<FeeSchedule> {
        let group = info
            .get("fees")
            .and_then(Value::as_array)
            .and_then(|groups| {
                groups.iter().find(|group| {
                    group
                        .get("pairs")
                        .and_then(Value::as_str)
                        .is_some_and(|base| canonical_currency(base) == pair.base())
                })
            })
            .unwrap_or(info);
        Ok(FeeSchedule {
            maker: percent_to_fraction(n.decimal_field(group, "maker_fees")?),
            taker: percent_to_fraction(n.decimal_field(group, "taker_fees")?),
        })
    }
}

impl Interface for Bitfinex {
    fn exchange(&self) -> ExchangeId {
        ExchangeId::Bitfinex
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

    fn ticker(&self, pair: &Pair) -> Result<Ticker> {
        let endpoint = format!("pubticker/{}", self.pairs.to_exchange(pair));
        let (n, body) = self.public("ticker", &endpoint, &Params::new())?;
        Ok(Ticker {
            bid: n.decimal_field(&body, "bid")?,
            ask: n.decimal_field(&body, "ask")?,
            last: n.decimal_field(&body, "last_price")?,
            volume: n.decimal_field(&body, "volume")?,
            timestamp: n.seconds(n.field(&body, "timestamp")?)?,
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
                    timestamp: n.seconds(n.field(t, "timestamp")?)?,
                })
            })
            .collect()
    }

    /// Sum over the exchange, trading and deposit wallets
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

    /// Balance history of every currency held, one call per currency
    fn ledger(&self) -> Result<Vec<LedgerEntry>> {
        let mut entries = Vec::new();
        for currency in self.currencies()? {
            let params = Params::new().with("currency", currency.to_uppercase());
            let (n, body) = self.private("ledger", "history", &params)?;
            for item in n.array(&body)? {
                let timestamp = n.text_field(item, "timestamp")?;
                entries.push(LedgerEntry {
                    id: format!("{}-{timestamp}", currency.to_uppercase()),
                    currency: canonical_currency(&n.text_field(item, "currency")?),
                    amount: n.decimal_field(item, "amount")?,
                    fee: Decimal::ZERO,
                    kind: n.text_field(item, "description")?,
                    timestamp: n.seconds(n.field(item, "timestamp")?)?,
                });
            }
        }
        entries.sort_by_key(|entry| entry.timestamp);
        Ok(entries)
    }

    fn add_order(&self, order: &OrderRequest) -> Result<OrderReceipt> {
        let price = limit_price(self.exchange(), order)?;
        let mut params = Params::new()
            .with("symbol", self.pairs.to_exchange(&order.pair))
            .with("amount", order.volume.to_string())
            .with(
                "price",
                price.map_or_else(|| MARKET_ORDER_PRICE.to_string(), |p| p.to_string()),
            )
            .with("exchange", "bitfinex")
            .with("side", order.side.as_str())
            .with("type", format!("exchange {}", order.order_type.as_str()));
        params.extend(&order.extra);

        let (n, body) = self.private("add_order", "order/new", &params)?;
        Ok(OrderReceipt {
            order_id: n.text_field(&body, "order_id")?,
            pair: order.pair.clone(),
            side: order.side,
            order_type: order.order_type,
            price,
            volume: order.volume,
        })
    }

    fn cancel_order(&self, order_id: &str) -> Result<bool> {
        let params = Params::new().with_raw("order_id", order_id);
        let (n, body) = self.private("cancel_order", "order/cancel", &params)?;
        Ok(n.text_field(&body, "id")? == order_id)
    }

    /// Fees per base-currency group, applied to every listed symbol
    fn fees(&self) -> Result<Fees> {
        let pairs = self.supported_pairs()?;
        let (n, body) = self.private("fees", "account_infos", &Params::new())?;
        let info = n.index(&body, 0)?;
        pairs
            .into_iter()
            .map(|pair| Ok((pair.clone(), Self::fee_group(&n, info, &pair)?)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_fee_group_falls_back_to_account_level() -> Result<()> {
        let n = Normalizer::new(ExchangeId::Bitfinex, "fees");
        let info = json!({
            "maker_fees": "0.1",
            "taker_fees": "0.2",
            "fees": [{"pairs": "LTC", "maker_fees": "0.08", "taker_fees": "0.18"}]
        });
        let ltc: Pair = "LTC/USD".parse()?;
        let eth: Pair = "ETH/USD".parse()?;

        let grouped = Bitfinex::fee_group(&n, &info, &ltc)?;
        assert_eq!(grouped.maker, dec!(0.0008));
        assert_eq!(grouped.taker, dec!(0.0018));

        let fallback = Bitfinex::fee_group(&n, &info, &eth)?;
        assert_eq!(fallback.maker, dec!(0.001));
        assert_eq!(fallback.taker, dec!(0.002));
        Ok(())
    }

    #[test]
    fn test_message_body_is_an_error() {
        let n = Normalizer::new(ExchangeId::Bitfinex, "balance");
        let response = RawResponse::new(200, r#"{"message":"Nonce is too small."}"#);
        let err = Bitfinex::checked(&n, "balances", &response).expect_err("message means failure");
        assert!(err.to_string().contains("Nonce is too small."));
    }
}
