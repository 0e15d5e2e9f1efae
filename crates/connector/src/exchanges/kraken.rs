//! Kraken
//!
//! Every response is wrapped in `{"error": [...], "result": ...}`; a
//! non-empty error list is an exchange error even with HTTP 200. Results
//! keyed by pair use Kraken's own symbol, which may differ from the one
//! requested (`XBTEUR` comes back as `XXBTZEUR`).

use super::limit_price;
use crate::interface::Interface;
use crate::normalize::{Normalizer, percent_to_fraction};
use crate::pairs::{KrakenFormatter, PairFormatter, kraken_asset_to_canonical};
use chrono::Utc;
use common::{
    Balances, ExchangeId, FeeSchedule, Fees, LedgerEntry, Method, Order, OrderBook, OrderReceipt,
    OrderRequest, OrderType, Pair, Params, Result, Ticker, Trade,
};
use rest::{ApiClient, RawResponse};
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::warn;

/// Kraken spot interface
#[derive(Debug)]
pub struct Kraken {
    client: ApiClient,
    pairs: KrakenFormatter,
}

impl Kraken {
    /// Wrap a Kraken client
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self {
            client,
            pairs: KrakenFormatter,
        }
    }

    /// `result` member of a response, after checking the error list
    fn result(&self, n: &Normalizer, endpoint: &str, response: &RawResponse) -> Result<Value> {
        let mut body = n.json(response)?;
        let errors: Vec<String> = body
            .get("error")
            .and_then(Value::as_array)
            .map(|errors| errors.iter().filter_map(|e| e.as_str().map(str::to_string)).collect())
            .unwrap_or_default();
        if !errors.is_empty() {
            warn!("kraken: {} reported {:?}", endpoint, errors);
            return Err(n.api_error(endpoint, response.status, errors.join("; ")));
        }
        body.get_mut("result")
            .map(Value::take)
            .ok_or_else(|| n.error("missing field 'result'"))
    }

    fn public(&self, operation: &'static str, endpoint: &str, params: &Params) -> Result<(Normalizer, Value)> {
        let n = Normalizer::new(ExchangeId::Kraken, operation);
        let response = self.public_query(endpoint, params)?;
        let result = self.result(&n, endpoint, &response)?;
        Ok((n, result))
    }

    fn private(&self, operation: &'static str, endpoint: &str, params: &Params) -> Result<(Normalizer, Value)> {
        let n = Normalizer::new(ExchangeId::Kraken, operation);
        let response = self.private_query(endpoint, params)?;
        let result = self.result(&n, endpoint, &response)?;
        Ok((n, result))
    }

    /// The single pair-keyed entry of a result, ignoring the `last` cursor
    fn pair_entry<'a>(n: &Normalizer, result: &'a Value) -> Result<&'a Value> {
        n.object(result)?
            .iter()
            .find(|(key, _)| key.as_str() != "last")
            .map(|(_, value)| value)
            .ok_or_else(|| n.error("result holds no pair entry"))
    }

    fn order(&self, n: &Normalizer, id: &str, value: &Value) -> Result<Order> {
        let descr = n.field(value, "descr")?;
        let symbol = n.text_field(descr, "pair")?;
        let order_type = if n.text_field(descr, "ordertype")? == "market" {
            OrderType::Market
        } else {
            OrderType::Limit
        };
        let price = n
            .optional_decimal(descr, "price")?
            .filter(|price| !price.is_zero() && order_type == OrderType::Limit);
        Ok(Order {
            id: id.to_string(),
            pair: self.pairs.to_canonical(&symbol).ok(),
            symbol,
            side: n.side(n.field(descr, "type")?)?,
            order_type,
            price,
            volume: n.decimal_field(value, "vol")?,
            filled: n.decimal_field(value, "vol_exec")?,
            opened_at: value.get("opentm").map(|t| n.seconds(t)).transpose()?,
        })
    }
}

impl Interface for Kraken {
    fn exchange(&self) -> ExchangeId {
        ExchangeId::Kraken
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

    fn private_query(&self, endpoint: &str, params: &Params) -> Result<RawResponse> {
        self.client
            .query(Method::Post, &format!("private/{endpoint}"), params, true)
    }

    fn supported_pairs(&self) -> Result<Vec<Pair>> {
        let (n, result) = self.public("supported_pairs", "AssetPairs", &Params::new())?;
        Ok(n.object(&result)?
            .iter()
            .filter(|(name, _)| !name.ends_with(".d"))
            .filter_map(|(_, info)| {
                let base = info.get("base")?.as_str()?;
                let quote = info.get("quote")?.as_str()?;
                Pair::new(&kraken_asset_to_canonical(base), &kraken_asset_to_canonical(quote)).ok()
            })
            .collect())
    }

    fn ticker(&self, pair: &Pair) -> Result<Ticker> {
        let params = Params::new().with("pair", self.pairs.to_exchange(pair));
        let (n, result) = self.public("ticker", "Ticker", &params)?;
        let entry = Self::pair_entry(&n, &result)?;
        Ok(Ticker {
            bid: n.decimal(n.index(n.field(entry, "b")?, 0)?)?,
            ask: n.decimal(n.index(n.field(entry, "a")?, 0)?)?,
            last: n.decimal(n.index(n.field(entry, "c")?, 0)?)?,
            volume: n.decimal(n.index(n.field(entry, "v")?, 1)?)?,
            timestamp: Utc::now(),
        })
    }

    fn order_book(&self, pair: &Pair, params: &Params) -> Result<OrderBook> {
        let mut query = Params::new().with("pair", self.pairs.to_exchange(pair));
        query.extend(params);
        let (n, result) = self.public("order_book", "Depth", &query)?;
        let entry = Self::pair_entry(&n, &result)?;
        Ok(OrderBook {
            bids: n.levels(n.field(entry, "bids")?, "price", "volume")?,
            asks: n.levels(n.field(entry, "asks")?, "price", "volume")?,
        })
    }

    fn trades(&self, pair: &Pair, params: &Params) -> Result<Vec<Trade>> {
        let mut query = Params::new().with("pair", self.pairs.to_exchange(pair));
        query.extend(params);
        let (n, result) = self.public("trades", "Trades", &query)?;
        n.array(Self::pair_entry(&n, &result)?)?
            .iter()
            .map(|t| {
                Ok(Trade {
                    price: n.decimal(n.index(t, 0)?)?,
                    volume: n.decimal(n.index(t, 1)?)?,
                    timestamp: n.seconds(n.index(t, 2)?)?,
                    side: n.side(n.index(t, 3)?)?,
                })
            })
            .collect()
    }

    fn balance(&self) -> Result<Balances> {
        let (n, result) = self.private("balance", "Balance", &Params::new())?;
        let mut balances = Balances::new();
        for (asset, amount) in n.object(&result)? {
            *balances.entry(kraken_asset_to_canonical(asset)).or_default() += n.decimal(amount)?;
        }
        Ok(balances)
    }

    fn orders(&self) -> Result<Vec<Order>> {
        let (n, result) = self.private("orders", "OpenOrders", &Params::new())?;
        n.object(n.field(&result, "open")?)?
            .iter()
            .map(|(id, value)| self.order(&n, id, value))
            .collect()
    }

    fn order_status(&self, order_id: &str) -> Result<Order> {
        let params = Params::new().with("txid", order_id);
        let (n, result) = self.private("order_status", "QueryOrders", &params)?;
        self.order(&n, order_id, n.field(&result, order_id)?)
    }

    fn ledger(&self) -> Result<Vec<LedgerEntry>> {
        let (n, result) = self.private("ledger", "Ledgers", &Params::new())?;
        let mut entries = n
            .object(n.field(&result, "ledger")?)?
            .iter()
            .map(|(id, entry)| {
                Ok(LedgerEntry {
                    id: id.clone(),
                    currency: kraken_asset_to_canonical(&n.text_field(entry, "asset")?),
                    amount: n.decimal_field(entry, "amount")?,
                    fee: n.decimal_field(entry, "fee")?,
                    kind: n.text_field(entry, "type")?,
                    timestamp: n.seconds(n.field(entry, "time")?)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        entries.sort_by_key(|entry| entry.timestamp);
        Ok(entries)
    }

    fn add_order(&self, order: &OrderRequest) -> Result<OrderReceipt> {
        let price = limit_price(self.exchange(), order)?;
        let mut params = Params::new()
            .with("pair", self.pairs.to_exchange(&order.pair))
            .with("type", order.side.as_str())
            .with("ordertype", order.order_type.as_str());
        if let Some(price) = price {
            params.insert("price", price.to_string());
        }
        params.insert("volume", order.volume.to_string());
        params.extend(&order.extra);

        let (n, result) = self.private("add_order", "AddOrder", &params)?;
        let order_id = n.text(n.index(n.field(&result, "txid")?, 0)?)?;
        Ok(OrderReceipt {
            order_id,
            pair: order.pair.clone(),
            side: order.side,
            order_type: order.order_type,
            price,
            volume: order.volume,
        })
    }

    fn cancel_order(&self, order_id: &str) -> Result<bool> {
        let params = Params::new().with("txid", order_id);
        let (n, result) = self.private("cancel_order", "CancelOrder", &params)?;
        Ok(n.decimal_field(&result, "count")? > Decimal::ZERO)
    }

    /// First-tier fees from the public `AssetPairs` listing
    fn fees(&self) -> Result<Fees> {
        let (n, result) = self.public("fees", "AssetPairs", &Params::new())?;
        let first_tier = |info: &Value, key: &str| -> Result<Option<Decimal>> {
            info.get(key)
                .and_then(|tiers| tiers.get(0))
                .map(|tier| n.decimal(n.index(tier, 1)?).map(percent_to_fraction))
                .transpose()
        };

        let mut fees = Fees::new();
        for (name, info) in n.object(&result)? {
            if name.ends_with(".d") {
                continue;
            }
            let (Some(base), Some(quote)) = (
                info.get("base").and_then(Value::as_str),
                info.get("quote").and_then(Value::as_str),
            ) else {
                continue;
            };
            let Ok(pair) = Pair::new(&kraken_asset_to_canonical(base), &kraken_asset_to_canonical(quote)) else {
                continue;
            };
            let Some(taker) = first_tier(info, "fees")? else {
                continue;
            };
            let maker = first_tier(info, "fees_maker")?.unwrap_or(taker);
            fees.insert(pair, FeeSchedule { maker, taker });
        }
        Ok(fees)
    }
}
