//! Per-exchange implementations of [`Interface`](crate::Interface)

mod bitfinex;
mod bitstamp;
mod bittrex;
mod gdax;
mod gemini;
mod kraken;
mod poloniex;
mod quoine;

pub use bitfinex::Bitfinex;
pub use bitstamp::Bitstamp;
pub use bittrex::Bittrex;
pub use gdax::Gdax;
pub use gemini::Gemini;
pub use kraken::Kraken;
pub use poloniex::Poloniex;
pub use quoine::Quoine;

use common::{Error, ExchangeId, FeeSchedule, Fees, OrderRequest, OrderType, Pair, Result};
use rust_decimal::Decimal;

/// Limit price of an order, required for limit orders
fn limit_price(exchange: ExchangeId, order: &OrderRequest) -> Result<Option<Decimal>> {
    match (order.order_type, order.price) {
        (OrderType::Limit, None) => Err(Error::InvalidOrder {
            exchange,
            reason: "limit order without price".to_string(),
        }),
        (OrderType::Limit, price) => Ok(price),
        (OrderType::Market, _) => Ok(None),
    }
}

/// Limit-only exchanges: reject market orders, return the price otherwise
fn require_limit(exchange: ExchangeId, order: &OrderRequest) -> Result<Decimal> {
    match order.order_type {
        OrderType::Market => Err(Error::UnsupportedOperation {
            exchange,
            operation: "market orders",
        }),
        OrderType::Limit => limit_price(exchange, order)?.ok_or_else(|| Error::InvalidOrder {
            exchange,
            reason: "limit order without price".to_string(),
        }),
    }
}

/// Same schedule for every pair
fn uniform_fees(pairs: Vec<Pair>, schedule: FeeSchedule) -> Fees {
    pairs.into_iter().map(|pair| (pair, schedule)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::Side;
    use rust_decimal_macros::dec;

    fn pair() -> Pair {
        Pair::new("BTC", "EUR").expect("valid pair")
    }

    #[test]
    fn test_limit_price_rules() -> Result<()> {
        let limit = OrderRequest::limit(pair(), Side::Buy, dec!(100), dec!(1));
        assert_eq!(limit_price(ExchangeId::Kraken, &limit)?, Some(dec!(100)));

        let mut broken = limit.clone();
        broken.price = None;
        assert!(matches!(
            limit_price(ExchangeId::Kraken, &broken),
            Err(Error::InvalidOrder { .. })
        ));

        let market = OrderRequest::market(pair(), Side::Sell, dec!(1));
        assert_eq!(limit_price(ExchangeId::Kraken, &market)?, None);
        assert!(matches!(
            require_limit(ExchangeId::Poloniex, &market),
            Err(Error::UnsupportedOperation { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_uniform_fees() {
        let schedule = FeeSchedule {
            maker: dec!(0.001),
            taker: dec!(0.002),
        };
        let fees = uniform_fees(vec![pair()], schedule);
        assert_eq!(fees.get(&pair()), Some(&schedule));
    }
}
