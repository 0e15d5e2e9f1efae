//! Test fixtures: credentials, pairs and canned exchange responses
//!
//! Response bodies are trimmed copies of what each exchange returns; decimal
//! strings are kept verbatim so tests can assert exact values.

use crate::factories::credentials_for;
use auth::Credentials;
use common::{ExchangeId, Pair};
use rstest::fixture;

/// BTC/EUR
#[fixture]
pub fn btc_eur() -> Pair {
    Pair::new("BTC", "EUR").expect("valid pair")
}

/// BTC/USD
#[fixture]
pub fn btc_usd() -> Pair {
    Pair::new("BTC", "USD").expect("valid pair")
}

/// LTC/BTC
#[fixture]
pub fn ltc_btc() -> Pair {
    Pair::new("LTC", "BTC").expect("valid pair")
}

/// Kraken credentials
#[fixture]
pub fn kraken_credentials() -> Credentials {
    credentials_for(ExchangeId::Kraken)
}

/// Bitstamp credentials, including the customer id
#[fixture]
pub fn bitstamp_credentials() -> Credentials {
    credentials_for(ExchangeId::Bitstamp)
}

/// GDAX credentials, including the passphrase
#[fixture]
pub fn gdax_credentials() -> Credentials {
    credentials_for(ExchangeId::Gdax)
}

/// Kraken responses
pub mod kraken {
    pub const DEPTH: &str = r#"{"error":[],"result":{"XXBTZEUR":{
        "asks":[["2519.00000","1.500",1499040000],["2520.50000","0.250",1499040001]],
        "bids":[["2518.90000","0.021",1499040000],["2518.10000","3.000",1499040002]]}}}"#;

    pub const TICKER: &str = r#"{"error":[],"result":{"XXBTZEUR":{
        "a":["2519.00000","1","1.000"],"b":["2518.90000","2","2.000"],
        "c":["2518.95000","0.01000000"],"v":["1200.12345678","4321.87654321"],
        "p":["2500.0","2490.0"],"t":[100,4000],"l":["2400.0","2400.0"],
        "h":["2600.0","2600.0"],"o":"2450.0"}}}"#;

    pub const TRADES: &str = r#"{"error":[],"result":{"XXBTZEUR":[
        ["2518.90000","0.01000000",1499040000.1234,"b","l",""],
        ["2519.00000","0.50000000",1499040001.5,"s","m",""]],
        "last":"1499040001500000000"}}"#;

    pub const BALANCE: &str =
        r#"{"error":[],"result":{"ZEUR":"1500.2500","XXBT":"0.5000000000","DASH":"12.0000000000"}}"#;

    pub const OPEN_ORDERS: &str = r#"{"error":[],"result":{"open":{"OQCLML-BW3P3-BUCMWZ":{
        "refid":null,"status":"open","opentm":1499040000.5,"starttm":0,"expiretm":0,
        "descr":{"pair":"XBTEUR","type":"buy","ordertype":"limit","price":"2400.0","price2":"0",
                 "leverage":"none","order":"buy 1.25000000 XBTEUR @ limit 2400.0"},
        "vol":"1.25000000","vol_exec":"0.37500000","cost":"900.0","fee":"0.0","price":"2400.0"}}}}"#;

    pub const LEDGERS: &str = r#"{"error":[],"result":{"ledger":{
        "L2":{"refid":"T2","time":1499040100.0,"type":"trade","aclass":"currency","asset":"ZEUR",
              "amount":"-25.0000","fee":"0.0400","balance":"1475.2500"},
        "L1":{"refid":"T1","time":1499040000.0,"type":"deposit","aclass":"currency","asset":"XXBT",
              "amount":"0.5000000000","fee":"0.0000000000","balance":"0.5000000000"}},
        "count":2}}"#;

    pub const ADD_ORDER: &str = r#"{"error":[],"result":{
        "descr":{"order":"buy 0.01000000 XBTEUR @ limit 2400.0"},"txid":["OU22CG-KLAF2-FWUDD7"]}}"#;

    pub const CANCEL_ORDER: &str = r#"{"error":[],"result":{"count":1}}"#;

    pub const ASSET_PAIRS: &str = r#"{"error":[],"result":{
        "XXBTZEUR":{"altname":"XBTEUR","base":"XXBT","quote":"ZEUR",
                    "fees":[[0,0.26],[50000,0.24]],"fees_maker":[[0,0.16],[50000,0.14]]},
        "XXBTZEUR.d":{"altname":"XBTEUR.d","base":"XXBT","quote":"ZEUR","fees":[[0,0.26]]},
        "DASHEUR":{"altname":"DASHEUR","base":"DASH","quote":"ZEUR","fees":[[0,0.26]]}}}"#;

    pub const INVALID_NONCE: &str = r#"{"error":["EAPI:Invalid nonce"]}"#;
}

/// Bitstamp responses
pub mod bitstamp {
    pub const TICKER: &str = r#"{"high":"2600.00","last":"2519.10","timestamp":"1499040000",
        "bid":"2518.90","vwap":"2510.00","volume":"1523.81245678","low":"2400.00","ask":"2519.10",
        "open":"2450.00"}"#;

    pub const ORDER_BOOK: &str = r#"{"timestamp":"1499040000",
        "bids":[["2518.90","0.50000000"],["2518.00","1.00000000"]],
        "asks":[["2519.10","0.25000000"]]}"#;

    pub const BALANCE: &str = r#"{"btc_balance":"0.50000000","btc_available":"0.40000000",
        "btc_reserved":"0.10000000","eur_balance":"1000.00","eur_available":"1000.00",
        "eur_reserved":"0.00","btceur_fee":"0.25","btcusd_fee":"0.20"}"#;

    pub const USER_TRANSACTIONS: &str = r#"[
        {"id":2,"datetime":"2017-07-03 00:01:00","type":"2","fee":"0.25","eur":"-100.00",
         "btc":"0.04000000","usd":0,"btc_eur":2500.0,"order_id":314},
        {"id":1,"datetime":"2017-07-02 12:00:00","type":"0","fee":"0.00","eur":"0.00",
         "btc":"1.00000000","usd":0}]"#;

    pub const ORDER_PLACED: &str =
        r#"{"id":"77001","datetime":"2017-07-03 00:02:00","type":"0","price":"2519.10","amount":"0.01000000"}"#;

    pub const ERROR: &str = r#"{"status":"error","reason":"Invalid nonce","code":"API0004"}"#;
}

/// Bitfinex responses
pub mod bitfinex {
    pub const TICKER: &str = r#"{"mid":"2519.0","bid":"2518.9","ask":"2519.1","last_price":"2519.05",
        "low":"2400.0","high":"2600.0","volume":"15234.56789","timestamp":"1499040000.348340958"}"#;

    pub const BALANCES: &str = r#"[
        {"type":"exchange","currency":"btc","amount":"0.5","available":"0.5"},
        {"type":"trading","currency":"btc","amount":"0.25","available":"0.25"},
        {"type":"exchange","currency":"usd","amount":"1000.0","available":"900.0"}]"#;

    pub const ORDER: &str = r#"{"id":448364249,"symbol":"btcusd","exchange":"bitfinex","price":"2400.0",
        "avg_execution_price":"0.0","side":"buy","type":"exchange limit","timestamp":"1499040000.0",
        "is_live":true,"is_cancelled":false,"original_amount":"0.01","remaining_amount":"0.01",
        "executed_amount":"0.0","order_id":448364249}"#;
}

/// Bittrex responses
pub mod bittrex {
    pub const ORDER_BOOK: &str = r#"{"success":true,"message":"","result":{
        "buy":[{"Quantity":12.37,"Rate":0.02525},{"Quantity":1.5,"Rate":0.025}],
        "sell":[{"Quantity":32.55412402,"Rate":0.02540008}]}}"#;

    pub const INVALID_MARKET: &str = r#"{"success":false,"message":"INVALID_MARKET","result":null}"#;

    pub const OPEN_ORDERS: &str = r#"{"success":true,"message":"","result":[
        {"OrderUuid":"09aa5bb6-8232-41aa-9b78-a5a1093e0211","Exchange":"BTC-LTC","OrderType":"LIMIT_SELL",
         "Quantity":5.0,"QuantityRemaining":3.5,"Limit":0.026,"Opened":"2017-07-02T03:55:48.77"}]}"#;
}

/// GDAX responses
pub mod gdax {
    pub const TRADES: &str = r#"[
        {"time":"2017-07-03T00:00:01.123Z","trade_id":74,"price":"2519.10","size":"0.01","side":"buy"},
        {"time":"2017-07-03T00:00:00.5Z","trade_id":73,"price":"2519.00","size":"0.50","side":"sell"}]"#;

    pub const ACCOUNTS: &str = r#"[
        {"id":"acc-btc","currency":"BTC","balance":"0.5000000000000000","available":"0.5","hold":"0"},
        {"id":"acc-usd","currency":"USD","balance":"1000.0000000000000000","available":"900","hold":"100"}]"#;

    pub const BTC_LEDGER: &str = r#"[
        {"id":"101","created_at":"2017-07-02T08:19:27.028459Z","amount":"0.5","balance":"0.5","type":"transfer"}]"#;

    pub const USD_LEDGER: &str = r#"[
        {"id":"201","created_at":"2017-07-01T08:19:27.028459Z","amount":"1000.00","balance":"1000.00","type":"transfer"},
        {"id":"202","created_at":"2017-07-03T08:19:27.028459Z","amount":"-0.25","balance":"999.75","type":"fee"}]"#;

    pub const CANCELLED: &str = r#"["c5ab5eae-76be-480e-8961-00792dc7e138"]"#;
}

/// Poloniex responses
pub mod poloniex {
    pub const TICKER: &str = r#"{"BTC_LTC":{"last":"0.0251","lowestAsk":"0.02589999","highestBid":"0.0251",
        "percentChange":"0.02390438","baseVolume":"6.16485315","quoteVolume":"245.82513926"},
        "BTC_XMR":{"last":"0.0069","lowestAsk":"0.0070","highestBid":"0.0068",
        "percentChange":"0.0","baseVolume":"1.0","quoteVolume":"145.0"}}"#;

    pub const COMPLETE_BALANCES: &str = r#"{"LTC":{"available":"5.015","onOrders":"1.0025","btcValue":"0.078"},
        "BTC":{"available":"0.5","onOrders":"0","btcValue":"0.5"}}"#;

    pub const OPEN_ORDERS: &str = r#"{"BTC_LTC":[{"orderNumber":"120466","type":"sell","rate":"0.025",
        "amount":"60","startingAmount":"100","total":"1.5","date":"2017-07-02 10:00:00"}],"BTC_XMR":[]}"#;
}

/// Gemini responses
pub mod gemini {
    pub const TICKER: &str = r#"{"ask":"2519.10","bid":"2518.90","last":"2519.00",
        "volume":{"BTC":"2210.505328803","USD":"5567883.12","timestamp":1499040000000}}"#;

    pub const CANCELLED: &str = r#"{"order_id":"106817811","id":"106817811","symbol":"btcusd",
        "side":"buy","type":"exchange limit","is_live":false,"is_cancelled":true,
        "original_amount":"0.01","executed_amount":"0","price":"2400.00","timestampms":1499040000000}"#;
}

/// Quoine responses
pub mod quoine {
    pub const PRODUCTS: &str = r#"[
        {"id":5,"product_type":"CurrencyPair","code":"CASH","currency_pair_code":"BTCJPY",
         "market_ask":"283000.0","market_bid":"282900.5","last_traded_price":"282950.0",
         "volume_24h":"1234.56","maker_fee":"0.0","taker_fee":"0.0015","currency":"JPY","base_currency":"BTC"},
        {"id":1,"product_type":"CurrencyPair","code":"CASH","currency_pair_code":"BTCUSD",
         "market_ask":"2520.0","market_bid":"2518.0","last_traded_price":"2519.0",
         "volume_24h":"12.5","maker_fee":"0.001","taker_fee":"0.002","currency":"USD","base_currency":"BTC"}]"#;

    pub const PRICE_LEVELS: &str = r#"{"buy_price_levels":[["282900.50000","0.12000"],["282800.00000","1.00000"]],
        "sell_price_levels":[["283000.00000","0.50000"]]}"#;

    pub const ORDER_CREATED: &str = r#"{"id":2157474,"order_type":"limit","quantity":"0.01",
        "side":"buy","filled_quantity":"0.0","price":"282000.0","created_at":1499040000,
        "status":"live","product_id":5,"currency_pair_code":"BTCJPY"}"#;
}
