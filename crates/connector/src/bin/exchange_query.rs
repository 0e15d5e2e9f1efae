//! Command-line access to the unified exchange interface
//!
//! ```text
//! exchange_query --exchange kraken book BTC/EUR
//! exchange_query --exchange bitstamp --key-file ~/.bitstamp.key balance
//! ```
//!
//! Results are printed as JSON on stdout; logs go to stderr and follow
//! `RUST_LOG`.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use common::{ExchangeId, OrderRequest, Pair, Params, Side};
use connector::Interface;
use rest::{ClientsConfig, ExchangeConfig};
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "exchange_query")]
#[command(about = "Query crypto exchange REST APIs through one interface")]
#[command(version)]
struct Cli {
    /// Exchange name (kraken, bitstamp, bitfinex, bittrex, gdax, poloniex, gemini, quoine)
    #[arg(long, short)]
    exchange: ExchangeId,

    /// TOML client configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Credential file, overriding the configuration
    #[arg(long)]
    key_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Pairs listed by the exchange
    Pairs,
    /// Top of book
    Ticker { pair: Pair },
    /// Order book
    Book { pair: Pair },
    /// Recent trades
    Trades { pair: Pair },
    /// Balance per currency
    Balance,
    /// Open orders
    Orders,
    /// One order
    Status { order_id: String },
    /// Account movements
    Ledger,
    /// Place an order; omit the price for a market order
    Order {
        #[arg(value_enum)]
        side: CliSide,
        pair: Pair,
        volume: Decimal,
        price: Option<Decimal>,
    },
    /// Cancel an order
    Cancel { order_id: String },
    /// Maker and taker fees
    Fees,
}

#[derive(Clone, Copy, ValueEnum)]
enum CliSide {
    Buy,
    Sell,
}

impl From<CliSide> for Side {
    fn from(side: CliSide) -> Self {
        match side {
            CliSide::Buy => Self::Buy,
            CliSide::Sell => Self::Sell,
        }
    }
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => ClientsConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?
            .get(cli.exchange),
        None => ExchangeConfig::default(),
    };
    if cli.key_file.is_some() {
        config.key_file.clone_from(&cli.key_file);
    }

    let exchange = connector::from_config(cli.exchange, &config)
        .with_context(|| format!("creating {} client", cli.exchange))?;
    info!("{}: running {}", cli.exchange, command_name(&cli.command));
    run(exchange.as_ref(), cli.command)
}

const fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Pairs => "pairs",
        Command::Ticker { .. } => "ticker",
        Command::Book { .. } => "book",
        Command::Trades { .. } => "trades",
        Command::Balance => "balance",
        Command::Orders => "orders",
        Command::Status { .. } => "status",
        Command::Ledger => "ledger",
        Command::Order { .. } => "order",
        Command::Cancel { .. } => "cancel",
        Command::Fees => "fees",
    }
}

fn run(exchange: &dyn Interface, command: Command) -> Result<()> {
    match command {
        Command::Pairs => print(&exchange.supported_pairs()?),
        Command::Ticker { pair } => print(&exchange.ticker(&pair)?),
        Command::Book { pair } => print(&exchange.order_book(&pair, &Params::new())?),
        Command::Trades { pair } => print(&exchange.trades(&pair, &Params::new())?),
        Command::Balance => print(&exchange.balance()?),
        Command::Orders => print(&exchange.orders()?),
        Command::Status { order_id } => print(&exchange.order_status(&order_id)?),
        Command::Ledger => print(&exchange.ledger()?),
        Command::Order {
            side,
            pair,
            volume,
            price,
        } => {
            let request = match price {
                Some(price) => OrderRequest::limit(pair, side.into(), price, volume),
                None => OrderRequest::market(pair, side.into(), volume),
            };
            print(&exchange.add_order(&request)?)
        }
        Command::Cancel { order_id } => print(&exchange.cancel_order(&order_id)?),
        Command::Fees => print(&exchange.fees()?),
    }
}

fn print<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
