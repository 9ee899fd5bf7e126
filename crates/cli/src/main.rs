//! `bft`: place orders on the Binance USDⓈ-M Futures testnet.
//!
//! One invocation performs one action: a diagnostic sweep, a balance or
//! position query, or a single order placement. Dry-run mode swaps the live
//! transport for a simulator and never opens a socket.

mod bot;
mod diagnostics;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use rust_decimal::Decimal;
use tracing::{info, warn};

use bft_core::config::{Overrides, Settings};
use bft_core::logging::init_tracing;
use bft_core::types::{OrderKind, Side, Symbol, TimeInForce};
use bft_execution::{
    FuturesRestClient, LiveTransport, NullTransport, OrderRequest, Transport,
};

use crate::bot::Bot;

#[derive(Debug, Parser)]
#[command(
    name = "bft",
    about = "Binance Futures testnet order-placement CLI",
    version
)]
struct Args {
    /// Trading pair, e.g. BTCUSDT (case-insensitive).
    #[arg(long, required_unless_present_any = ["diagnostic_only", "balance", "positions"])]
    symbol: Option<Symbol>,

    /// Order side: BUY or SELL.
    #[arg(long, required_unless_present_any = ["diagnostic_only", "balance", "positions"])]
    side: Option<Side>,

    /// Order type: market, limit, or stop_limit.
    #[arg(long = "type", default_value = "market")]
    order_type: OrderKind,

    /// Order quantity in base units.
    #[arg(long, required_unless_present_any = ["diagnostic_only", "balance", "positions"])]
    quantity: Option<Decimal>,

    /// Limit price (required for limit and stop_limit orders).
    #[arg(long)]
    price: Option<Decimal>,

    /// Stop trigger price (required for stop_limit orders).
    #[arg(long)]
    stop_price: Option<Decimal>,

    /// Time-in-force for limit-type orders: GTC, IOC, or FOK.
    #[arg(long, default_value = "GTC")]
    time_in_force: TimeInForce,

    /// API key (overrides BINANCE_API_KEY).
    #[arg(long)]
    api_key: Option<String>,

    /// API secret (overrides BINANCE_API_SECRET).
    #[arg(long)]
    api_secret: Option<String>,

    /// Simulate the order without sending it.
    #[arg(long)]
    dry_run: bool,

    /// Minimum log level (error, warn, info, debug, trace).
    #[arg(long)]
    log_level: Option<String>,

    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run connectivity diagnostics before the requested action.
    #[arg(long)]
    diagnostic: bool,

    /// Run connectivity diagnostics and exit.
    #[arg(long)]
    diagnostic_only: bool,

    /// Print account balances and exit.
    #[arg(long)]
    balance: bool,

    /// Print open positions and exit.
    #[arg(long)]
    positions: bool,

    /// Reject orders that violate exchange filters instead of adjusting them.
    #[arg(long)]
    strict_prices: bool,
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Absent .env files are fine; malformed ones are not.
    match dotenvy::dotenv() {
        Ok(_) => {}
        Err(err) if err.not_found() => {}
        Err(err) => return Err(err).context("failed to load .env"),
    }

    let args = Args::parse();

    let mut settings = Settings::load(
        args.config.clone(),
        Overrides {
            api_key: args.api_key.clone(),
            api_secret: args.api_secret.clone(),
            dry_run: args.dry_run,
            log_level: args.log_level.clone(),
        },
    )
    .context("failed to load configuration")?;

    let forced_dry_run = settings.enforce_credential_policy();

    let _guard = init_tracing(&settings.log_level, settings.log_dir.as_ref())
        .context("failed to initialize logging")?;

    if forced_dry_run {
        warn!("API credentials missing, forcing dry-run mode");
    }
    info!(
        base_url = %settings.base_url,
        dry_run = settings.dry_run,
        api_key = settings.masked_api_key().as_deref().unwrap_or("none"),
        "starting"
    );

    let transport: Arc<dyn Transport> = if settings.dry_run {
        Arc::new(NullTransport)
    } else {
        Arc::new(LiveTransport::new(
            settings.base_url.clone(),
            settings.api_key.clone(),
            settings.timeout_ms,
        )?)
    };
    let client = FuturesRestClient::new(
        settings.api_secret.clone(),
        settings.recv_window,
        transport,
    );
    let bot = Bot::new(settings, client);

    if args.diagnostic || args.diagnostic_only {
        let symbol = args.symbol.as_ref().map(Symbol::as_str);
        let report = diagnostics::run(&bot, symbol).await;
        print_json(&report)?;
        if args.diagnostic_only {
            return Ok(if report.all_ok() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            });
        }
        if !report.all_ok() {
            warn!("diagnostics reported failures, continuing");
        }
    }

    if args.balance {
        return match bot.account_balances().await {
            Ok(Some(balances)) => {
                print_json(&balances)?;
                Ok(ExitCode::SUCCESS)
            }
            Ok(None) => {
                eprintln!("dry-run mode: no account to query, balance skipped");
                Ok(ExitCode::SUCCESS)
            }
            Err(err) => {
                tracing::error!("balance query failed: {err}");
                eprintln!("balance query failed: {err}");
                Ok(ExitCode::FAILURE)
            }
        };
    }

    if args.positions {
        return match bot.open_positions().await {
            Ok(Some(positions)) => {
                print_json(&positions)?;
                Ok(ExitCode::SUCCESS)
            }
            Ok(None) => {
                eprintln!("dry-run mode: no account to query, positions skipped");
                Ok(ExitCode::SUCCESS)
            }
            Err(err) => {
                tracing::error!("position query failed: {err}");
                eprintln!("position query failed: {err}");
                Ok(ExitCode::FAILURE)
            }
        };
    }

    // clap guarantees these are present on the order path.
    let (Some(symbol), Some(side), Some(quantity)) =
        (args.symbol, args.side, args.quantity)
    else {
        anyhow::bail!("--symbol, --side, and --quantity are required to place an order");
    };

    let request = OrderRequest {
        symbol,
        side,
        kind: args.order_type,
        quantity,
        price: args.price,
        stop_price: args.stop_price,
        time_in_force: args.time_in_force,
    };

    let outcome = bot.place_order(request, args.strict_prices).await;
    print_json(&outcome)?;

    Ok(if outcome.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
