//! Seasonality ingestor: keeps daily candles and monthly seasonality for
//! every listed pair up to date, a few symbols per invocation.
//!
//! Commands:
//! - `run` — process one slice and exit (for cron or serverless schedulers)
//! - `watch` — process a slice on a fixed interval until Ctrl-C
//! - `status`, `symbols`, `symbol-status`, `history`, `seasonality`, `ping` —
//!   read-only views printed as JSON

mod config;
mod main_lib;
mod scheduler;

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::time::Duration;

use config::Config;
use main_lib::{build_state, init_tracing};

#[derive(Parser)]
#[command(
    name = "seasonality-ingestor",
    about = "Resumable daily-candle ingestion and monthly seasonality"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process one bounded slice of symbols, then exit.
    Run,
    /// Process a slice on a fixed interval until Ctrl-C.
    Watch {
        /// Seconds between slices. Defaults to SEASONALITY_WATCH_INTERVAL_SECS.
        #[arg(long)]
        interval_secs: Option<u64>,
    },
    /// Show the persisted processing state.
    Status,
    /// List active symbols.
    Symbols,
    /// Show the newest stored daily candle time for a symbol.
    SymbolStatus {
        /// Pair, e.g. BTCUSDT.
        symbol: String,
    },
    /// Print monthly candles for a symbol, oldest first.
    History {
        /// Pair, e.g. BTCUSDT.
        symbol: String,
    },
    /// Print average return per calendar month for a symbol.
    Seasonality {
        /// Pair, e.g. BTCUSDT.
        symbol: String,
    },
    /// Check the database is reachable.
    Ping,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;
    init_tracing();
    let state = build_state(&config)?;
    let service = &state.ingestion_service;

    match cli.command {
        Commands::Run => print_json(&service.run_ingestion_slice().await?)?,
        Commands::Watch { interval_secs } => {
            let period = interval_secs
                .map(|secs| Duration::from_secs(secs.max(1)))
                .unwrap_or(config.watch_interval);
            scheduler::run_watch_loop(state.clone(), period).await?;
        }
        Commands::Status => print_json(&service.get_processing_status()?)?,
        Commands::Symbols => print_json(&service.list_active_symbols()?)?,
        Commands::SymbolStatus { symbol } => {
            let symbol = symbol.to_ascii_uppercase();
            let latest = service.get_symbol_status(&symbol)?;
            print_json(&serde_json::json!({ "symbol": symbol, "latestCandle": latest }))?;
        }
        Commands::History { symbol } => {
            print_json(&service.get_monthly_history(&symbol.to_ascii_uppercase())?)?
        }
        Commands::Seasonality { symbol } => {
            print_json(&service.get_seasonality(&symbol.to_ascii_uppercase())?)?
        }
        Commands::Ping => {
            service.ping()?;
            print_json(&serde_json::json!({ "status": "ok" }))?;
        }
    }

    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
