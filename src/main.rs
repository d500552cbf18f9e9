use std::{process::ExitCode, time::Duration};

use anyhow::{anyhow, Context, Result};
use clap::Parser;

use crate::{
    backfill::quote::{self, Options, StopReason},
    cli::Cli,
    config::{App, SymbolSource},
    crawler::twse::stock_day::StockDay,
    logging::LogConfig,
    util::datetime,
};

pub mod backfill;
pub mod cli;
pub mod config;
pub mod crawler;
pub mod declare;
pub mod export;
pub mod logging;
pub mod util;

#[cfg(all(target_os = "linux", target_env = "musl"))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();

    if let Err(why) = logging::init(LogConfig::from_env()) {
        logging::error_console(format!("Failed to initialize logging because {:?}", why));
    }

    let code = match run().await {
        Ok(_) => ExitCode::SUCCESS,
        Err(why) => {
            logging::error_file_async(format!("{:?}", why));
            ExitCode::FAILURE
        }
    };

    logging::flush();
    code
}

async fn run() -> Result<()> {
    // reqwest 只啟用 rustls-no-provider，需自行安裝 crypto provider
    let _ = rustls::crypto::ring::default_provider().install_default();

    let cli = Cli::parse();
    let app = cli.override_app(App::get()?);

    let options = Options {
        start: datetime::current_month(),
        floor_year: app.backfill.floor_year,
        interval: Duration::from_secs(app.backfill.interval_secs),
        empty_month: app.backfill.empty_month,
        output_dir: app.backfill.output_dir.clone(),
    };
    let source = StockDay::new(&app.twse.base_url);

    logging::info_file_async(format!(
        "Backfill from {} back to {} with {:?} between requests, empty month policy: {}",
        options.start, options.floor_year, options.interval, options.empty_month
    ));

    let symbol_source = cli.symbol_source(&app);
    let stock_symbols = symbol_source.resolve().context("Failed to resolve symbols")?;

    match symbol_source {
        SymbolSource::Single(raw) => {
            let stock_symbol = stock_symbols
                .first()
                .ok_or_else(|| anyhow!("'{}' is not a valid stock symbol", raw))?;
            let outcome = quote::execute(&source, stock_symbol, &options).await?;
            let stop = match outcome.stop {
                StopReason::EmptyMonth(month) => format!("stopped at empty month {}", month),
                StopReason::FloorReached => format!("reached {}", options.floor_year),
            };

            match outcome.written {
                Some(path) => logging::info_file_async(format!(
                    "{} done: {} records from {} months saved to {}, {}",
                    outcome.stock_symbol,
                    outcome.records,
                    outcome.months_fetched,
                    path.display(),
                    stop
                )),
                None => logging::warn_file_async(format!(
                    "{} done: no records after {} months, {}",
                    outcome.stock_symbol, outcome.months_fetched, stop
                )),
            }
        }
        _ => {
            let summary = quote::execute_batch(&source, &stock_symbols, &options).await?;

            logging::info_file_async(format!(
                "Batch done: written {:?}, empty {:?}, failed {:?}",
                summary.written, summary.empty, summary.failed
            ));
        }
    }

    Ok(())
}
