use std::{path::PathBuf, time::Duration};

use thiserror::Error;

use crate::{
    backfill::{history::History, month},
    crawler::{FetchError, MonthlyQuoteSource},
    declare::{EmptyMonthPolicy, YearMonth},
    export, logging,
};

/// 回補的參數
#[derive(Debug, Clone)]
pub struct Options {
    /// 從哪個月份開始往回抓，通常是本月
    pub start: YearMonth,
    pub floor_year: i32,
    /// 每次請求後的等待時間，避免被證交所封鎖
    pub interval: Duration,
    pub empty_month: EmptyMonthPolicy,
    pub output_dir: PathBuf,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// 遇到沒有資料的月份
    EmptyMonth(YearMonth),
    /// 已走到最早年份
    FloorReached,
}

#[derive(Debug)]
pub struct Outcome {
    pub stock_symbol: String,
    pub months_fetched: usize,
    pub records: usize,
    pub stop: StopReason,
    /// 沒有任何資料時不會產生檔案
    pub written: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum BackfillError {
    #[error("failed to fetch {stock_symbol} {month}: {source}")]
    Fetch {
        stock_symbol: String,
        month: YearMonth,
        source: FetchError,
    },

    #[error("failed to write {path}")]
    Write {
        path: String,
        #[source]
        source: anyhow::Error,
    },
}

/// 批次回補的結果
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub written: Vec<String>,
    pub empty: Vec<String>,
    pub failed: Vec<String>,
}

/// 逐月往回抓取個股每日成交資訊，結束後依日期排序寫成 csv
pub async fn execute<S>(
    source: &S,
    stock_symbol: &str,
    options: &Options,
) -> Result<Outcome, BackfillError>
where
    S: MonthlyQuoteSource + ?Sized,
{
    let mut history = History::new();
    let mut months_fetched = 0;
    let mut stop = StopReason::FloorReached;

    for month in month::months_back(options.start, options.floor_year) {
        logging::info_file_async(format!("Fetching {} {}", stock_symbol, month));

        let fetched = source.fetch_month(stock_symbol, month).await;
        months_fetched += 1;
        tokio::time::sleep(options.interval).await;

        let records = fetched.map_err(|why| BackfillError::Fetch {
            stock_symbol: stock_symbol.to_string(),
            month,
            source: why,
        })?;

        if records.is_empty() {
            match options.empty_month {
                EmptyMonthPolicy::Stop => {
                    logging::info_file_async(format!(
                        "This month ({}) has no data, stop here",
                        month
                    ));
                    stop = StopReason::EmptyMonth(month);
                    break;
                }
                EmptyMonthPolicy::Continue => {
                    logging::debug_file_async(format!("This month ({}) has no data, skip", month));
                    continue;
                }
            }
        }

        history.merge(records);
    }

    let written = if history.is_empty() {
        logging::warn_file_async(format!("{} has no data, nothing to save", stock_symbol));
        None
    } else {
        let path = export::output_path(&options.output_dir, stock_symbol);
        logging::info_file_async(format!(
            "Saving {} records of {} to {}",
            history.len(),
            stock_symbol,
            path.display()
        ));

        export::write_history(&history, &path).map_err(|why| BackfillError::Write {
            path: path.display().to_string(),
            source: why,
        })?;

        Some(path)
    };

    Ok(Outcome {
        stock_symbol: stock_symbol.to_string(),
        months_fetched,
        records: history.len(),
        stop,
        written,
    })
}

/// 依序回補多檔股票；抓取失敗只記錄並跳過，寫檔失敗則中止整批
pub async fn execute_batch<S>(
    source: &S,
    stock_symbols: &[String],
    options: &Options,
) -> Result<BatchSummary, BackfillError>
where
    S: MonthlyQuoteSource + ?Sized,
{
    let mut summary = BatchSummary::default();

    for stock_symbol in stock_symbols
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
    {
        match execute(source, stock_symbol, options).await {
            Ok(outcome) => match outcome.written {
                Some(_) => summary.written.push(outcome.stock_symbol),
                None => summary.empty.push(outcome.stock_symbol),
            },
            Err(why @ BackfillError::Fetch { .. }) => {
                logging::error_file_async(format!("{}, move on to the next one", why));
                summary.failed.push(stock_symbol.to_string());
            }
            Err(why) => return Err(why),
        }
    }

    Ok(summary)
}
