use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    crawler::{twse, FetchError, MonthlyQuoteSource},
    declare::{DailyRecord, YearMonth},
    logging,
    util::{datetime, http, text},
};

/// 每列固定九個欄位：日期、成交股數、成交金額、開盤價、最高價、最低價、收盤價、漲跌價差、成交筆數
const FIELD_COUNT: usize = 9;

#[derive(Serialize, Deserialize, Debug, Default)]
struct StockDayResponse {
    pub stat: Option<String>,
    pub date: Option<String>,
    pub title: Option<String>,
    pub fields: Option<Vec<String>>,
    pub notes: Option<Vec<String>>,
    pub data: Option<Vec<Vec<String>>>,
}

/// 證交所 exchangeReport/STOCK_DAY
pub struct StockDay {
    base_url: String,
}

impl StockDay {
    pub fn new(base_url: &str) -> Self {
        let mut base_url = base_url.trim().to_string();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        StockDay { base_url }
    }

    fn url(&self, stock_symbol: &str, month: YearMonth) -> String {
        format!(
            "{}exchangeReport/STOCK_DAY?response=json&date={}{:02}01&stockNo={}",
            self.base_url, month.year, month.month, stock_symbol
        )
    }
}

impl Default for StockDay {
    fn default() -> Self {
        StockDay::new(twse::DEFAULT_BASE_URL)
    }
}

#[async_trait]
impl MonthlyQuoteSource for StockDay {
    /// 抓取個股某個月份的每日成交資訊
    async fn fetch_month(
        &self,
        stock_symbol: &str,
        month: YearMonth,
    ) -> Result<Vec<DailyRecord>, FetchError> {
        let url = self.url(stock_symbol, month);
        let body = http::get(&url, Some(twse::build_headers()))
            .await
            .map_err(|why| FetchError::Transport(format!("{:?}", why)))?;

        parse_response(&body, month)
    }
}

/// stat 不是 OK 時（例如「很抱歉，沒有符合條件的資料!」）視為該月沒有資料
fn parse_response(body: &str, month: YearMonth) -> Result<Vec<DailyRecord>, FetchError> {
    let res = serde_json::from_str::<StockDayResponse>(body).map_err(|why| {
        FetchError::Malformed(format!("Failed to parse STOCK_DAY json because {:?}", why))
    })?;

    let stat = match &res.stat {
        None => {
            return Err(FetchError::Malformed(
                "STOCK_DAY.stat is missing".to_string(),
            ))
        }
        Some(stat) => stat.trim().to_uppercase(),
    };

    if stat != "OK" {
        logging::debug_file_async(format!("STOCK_DAY {} stat: {}", month, stat));
        return Ok(Vec::new());
    }

    if let Some(date) = res.date.as_deref() {
        match NaiveDate::parse_from_str(date, "%Y%m%d") {
            Ok(d) if YearMonth::of(&d) != month => {
                logging::warn_file_async(format!(
                    "STOCK_DAY answered {} while {} was requested",
                    YearMonth::of(&d),
                    month
                ));
            }
            Ok(_) => {}
            Err(why) => {
                logging::warn_file_async(format!(
                    "STOCK_DAY.date '{}' is not yyyymmdd: {:?}",
                    date, why
                ));
            }
        }
    }

    let rows = res.data.unwrap_or_default();
    let mut records = Vec::with_capacity(rows.len());
    for item in &rows {
        let record = to_daily_record(item).map_err(|why| {
            FetchError::Malformed(format!("Failed to convert row {:?} because {:?}", item, why))
        })?;
        records.push(record);
    }

    Ok(records)
}

fn to_daily_record(item: &[String]) -> Result<DailyRecord> {
    if item.len() != FIELD_COUNT {
        return Err(anyhow!(
            "expected {} columns but got {}",
            FIELD_COUNT,
            item.len()
        ));
    }

    let date = datetime::parse_taiwan_date(&item[0])
        .ok_or_else(|| anyhow!("'{}' is not a ROC date", item[0]))?;

    Ok(DailyRecord {
        date,
        capacity: text::parse_i64(&item[1], None)?,
        turnover: text::parse_i64(&item[2], None)?,
        open: text::parse_optional_decimal(&item[3], None)?,
        high: text::parse_optional_decimal(&item[4], None)?,
        low: text::parse_optional_decimal(&item[5], None)?,
        close: text::parse_optional_decimal(&item[6], None)?,
        // X 表示除權息，+ 只是正號
        change: text::parse_optional_decimal(&item[7], Some(vec!['X', '+']))?,
        transaction: text::parse_i64(&item[8], None)?,
    })
}
