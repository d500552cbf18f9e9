use async_trait::async_trait;
use thiserror::Error;

use crate::declare::{DailyRecord, YearMonth};

/// 台灣證券交易所
pub mod twse;

/// 抓取遠端資料時可能發生的錯誤
#[derive(Debug, Error)]
pub enum FetchError {
    /// 連線、逾時或非 2xx 回應
    #[error("transport failure: {0}")]
    Transport(String),

    /// 回應內容不是預期的 JSON 或欄位格式不符
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// 依月份提供個股每日成交資訊的來源
#[async_trait]
pub trait MonthlyQuoteSource {
    /// 取回指定月份的每日成交資訊，依來源順序排列，沒有資料時回傳空集合
    async fn fetch_month(
        &self,
        stock_symbol: &str,
        month: YearMonth,
    ) -> Result<Vec<DailyRecord>, FetchError>;
}
