use std::fmt;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// 年月，月份為 1 ~ 12
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) {
            Some(YearMonth { year, month })
        } else {
            None
        }
    }

    pub fn of<D: Datelike>(date: &D) -> Self {
        YearMonth {
            year: date.year(),
            month: date.month(),
        }
    }

    /// 上一個月，一月會退回前一年的十二月；年份已到 i32 下限時回傳 None
    pub fn previous(self) -> Option<Self> {
        if self.month <= 1 {
            Some(YearMonth {
                year: self.year.checked_sub(1)?,
                month: 12,
            })
        } else {
            Some(YearMonth {
                year: self.year,
                month: self.month - 1,
            })
        }
    }

    /// year * 12 + month，可用來比較先後
    #[cfg(test)]
    pub fn ordinal(self) -> i64 {
        i64::from(self.year) * 12 + i64::from(self.month)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{:02}", self.year, self.month)
    }
}

/// 個股單日成交資訊
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyRecord {
    /// 日期
    pub date: NaiveDate,
    /// 成交股數
    pub capacity: i64,
    /// 成交金額
    pub turnover: i64,
    /// 開盤價，當日無成交時為 None
    pub open: Option<Decimal>,
    /// 最高價
    pub high: Option<Decimal>,
    /// 最低價
    pub low: Option<Decimal>,
    /// 收盤價
    pub close: Option<Decimal>,
    /// 漲跌價差
    pub change: Option<Decimal>,
    /// 成交筆數
    pub transaction: i64,
}

/// 遇到沒有資料的月份時的處理方式
#[derive(
    Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum EmptyMonthPolicy {
    /// 第一個空月份即視為歷史資料的盡頭
    #[default]
    Stop,
    /// 略過空月份，一路往回抓到最早年份
    Continue,
}
