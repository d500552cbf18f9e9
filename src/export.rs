use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use rust_decimal::Decimal;

use crate::backfill::history::History;

pub const HEADERS: [&str; 9] = [
    "date",
    "capacity",
    "turnover",
    "open",
    "high",
    "low",
    "close",
    "change",
    "transaction",
];

/// 輸出檔位置 `<output_dir>/<symbol>.csv`
pub fn output_path(output_dir: &Path, stock_symbol: &str) -> PathBuf {
    output_dir.join(format!("{}.csv", stock_symbol))
}

fn optional(value: Option<Decimal>) -> String {
    value.map(|d| d.to_string()).unwrap_or_default()
}

/// 依日期由舊到新輸出 csv，日期格式為 yyyymmdd，無成交價的欄位留空
pub fn to_csv(history: &History) -> Result<String> {
    let mut wtr = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(vec![]);

    wtr.write_record(HEADERS)?;

    for r in history.sorted() {
        wtr.write_record([
            &r.date.format("%Y%m%d").to_string(),
            &r.capacity.to_string(),
            &r.turnover.to_string(),
            &optional(r.open),
            &optional(r.high),
            &optional(r.low),
            &optional(r.close),
            &optional(r.change),
            &r.transaction.to_string(),
        ])?;
    }

    let bytes = wtr.into_inner().context("Failed to flush csv writer")?;
    String::from_utf8(bytes).context("csv output is not utf-8")
}

/// 寫入 csv，目錄不存在時會先建立
///
/// 沒有任何資料時回傳 false，不會建立目錄或檔案
pub fn write_history(history: &History, path: &Path) -> Result<bool> {
    if history.is_empty() {
        return Ok(false);
    }

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;
    }

    let content = to_csv(history)?;
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(true)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::{backfill::history::tests::record, declare::DailyRecord};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_to_csv_layout() {
        let mut history = History::new();
        history.insert(DailyRecord {
            date: day(2024, 5, 3),
            capacity: 7_128_114,
            turnover: 1_182_563_925,
            open: Some(dec!(165.50)),
            high: Some(dec!(166.50)),
            low: Some(dec!(165.00)),
            close: Some(dec!(166.30)),
            change: Some(dec!(1.90)),
            transaction: 9_215,
        });
        history.insert(DailyRecord {
            date: day(2024, 5, 2),
            capacity: 6_016_227,
            turnover: 989_015_000,
            open: None,
            high: None,
            low: None,
            close: None,
            change: Some(dec!(-0.45)),
            transaction: 8_054,
        });

        let csv = to_csv(&history).unwrap();
        assert_eq!(
            csv,
            "date,capacity,turnover,open,high,low,close,change,transaction\n\
             20240502,6016227,989015000,,,,,-0.45,8054\n\
             20240503,7128114,1182563925,165.50,166.50,165.00,166.30,1.90,9215\n"
        );
    }

    #[test]
    fn test_write_history_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = output_path(&dir.path().join("data").join("tw"), "0050");

        let mut history = History::new();
        history.insert(record(day(2024, 5, 2), 10));

        assert!(write_history(&history, &path).unwrap());
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("date,capacity,turnover"));
        assert_eq!(content.lines().count(), 2);
    }

    #[test]
    fn test_write_history_skips_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = output_path(&dir.path().join("data"), "0050");

        assert!(!write_history(&History::new(), &path).unwrap());
        assert!(!path.exists());
        assert!(!dir.path().join("data").exists());
    }

    #[test]
    fn test_round_trip_order() {
        let mut history = History::new();
        for (m, d) in [(5, 31), (3, 1), (4, 15), (5, 2)] {
            history.insert(record(day(2024, m, d), 10 + d as i64));
        }

        let csv = to_csv(&history).unwrap();
        let mut rdr = csv::Reader::from_reader(csv.as_bytes());
        let mut dates: Vec<NaiveDate> = rdr
            .records()
            .map(|r| NaiveDate::parse_from_str(&r.unwrap()[0], "%Y%m%d").unwrap())
            .collect();
        let as_written = dates.clone();
        dates.sort();

        let expected: Vec<NaiveDate> = history.sorted().iter().map(|r| r.date).collect();
        assert_eq!(as_written, expected);
        assert_eq!(dates, expected);
    }
}
