use chrono::NaiveDate;
use hashbrown::HashMap;

use crate::declare::DailyRecord;

/// 單一股票的歷史成交資訊，以日期為鍵、保留寫入順序
///
/// 同一天重複寫入時以後寫入者為準，位置不變。
#[derive(Debug, Default)]
pub struct History {
    records: Vec<DailyRecord>,
    index: HashMap<NaiveDate, usize>,
}

impl History {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn insert(&mut self, record: DailyRecord) {
        match self.index.get(&record.date) {
            Some(&i) => self.records[i] = record,
            None => {
                self.index.insert(record.date, self.records.len());
                self.records.push(record);
            }
        }
    }

    /// 併入一整個月的資料
    pub fn merge(&mut self, records: impl IntoIterator<Item = DailyRecord>) {
        for record in records {
            self.insert(record);
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[cfg(test)]
    pub fn get(&self, date: &NaiveDate) -> Option<&DailyRecord> {
        self.index.get(date).map(|&i| &self.records[i])
    }

    /// 依寫入順序
    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = &DailyRecord> {
        self.records.iter()
    }

    /// 依日期由舊到新
    pub fn sorted(&self) -> Vec<&DailyRecord> {
        let mut sorted: Vec<&DailyRecord> = self.records.iter().collect();
        sorted.sort_by_key(|r| r.date);
        sorted
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use rust_decimal::Decimal;

    use super::*;

    pub(crate) fn record(date: NaiveDate, close: i64) -> DailyRecord {
        DailyRecord {
            date,
            capacity: 1_000,
            turnover: close * 1_000,
            open: Some(Decimal::new(close, 0)),
            high: Some(Decimal::new(close, 0)),
            low: Some(Decimal::new(close, 0)),
            close: Some(Decimal::new(close, 0)),
            change: Some(Decimal::ZERO),
            transaction: 10,
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_merge_keeps_insertion_order_and_sorts() {
        let mut history = History::new();
        history.merge(vec![record(day(2024, 5, 2), 10), record(day(2024, 5, 3), 11)]);
        history.merge(vec![record(day(2024, 4, 1), 9)]);

        let inserted: Vec<NaiveDate> = history.iter().map(|r| r.date).collect();
        assert_eq!(
            inserted,
            vec![day(2024, 5, 2), day(2024, 5, 3), day(2024, 4, 1)]
        );

        let sorted: Vec<NaiveDate> = history.sorted().iter().map(|r| r.date).collect();
        assert_eq!(sorted, vec![day(2024, 4, 1), day(2024, 5, 2), day(2024, 5, 3)]);
    }

    #[test]
    fn test_last_write_wins() {
        let mut history = History::new();
        history.insert(record(day(2024, 5, 2), 10));
        history.insert(record(day(2024, 5, 3), 11));
        history.insert(record(day(2024, 5, 2), 12));

        assert_eq!(history.len(), 2);
        assert_eq!(
            history.get(&day(2024, 5, 2)).unwrap().close,
            Some(Decimal::new(12, 0))
        );
        assert_eq!(history.iter().next().unwrap().date, day(2024, 5, 2));
    }

    #[test]
    fn test_empty() {
        let history = History::new();
        assert!(history.is_empty());
        assert!(history.sorted().is_empty());
    }
}
