use std::iter;

use crate::declare::YearMonth;

pub const DEFAULT_FLOOR_YEAR: i32 = 1900;

/// 從 `start` 開始逐月往回，年份小於 `floor_year` 即停止（不會輸出該月）
///
/// 每次呼叫都會得到一條新的序列，彼此不共用狀態。
pub fn months_back(start: YearMonth, floor_year: i32) -> impl Iterator<Item = YearMonth> {
    iter::successors(Some(start), |ym| ym.previous())
        .take_while(move |ym| ym.year >= floor_year)
}
