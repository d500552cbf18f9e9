/// 單一股票的歷史資料暫存
pub mod history;
/// 逐月往回的年月序列
pub mod month;
/// 回補個股每日成交資訊並輸出 csv
pub mod quote;
