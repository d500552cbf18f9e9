use reqwest::header::{HeaderMap, HeaderValue};

use crate::util::http;

/// 個股日成交資訊
pub mod stock_day;

pub const DEFAULT_BASE_URL: &str = "https://www.twse.com.tw/";

pub(super) fn build_headers() -> HeaderMap {
    let mut h = HeaderMap::with_capacity(3);
    h.insert(
        "Referer",
        HeaderValue::from_static("https://www.twse.com.tw/zh/trading/historical/stock-day.html"),
    );
    h.insert("X-Requested-With", HeaderValue::from_static("XMLHttpRequest"));
    if let Ok(ua) = HeaderValue::from_str(&http::user_agent::gen_random_ua()) {
        h.insert("User-Agent", ua);
    }
    h
}
