use std::{
    env, fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::{Context, Result};
use config::{Config as config_config, File as config_file};
use serde::{Deserialize, Serialize};

use crate::{
    backfill::month::DEFAULT_FLOOR_YEAR, crawler::twse::DEFAULT_BASE_URL,
    declare::EmptyMonthPolicy, logging,
};

const CONFIG_PATH: &str = "app.json";

const TWSE_BASE_URL: &str = "TWSE_BASE_URL";
const BACKFILL_OUTPUT_DIR: &str = "BACKFILL_OUTPUT_DIR";
const BACKFILL_INTERVAL_SECS: &str = "BACKFILL_INTERVAL_SECS";
const BACKFILL_FLOOR_YEAR: &str = "BACKFILL_FLOOR_YEAR";
const BACKFILL_EMPTY_MONTH: &str = "BACKFILL_EMPTY_MONTH";
const BACKFILL_SYMBOLS: &str = "BACKFILL_SYMBOLS";

#[derive(Serialize, Deserialize, Default, Debug, Clone)]
#[serde(default)]
pub struct App {
    pub backfill: Backfill,
    pub twse: Twse,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Backfill {
    pub output_dir: PathBuf,
    /// 每次請求後等待的秒數
    pub interval_secs: u64,
    pub floor_year: i32,
    pub empty_month: EmptyMonthPolicy,
    /// 使用 --batch 時依序回補的股票
    pub symbols: Vec<String>,
}

impl Default for Backfill {
    fn default() -> Self {
        Backfill {
            output_dir: PathBuf::from("data"),
            interval_secs: 5,
            floor_year: DEFAULT_FLOOR_YEAR,
            empty_month: EmptyMonthPolicy::Stop,
            symbols: ["0050", "0056", "2330", "2317", "2454"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Twse {
    pub base_url: String,
}

impl Default for Twse {
    fn default() -> Self {
        Twse {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl App {
    /// 讀取 app.json（不存在時使用預設值），再以 env 覆蓋
    pub fn get() -> Result<Self> {
        Ok(Self::load(&config_path())?.override_with_env())
    }

    fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(App::default());
        }

        let app = config_config::builder()
            .add_source(config_file::from(path))
            .build()
            .and_then(|c| c.try_deserialize::<App>())
            .with_context(|| format!("I can't read the config {}", path.display()))?;

        Ok(app)
    }

    /// 將來自於 env 的設定值覆蓋掉 json 上的設定值
    fn override_with_env(self) -> Self {
        self.override_with(|key| env::var(key).ok())
    }

    fn override_with(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(TWSE_BASE_URL) {
            self.twse.base_url = url;
        }

        if let Some(dir) = lookup(BACKFILL_OUTPUT_DIR) {
            self.backfill.output_dir = PathBuf::from(dir);
        }

        if let Some(secs) = parse_var(&lookup, BACKFILL_INTERVAL_SECS) {
            self.backfill.interval_secs = secs;
        }

        if let Some(year) = parse_var(&lookup, BACKFILL_FLOOR_YEAR) {
            self.backfill.floor_year = year;
        }

        if let Some(policy) = parse_var(&lookup, BACKFILL_EMPTY_MONTH) {
            self.backfill.empty_month = policy;
        }

        if let Some(symbols) = lookup(BACKFILL_SYMBOLS) {
            self.backfill.symbols = clean_symbols(symbols.split(','));
        }

        self
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            logging::warn_file_async(format!("Ignore {}={} because it can't be parsed", key, raw));
            None
        }
    }
}

/// 回傳設定檔的路徑
fn config_path() -> PathBuf {
    PathBuf::from(CONFIG_PATH)
}

/// 要回補哪些股票
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolSource {
    Single(String),
    /// 一行一檔的清單檔
    FileList(PathBuf),
    /// 設定檔中的清單
    Batch(Vec<String>),
}

impl SymbolSource {
    pub fn resolve(&self) -> Result<Vec<String>> {
        let symbols = match self {
            SymbolSource::Single(symbol) => vec![symbol.clone()],
            SymbolSource::FileList(path) => read_symbols(path)?,
            SymbolSource::Batch(symbols) => symbols.clone(),
        };

        Ok(clean_symbols(symbols.iter().map(String::as_str)))
    }
}

/// 回傳指定路徑清單檔中的股票代號
pub(crate) fn read_symbols(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read symbol list {}", path.display()))?;

    Ok(clean_symbols(content.lines()))
}

/// 去除空白與空行；代號只接受英數字，其餘會被當成路徑或查詢字串的一部分
fn clean_symbols<'a>(symbols: impl Iterator<Item = &'a str>) -> Vec<String> {
    symbols
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .filter(|s| {
            let valid = is_valid_symbol(s);
            if !valid {
                logging::warn_file_async(format!("Ignore invalid stock symbol '{}'", s));
            }
            valid
        })
        .map(|s| s.to_string())
        .collect()
}

fn is_valid_symbol(stock_symbol: &str) -> bool {
    !stock_symbol.is_empty() && stock_symbol.chars().all(|c| c.is_ascii_alphanumeric())
}
