use std::{
    env,
    fs::{self, OpenOptions},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    thread,
    time::Duration,
};

use anyhow::{anyhow, Context, Result};
use chrono::Local;
use crossbeam_channel::{bounded, unbounded, Sender};
use log::{Level, LevelFilter};
use once_cell::sync::{Lazy, OnceCell};

const LOG_LEVEL: &str = "LOG_LEVEL";
const LOG_TO_FILE: &str = "LOG_TO_FILE";

static LOGGER: OnceCell<Logger> = OnceCell::new();

/// 尚未呼叫 init 之前，只輸出到 console
static FALLBACK: Lazy<Logger> = Lazy::new(|| Logger {
    level: LevelFilter::Info,
    file_writer: None,
});

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: LevelFilter,
    /// 另外寫一份到檔案
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: LevelFilter::Info,
            file: None,
        }
    }
}

impl LogConfig {
    /// 從 env 中讀取 LOG_LEVEL 與 LOG_TO_FILE
    pub fn from_env() -> Self {
        let level = env::var(LOG_LEVEL)
            .ok()
            .and_then(|l| parse_level(&l))
            .unwrap_or(LevelFilter::Info);
        let file = env::var(LOG_TO_FILE)
            .ok()
            .filter(|f| !f.trim().is_empty())
            .map(PathBuf::from);

        LogConfig { level, file }
    }
}

/// 接受 python logging 的等級名稱，也接受 log crate 的名稱
pub fn parse_level(name: &str) -> Option<LevelFilter> {
    match name.trim().to_uppercase().as_str() {
        "CRITICAL" | "ERROR" => Some(LevelFilter::Error),
        "WARNING" | "WARN" => Some(LevelFilter::Warn),
        "INFO" => Some(LevelFilter::Info),
        "DEBUG" => Some(LevelFilter::Debug),
        "TRACE" | "NOSET" | "NOTSET" => Some(LevelFilter::Trace),
        "OFF" => Some(LevelFilter::Off),
        _ => None,
    }
}

enum Command {
    Line(String),
    Flush(Sender<()>),
}

pub struct Logger {
    level: LevelFilter,
    file_writer: Option<Sender<Command>>,
}

impl Logger {
    fn new(config: &LogConfig) -> Result<Self> {
        let file_writer = match &config.file {
            Some(path) => Some(Self::create_writer(path)?),
            None => None,
        };

        Ok(Logger {
            level: config.level,
            file_writer,
        })
    }

    fn create_writer(log_path: &Path) -> Result<Sender<Command>> {
        if let Some(dir) = log_path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)
            .with_context(|| format!("Failed to open log file {}", log_path.display()))?;
        let (tx, rx) = unbounded::<Command>();

        // 寫入檔案的操作使用另一個線程處理
        thread::spawn(move || {
            let mut writer = BufWriter::new(file);

            for received in &rx {
                match received {
                    Command::Line(line) => {
                        if let Err(why) = writeln!(writer, "{}", line) {
                            error_console(format!(
                                "Failed to write to log file. because:{:#?}\r\nmsg:{}",
                                why, line
                            ));
                        }

                        if rx.is_empty() {
                            if let Err(why) = writer.flush() {
                                error_console(format!(
                                    "Failed to flush log file. because:{:#?}",
                                    why
                                ));
                            }
                        }
                    }
                    Command::Flush(ack) => {
                        if let Err(why) = writer.flush() {
                            error_console(format!("Failed to flush log file. because:{:#?}", why));
                        }
                        let _ = ack.send(());
                    }
                }
            }
        });

        Ok(tx)
    }

    fn log(&self, level: Level, msg: String) {
        if level > self.level {
            return;
        }

        let line = format!("{} {} {}", Local::now().format("%F %X%.6f"), level, msg);
        println!("{}", line);

        if let Some(writer) = &self.file_writer {
            if let Err(why) = writer.send(Command::Line(line)) {
                error_console(why.to_string());
            }
        }
    }

    /// 等待背景線程把檔案寫完
    fn flush(&self) {
        if let Some(writer) = &self.file_writer {
            let (ack_tx, ack_rx) = bounded::<()>(1);
            if writer.send(Command::Flush(ack_tx)).is_ok() {
                let _ = ack_rx.recv_timeout(Duration::from_secs(5));
            }
        }
    }
}

/// 在程式啟動時呼叫一次；重複呼叫會回傳錯誤，不會多掛一組輸出
pub fn init(config: LogConfig) -> Result<()> {
    if LOGGER.get().is_some() {
        return Err(anyhow!("logging has already been initialized"));
    }

    let logger = Logger::new(&config)?;
    LOGGER
        .set(logger)
        .map_err(|_| anyhow!("logging has already been initialized"))
}

fn logger() -> &'static Logger {
    LOGGER.get().unwrap_or_else(|| Lazy::force(&FALLBACK))
}

pub fn flush() {
    logger().flush();
}

pub fn info_file_async(log: String) {
    logger().log(Level::Info, log);
}

pub fn warn_file_async(log: String) {
    logger().log(Level::Warn, log);
}

pub fn error_file_async(log: String) {
    logger().log(Level::Error, log);
}

pub fn debug_file_async(log: String) {
    logger().log(Level::Debug, log);
}

pub fn error_console(log: String) {
    eprintln!(
        "{} Error {}",
        Local::now().format("%Y-%m-%d %H:%M:%S.%3f"),
        log
    );
}
