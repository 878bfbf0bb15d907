//! Leveled console logging.
//!
//! Writes timestamped text lines to stderr. The minimum level comes from
//! `init` (normally the `--log-level` flag); if `init` was never called it
//! falls back to the `LOG_LEVEL` environment variable, defaulting to info.

use std::sync::OnceLock;

use chrono::Utc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
}

impl Level {
    pub fn from_env() -> Self {
        match std::env::var("LOG_LEVEL").as_deref() {
            Ok("trace") => Level::Trace,
            Ok("debug") => Level::Debug,
            Ok("info") => Level::Info,
            Ok("warn") => Level::Warn,
            Ok("error") => Level::Error,
            _ => Level::Info,
        }
    }

    /// Parse a `--log-level` flag value.
    pub fn from_flag(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(Level::Trace),
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" => Ok(Level::Warn),
            "error" => Ok(Level::Error),
            other => Err(format!("unknown log level: {}", other)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
        }
    }
}

static MIN_LEVEL: OnceLock<Level> = OnceLock::new();

/// Set the minimum level for the process. Later calls are ignored.
pub fn init(level: Level) {
    let _ = MIN_LEVEL.set(level);
}

fn min_level() -> Level {
    *MIN_LEVEL.get_or_init(Level::from_env)
}

/// RFC3339 timestamp with milliseconds
fn ts_now() -> String {
    Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

fn emit(level: Level, msg: &str) {
    if level < min_level() {
        return;
    }
    eprintln!("{} {} {}", ts_now(), level.as_str().to_uppercase(), msg);
}

pub fn trace(msg: &str) {
    emit(Level::Trace, msg);
}

pub fn debug(msg: &str) {
    emit(Level::Debug, msg);
}

pub fn info(msg: &str) {
    emit(Level::Info, msg);
}

pub fn warn(msg: &str) {
    emit(Level::Warn, msg);
}

pub fn error(msg: &str) {
    emit(Level::Error, msg);
}
