//! Target configuration and `color:value` list parsing.

use std::collections::BTreeMap;
use std::time::Duration;

pub const MIN_RPS: u32 = 1;
pub const MAX_RPS: u32 = 100;
pub const DEFAULT_RPS: u32 = 20;

/// Everything the driver needs to know about the server under test.
/// Built once from validated flags and never mutated afterwards.
///
/// The per-color maps are `BTreeMap`s so header emission and startup log
/// lines come out in a stable order.
#[derive(Debug, Clone)]
pub struct Target {
    pub host: String,
    pub path: String,
    pub rps: u32,
    pub error_rates: BTreeMap<String, f64>,
    pub latencies: BTreeMap<String, Duration>,
}

/// Split a `color:value` entry on the first colon, so durations like
/// `blue:1:30` fail on the value parse rather than the split.
fn split_first_colon(entry: &str) -> Result<(&str, &str), String> {
    let (color, value) = entry
        .split_once(':')
        .ok_or_else(|| format!("bad entry ({}): expected color:value", entry))?;
    if color.is_empty() {
        return Err(format!("bad entry ({}): color must not be empty", entry));
    }
    Ok((color, value))
}

/// Parse one `color:rate` entry, e.g. `blue:0.01`.
pub fn parse_rate_entry(entry: &str) -> Result<(String, f64), String> {
    let (color, value) = split_first_colon(entry)?;
    let rate: f64 = value
        .parse()
        .map_err(|err| format!("bad error rate ({}:{}): {}", color, value, err))?;
    if rate < 0.0 {
        return Err(format!("error rate ({}:{}) must be >= 0", color, value));
    }
    Ok((color.to_string(), rate))
}

/// Parse one `color:duration` entry, e.g. `blue:24ms`.
pub fn parse_latency_entry(entry: &str) -> Result<(String, Duration), String> {
    let (color, value) = split_first_colon(entry)?;
    let latency = humantime::parse_duration(value)
        .map_err(|err| format!("bad duration ({}:{}): {}", color, value, err))?;
    if latency.is_zero() {
        return Err(format!("duration ({}:{}) must be > 0", color, value));
    }
    Ok((color.to_string(), latency))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_entry_parses() {
        let (color, rate) = parse_rate_entry("blue:0.01").unwrap();
        assert_eq!(color, "blue");
        assert_eq!(rate, 0.01);
    }

    #[test]
    fn rate_entry_allows_zero() {
        let (_, rate) = parse_rate_entry("green:0").unwrap();
        assert_eq!(rate, 0.0);
    }

    #[test]
    fn rate_entry_rejects_negative() {
        let err = parse_rate_entry("blue:-0.1").unwrap_err();
        assert!(err.contains("must be >= 0"), "{}", err);
    }

    #[test]
    fn rate_entry_rejects_garbage() {
        assert!(parse_rate_entry("blue:fast").is_err());
        assert!(parse_rate_entry("blue").is_err());
        assert!(parse_rate_entry(":0.5").is_err());
    }

    #[test]
    fn latency_entry_parses() {
        let (color, latency) = parse_latency_entry("blue:24ms").unwrap();
        assert_eq!(color, "blue");
        assert_eq!(latency, Duration::from_millis(24));
    }

    #[test]
    fn latency_entry_parses_seconds() {
        let (_, latency) = parse_latency_entry("green:2s").unwrap();
        assert_eq!(latency, Duration::from_secs(2));
    }

    #[test]
    fn latency_entry_rejects_zero() {
        let err = parse_latency_entry("blue:0s").unwrap_err();
        assert!(err.contains("must be > 0"), "{}", err);
    }

    #[test]
    fn latency_entry_rejects_garbage() {
        assert!(parse_latency_entry("blue:soon").is_err());
        assert!(parse_latency_entry("blue").is_err());
    }

    #[test]
    fn value_may_contain_colons() {
        // the split is on the first colon only; the remainder is the value
        let err = parse_latency_entry("blue:1:30").unwrap_err();
        assert!(err.contains("bad duration (blue:1:30)"), "{}", err);
    }

    #[test]
    fn later_entries_win_when_collected() {
        let entries = vec![
            parse_rate_entry("blue:0.1").unwrap(),
            parse_rate_entry("blue:0.2").unwrap(),
        ];
        let rates: BTreeMap<String, f64> = entries.into_iter().collect();
        assert_eq!(rates["blue"], 0.2);
    }
}
