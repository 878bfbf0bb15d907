//! Request plan: the URL and header set every dispatched request shares.

use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use url::Url;

use crate::config::Target;

/// Built once per run and reused read-only by every request.
#[derive(Debug, Clone)]
pub struct RequestPlan {
    pub url: Url,
    pub headers: HeaderMap,
}

/// Strip an explicit default HTTP port so the wire form matches a bare-host
/// URL. Exact-suffix match only: hosts that merely end in `8` or `0` and
/// non-default ports pass through untouched.
pub fn normalize_host(host: &str) -> &str {
    host.strip_suffix(":80").unwrap_or(host)
}

/// Derive the plan from a validated target.
///
/// Each error-rate entry becomes an `x-<color>-error` header with the rate
/// as a fixed-point decimal, and each latency entry an `x-<color>-delay`
/// header with the whole-millisecond count.
pub fn build_plan(target: &Target) -> Result<RequestPlan> {
    let host = normalize_host(&target.host);
    let url = Url::parse(&format!("http://{}/{}", host, target.path))
        .with_context(|| format!("bad target url (host {}, path {})", target.host, target.path))?;

    let mut headers = HeaderMap::new();
    for (color, rate) in &target.error_rates {
        headers.insert(
            header_name(color, "error")?,
            HeaderValue::from_str(&format!("{:.6}", rate))
                .with_context(|| format!("bad error-rate value for color {}", color))?,
        );
    }
    for (color, latency) in &target.latencies {
        headers.insert(
            header_name(color, "delay")?,
            HeaderValue::from_str(&latency.as_millis().to_string())
                .with_context(|| format!("bad latency value for color {}", color))?,
        );
    }

    Ok(RequestPlan { url, headers })
}

fn header_name(color: &str, kind: &str) -> Result<HeaderName> {
    HeaderName::from_bytes(format!("x-{}-{}", color, kind).as_bytes())
        .with_context(|| format!("color {} is not usable in a header name", color))
}
