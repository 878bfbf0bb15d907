//! The dispatch loop: paces requests at the target rate and fires each one
//! as an independent task.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::config::Target;
use crate::logging;
use crate::request::{build_plan, RequestPlan};

/// Client-side timeout derived from the configured latency targets.
///
/// A request whose injected delay is part of the test must never be cut off
/// by our own client, so the deadline is ten times the largest configured
/// latency, floored at one second for unthrottled runs.
pub fn client_timeout(latencies: &BTreeMap<String, Duration>) -> Duration {
    let max_latency = latencies.values().copied().max().unwrap_or(Duration::ZERO);
    (max_latency * 10).max(Duration::from_secs(1))
}

/// A progress line is due whenever the dispatch count crosses a multiple of
/// ten seconds' worth of requests.
fn progress_due(sent: u64, rps: u32) -> bool {
    sent % (u64::from(rps) * 10) == 0
}

pub struct Driver {
    target: Target,
    plan: RequestPlan,
    timeout: Duration,
    client: Client,
    sent: Arc<AtomicU64>,
}

impl Driver {
    pub fn new(target: Target) -> Result<Self> {
        let plan = build_plan(&target)?;
        let timeout = client_timeout(&target.latencies);
        let client = Client::builder()
            .timeout(timeout)
            .default_headers(plan.headers.clone())
            .build()
            .context("building http client")?;
        Ok(Self {
            target,
            plan,
            timeout,
            client,
            sent: Arc::new(AtomicU64::new(0)),
        })
    }

    /// Handle on the dispatch counter. Best-effort telemetry only; relaxed
    /// increments may be observed slightly out of order.
    pub fn sent_counter(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.sent)
    }

    fn announce(&self) {
        logging::info(&format!(
            "Sending {} RPS to {}",
            self.target.rps, self.plan.url
        ));
        if !self.target.error_rates.is_empty() {
            logging::info("Error-rate targets:");
        }
        for (color, rate) in &self.target.error_rates {
            logging::info(&format!("  {}: {:.2}", color, rate));
        }
        if !self.target.latencies.is_empty() {
            logging::info("Latency targets:");
        }
        for (color, latency) in &self.target.latencies {
            logging::info(&format!("  {}: {}ms", color, latency.as_millis()));
        }
        logging::info(&format!("Timeout: {}ms", self.timeout.as_millis()));
    }

    /// Run the dispatch loop. Never returns; the process is expected to be
    /// killed externally.
    ///
    /// Each tick spawns one request and moves on without waiting for it.
    /// No cap on in-flight requests, no retry: one tick, one attempt.
    pub async fn run(&self) -> Result<()> {
        self.announce();

        let period = Duration::from_secs(1) / self.target.rps;
        // first fire one full period after start, then fixed-period ticks
        // with no burst catch-up after a stall
        let mut ticks = interval_at(Instant::now() + period, period);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticks.tick().await;

            let sent = self.sent.fetch_add(1, Ordering::Relaxed) + 1;
            if progress_due(sent, self.target.rps) {
                logging::info(&format!("{} requests sent", sent));
            }

            let request = self.client.get(self.plan.url.clone());
            tokio::spawn(async move {
                match request.send().await {
                    Ok(response) => {
                        // drain the body so the connection is released
                        let _ = response.bytes().await;
                    }
                    Err(err) => logging::error(&err.to_string()),
                }
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn latencies(entries: &[(&str, Duration)]) -> BTreeMap<String, Duration> {
        entries
            .iter()
            .map(|(color, latency)| (color.to_string(), *latency))
            .collect()
    }

    #[test]
    fn timeout_floors_at_one_second() {
        assert_eq!(client_timeout(&BTreeMap::new()), Duration::from_secs(1));
        // 24ms * 10 = 240ms, still under the floor
        let small = latencies(&[("blue", Duration::from_millis(24))]);
        assert_eq!(client_timeout(&small), Duration::from_secs(1));
    }

    #[test]
    fn timeout_scales_with_largest_latency() {
        let slow = latencies(&[
            ("blue", Duration::from_millis(150)),
            ("green", Duration::from_millis(40)),
        ]);
        assert_eq!(client_timeout(&slow), Duration::from_millis(1500));
    }

    #[test]
    fn timeout_exact_boundary() {
        let boundary = latencies(&[("blue", Duration::from_millis(100))]);
        assert_eq!(client_timeout(&boundary), Duration::from_secs(1));
    }

    #[test]
    fn progress_fires_every_ten_seconds_of_dispatches() {
        assert!(!progress_due(1, 20));
        assert!(!progress_due(199, 20));
        assert!(progress_due(200, 20));
        assert!(progress_due(400, 20));
        assert!(progress_due(10, 1));
    }

    #[test]
    fn driver_builds_from_a_valid_target() {
        let target = Target {
            host: "127.0.0.1:80".to_string(),
            path: "api".to_string(),
            rps: 20,
            error_rates: BTreeMap::from([("blue".to_string(), 0.01)]),
            latencies: latencies(&[("blue", Duration::from_millis(24))]),
        };
        let driver = Driver::new(target).unwrap();
        assert_eq!(driver.timeout, Duration::from_secs(1));
        assert_eq!(driver.plan.url.as_str(), "http://127.0.0.1/api");
        assert_eq!(driver.sent_counter().load(Ordering::Relaxed), 0);
    }
}
