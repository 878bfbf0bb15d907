//! Synthetic traffic driver for color-routed API servers.
//!
//! Paces HTTP GET requests at a target rate against a single endpoint,
//! attaching `x-<color>-error` and `x-<color>-delay` headers that tell the
//! server under test which error rates and latencies to simulate for each
//! deployment color. The driver itself never retries and never stops; it
//! runs until the process is killed.

pub mod config;
pub mod driver;
pub mod logging;
pub mod request;
