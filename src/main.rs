use std::time::Duration;

use anyhow::Result;
use clap::Parser;

use chromadrive::config::{self, Target};
use chromadrive::driver::Driver;
use chromadrive::logging;

/// Drive synthetic traffic at a color-routed API server.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Address of the server under test.
    #[arg(long, value_name = "HOST:PORT", default_value = "127.0.0.1:80")]
    host: String,

    /// Path to query on the server.
    #[arg(long, default_value = "api")]
    path: String,

    /// Target requests per second, between 1 and 100 inclusive. Best effort.
    #[arg(
        long,
        default_value_t = config::DEFAULT_RPS,
        value_parser = clap::value_parser!(u32).range(i64::from(config::MIN_RPS)..=i64::from(config::MAX_RPS))
    )]
    rps: u32,

    /// Error rates by color, formatted as `color:rate` (e.g. `blue:0.01`).
    /// May be passed multiple times or comma-separated.
    #[arg(
        long = "error-rates",
        value_name = "COLOR:RATE",
        value_delimiter = ',',
        value_parser = config::parse_rate_entry
    )]
    error_rates: Vec<(String, f64)>,

    /// Latency targets by color, formatted as `color:duration`
    /// (e.g. `blue:24ms`). May be passed multiple times or comma-separated.
    #[arg(
        long = "latencies",
        value_name = "COLOR:DURATION",
        value_delimiter = ',',
        value_parser = config::parse_latency_entry
    )]
    latencies: Vec<(String, Duration)>,

    /// Log verbosity: trace, debug, info, warn or error.
    #[arg(
        long,
        env = "LOG_LEVEL",
        default_value = "info",
        value_parser = logging::Level::from_flag
    )]
    log_level: logging::Level,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.log_level);

    let target = Target {
        host: args.host,
        path: args.path,
        rps: args.rps,
        error_rates: args.error_rates.into_iter().collect(),
        latencies: args.latencies.into_iter().collect(),
    };

    Driver::new(target)?.run().await
}
