//! Host gesture client.
//!
//! Reads landmark frames as JSON lines on stdin (one per perception frame),
//! samples the newest one on a fixed tick, classifies and debounces it, and
//! fires committed commands at the LED server.
//!
//! ```text
//! hand-tracker ──stdin──▶ gesture-client ──GET /led?cmd=..──▶ pinchlink
//! ```

use core::time::Duration;
use std::io::BufReader;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::info;

use pinchlink::adapters::log_sink::LogEventSink;
use pinchlink::adapters::time::SystemClock;
use pinchlink::app::service::GesturePipeline;
use pinchlink::client::run_loop;
use pinchlink::client::sender::FireAndForget;
use pinchlink::client::source::JsonLinesSource;
use pinchlink::config::SystemConfig;
use pinchlink::gesture::debounce::DebounceConfig;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Policy {
    /// Full-window majority vote over distance buckets.
    Majority,
    /// Two pinch pulses toggle the LED.
    DoublePulse,
}

#[derive(Parser, Debug)]
#[command(name = "gesture-client", about = "Gesture-to-LED command client")]
struct Cli {
    /// JSON config file; defaults are used when omitted.
    #[arg(long)]
    config: Option<std::path::PathBuf>,

    /// Override `client.endpoint` (`host:port`).
    #[arg(long)]
    server: Option<String>,

    /// Override the debounce policy (keeps configured window / cooldown
    /// only when the policy matches).
    #[arg(long, value_enum)]
    policy: Option<Policy>,

    /// Override `client.sample_interval_ms`.
    #[arg(long)]
    interval_ms: Option<u32>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pinchlink=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = SystemConfig::load_or_default(cli.config.as_deref())
        .map_err(pinchlink::error::Error::from)
        .context("loading config")?;
    let client = &mut config.client;

    if let Some(server) = &cli.server {
        client.endpoint = heapless::String::try_from(server.as_str())
            .map_err(|_| anyhow::anyhow!("--server longer than 64 bytes"))?;
    }
    if let Some(ms) = cli.interval_ms {
        client.sample_interval_ms = ms;
    }
    let is_majority = matches!(client.debounce, DebounceConfig::Majority { .. });
    match cli.policy {
        Some(Policy::Majority) if !is_majority => {
            client.debounce = DebounceConfig::Majority {
                window: 3,
                map: Default::default(),
            };
        }
        Some(Policy::DoublePulse) if is_majority => {
            client.debounce = DebounceConfig::DoublePulse { cooldown_ms: 500 };
        }
        _ => {}
    }
    config
        .validate()
        .map_err(pinchlink::error::Error::from)
        .context("validating overrides")?;

    let client = &config.client;
    info!(
        "gesture-client v{} -> {} ({:?}, every {} ms)",
        env!("CARGO_PKG_VERSION"),
        client.endpoint,
        client.debounce,
        client.sample_interval_ms
    );

    let mut transport = FireAndForget::spawn(&client.endpoint, client.send_timeout_ms)
        .with_context(|| format!("resolving {}", client.endpoint))?;
    let mut pipeline = GesturePipeline::new(client);
    let mut source = JsonLinesSource::spawn(BufReader::new(std::io::stdin()))
        .context("starting landmark reader")?;
    let clock = SystemClock::new();
    let mut sink = LogEventSink::new();

    let summary = futures_lite::future::block_on(run_loop(
        &mut pipeline,
        &mut source,
        &mut transport,
        &mut sink,
        &clock,
        Duration::from_millis(u64::from(client.sample_interval_ms)),
    ));

    transport.shutdown();
    info!(
        "gesture-client done: {} ticks, {} commands, {} bad lines",
        summary.ticks,
        summary.committed,
        source.bad_lines()
    );
    Ok(())
}
