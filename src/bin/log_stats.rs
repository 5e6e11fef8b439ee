//! TCP consumer that echoes received log lines and prints running statistics.
//!
//! Accepts a single client. A report is printed every `N` lines, and every
//! `T` seconds when something arrived since the last report.

use std::io::{self, BufReader};
use std::net::TcpListener;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use fanout_logger::destinations::socket::validate_port;
use fanout_logger::stats::{for_each_line, StatsCollector};
use parking_lot::Mutex;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "log-stats", version, about = "Collect statistics over received log lines")]
struct Cli {
    /// Port to listen on
    #[arg(value_parser = parse_port)]
    port: u16,

    /// Print statistics after every N messages
    #[arg(value_parser = clap::value_parser!(u64).range(1..))]
    every: u64,

    /// Print statistics every T seconds if anything changed
    #[arg(value_parser = clap::value_parser!(u64).range(1..))]
    interval: u64,

    /// Print reports as JSON
    #[arg(long)]
    json: bool,
}

fn parse_port(value: &str) -> Result<u16, String> {
    let port: u32 = value
        .parse()
        .map_err(|_| format!("'{}' is not a port number", value))?;
    validate_port(port).map_err(|e| e.to_string())
}

#[derive(Debug, Clone, Copy)]
enum Trigger {
    Count,
    Interval,
}

fn report(stats: &mut StatsCollector, json: bool, trigger: Trigger) {
    let snapshot = stats.snapshot();
    if json {
        match serde_json::to_string(&snapshot) {
            Ok(text) => println!("{}", text),
            Err(e) => tracing::error!(error = %e, "failed to serialize statistics"),
        }
    } else {
        println!("\n{}", snapshot);
    }
    match trigger {
        Trigger::Count => stats.mark_count_reported(),
        Trigger::Interval => stats.mark_interval_reported(),
    }
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let listener = TcpListener::bind(("0.0.0.0", cli.port))
        .with_context(|| format!("binding port {}", cli.port))?;
    println!("Listening on port {}...", cli.port);

    let (stream, peer) = listener.accept().context("accepting client")?;
    println!("Client connected.");
    tracing::debug!(%peer, "client connected");

    let stats = Mutex::new(StatsCollector::new());
    let running = AtomicBool::new(true);
    let interval = Duration::from_secs(cli.interval);

    thread::scope(|scope| {
        scope.spawn(|| {
            let mut last_report = Instant::now();
            while running.load(Ordering::Acquire) {
                thread::sleep(Duration::from_secs(1));
                if last_report.elapsed() < interval {
                    continue;
                }
                let mut stats = stats.lock();
                if stats.has_changed() {
                    report(&mut stats, cli.json, Trigger::Interval);
                    last_report = Instant::now();
                }
            }
        });

        let received = for_each_line(BufReader::new(stream), |line| {
            println!("{}", line);

            let mut stats = stats.lock();
            stats.record(line);
            if stats.since_report() >= cli.every {
                report(&mut stats, cli.json, Trigger::Count);
            }
        });
        if let Err(e) = received {
            tracing::warn!(error = %e, "connection read failed");
        }

        running.store(false, Ordering::Release);
    });

    println!("Client disconnected.");
    Ok(())
}
