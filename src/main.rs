//! Interactive front end: reads lines from stdin and logs them through the
//! dispatch worker to a file and, optionally, a TCP consumer.

use std::io::{self, BufRead};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use fanout_logger::destinations::socket::validate_port;
use fanout_logger::input::{is_exit_command, parse_input_line};
use fanout_logger::{run_dispatcher, Logger, LoggerMetrics, Severity};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "fanout-logger",
    version,
    about = "Log stdin lines to a file and an optional TCP consumer",
    after_help = "Examples:\n  fanout-logger log.txt info\n  fanout-logger log.txt warning 127.0.0.1 5000\n\n\
                  Lines may start with error:, warning: or info: to override the default level.\n\
                  Type 'exit' to stop."
)]
struct Cli {
    /// File that receives every accepted line
    log_file: PathBuf,

    /// Threshold and default message level: error, warning or info
    #[arg(value_parser = parse_level)]
    level: Severity,

    /// Host of a line-oriented TCP consumer
    #[arg(requires = "port")]
    host: Option<String>,

    /// Port of the TCP consumer (1-65535)
    #[arg(value_parser = parse_port, requires = "host")]
    port: Option<u16>,
}

fn parse_level(value: &str) -> Result<Severity, String> {
    Severity::from_keyword(value).map_err(|e| e.to_string())
}

fn parse_port(value: &str) -> Result<u16, String> {
    let port: u32 = value
        .parse()
        .map_err(|_| format!("'{}' is not a port number", value))?;
    validate_port(port).map_err(|e| e.to_string())
}

/// Filter used when `RUST_LOG` is unset
const DEFAULT_FILTER: &str = "warn";

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let socket = cli.host.as_deref().zip(cli.port);
    let logger = Logger::with_file_and_optional_socket(&cli.log_file, cli.level, socket)
        .context("invalid logger configuration")?;

    println!("Enter messages. Optional prefix: error:message or warning:message or info:message");
    println!("Type 'exit' to stop.");

    let default_level = cli.level;
    run_dispatcher(&logger, |producer| -> anyhow::Result<()> {
        for line in io::stdin().lock().lines() {
            let line = line.context("reading standard input")?;
            if is_exit_command(&line) {
                break;
            }
            producer.enqueue(parse_input_line(&line, default_level))?;
        }
        Ok(())
    })??;

    log_summary(logger.metrics());
    Ok(())
}

/// End-of-run counters, emitted at debug so they only show with `RUST_LOG=debug`.
fn log_summary(metrics: &LoggerMetrics) {
    tracing::debug!(
        dispatched = metrics.dispatched(),
        accepted = metrics.accepted(),
        filtered = metrics.filtered(),
        failures = metrics.destination_failures(),
        "logger finished"
    );
}
