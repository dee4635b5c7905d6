//! Binary crate for the `forecast` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive configuration and API key prompting
//! - Logging setup and human-friendly progress output

use std::io::{self, Write};

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod cli;

fn log_filter_from_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn init_logging(verbose: u8) {
    // RUST_LOG wins over -v flags.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_filter_from_verbosity(verbose)));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Failures go to stdout next to the progress lines; stderr carries logs.
fn write_failure(out: &mut impl Write, err: &anyhow::Error) -> io::Result<()> {
    writeln!(out, "Error: {err}")?;
    for cause in err.chain().skip(1) {
        writeln!(out, "  Caused by: {cause}")?;
    }
    out.flush()
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Values from .env feed clap's `env` fallbacks, so load them first.
    dotenvy::dotenv().ok();

    let cmd = cli::Cli::parse();
    init_logging(cmd.verbose);

    if let Err(err) = cmd.run().await {
        write_failure(&mut io::stdout().lock(), &err).ok();
        std::process::exit(1);
    }
}
