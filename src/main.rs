use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use httpsweep::cli::{normalize_args, Cli};
use httpsweep::output::open_writer;
use httpsweep::{Config, ScanError, Scanner};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_from(normalize_args(std::env::args_os()));

    init_tracing(cli.verbose);

    let config = Config::from_cli(&cli).context("invalid configuration")?;
    let scanner = Scanner::with_http_client(config).context("failed to set up prober")?;
    debug!(
        workers = scanner.config().workers,
        ports = scanner.config().ports.len(),
        timeout = ?scanner.config().timeout,
        "starting sweep"
    );

    let output = open_writer(scanner.config().output_file.as_deref())
        .await
        .context("failed to open output")?;

    match scanner.run(tokio::io::stdin(), output).await {
        Ok(summary) => {
            debug!(%summary, "done");
            Ok(())
        }
        Err(err @ ScanError::Input(_)) => {
            // Exit without waiting for in-flight workers.
            error!("{}", err);
            std::process::exit(1);
        }
        Err(err) => Err(err).context("sweep failed"),
    }
}

/// Logs go to stderr; stdout carries only results.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "warn,httpsweep=debug",
        _ => "warn,httpsweep=trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(level))
        .with_writer(std::io::stderr)
        .init();
}
