use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::cli::Cli;
use crate::error::{Result, ScanError};
use crate::output::OutputFormat;

/// Ports probed per domain when `-ports` is not given, in probe order.
pub const DEFAULT_PORTS: &str = "6443,8443,4443,443,4343,80,81,9443,8080,8081,8082,8000,10443,9080,8090";

const DEFAULT_PORT_LIST: [u16; 15] = [
    6443, 8443, 4443, 443, 4343, 80, 81, 9443, 8080, 8081, 8082, 8000, 10443, 9080, 8090,
];

pub const DEFAULT_WORKERS: usize = 10;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

/// Settings for one sweep, fixed at startup and shared read-only by every worker.
#[derive(Debug, Clone)]
pub struct Config {
    pub workers: usize,
    pub ports: Arc<[u16]>,
    pub timeout: Duration,
    pub output_format: OutputFormat,
    pub output_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            ports: Arc::from(DEFAULT_PORT_LIST.as_slice()),
            timeout: DEFAULT_TIMEOUT,
            output_format: OutputFormat::default(),
            output_file: None,
        }
    }
}

impl Config {
    /// Build the configuration from parsed command line flags
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let config = Self {
            workers: cli.workers,
            ports: cli.ports.clone(),
            timeout: cli.timeout,
            output_format: cli.output_format,
            output_file: cli.output_file.clone(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(ScanError::InvalidConfig(
                "workers must be greater than 0".to_string(),
            ));
        }

        if self.ports.is_empty() {
            return Err(ScanError::InvalidConfig(
                "port list must not be empty".to_string(),
            ));
        }

        if self.timeout.is_zero() {
            return Err(ScanError::InvalidConfig(
                "timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Create a small, fast config for testing
    #[cfg(test)]
    pub fn test_config(ports: &[u16]) -> Self {
        Self {
            workers: 4,
            ports: Arc::from(ports),
            timeout: Duration::from_millis(500),
            output_format: OutputFormat::Plain,
            output_file: None,
        }
    }
}

/// Parse a comma-separated port list such as `443,80,8000-8010`.
///
/// Entry order is kept and ranges expand in ascending order. Duplicates are
/// not removed; the list is probed exactly as written.
pub fn parse_ports(spec: &str) -> Result<Arc<[u16]>> {
    let mut ports = Vec::new();

    for entry in spec.split(',') {
        let entry = entry.trim();
        if entry.is_empty() {
            return Err(ScanError::InvalidPort(format!(
                "empty entry in port list \"{}\"",
                spec
            )));
        }

        match entry.split_once('-') {
            Some((start, end)) => {
                let start = parse_port(start)?;
                let end = parse_port(end)?;
                if start > end {
                    return Err(ScanError::InvalidPort(format!(
                        "range {} is reversed",
                        entry
                    )));
                }
                ports.extend(start..=end);
            }
            None => ports.push(parse_port(entry)?),
        }
    }

    Ok(ports.into())
}

fn parse_port(value: &str) -> Result<u16> {
    match value.trim().parse::<u16>() {
        Ok(0) | Err(_) => Err(ScanError::InvalidPort(value.trim().to_string())),
        Ok(port) => Ok(port),
    }
}
