use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use crate::config::{parse_ports, DEFAULT_PORTS};
use crate::output::OutputFormat;

/// Long flags that may also be written with a single dash (`-workers 5`).
const LONG_FLAGS: &[&str] = &["workers", "ports", "timeout", "format", "output", "verbose"];

#[derive(Parser, Debug)]
#[command(name = "httpsweep")]
#[command(version)]
#[command(about = "Probe domains from stdin for live HTTP(S) endpoints", long_about = None)]
pub struct Cli {
    #[arg(long, default_value = "10", value_parser = parse_workers, help = "Number of concurrent workers")]
    pub workers: usize,

    #[arg(long, default_value = DEFAULT_PORTS, value_parser = parse_port_list, help = "Comma-separated list of ports to probe (ranges like 8000-8010 allowed)")]
    pub ports: Arc<[u16]>,

    #[arg(long, default_value = "3s", value_parser = parse_timeout, help = "Timeout for HTTP requests (e.g. 3s, 500ms)")]
    pub timeout: Duration,

    #[arg(long = "format", value_enum, default_value = "plain", help = "Output format")]
    pub output_format: OutputFormat,

    #[arg(short = 'o', long = "output", help = "Write results to a file instead of stdout")]
    pub output_file: Option<PathBuf>,

    #[arg(short, long, action = clap::ArgAction::Count, help = "Log verbosity on stderr (-v debug, -vv trace)")]
    pub verbose: u8,
}

fn parse_workers(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("must be greater than 0".to_string()),
        Ok(workers) => Ok(workers),
        Err(e) => Err(e.to_string()),
    }
}

fn parse_port_list(value: &str) -> Result<Arc<[u16]>, String> {
    parse_ports(value).map_err(|e| e.to_string())
}

fn parse_timeout(value: &str) -> Result<Duration, String> {
    let timeout = humantime::parse_duration(value).map_err(|e| e.to_string())?;
    if timeout.is_zero() {
        return Err("must be greater than 0".to_string());
    }
    Ok(timeout)
}

/// Rewrite single-dash long flags (`-ports=80`) to their double-dash form.
///
/// Short flags such as `-o` and `-vv` are left alone, and everything after a
/// bare `--` is passed through untouched.
pub fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut passthrough = false;
    args.into_iter()
        .map(|arg| {
            if passthrough {
                return arg;
            }
            let Some(text) = arg.to_str() else {
                return arg;
            };
            if text == "--" {
                passthrough = true;
                return arg;
            }
            match text.strip_prefix('-') {
                Some(rest) if !rest.starts_with('-') => {
                    let name = rest.split_once('=').map_or(rest, |(name, _)| name);
                    if LONG_FLAGS.contains(&name) {
                        OsString::from(format!("-{}", text))
                    } else {
                        arg
                    }
                }
                _ => arg,
            }
        })
        .collect()
}
