//! Concurrent HTTP(S) liveness prober.
//!
//! Domains are read one per line, each is probed on every configured port
//! (HTTPS first, then plain HTTP for bare domains) by a fixed pool of
//! workers, and every endpoint that answers is reported as `<url> <status>`.

pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod scanner;

pub use config::Config;
pub use error::{Result, ScanError};
pub use output::{OutputFormat, ResultSink};
pub use scanner::{HttpProber, ProbeResult, Prober, ScanSummary, Scanner, NOT_ALIVE};
