use super::client::{Prober, NOT_ALIVE};
use super::results::ProbeResult;

/// Outcome of probing one port of one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortOutcome {
    /// First candidate URL that answered, if any
    pub result: Option<ProbeResult>,
    /// Number of GET requests issued
    pub attempts: usize,
}

/// Whether the input line already names a scheme (`http://`, `https://`).
pub fn has_scheme(domain: &str) -> bool {
    domain.starts_with("http")
}

/// URLs to try for `domain` on `port`, in order.
///
/// A domain with an explicit scheme is used as the base URL as-is. A bare
/// domain is tried over HTTPS first, then plain HTTP.
pub fn candidate_urls(domain: &str, port: u16) -> Vec<String> {
    if has_scheme(domain) {
        vec![format!("{}:{}", domain, port)]
    } else {
        vec![
            format!("https://{}:{}", domain, port),
            format!("http://{}:{}", domain, port),
        ]
    }
}

/// Probe the candidates for one port, stopping at the first that answers.
pub async fn probe_port<P>(prober: &P, domain: &str, port: u16) -> PortOutcome
where
    P: Prober + ?Sized,
{
    let mut attempts = 0;
    for url in candidate_urls(domain, port) {
        attempts += 1;
        let status = prober.probe(&url).await;
        if status != NOT_ALIVE {
            return PortOutcome {
                result: Some(ProbeResult::new(url, status)),
                attempts,
            };
        }
    }

    PortOutcome {
        result: None,
        attempts,
    }
}
