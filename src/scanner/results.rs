use serde::Serialize;
use std::fmt;

/// An alive endpoint: the probed URL and the status code it answered with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeResult {
    pub url: String,
    pub status: u16,
}

impl ProbeResult {
    pub fn new(url: impl Into<String>, status: u16) -> Self {
        Self {
            url: url.into(),
            status,
        }
    }
}

impl fmt::Display for ProbeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.url, self.status)
    }
}

/// Totals for a finished sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanSummary {
    /// Jobs read from input and fully processed
    pub jobs: usize,
    /// Individual GET requests issued
    pub probes: usize,
    /// Result lines written
    pub alive: usize,
}

impl fmt::Display for ScanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} jobs, {} probes, {} alive",
            self.jobs, self.probes, self.alive
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_display() {
        let result = ProbeResult::new("https://example.com:443", 200);
        assert_eq!(result.to_string(), "https://example.com:443 200");
    }

    #[test]
    fn test_result_serialization() {
        let result = ProbeResult::new("http://foo.test:8443", 404);
        let json = serde_json::to_string(&result).unwrap();
        assert_eq!(json, r#"{"url":"http://foo.test:8443","status":404}"#);
    }
}
