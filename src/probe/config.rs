//! Probe configuration.

use std::time::Duration;

/// Endpoint placeholder. Replace with the real charge endpoint before use.
pub const DEFAULT_URL: &str = "https://example.com/api/endpoint";

/// Number of requests sent per run.
pub const DEFAULT_ITERATIONS: usize = 100;

/// Configuration for the request loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    /// Target URL for every POST.
    pub url: String,
    /// Number of sequential attempts.
    pub iterations: usize,
    /// Per-request timeout. `None` leaves the HTTP client's default in place.
    pub timeout: Option<Duration>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            iterations: DEFAULT_ITERATIONS,
            timeout: None,
        }
    }
}

impl ProbeConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target URL.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set the number of attempts.
    pub fn iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Set a per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}
