//! The sequential request loop.

use crate::http::{ChargeRequest, ProbeResponse};
use crate::probe::{ProbeConfig, ProbeError, Transport};
use std::io::Write;
use tracing::{debug, error, info};

/// Counts collected over a completed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopSummary {
    /// Requests sent.
    pub attempts: usize,
    /// Responses with status 200.
    pub succeeded: usize,
    /// Responses with any other status.
    pub failed: usize,
}

/// Posts the fixed charge payload `iterations` times, one request at a time,
/// writing a two-line outcome report per response.
pub struct RequestLoop<T: Transport> {
    config: ProbeConfig,
    transport: T,
}

impl<T: Transport> RequestLoop<T> {
    /// Create a new request loop.
    pub fn new(config: ProbeConfig, transport: T) -> Self {
        Self { config, transport }
    }

    /// Get the transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Run every iteration, writing reports to `out`.
    ///
    /// Non-200 responses are reported and the loop continues. A transport
    /// failure or an undecodable 200 body ends the run with an error.
    pub async fn run<W: Write>(&self, out: &mut W) -> Result<LoopSummary, ProbeError> {
        let mut summary = LoopSummary::default();

        info!(
            "Sending {} requests to {}",
            self.config.iterations, self.config.url
        );

        for iteration in 0..self.config.iterations {
            let payload = ChargeRequest::probe();

            let response = match self.transport.post_json(&self.config.url, &payload).await {
                Ok(response) => response,
                Err(e) => {
                    error!("Request {} failed: {}", iteration, e);
                    return Err(e);
                }
            };
            summary.attempts += 1;

            debug!("Request {} returned {}", iteration, response.status);

            if report(out, iteration, &response)? {
                summary.succeeded += 1;
            } else {
                summary.failed += 1;
            }
        }

        info!(
            "Finished: {} succeeded, {} failed",
            summary.succeeded, summary.failed
        );

        Ok(summary)
    }
}

/// Write the outcome report for one response. Returns whether it was a success.
fn report<W: Write>(
    out: &mut W,
    iteration: usize,
    response: &ProbeResponse,
) -> Result<bool, ProbeError> {
    if response.status.is_ok() {
        writeln!(out, "Request succeeded!")?;
        let body = response
            .json()
            .map_err(|source| ProbeError::Decode { iteration, source })?;
        writeln!(out, "Response: {}", body)?;
        Ok(true)
    } else {
        writeln!(out, "Request failed with status code: {}", response.status)?;
        writeln!(out, "Error message: {}", response.text())?;
        Ok(false)
    }
}
