//! Request loop that probes the charge endpoint.

mod config;
mod error;
mod runner;
mod transport;

pub use config::{ProbeConfig, DEFAULT_ITERATIONS, DEFAULT_URL};
pub use error::ProbeError;
pub use runner::{LoopSummary, RequestLoop};
pub use transport::{HttpTransport, Transport};
