//! HTTP runtime hosting the charge service.

mod config;
mod server;

pub use config::{LedgerConfig, ServerConfig};
pub use server::ChargeServer;
