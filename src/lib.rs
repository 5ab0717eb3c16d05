//! # charge-probe
//!
//! A sequential HTTP load probe for an account-charging endpoint, plus the
//! charging service itself.
//!
//! ## Request loop
//!
//! The probe posts the same JSON body, `{"serviceType": "voice", "unit": -2}`,
//! to one endpoint a fixed number of times (100 by default), strictly one
//! request after another, and prints a two-line report for each response:
//!
//! ```text
//! Request succeeded!
//! Response: {"ok":true}
//! ```
//!
//! or
//!
//! ```text
//! Request failed with status code: 503
//! Error message: service unavailable
//! ```
//!
//! Non-200 responses are reported and the loop continues. A transport failure,
//! or a 200 whose body is not JSON, stops the run with an error.
//!
//! ```rust,no_run
//! use charge_probe::prelude::*;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let config = ProbeConfig::new().url("http://127.0.0.1:8080/charge");
//!     let transport = HttpTransport::new(&config)?;
//!     let summary = RequestLoop::new(config, transport)
//!         .run(&mut std::io::stdout())
//!         .await?;
//!     println!("{} ok, {} failed", summary.succeeded, summary.failed);
//!     Ok(())
//! }
//! ```
//!
//! ## Charge service
//!
//! `ChargeServer` exposes `POST /charge`, which prices a request
//! (`voice` = 2 per unit, `data` = 5 per unit) and debits a single account
//! balance if it covers the charges, and `POST /reset`, which restores the
//! balance to 100. The balance lives in memory or in redis.

pub mod charge;
pub mod http;
pub mod probe;
pub mod runtime;

/// Re-export commonly used types.
pub mod prelude {
    pub use crate::charge::{
        ChargeError, ChargeEvent, ChargeReceipt, ChargeService, Ledger, MemoryLedger,
        RedisLedger,
    };
    pub use crate::http::{ChargeRequest, ProbeResponse, StatusCode};
    pub use crate::probe::{
        HttpTransport, LoopSummary, ProbeConfig, ProbeError, RequestLoop, Transport,
    };
    pub use crate::runtime::{ChargeServer, LedgerConfig, ServerConfig};
    pub use async_trait::async_trait;
}

// Re-export for convenience
pub use charge::{ChargeService, Ledger};
pub use http::{ChargeRequest, ProbeResponse};
pub use probe::{HttpTransport, ProbeConfig, ProbeError, RequestLoop, Transport};
pub use runtime::{ChargeServer, ServerConfig};
