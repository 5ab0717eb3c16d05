//! Account charging: the service the probe targets.

pub mod ledger;
pub mod service;

pub use ledger::{Ledger, LedgerError, MemoryLedger, RedisLedger, BALANCE_KEY, DEFAULT_BALANCE};
pub use service::{ChargeError, ChargeEvent, ChargeReceipt, ChargeService};
