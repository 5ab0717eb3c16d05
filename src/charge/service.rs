//! Charge validation, pricing and authorization.

use crate::charge::ledger::{Ledger, LedgerError, DEFAULT_BALANCE};
use crate::http::StatusCode;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

/// Incoming charge request. Both fields are optional on the wire so that
/// missing fields can be reported instead of failing deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeEvent {
    #[serde(rename = "serviceType", default)]
    pub service_type: Option<String>,
    #[serde(default)]
    pub unit: Option<i64>,
}

impl ChargeEvent {
    pub fn new(service_type: impl Into<String>, unit: i64) -> Self {
        Self {
            service_type: Some(service_type.into()),
            unit: Some(unit),
        }
    }
}

/// Result of a charge attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargeReceipt {
    /// Balance after the charge was applied (unchanged when not authorized).
    pub remaining_balance: i64,
    /// Amount deducted. Zero when not authorized.
    pub charges: i64,
    /// Whether the balance covered the charges.
    pub is_authorized: bool,
}

/// Charge service errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChargeError {
    MissingField,
    NegativeUnit,
    UnitOutOfRange,
    InvalidServiceType,
    BalanceUnavailable(LedgerError),
    ChargeFailed(LedgerError),
    ResetFailed(LedgerError),
}

impl ChargeError {
    /// HTTP status reported for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ChargeError::MissingField
            | ChargeError::NegativeUnit
            | ChargeError::UnitOutOfRange
            | ChargeError::InvalidServiceType => StatusCode::BAD_REQUEST,
            ChargeError::BalanceUnavailable(_)
            | ChargeError::ChargeFailed(_)
            | ChargeError::ResetFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for ChargeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChargeError::MissingField => write!(f, "Missing serviceType or unit"),
            ChargeError::NegativeUnit => {
                write!(f, "Invalid unit value. Unit cannot be negative.")
            }
            ChargeError::UnitOutOfRange => write!(f, "Invalid unit value. Unit is too large."),
            ChargeError::InvalidServiceType => write!(f, "Invalid service type"),
            ChargeError::BalanceUnavailable(_) => write!(f, "Failed to retrieve balance"),
            ChargeError::ChargeFailed(_) => write!(f, "Failed to charge balance"),
            ChargeError::ResetFailed(_) => write!(f, "Failed to reset balance"),
        }
    }
}

impl std::error::Error for ChargeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ChargeError::BalanceUnavailable(e)
            | ChargeError::ChargeFailed(e)
            | ChargeError::ResetFailed(e) => Some(e),
            _ => None,
        }
    }
}

/// Per-unit price of a service type.
pub fn charge_rate(service_type: &str) -> Option<i64> {
    match service_type {
        "voice" => Some(2),
        "data" => Some(5),
        _ => None,
    }
}

/// Total price of `unit` units of `service_type`.
pub fn get_charges(service_type: &str, unit: i64) -> Result<i64, ChargeError> {
    let rate = charge_rate(service_type).ok_or(ChargeError::InvalidServiceType)?;
    rate.checked_mul(unit).ok_or(ChargeError::UnitOutOfRange)
}

/// A request is authorized when the balance covers the charges.
pub fn authorize(remaining_balance: i64, charges: i64) -> bool {
    remaining_balance >= charges
}

/// Charges requests against a shared ledger.
#[derive(Clone)]
pub struct ChargeService {
    ledger: Arc<dyn Ledger>,
}

impl ChargeService {
    /// Create a new charge service.
    pub fn new(ledger: Arc<dyn Ledger>) -> Self {
        Self { ledger }
    }

    /// Get the ledger.
    pub fn ledger(&self) -> Arc<dyn Ledger> {
        self.ledger.clone()
    }

    /// Validate, price and apply a charge.
    pub async fn charge(&self, event: &ChargeEvent) -> Result<ChargeReceipt, ChargeError> {
        let (service_type, unit) = match (event.service_type.as_deref(), event.unit) {
            (Some(service_type), Some(unit)) if !service_type.is_empty() && unit != 0 => {
                (service_type, unit)
            }
            _ => return Err(ChargeError::MissingField),
        };

        if unit < 0 {
            return Err(ChargeError::NegativeUnit);
        }

        let remaining_balance = self.ledger.balance().await.map_err(|e| {
            error!("Failed to retrieve balance: {}", e);
            ChargeError::BalanceUnavailable(e)
        })?;

        let charges = get_charges(service_type, unit)?;

        if !authorize(remaining_balance, charges) {
            info!(
                "Declined {} x{}: balance {} < charges {}",
                service_type, unit, remaining_balance, charges
            );
            return Ok(ChargeReceipt {
                remaining_balance,
                charges: 0,
                is_authorized: false,
            });
        }

        self.ledger.charge(charges).await.map_err(|e| {
            error!("Failed to charge balance: {}", e);
            ChargeError::ChargeFailed(e)
        })?;

        info!("Charged {} for {} x{}", charges, service_type, unit);

        Ok(ChargeReceipt {
            remaining_balance: remaining_balance - charges,
            charges,
            is_authorized: true,
        })
    }

    /// Restore the default balance and return it.
    pub async fn reset(&self) -> Result<i64, ChargeError> {
        self.ledger.reset(DEFAULT_BALANCE).await.map_err(|e| {
            error!("Failed to reset balance: {}", e);
            ChargeError::ResetFailed(e)
        })?;
        info!("Balance reset to {}", DEFAULT_BALANCE);
        Ok(DEFAULT_BALANCE)
    }
}
