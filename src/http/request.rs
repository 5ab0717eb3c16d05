//! Outbound charge request payload.

use serde::{Deserialize, Serialize};

/// Service type sent by the probe.
pub const PROBE_SERVICE_TYPE: &str = "voice";

/// Unit count sent by the probe.
pub const PROBE_UNIT: i64 = -2;

/// JSON body posted to the charge endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeRequest {
    /// Service being charged for, e.g. `voice` or `data`.
    #[serde(rename = "serviceType")]
    pub service_type: String,
    /// Number of units consumed.
    pub unit: i64,
}

impl ChargeRequest {
    /// Create a new ChargeRequest.
    pub fn new(service_type: impl Into<String>, unit: i64) -> Self {
        Self {
            service_type: service_type.into(),
            unit,
        }
    }

    /// The fixed payload sent on every probe iteration.
    pub fn probe() -> Self {
        Self::new(PROBE_SERVICE_TYPE, PROBE_UNIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_payload_fields() {
        let value = serde_json::to_value(ChargeRequest::probe()).unwrap();
        assert_eq!(value, serde_json::json!({"serviceType": "voice", "unit": -2}));
    }

    #[test]
    fn test_payload_uses_camel_case_key() {
        let json = serde_json::to_string(&ChargeRequest::new("data", 3)).unwrap();
        assert!(json.contains("\"serviceType\":\"data\""));
        assert!(!json.contains("service_type"));
    }
}
