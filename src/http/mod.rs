//! HTTP payload and response types shared by the probe and the charge service.

mod request;
mod response;

pub use request::{ChargeRequest, PROBE_SERVICE_TYPE, PROBE_UNIT};
pub use response::{ProbeResponse, StatusCode};
