//! HTTP transport used by the request loop.

use crate::http::{ChargeRequest, ProbeResponse};
use crate::probe::{ProbeConfig, ProbeError};
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

/// Sends one JSON POST and waits for the complete response.
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST `payload` as JSON to `url`.
    ///
    /// Any non-2xx status is still `Ok`; only failures to obtain a response are errors.
    async fn post_json(
        &self,
        url: &str,
        payload: &ChargeRequest,
    ) -> Result<ProbeResponse, ProbeError>;
}

/// `reqwest`-backed transport. One client is reused for every iteration.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Build a transport honouring the config's timeout, if any.
    pub fn new(config: &ProbeConfig) -> Result<Self, ProbeError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ProbeError::Config(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_json(
        &self,
        url: &str,
        payload: &ChargeRequest,
    ) -> Result<ProbeResponse, ProbeError> {
        let response = self.client.post(url).json(payload).send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;

        debug!("POST {} -> {} ({} bytes)", url, status, body.len());

        Ok(ProbeResponse::new(status, body))
    }
}
