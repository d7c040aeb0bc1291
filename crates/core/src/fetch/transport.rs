//! Connection context used by every request of a run.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::types::RequestDescriptor;
use super::{FetchError, TransportError};
use crate::config::HttpConfig;

/// A fully buffered HTTP response.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// Final URL, including the query string.
    pub url: String,
    pub status: u16,
    pub body: Vec<u8>,
}

/// Performs one GET and buffers the whole body.
///
/// Implementations must be safe to share across concurrent requests and must
/// not interpret the status code or decode the body.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, request: &RequestDescriptor) -> Result<RawResponse, TransportError>;
}

/// Pooled reqwest session shared by all requests of one run.
///
/// Dropping the session closes its idle connections.
#[derive(Debug, Clone)]
pub struct HttpSession {
    client: Client,
}

impl HttpSession {
    /// Open a new session.
    pub fn open(config: &HttpConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .pool_idle_timeout(Duration::from_secs(config.pool_idle_timeout_secs))
            .build()
            .map_err(FetchError::Session)?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpSession {
    async fn get(&self, request: &RequestDescriptor) -> Result<RawResponse, TransportError> {
        debug!(rover = %request.identity(), url = %request.url(), "Sending GET");

        let response = self
            .client
            .get(request.url())
            .query(request.params())
            .send()
            .await?;

        let url = response.url().to_string();
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();

        Ok(RawResponse { url, status, body })
    }
}
