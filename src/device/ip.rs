//! Public IP lookup over HTTP.
//!
//! The endpoint is expected to answer `GET` with a JSON object carrying the
//! caller's address in an `ip` field, the way `api.ipify.org` does.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;

use super::IpProvider;

/// Default lookup endpoint.
pub const DEFAULT_IP_URL: &str = "https://api.ipify.org?format=json";

#[derive(Debug, Error)]
pub enum IpLookupError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IP service returned {0}")]
    Status(StatusCode),

    #[error("IP service returned an empty address")]
    EmptyAddress,
}

#[derive(Debug, Deserialize)]
struct IpResponse {
    ip: String,
}

/// HTTP client for a "what is my IP" JSON endpoint.
#[derive(Debug, Clone)]
pub struct IpClient {
    url: String,
    client: Client,
}

impl IpClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, IpLookupError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }

    /// Fetch the caller's public IP.
    pub async fn fetch(&self) -> Result<String, IpLookupError> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(IpLookupError::Status(status));
        }

        let body: IpResponse = response.json().await?;
        let ip = body.ip.trim().to_string();
        if ip.is_empty() {
            return Err(IpLookupError::EmptyAddress);
        }
        Ok(ip)
    }
}

#[async_trait]
impl IpProvider for IpClient {
    async fn public_ip(&self) -> Result<String, IpLookupError> {
        self.fetch().await
    }
}
