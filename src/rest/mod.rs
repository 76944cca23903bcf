//! # REST Module
//!
//! Uploads encoded frames to the telemetry server.
//!
//! Every upload is a single POST. The server acknowledges a stored frame
//! with `201 Created`; any other status counts as a failed upload. There is
//! no retry, the next application cycle simply produces a fresh frame.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use tracing::{debug, error, info};

use crate::config::RestConfig;
use crate::error::{LoggerError, Result};

/// Header carrying the server API key
pub const API_KEY_HEADER: &str = "x-apikey";

/// Upload path for encoded frames
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST `payload` to `url`, a path on the configured server
    async fn post(&self, url: &str, payload: &str) -> Result<()>;
}

/// HTTP(S) client for the telemetry server
#[derive(Debug, Clone)]
pub struct RestClient {
    client: Client,
    base_url: String,
    api_key: String,
    content_type: String,
}

impl RestClient {
    /// Create a client for the configured server
    ///
    /// # Errors
    ///
    /// Returns `LoggerError::Transport` if the HTTP client cannot be built
    pub fn new(config: &RestConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(|e| LoggerError::Transport(e.to_string()))?;

        let scheme = if config.tls { "https" } else { "http" };

        Ok(Self {
            client,
            base_url: format!("{}://{}:{}", scheme, config.host, config.port),
            api_key: config.api_key.clone(),
            content_type: config.content_type.clone(),
        })
    }

    /// Full request URL for a server path
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl Transport for RestClient {
    async fn post(&self, url: &str, payload: &str) -> Result<()> {
        let target = self.url_for(url);
        debug!("Sending POST request to {} ({} bytes)", target, payload.len());

        let response = self
            .client
            .post(&target)
            .header(CONTENT_TYPE, &self.content_type)
            .header(API_KEY_HEADER, &self.api_key)
            .body(payload.to_owned())
            .send()
            .await
            .map_err(|e| {
                error!("Failed to send HTTP request ({})", e);
                LoggerError::Transport(e.to_string())
            })?;

        let status = response.status();
        if status != StatusCode::CREATED {
            error!("Unexpected HTTP response status {}", status);
            return Err(LoggerError::Transport(format!("unexpected status {}", status)));
        }

        info!("Uploaded {} bytes to {}", payload.len(), url);
        Ok(())
    }
}
