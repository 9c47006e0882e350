//! Outbound HTTP to peer services.
//!
//! This is the ONLY place that interprets transport errors and status codes.
//! Callers receive either a decoded body or an `UpstreamError`; one attempt,
//! no retries.

use std::time::Duration;

use cair_core::ErrorKind;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

const USER_AGENT_VALUE: &str = concat!("cair-server/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("{service} timed out after {after:?}")]
    Timeout {
        service: &'static str,
        after: Duration,
    },

    #[error("{service} unreachable: {message}")]
    Network {
        service: &'static str,
        message: String,
    },

    #[error("{service} returned HTTP {status}")]
    Status { service: &'static str, status: u16 },

    #[error("{service} sent a malformed response: {message}")]
    Malformed {
        service: &'static str,
        message: String,
    },
}

impl UpstreamError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Timeout { .. } => ErrorKind::Timeout,
            _ => ErrorKind::Upstream,
        }
    }
}

/// JSON client bound to one peer base URL with a fixed deadline.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
    base_url: String,
    service: &'static str,
    timeout: Duration,
}

impl UpstreamClient {
    pub fn new(
        service: &'static str,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, UpstreamError> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(default_headers)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| UpstreamError::Network {
                service,
                message: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            service,
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn service(&self) -> &'static str {
        self.service
    }

    /// POST `body` to `{base_url}{path}` and decode a 2xx JSON reply.
    pub async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, UpstreamError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!(service = self.service, url = %url, "upstream request");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status {
                service: self.service,
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(|e| self.classify(e))?;
        serde_json::from_slice(&bytes).map_err(|e| UpstreamError::Malformed {
            service: self.service,
            message: e.to_string(),
        })
    }

    fn classify(&self, err: reqwest::Error) -> UpstreamError {
        if err.is_timeout() {
            UpstreamError::Timeout {
                service: self.service,
                after: self.timeout,
            }
        } else {
            UpstreamError::Network {
                service: self.service,
                message: err.to_string(),
            }
        }
    }
}
