//! Shared HTTP plumbing for the record store clients
//!
//! Every call is a GET, so every call is safe to repeat. A call is bounded by
//! the per-attempt timeout and retried with exponential backoff only while it
//! keeps failing transiently.

use std::time::Duration;

use anyhow::Context;
use rand::Rng;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

use crate::config::UpstreamSettings;
use crate::error::UpstreamError;

/// Retry schedule for transient failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    pub base_backoff: Duration,
    pub max_backoff: Duration,
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (0-based), without jitter
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.base_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }

    fn backoff_with_jitter(&self, attempt: u32) -> Duration {
        let jitter_ms = (self.base_backoff.as_millis() / 2) as u64;
        let jitter = if jitter_ms == 0 {
            0
        } else {
            rand::thread_rng().gen_range(0..=jitter_ms)
        };
        self.backoff(attempt) + Duration::from_millis(jitter)
    }
}

impl From<&UpstreamSettings> for RetryPolicy {
    fn from(settings: &UpstreamSettings) -> Self {
        Self {
            max_retries: settings.max_retries,
            base_backoff: settings.base_backoff,
            max_backoff: settings.max_backoff,
        }
    }
}

/// HTTP access to one record store
#[derive(Clone)]
pub struct RecordStoreHttp {
    http: Client,
    base_url: String,
    retry: RetryPolicy,
}

impl RecordStoreHttp {
    pub fn new(base_url: &str, settings: &UpstreamSettings) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(token) = &settings.bearer_token {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", token))
                    .context("Invalid record store token format")?,
            );
        }

        let http = Client::builder()
            .default_headers(headers)
            .timeout(settings.timeout)
            .build()
            .context("Failed to build record store HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            retry: RetryPolicy::from(settings),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET `path` and decode the JSON body, retrying transient failures
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, UpstreamError> {
        self.get_json_url(&self.url(path)).await
    }

    /// Same as [`get_json`](Self::get_json) for an absolute URL handed out by
    /// the store itself, such as a pagination link
    pub async fn get_json_url<T: DeserializeOwned>(&self, url: &str) -> Result<T, UpstreamError> {
        let mut attempt: u32 = 0;

        loop {
            match self.get_once(url).await {
                Ok(value) => {
                    if attempt > 0 {
                        tracing::info!(url = %url, attempt, "Record store call succeeded after retries");
                    }
                    return Ok(value);
                }
                Err(e) if e.is_transient() && attempt < self.retry.max_retries => {
                    let delay = self.retry.backoff_with_jitter(attempt);
                    attempt += 1;
                    tracing::warn!(
                        url = %url,
                        attempt,
                        error = %e,
                        delay_ms = delay.as_millis() as u64,
                        "Record store call failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    if e.is_transient() {
                        tracing::warn!(url = %url, attempts = attempt + 1, error = %e, "Record store call failed, giving up");
                    }
                    return Err(e);
                }
            }
        }
    }

    async fn get_once<T: DeserializeOwned>(&self, url: &str) -> Result<T, UpstreamError> {
        let response = self.http.get(url).send().await.map_err(transport_error)?;
        handle_response(response).await
    }
}

fn transport_error(e: reqwest::Error) -> UpstreamError {
    if e.is_timeout() {
        UpstreamError::TimedOut
    } else {
        UpstreamError::Unreachable(e.to_string())
    }
}

async fn handle_response<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, UpstreamError> {
    let status = response.status();

    if status.is_success() {
        let body = response.bytes().await.map_err(transport_error)?;
        serde_json::from_slice(&body).map_err(|e| UpstreamError::InvalidResponse(e.to_string()))
    } else if status == StatusCode::NOT_FOUND {
        Err(UpstreamError::NotFound)
    } else if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        Err(UpstreamError::Unreachable(format!(
            "upstream returned {}",
            status
        )))
    } else {
        Err(UpstreamError::InvalidResponse(format!(
            "upstream returned {}",
            status
        )))
    }
}
