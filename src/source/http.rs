//! HTTP incident client with retry logic

use super::RecordSource;
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Fetches the incident payload from a URL
pub struct HttpSource {
    client: Client,
    url: String,
    retries: u32,
    retry_delay: Duration,
    expected_content_length: Option<u64>,
}

impl HttpSource {
    /// Create a new client for `url`
    pub fn new(url: impl Into<String>, config: &ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: url.into(),
            retries: config.retries.max(1),
            retry_delay: config.retry_delay,
            expected_content_length: config.expected_content_length,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send the request, retrying transport failures up to the configured attempts
    pub async fn get_response(&self) -> Result<Response> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.client.get(&self.url).send().await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    warn!(
                        "Attempt {} of {} to fetch {} failed: {}",
                        attempt, self.retries, self.url, e
                    );
                    if attempt >= self.retries {
                        return Err(Error::Request(e));
                    }
                    sleep(self.calculate_backoff(attempt)).await;
                }
            }
        }
    }

    /// Exponential backoff before the retry following `attempt`
    fn calculate_backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32 << (attempt.saturating_sub(1)).min(16);
        self.retry_delay.saturating_mul(factor)
    }
}

#[async_trait]
impl RecordSource for HttpSource {
    async fn fetch(&self) -> Result<Vec<u8>> {
        let response = self.get_response().await?;
        validate_response(
            response.status(),
            response.headers(),
            self.expected_content_length,
        )?;

        let body = response.bytes().await?;
        debug!("Fetched {} bytes from {}", body.len(), self.url);
        Ok(body.to_vec())
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Check status, content type and (optionally) declared length of a response
pub fn validate_response(
    status: StatusCode,
    headers: &HeaderMap,
    expected_content_length: Option<u64>,
) -> Result<()> {
    if status != StatusCode::OK {
        return Err(Error::HttpStatus(status));
    }

    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");
    let media_type = content_type.split(';').next().unwrap_or("").trim();
    if !media_type.eq_ignore_ascii_case("application/json") {
        return Err(Error::ContentType(content_type.to_string()));
    }

    let (Some(expected), Some(declared)) = (expected_content_length, headers.get(CONTENT_LENGTH))
    else {
        return Ok(());
    };
    let actual = declared
        .to_str()
        .ok()
        .and_then(|value| value.trim().parse::<u64>().ok())
        .ok_or_else(|| Error::Validation(format!("Invalid Content-Length header: {:?}", declared)))?;
    if actual != expected {
        return Err(Error::ContentLength { expected, actual });
    }
    Ok(())
}
