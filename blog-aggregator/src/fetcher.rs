use crate::types::{FetchConfig, FetchError, Result};
use backoff::{backoff::Backoff, exponential::ExponentialBackoff};
use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

pub const ACCEPT_JSON: &str = "application/json";
pub const ACCEPT_FEED: &str = "application/rss+xml, application/xml, text/xml";

/// Shared HTTP client for every provider. Cheap to clone.
#[derive(Clone)]
pub struct Fetcher {
    client: Client,
    config: FetchConfig,
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// GET `url` and return the body. Transport failures and 5xx answers are
    /// retried with exponential backoff; 404, 429 and other 4xx are not.
    pub async fn get_text(
        &self,
        url: &Url,
        accept: &str,
        account: &str,
    ) -> std::result::Result<String, FetchError> {
        let mut backoff: ExponentialBackoff<backoff::SystemClock> = ExponentialBackoff {
            current_interval: Duration::from_secs(self.config.retry_delay_seconds),
            initial_interval: Duration::from_secs(self.config.retry_delay_seconds),
            max_interval: Duration::from_secs(self.config.retry_delay_seconds * 8),
            multiplier: 2.0,
            max_elapsed_time: Some(Duration::from_secs(
                self.config.timeout_seconds * (u64::from(self.config.max_retries) + 1),
            )),
            ..Default::default()
        };

        let mut attempt = 0u32;
        loop {
            match self.get_once(url, accept, account).await {
                Ok(body) => return Ok(body),
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    attempt += 1;
                    match backoff.next_backoff() {
                        Some(delay) => {
                            warn!(%url, attempt, error = %e, "request failed, retrying in {:?}", delay);
                            tokio::time::sleep(delay).await;
                        }
                        None => return Err(e),
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &Url,
        account: &str,
    ) -> std::result::Result<T, FetchError> {
        let body = self.get_text(url, ACCEPT_JSON, account).await?;
        serde_json::from_str(&body).map_err(|e| FetchError::Decode(e.to_string()))
    }

    async fn get_once(
        &self,
        url: &Url,
        accept: &str,
        account: &str,
    ) -> std::result::Result<String, FetchError> {
        debug!(%url, "GET");
        let response = self
            .client
            .get(url.clone())
            .header(ACCEPT, accept)
            .send()
            .await?;

        check_status(response.status(), account)?;

        let body = response.text().await?;
        debug!(%url, bytes = body.len(), "response received");
        Ok(body)
    }
}

/// Map a response status onto the error callers react to.
pub fn check_status(status: StatusCode, account: &str) -> std::result::Result<(), FetchError> {
    if status.is_success() {
        return Ok(());
    }
    match status {
        StatusCode::NOT_FOUND => Err(FetchError::NotFound {
            account: account.to_string(),
        }),
        StatusCode::TOO_MANY_REQUESTS => Err(FetchError::RateLimited),
        other => Err(FetchError::Http {
            status: other.as_u16(),
            reason: other.canonical_reason().unwrap_or("Unknown").to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_statuses() {
        assert!(check_status(StatusCode::OK, "me").is_ok());
        assert!(matches!(
            check_status(StatusCode::NOT_FOUND, "me"),
            Err(FetchError::NotFound { account }) if account == "me"
        ));
        assert!(check_status(StatusCode::TOO_MANY_REQUESTS, "me")
            .unwrap_err()
            .is_rate_limited());

        let err = check_status(StatusCode::BAD_GATEWAY, "me").unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(err.to_string(), "HTTP 502: Bad Gateway");

        assert!(!check_status(StatusCode::FORBIDDEN, "me").unwrap_err().is_retryable());
    }
}
