//! Client for the LTA DataMall `BusArrivalv2` endpoint.
//!
//! A thin wrapper around [`reqwest::Client`] that attaches the `AccountKey`
//! credential, bounds each request with a timeout, and classifies failures
//! into [`UpstreamError`]. One attempt per call: the gateway does no
//! retrying, rate-limiting, or circuit breaking.

use std::time::Duration;

use bytes::Bytes;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

/// Production base URL of the DataMall OData service.
pub const DEFAULT_BASE_URL: &str = "https://datamall2.mytransport.sg/ltaodataservice";

/// Errors from a single upstream request.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The upstream answered with a non-2xx status.
    #[error("upstream returned status {status}")]
    Status {
        status: u16,
        /// Upstream response body, parsed as JSON when possible.
        details: Value,
    },

    /// The request never completed: connect failure, timeout, protocol error.
    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// HTTP client for bus-arrival queries.
#[derive(Debug, Clone)]
pub struct LtaClient {
    http: reqwest::Client,
    base_url: String,
}

impl LtaClient {
    /// Builds a client against `base_url` with the given per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`reqwest::Error`] if the TLS backend cannot
    /// be initialized.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Ok(Self { http, base_url })
    }

    /// Fetches arrival data for `stop_code`, returning the raw payload.
    ///
    /// The payload is kept as [`Bytes`] so the gateway can mirror the
    /// upstream response verbatim instead of re-encoding it.
    ///
    /// # Errors
    ///
    /// - [`UpstreamError::Status`] for a non-2xx upstream response; the body
    ///   is carried along as `details`.
    /// - [`UpstreamError::Transport`] for timeouts and network failures.
    pub async fn bus_arrivals(
        &self,
        api_key: &str,
        stop_code: &str,
    ) -> Result<Bytes, UpstreamError> {
        let url = format!("{}/BusArrivalv2", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[("BusStopCode", stop_code)])
            .header("AccountKey", api_key)
            .header("accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        let payload = response.bytes().await?;

        if !status.is_success() {
            warn!(status = status.as_u16(), stop_code, "upstream request rejected");
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                details: decode_details(&payload),
            });
        }

        Ok(payload)
    }
}

// Error bodies are usually JSON but the DataMall edge occasionally returns
// plain text; keep whatever we got so the caller can surface it.
fn decode_details(payload: &[u8]) -> Value {
    serde_json::from_slice(payload)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(payload).into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn details_prefer_json() {
        let details = decode_details(br#"{"fault": "rate limit"}"#);
        assert_eq!(details["fault"], "rate limit");
    }

    #[test]
    fn details_fall_back_to_text() {
        let details = decode_details(b"Service Unavailable");
        assert_eq!(details, Value::String("Service Unavailable".to_owned()));
    }

    #[tokio::test]
    async fn base_url_trailing_slash_is_normalized() {
        let client = LtaClient::new("http://127.0.0.1:9/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url, "http://127.0.0.1:9");
    }
}
