//! The cache-and-forward request handler.
//!
//! [`Gateway`] owns the TTL cache and the upstream client and turns each
//! inbound request into a response:
//!
//! 1. `OPTIONS` preflights are answered immediately with an empty 200.
//! 2. `GET /` requests are validated (`busStopCode` present, API key
//!    configured), answered from the cache when fresh, and otherwise
//!    forwarded upstream with the credential attached.
//! 3. Anything else gets a JSON 404/405.
//!
//! Every response, including errors and preflights, carries the CORS
//! headers; successful payloads additionally carry `X-Cache` and
//! `Cache-Control`.

use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{error, warn};

use crate::cache::TtlCache;
use crate::config::Config;
use crate::http::{Method, Request, Response, StatusCode};
use crate::upstream::{LtaClient, UpstreamError};

/// Inbound query parameter naming the bus stop.
const STOP_CODE_PARAM: &str = "busStopCode";

/// Failures surfaced to the caller as a JSON error envelope.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The `busStopCode` query parameter is absent or empty.
    #[error("BusStopCode query parameter is required.")]
    MissingStopCode,

    /// No API key is configured in the environment.
    #[error("Server configuration error: API key missing.")]
    MissingApiKey,

    /// The upstream call failed; see [`UpstreamError`].
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl GatewayError {
    /// The HTTP status this error maps to. Upstream non-2xx statuses are
    /// propagated when representable, everything else collapses to 500.
    fn status(&self) -> StatusCode {
        match self {
            Self::MissingStopCode => StatusCode::BadRequest,
            Self::MissingApiKey => StatusCode::InternalServerError,
            Self::Upstream(UpstreamError::Status { status, .. }) => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::InternalServerError)
            }
            Self::Upstream(UpstreamError::Transport(_)) => StatusCode::InternalServerError,
        }
    }

    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            Self::Upstream(UpstreamError::Status { details, .. }) => ErrorBody {
                error: "Failed to fetch from LTA API".to_owned(),
                details: Some(details),
            },
            Self::Upstream(UpstreamError::Transport(e)) => ErrorBody {
                error: "Failed to fetch from LTA API".to_owned(),
                details: Some(Value::String(e.to_string())),
            },
            other => ErrorBody {
                error: other.to_string(),
                details: None,
            },
        };
        body.into_response(status)
    }
}

/// The `{"error": ..., "details"?: ...}` envelope returned on failure.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl ErrorBody {
    fn plain(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            details: None,
        }
    }

    fn into_response(self, status: StatusCode) -> Response {
        // ErrorBody is strings and JSON values; serialization cannot fail.
        let value = serde_json::to_value(&self).unwrap_or(Value::Null);
        Response::new(status).json(&value)
    }
}

/// The gateway handler: validation, cache lookup, upstream forward, CORS.
///
/// Cheap to share: wrap it in an `Arc` and clone the handle into each
/// connection task.
pub struct Gateway {
    cache: TtlCache,
    client: LtaClient,
    api_key: Option<String>,
    frontend_origin: String,
}

impl Gateway {
    /// Builds a gateway from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`reqwest::Error`] if the upstream HTTP
    /// client cannot be constructed.
    pub fn new(config: Config) -> Result<Self, reqwest::Error> {
        let client = LtaClient::new(config.upstream_base, config.upstream_timeout)?;
        Ok(Self {
            cache: TtlCache::new(config.cache_ttl),
            client,
            api_key: config.api_key,
            frontend_origin: config.frontend_origin,
        })
    }

    /// Handles one inbound request, producing the complete response.
    pub async fn handle(&self, req: Request) -> Response {
        let response = self.route(&req).await;
        self.with_cors(response)
    }

    async fn route(&self, req: &Request) -> Response {
        match req.method() {
            // Preflight: succeed with no body; CORS headers are added by the caller.
            Method::Options => Response::new(StatusCode::Ok),
            Method::Get if req.path() == "/" => match self.arrivals(req).await {
                Ok(response) => response,
                Err(e) => {
                    match &e {
                        GatewayError::MissingApiKey => {
                            error!("LTA_API_KEY environment variable not set");
                        }
                        GatewayError::Upstream(err) => {
                            warn!(error = %err, "failed to fetch from LTA API");
                        }
                        GatewayError::MissingStopCode => {}
                    }
                    e.into_response()
                }
            },
            Method::Get => ErrorBody::plain("Not Found").into_response(StatusCode::NotFound),
            _ => ErrorBody::plain("Method Not Allowed").into_response(StatusCode::MethodNotAllowed),
        }
    }

    /// The cache-and-forward path for `GET /?busStopCode=<code>`.
    async fn arrivals(&self, req: &Request) -> Result<Response, GatewayError> {
        let stop_code = req
            .query_param(STOP_CODE_PARAM)
            .filter(|code| !code.is_empty())
            .ok_or(GatewayError::MissingStopCode)?;

        let api_key = self
            .api_key
            .as_deref()
            .ok_or(GatewayError::MissingApiKey)?;

        if let Some(payload) = self.cache.get(stop_code) {
            return Ok(self.payload_response(payload, "HIT"));
        }

        let payload = self.client.bus_arrivals(api_key, stop_code).await?;
        self.cache.insert(stop_code, payload.clone());
        Ok(self.payload_response(payload, "MISS"))
    }

    fn payload_response(&self, payload: Bytes, cache_status: &str) -> Response {
        Response::new(StatusCode::Ok)
            .header("Content-Type", "application/json")
            .header("X-Cache", cache_status)
            .header(
                "Cache-Control",
                format!("public, max-age={}", self.cache.ttl().as_secs()),
            )
            .body_bytes(payload)
    }

    fn with_cors(&self, mut response: Response) -> Response {
        response.add_header("Access-Control-Allow-Origin", &self.frontend_origin);
        response.add_header("Access-Control-Allow-Methods", "GET, OPTIONS");
        response.add_header("Access-Control-Allow-Headers", "Content-Type");
        response
    }
}
