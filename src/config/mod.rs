//! Environment-derived gateway configuration.
//!
//! The gateway is configured entirely through environment variables, so it
//! deploys anywhere a secret can be injected into the process environment:
//!
//! | Variable          | Meaning                               | Default                    |
//! |-------------------|---------------------------------------|----------------------------|
//! | `LTA_API_KEY`     | DataMall `AccountKey` secret          | *(unset → per-request 500)*|
//! | `FRONTEND_ORIGIN` | Allowed CORS origin                   | `*`                        |
//! | `LTA_API_BASE`    | Upstream base URL                     | DataMall production URL    |
//! | `BIND_ADDR`       | TCP listen address                    | `127.0.0.1:8080`           |

use std::env;
use std::time::Duration;

use crate::upstream;

/// How long a cached upstream payload stays fresh.
pub const CACHE_TTL: Duration = Duration::from_secs(10);

/// Per-request upstream timeout.
pub const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(8);

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

/// Runtime configuration for the gateway.
///
/// A missing `LTA_API_KEY` is deliberately not a startup failure: the
/// process comes up and answers every arrival request with a 500 until the
/// key is provided, so a misdeployed instance stays reachable and loud
/// instead of crash-looping.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP address the server binds to.
    pub bind_addr: String,
    /// DataMall `AccountKey` secret, if configured.
    pub api_key: Option<String>,
    /// Value for `Access-Control-Allow-Origin`.
    pub frontend_origin: String,
    /// Base URL of the upstream API, without a trailing slash.
    pub upstream_base: String,
    /// Freshness window for cached payloads.
    pub cache_ttl: Duration,
    /// Timeout applied to each upstream request.
    pub upstream_timeout: Duration,
}

impl Config {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Self {
        Self {
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_owned()),
            api_key: env::var("LTA_API_KEY").ok().filter(|k| !k.is_empty()),
            frontend_origin: env::var("FRONTEND_ORIGIN").unwrap_or_else(|_| "*".to_owned()),
            upstream_base: env::var("LTA_API_BASE")
                .unwrap_or_else(|_| upstream::DEFAULT_BASE_URL.to_owned()),
            cache_ttl: CACHE_TTL,
            upstream_timeout: UPSTREAM_TIMEOUT,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_owned(),
            api_key: None,
            frontend_origin: "*".to_owned(),
            upstream_base: upstream::DEFAULT_BASE_URL.to_owned(),
            cache_ttl: CACHE_TTL,
            upstream_timeout: UPSTREAM_TIMEOUT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.api_key, None);
        assert_eq!(config.frontend_origin, "*");
        assert_eq!(config.cache_ttl, Duration::from_secs(10));
        assert_eq!(config.upstream_timeout, Duration::from_secs(8));
        assert!(config.upstream_base.starts_with("https://"));
    }
}
