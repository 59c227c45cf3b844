//! # busgate
//!
//! A caching HTTP gateway for the LTA DataMall bus-arrival API.
//!
//! The gateway accepts `GET /?busStopCode=<code>` requests, consults a
//! process-lifetime TTL cache, and on a miss forwards the query to the
//! DataMall `BusArrivalv2` endpoint with the server-side `AccountKey`
//! credential attached. Responses carry an `X-Cache: HIT|MISS` header and
//! permissive (or configured) CORS headers.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use busgate::{config::Config, gateway::Gateway, server::Server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env();
//!     let server = Server::bind(&config.bind_addr).await?;
//!     let gateway = Arc::new(Gateway::new(config)?);
//!     server
//!         .run(move |req| {
//!             let gateway = Arc::clone(&gateway);
//!             async move { gateway.handle(req).await }
//!         })
//!         .await?;
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod config;
pub mod gateway;
pub mod http;
pub mod server;
pub mod upstream;

// ── Convenience re-exports ────────────────────────────────────────────────────
pub use config::Config;
pub use gateway::Gateway;
pub use http::{Headers, Method, Request, Response, StatusCode};
pub use server::{Server, ServerError};
