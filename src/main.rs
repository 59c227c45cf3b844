//! Binary entrypoint: wire up logging, configuration, and the server.

use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use busgate::{Config, Gateway, Server};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    if config.api_key.is_none() {
        // Not fatal: the gateway answers with a 500 until the key is set.
        warn!("LTA_API_KEY is not set — arrival requests will be rejected");
    }
    info!(
        bind_addr = %config.bind_addr,
        upstream = %config.upstream_base,
        origin = %config.frontend_origin,
        "starting busgate"
    );

    let server = Server::bind(&config.bind_addr).await?;
    let gateway = Arc::new(Gateway::new(config)?);

    server
        .run(move |req| {
            let gateway = Arc::clone(&gateway);
            async move { gateway.handle(req).await }
        })
        .await?;

    Ok(())
}
