//! rpc-transport service.
//!
//! Loads `conf/conf.toml` (or `conf/conf_prod.toml` when
//! `RPC_TRANSPORT_MODE=prod`), registers the built-in routes plus an echo
//! service, and serves until Ctrl+C.

use std::path::PathBuf;
use std::sync::Arc;

use axum::response::Response;
use tokio::net::TcpListener;

use rpc_transport::auth::precheck;
use rpc_transport::config::loader::{load_config, profile_path};
use rpc_transport::http::ConfigLogFlags;
use rpc_transport::observability::init_logging;
use rpc_transport::{HttpServer, RequestContext, RouterBuilder, Shutdown, TransportConfig};

const MODE_ENV: &str = "RPC_TRANSPORT_MODE";
const CONF_DIR_ENV: &str = "RPC_TRANSPORT_CONF_DIR";

/// Echo the payload of an authenticated base request.
async fn echo(ctx: RequestContext) -> Response {
    let request = match precheck(&ctx) {
        Ok(request) => request,
        Err(rejection) => return ctx.send(rejection),
    };

    let mut response = ctx.response();
    response.message = "OK".to_string();
    response.payload = Some(request.payload.clone());
    ctx.send(response)
}

/// Echo the captured path segment.
async fn echo_segment(ctx: RequestContext) -> Response {
    let mut response = ctx.response();
    response.message = ctx.captures().first().cloned().unwrap_or_default();
    ctx.send(response)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mode = std::env::var(MODE_ENV).unwrap_or_default();
    let conf_dir = std::env::var(CONF_DIR_ENV).unwrap_or_else(|_| "conf".to_string());
    let config_path = profile_path(&mode, &PathBuf::from(conf_dir));

    let config = if config_path.exists() {
        load_config(&config_path)?
    } else {
        TransportConfig::default()
    };

    init_logging(&config.logging)?;
    tracing::info!(
        mode = %mode,
        config = %config_path.display(),
        bind_address = %config.listener.bind_address,
        dispatch_mode = ?config.dispatch.mode,
        "rpc-transport v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    let log_flags = Arc::new(ConfigLogFlags::new(&config.logging));

    // Keep the watch alive for the life of the process.
    let _watch = if config_path.exists() {
        match log_flags.clone().watch(&config_path) {
            Ok(handle) => Some(handle),
            Err(e) => {
                tracing::warn!(error = %e, "Config hot reload disabled");
                None
            }
        }
    } else {
        tracing::warn!(path = %config_path.display(), "Config file not found, using defaults");
        None
    };

    let router = RouterBuilder::from_config(&config.dispatch)
        .post("/echo", echo)
        .get_pattern(r"^/echo/([^/]+)$", echo_segment)?
        .build();

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let shutdown = Shutdown::new();

    HttpServer::new(&config, router, log_flags)
        .run(listener, shutdown.subscribe())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
