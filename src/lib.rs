//! hostrelay — host-rewriting reverse proxy for static-site origins.
//!
//! The library target exists so integration tests in `tests/` can
//! assemble the real application: build a [`Config`] by hand, wire
//! [`AppState`] from it, and serve the router returned by
//! [`build_router`].

use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::trace::TraceLayer;

pub mod cli;
pub mod config;
pub mod errors;
pub mod proxy;

use config::Config;
use proxy::rewrite::{HeaderPolicy, OriginTarget};
use proxy::upstream::UpstreamClient;

/// Requests buffer their body before forwarding; this caps how much.
/// Response bodies are streamed and are not subject to any limit.
const MAX_REQUEST_BODY_BYTES: usize = 32 * 1024 * 1024;

/// Shared application state passed to the proxy handler. Read-only for
/// its entire lifetime, so unlimited concurrent readers are safe.
pub struct AppState {
    pub origin: OriginTarget,
    pub policy: HeaderPolicy,
    pub client: UpstreamClient,
    pub upstream_timeout: Duration,
}

impl AppState {
    pub fn from_config(cfg: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            origin: OriginTarget::new(&cfg.origin_host, cfg.origin_scheme)?,
            policy: HeaderPolicy::new(&cfg.strip_headers),
            client: UpstreamClient::new(Duration::from_secs(cfg.connect_timeout_secs))?,
            upstream_timeout: Duration::from_secs(cfg.upstream_timeout_secs),
        })
    }
}

/// Build the application router. There are no named routes: every
/// method and path falls through to the proxy handler, matching the
/// `*/*` route pattern the proxy is deployed under.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .fallback(proxy::handler::proxy_handler)
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
