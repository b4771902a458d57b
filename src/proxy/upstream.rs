/// HTTP client for forwarding requests to the origin.
///
/// One pooled client per process, shared by every request. Deliberately
/// no retry layer: the proxy is a single-hop, fire-once forwarder, and
/// exactly one outbound request is issued per inbound request.
use std::time::Duration;

use axum::http::{HeaderMap, Method};
use bytes::Bytes;
use url::Url;

use crate::errors::AppError;

pub struct UpstreamClient {
    client: reqwest::Client,
}

impl UpstreamClient {
    pub fn new(connect_timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .pool_max_idle_per_host(32)
            .connect_timeout(connect_timeout)
            // 3xx from the origin are relayed verbatim, never chased.
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build HTTP client: {}", e))?;

        Ok(Self { client })
    }

    /// Send the rewritten request. `body` is `None` for GET/HEAD.
    ///
    /// No total timeout is set on the client: response bodies stream for
    /// as long as the download runs. The handler bounds the time to
    /// response headers instead.
    pub async fn forward(
        &self,
        method: Method,
        url: Url,
        headers: HeaderMap,
        body: Option<Bytes>,
    ) -> Result<reqwest::Response, AppError> {
        let mut request = self.client.request(method, url).headers(headers);
        if let Some(body) = body {
            request = request.body(body);
        }

        request.send().await.map_err(|e| {
            tracing::warn!("upstream request failed: {}", e);
            AppError::Upstream(e.to_string())
        })
    }
}
