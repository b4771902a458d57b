use std::io;
use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{HeaderMap, Method, Uri};
use axum::response::Response;
use futures::TryStreamExt;
use uuid::Uuid;

use crate::errors::AppError;
use crate::proxy::rewrite::{self, HeaderPolicy};
use crate::AppState;

/// The main handler for all proxied requests.
///
/// Every failure path returns `AppError`, which renders as a 500 with a
/// short diagnostic — the hosting runtime never sees an escaped fault.
#[tracing::instrument(skip(state, headers, body), fields(req_id = %Uuid::new_v4()))]
pub async fn proxy_handler(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    // -- 1. Rewrite: origin scheme and host, inbound path and query --
    let upstream_url = state.origin.rewrite_url(&uri)?;

    // -- 2. Headers: policy-filtered copy, then the origin Host --
    let upstream_headers = rewrite::build_upstream_headers(&headers, &state.origin, &state.policy);

    // -- 3. Body only for methods that carry one --
    let upstream_body = rewrite::method_allows_body(&method).then_some(body);

    tracing::debug!(%method, url = %upstream_url, "forwarding to origin");

    // -- 4. The single outbound call, bounded by the configured timeout --
    let upstream_resp = match tokio::time::timeout(
        state.upstream_timeout,
        state
            .client
            .forward(method, upstream_url, upstream_headers, upstream_body),
    )
    .await
    {
        Ok(Ok(resp)) => resp,
        Ok(Err(e)) => return Err(e),
        Err(_) => {
            tracing::warn!(timeout = ?state.upstream_timeout, "origin did not respond in time");
            return Err(AppError::UpstreamTimeout);
        }
    };

    // -- 5. Relay status, headers and body stream back to the caller --
    relay_response(upstream_resp, &state.policy)
}

/// Build the relayed response: status verbatim, origin headers minus the
/// hop-by-hop set, body streamed chunk-by-chunk so large objects never
/// sit fully in memory.
fn relay_response(
    upstream: reqwest::Response,
    policy: &HeaderPolicy,
) -> Result<Response, AppError> {
    let mut builder = Response::builder().status(upstream.status());

    for (name, value) in upstream.headers() {
        if !policy.strips_response(name.as_str()) {
            builder = builder.header(name, value);
        }
    }

    let stream = upstream
        .bytes_stream()
        .map_err(|e| io::Error::new(io::ErrorKind::BrokenPipe, e.to_string()));

    builder
        .body(Body::from_stream(stream))
        .map_err(|e| AppError::Internal(anyhow::anyhow!("response build failed: {}", e)))
}
