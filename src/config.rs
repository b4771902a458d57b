use serde::Deserialize;

use crate::proxy::rewrite::{Scheme, DEFAULT_EDGE_HEADERS};

#[derive(Debug, Deserialize)]
pub struct Config {
    /// Authority of the backend that actually serves the site content,
    /// e.g. `mybucket.s3-website.eu-west-1.amazonaws.com`.
    pub origin_host: String,
    pub origin_scheme: Scheme,
    pub port: u16,
    /// Edge-injected request header names never forwarded to the origin.
    /// Set via HOSTRELAY_STRIP_HEADERS as a comma-separated list.
    pub strip_headers: Vec<String>,
    /// Bound on the wait for origin response headers, in seconds.
    pub upstream_timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

pub fn load() -> anyhow::Result<Config> {
    dotenvy::dotenv().ok();

    let origin_host = std::env::var("HOSTRELAY_ORIGIN_HOST")
        .ok()
        .map(|h| h.trim().to_string())
        .filter(|h| !h.is_empty());
    let Some(origin_host) = origin_host else {
        anyhow::bail!(
            "HOSTRELAY_ORIGIN_HOST is not set. \
             Point it at the host that serves the site content, \
             e.g. mybucket.s3-website.eu-west-1.amazonaws.com"
        );
    };

    let origin_scheme: Scheme = std::env::var("HOSTRELAY_ORIGIN_SCHEME")
        .unwrap_or_else(|_| "http".into())
        .parse()?;

    Ok(Config {
        origin_host,
        origin_scheme,
        port: std::env::var("HOSTRELAY_PORT")
            .unwrap_or_else(|_| "8787".into())
            .parse()
            .unwrap_or(8787),
        strip_headers: parse_header_list(
            &std::env::var("HOSTRELAY_STRIP_HEADERS")
                .unwrap_or_else(|_| DEFAULT_EDGE_HEADERS.join(",")),
        ),
        upstream_timeout_secs: std::env::var("HOSTRELAY_UPSTREAM_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30),
        connect_timeout_secs: std::env::var("HOSTRELAY_CONNECT_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(5),
    })
}

/// Split a comma-separated header list. An explicitly empty value yields
/// an empty set, which disables edge-header stripping entirely.
fn parse_header_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.to_ascii_lowercase())
        .collect()
}
