//! Pure rewrite core: derive the outbound request from the inbound one.
//!
//! Everything here is side-effect free. The handler owns the I/O; this
//! module owns the contract — which URL the origin sees, which headers
//! survive the hop, and which methods carry a body.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use axum::http::header::HOST;
use axum::http::{HeaderMap, HeaderValue, Method, Uri};
use serde::Deserialize;
use url::Url;

use crate::errors::AppError;

/// Scheme the origin is reached over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scheme {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "http" => Ok(Scheme::Http),
            "https" => Ok(Scheme::Https),
            other => anyhow::bail!("unsupported origin scheme: {}", other),
        }
    }
}

/// The fixed backend every request is forwarded to.
///
/// Validated once at startup and shared read-only by all in-flight
/// requests; nothing mutates it afterwards.
#[derive(Debug, Clone)]
pub struct OriginTarget {
    host: String,
    scheme: Scheme,
    host_header: HeaderValue,
}

impl OriginTarget {
    /// `host` is an authority (`example.com` or `127.0.0.1:9000`), not a
    /// URL — schemes, paths or query strings in it are rejected here
    /// rather than producing a broken outbound URL on every request.
    pub fn new(host: &str, scheme: Scheme) -> anyhow::Result<Self> {
        let host = host.trim().to_string();
        if host.is_empty() {
            anyhow::bail!("origin host must not be empty");
        }

        let probe = Url::parse(&format!("{}://{}/", scheme, host))
            .map_err(|e| anyhow::anyhow!("invalid origin host {:?}: {}", host, e))?;
        if probe.host_str().is_none()
            || probe.path() != "/"
            || probe.query().is_some()
            || !probe.username().is_empty()
        {
            anyhow::bail!(
                "invalid origin host {:?}: expected a bare host[:port] authority",
                host
            );
        }

        let host_header = HeaderValue::from_str(&host)
            .map_err(|e| anyhow::anyhow!("origin host {:?} is not a valid Host header: {}", host, e))?;

        Ok(Self {
            host,
            scheme,
            host_header,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    /// Rebuild the inbound URI against the origin. Only scheme and host
    /// change; path and query pass through verbatim, with no
    /// re-encoding beyond what URL parsing itself performs.
    pub fn rewrite_url(&self, uri: &Uri) -> Result<Url, AppError> {
        let path_and_query = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
        Url::parse(&format!("{}://{}{}", self.scheme, self.host, path_and_query))
            .map_err(|e| AppError::MalformedUrl(e.to_string()))
    }
}

/// Hop-by-hop header names per RFC 7230 §6.1. These describe a single
/// connection and are stripped in both directions.
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailers",
    "transfer-encoding",
    "upgrade",
];

/// Edge-injected request headers stripped when no explicit set is
/// configured. Cloudflare's names, after the reference deployment;
/// other platforms supply their own set via `HOSTRELAY_STRIP_HEADERS`.
pub const DEFAULT_EDGE_HEADERS: &[&str] = &["cf-ray", "cf-connecting-ip"];

/// Which request headers never reach the origin.
///
/// `host` and the hop-by-hop set are always stripped; the edge layer is
/// whatever the deployment configured. Name matching is
/// case-insensitive — `HeaderName` is lowercase by construction.
#[derive(Debug, Clone)]
pub struct HeaderPolicy {
    edge: HashSet<String>,
}

impl HeaderPolicy {
    pub fn new<I, S>(edge_headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            edge: edge_headers
                .into_iter()
                .map(|s| s.as_ref().trim().to_ascii_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    /// True if an inbound request header must not be forwarded.
    ///
    /// `content-length` is recomputed from the actual outbound body: a
    /// GET whose dropped body left a stale length behind would stall
    /// the origin waiting for bytes that never come.
    pub fn strips_request(&self, name: &str) -> bool {
        let name = name.to_ascii_lowercase();
        name == "host"
            || name == "content-length"
            || HOP_BY_HOP.contains(&name.as_str())
            || self.edge.contains(&name)
    }

    /// True if an origin response header must not be relayed. Only the
    /// hop-by-hop set applies here — everything else the origin said is
    /// passed through verbatim.
    pub fn strips_response(&self, name: &str) -> bool {
        let name = name.to_ascii_lowercase();
        HOP_BY_HOP.contains(&name.as_str())
    }
}

impl Default for HeaderPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_EDGE_HEADERS.iter().copied())
    }
}

/// Outbound header set: the inbound headers in original order minus the
/// policy's exclusions, then exactly one `Host` naming the origin. The
/// insert happens after the copy so a duplicate inbound entry cannot
/// survive it.
pub fn build_upstream_headers(
    inbound: &HeaderMap,
    origin: &OriginTarget,
    policy: &HeaderPolicy,
) -> HeaderMap {
    let mut outbound = HeaderMap::with_capacity(inbound.len() + 1);
    for (name, value) in inbound.iter() {
        if !policy.strips_request(name.as_str()) {
            outbound.append(name.clone(), value.clone());
        }
    }
    outbound.insert(HOST, origin.host_header.clone());
    outbound
}

/// GET and HEAD go out bodiless; virtual-hosted origins are known to
/// reject these methods when a body is attached.
pub fn method_allows_body(method: &Method) -> bool {
    !matches!(*method, Method::GET | Method::HEAD)
}
