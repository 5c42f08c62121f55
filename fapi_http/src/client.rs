use std::time::Duration;

use fapi_ratelimit::RateLedger;
use reqwest::Client;
use reqwest::ClientBuilder;
use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use reqwest::header::RETRY_AFTER;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use tracing::warn;

use crate::errors::HttpError;
use crate::errors::Result;
use crate::types::BinanceError;

/// Lowercase prefix shared by every Binance usage header
const MBX_HEADER_PREFIX: &str = "x-mbx-";

/// Configuration for the HTTP transport.
///
/// Durations are in milliseconds so the struct can be read straight from a
/// config file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HttpClientConfig {
    /// Maximum idle connections per host (default: 50)
    pub pool_max_idle_per_host: usize,

    /// Idle timeout for pooled connections (default: 90s)
    pub pool_idle_timeout_ms: u64,

    /// Connection establishment timeout (default: 10s)
    pub connect_timeout_ms: u64,

    /// Total request timeout (default: 30s)
    pub request_timeout_ms: u64,

    /// TCP keepalive interval (default: 60s)
    pub tcp_keepalive_ms: u64,

    pub tcp_nodelay: bool,

    /// Skip HTTP/1.1 upgrade and speak HTTP/2 directly (default: false)
    pub http2_prior_knowledge: bool,

    pub http2_keep_alive_interval_ms: u64,

    pub http2_keep_alive_timeout_ms: u64,

    /// Resolve through hickory instead of the blocking system resolver (default: true)
    pub hickory_dns: bool,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            pool_max_idle_per_host: 50,
            pool_idle_timeout_ms: 90_000,
            connect_timeout_ms: 10_000,
            request_timeout_ms: 30_000,
            tcp_keepalive_ms: 60_000,
            tcp_nodelay: true,
            http2_prior_knowledge: false,
            http2_keep_alive_interval_ms: 30_000,
            http2_keep_alive_timeout_ms: 20_000,
            hickory_dns: true,
        }
    }
}

impl HttpClientConfig {
    /// Shorter timeouts for latency-sensitive callers.
    pub fn low_latency() -> Self {
        Self {
            pool_max_idle_per_host: 10,
            pool_idle_timeout_ms: 30_000,
            connect_timeout_ms: 5_000,
            request_timeout_ms: 10_000,
            tcp_keepalive_ms: 30_000,
            http2_keep_alive_interval_ms: 20_000,
            http2_keep_alive_timeout_ms: 10_000,
            ..Default::default()
        }
    }

    /// Larger connection pool for many concurrent requests.
    pub fn high_throughput() -> Self {
        Self { pool_max_idle_per_host: 100, pool_idle_timeout_ms: 120_000, ..Default::default() }
    }
}

/// Thin reqwest wrapper that reports every response to a [`RateLedger`]
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a new HTTP client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(HttpClientConfig::default())
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let mut builder = ClientBuilder::new()
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .pool_idle_timeout(Duration::from_millis(config.pool_idle_timeout_ms))
            .tcp_nodelay(config.tcp_nodelay)
            .tcp_keepalive(Some(Duration::from_millis(config.tcp_keepalive_ms)))
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .use_rustls_tls()
            .min_tls_version(reqwest::tls::Version::TLS_1_2)
            .http2_keep_alive_interval(Some(Duration::from_millis(config.http2_keep_alive_interval_ms)))
            .http2_keep_alive_timeout(Duration::from_millis(config.http2_keep_alive_timeout_ms))
            .gzip(true)
            .brotli(true);

        if config.http2_prior_knowledge {
            builder = builder.http2_prior_knowledge();
        }

        if config.hickory_dns {
            builder = builder.hickory_dns(true);
        }

        let client = builder.build()?;

        Ok(Self { client })
    }

    /// Issue a GET and decode the JSON body.
    ///
    /// Usage headers are recorded in `ledger` for every response that
    /// arrives, including error responses.
    pub async fn get_json<T>(&self, url: &str, query: &[(&str, String)], ledger: &RateLedger) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let response = self.client.get(url).query(query).send().await?;
        let status = response.status();

        ledger.record_usage(header_pairs(response.headers()));
        let retry_after = response.headers().get(RETRY_AFTER).and_then(|v| v.to_str().ok()).and_then(|v| v.trim().parse().ok());

        let bytes = response.bytes().await?;
        debug!("GET {url} -> {status} ({} bytes)", bytes.len());

        if !status.is_success() {
            return Err(error_from_response(status, retry_after, &bytes));
        }

        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Binance usage headers in the exchange's uppercase spelling.
///
/// HTTP header names are case-insensitive and reqwest normalises them to
/// lowercase; the ledger matches the exchange's documented spelling.
pub fn header_pairs(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .filter(|(name, _)| name.as_str().starts_with(MBX_HEADER_PREFIX))
        .filter_map(|(name, value)| Some((name.as_str().to_ascii_uppercase(), value.to_str().ok()?.to_string())))
        .collect()
}

/// Map a non-2xx response to an error
pub(crate) fn error_from_response(status: StatusCode, retry_after: Option<u64>, body: &[u8]) -> HttpError {
    if status == StatusCode::TOO_MANY_REQUESTS || status.as_u16() == 418 {
        warn!("Rate limited by exchange: HTTP {status}, retry after {retry_after:?}s");
        return HttpError::RateLimited { status: status.as_u16(), retry_after };
    }

    match serde_json::from_slice::<BinanceError>(body) {
        Ok(error) => HttpError::ApiError { code: error.code, message: error.msg },
        Err(_) => HttpError::InvalidResponse(format!("HTTP {status}")),
    }
}
