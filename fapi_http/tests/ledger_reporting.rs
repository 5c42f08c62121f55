//! End-to-end checks that responses feed the rate ledger
//!
//! A minimal HTTP/1.1 stub on 127.0.0.1 stands in for the exchange.

use std::collections::HashMap;
use std::sync::Arc;

use fapi_http::FuturesClient;
use fapi_http::HttpClientConfig;
use fapi_http::HttpError;
use fapi_http::types::KlineInterval;
use fapi_ratelimit::CeilingEntry;
use fapi_ratelimit::RateLedger;
use tokio::io::AsyncReadExt;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;

#[derive(Clone)]
struct StubResponse {
    status: u16,
    headers: Vec<(&'static str, String)>,
    body: String,
}

impl StubResponse {
    fn ok(body: &str, headers: &[(&'static str, &str)]) -> Self {
        Self::with_status(200, body, headers)
    }

    fn with_status(status: u16, body: &str, headers: &[(&'static str, &str)]) -> Self {
        Self { status, headers: headers.iter().map(|(k, v)| (*k, v.to_string())).collect(), body: body.to_string() }
    }
}

/// Serve canned responses keyed by request path, returns the base URL
async fn spawn_stub(routes: HashMap<&'static str, StubResponse>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let routes = Arc::new(routes);

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else { break };
            let routes = Arc::clone(&routes);

            tokio::spawn(async move {
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }

                let request = String::from_utf8_lossy(&request);
                let target = request.split_whitespace().nth(1).unwrap_or("/");
                let path = target.split('?').next().unwrap_or(target);

                let response = routes.get(path).cloned().unwrap_or_else(|| StubResponse::with_status(404, r#"{"code":-1,"msg":"not found"}"#, &[]));

                let mut raw = format!(
                    "HTTP/1.1 {} STUB\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n",
                    response.status,
                    response.body.len()
                );
                for (name, value) in &response.headers {
                    raw.push_str(&format!("{name}: {value}\r\n"));
                }
                raw.push_str("\r\n");
                raw.push_str(&response.body);

                let _ = socket.write_all(raw.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    format!("http://{addr}")
}

fn client(base_url: &str, ledger: RateLedger) -> FuturesClient {
    let config = HttpClientConfig { hickory_dns: false, ..HttpClientConfig::default() };
    FuturesClient::builder().base_url(base_url).http_config(config).ledger(ledger).build().unwrap()
}

const EXCHANGE_INFO: &str = r#"{
    "timezone":"UTC","serverTime":1760616000000,
    "rateLimits":[
        {"rateLimitType":"REQUEST_WEIGHT","interval":"MINUTE","intervalNum":1,"limit":2400},
        {"rateLimitType":"ORDERS","interval":"MINUTE","intervalNum":1,"limit":1200},
        {"rateLimitType":"ORDERS","interval":"SECOND","intervalNum":10,"limit":300}
    ],
    "symbols":[]
}"#;

#[tokio::test]
async fn test_response_headers_reach_ledger() {
    let mut routes = HashMap::new();
    routes.insert(
        "/fapi/v1/ticker/price",
        StubResponse::ok(r#"{"symbol":"BTCUSDT","price":"6000.01","time":1589437530011}"#, &[("X-MBX-USED-WEIGHT-1M", "7")]),
    );
    let base_url = spawn_stub(routes).await;

    let ledger = RateLedger::new();
    let client = client(&base_url, ledger.clone());

    let ticker = client.ticker_price("BTCUSDT").await.unwrap();

    assert_eq!(ticker.price, 600_001_000_000);
    assert_eq!(ledger.used_weight().get("1M"), Some(&7));
    assert!(ledger.used_orders().is_empty());
}

#[tokio::test]
async fn test_refresh_rate_limits_and_remaining() {
    let mut routes = HashMap::new();
    routes.insert("/fapi/v1/exchangeInfo", StubResponse::ok(EXCHANGE_INFO, &[("X-MBX-USED-WEIGHT-1M", "1")]));
    routes.insert(
        "/fapi/v1/klines",
        StubResponse::ok(
            r#"[[1499040000000,"0.0163","0.8","0.0157","0.0157","148976.1",1499644799999,"2434.1",308,"1756.8","28.4","0"]]"#,
            &[("X-MBX-USED-WEIGHT-1M", "6")],
        ),
    );
    let base_url = spawn_stub(routes).await;

    let ledger = RateLedger::new();
    let client = client(&base_url, ledger.clone());

    let state = client.refresh_rate_limits().await.unwrap();
    assert_eq!(state.ceilings.weight.get("1M"), Some(&2400));
    assert_eq!(state.ceilings.orders.get("10S"), Some(&300));
    assert_eq!(ledger.remaining_weight().get("1M"), Some(&2399));

    let klines = client.klines("BTCUSDT", KlineInterval::OneMinute, None, None, Some(1)).await.unwrap();
    assert_eq!(klines.len(), 1);

    let remaining = ledger.remaining();
    assert_eq!(remaining.weight.get("1M"), Some(&2394));
    assert_eq!(remaining.orders.get("1M"), Some(&1200));
    assert_eq!(remaining.orders.get("10S"), Some(&300));
}

#[tokio::test]
async fn test_failed_refresh_keeps_previous_ceilings() {
    let mut routes = HashMap::new();
    routes.insert(
        "/fapi/v1/exchangeInfo",
        StubResponse::with_status(500, r#"{"code":-1001,"msg":"Internal error; unable to process your request."}"#, &[]),
    );
    let base_url = spawn_stub(routes).await;

    let ledger = RateLedger::new();
    ledger.refresh_ceilings([CeilingEntry::new("REQUEST_WEIGHT", "1M", 1200)]);
    let client = client(&base_url, ledger.clone());

    let result = client.refresh_rate_limits().await;

    assert!(matches!(result, Err(HttpError::ApiError { code: -1001, .. })));
    assert_eq!(ledger.ceilings().weight.get("1M"), Some(&1200));
}

#[tokio::test]
async fn test_rate_limited_response_still_records_usage() {
    let mut routes = HashMap::new();
    routes.insert(
        "/fapi/v1/depth",
        StubResponse::with_status(
            429,
            r#"{"code":-1003,"msg":"Too many requests."}"#,
            &[("X-MBX-USED-WEIGHT-1M", "2450"), ("Retry-After", "12")],
        ),
    );
    let base_url = spawn_stub(routes).await;

    let ledger = RateLedger::new();
    ledger.refresh_ceilings([CeilingEntry::new("REQUEST_WEIGHT", "1M", 2400)]);
    let client = client(&base_url, ledger.clone());

    let result = client.depth("BTCUSDT", 100).await;

    assert!(matches!(result, Err(HttpError::RateLimited { status: 429, retry_after: Some(12) })));
    assert_eq!(ledger.remaining_weight().get("1M"), Some(&-50));
}
