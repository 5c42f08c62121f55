use fapi_ratelimit::CeilingEntry;
use fapi_ratelimit::LedgerState;
use fapi_ratelimit::RateLedger;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::info;
use tracing::warn;

use crate::client::HttpClient;
use crate::client::HttpClientConfig;
use crate::errors::Result;
use crate::types::AggTrade;
use crate::types::BookTicker;
use crate::types::ExchangeInfo;
use crate::types::FundingRate;
use crate::types::Kline;
use crate::types::KlineInterval;
use crate::types::MarkPrice;
use crate::types::OpenInterest;
use crate::types::OrderbookSnapshot;
use crate::types::RateLimitDescriptor;
use crate::types::ServerTime;
use crate::types::Ticker24h;
use crate::types::TickerPrice;
use crate::types::Trade;

pub const FUTURES_BASE_URL: &str = "https://fapi.binance.com";
pub const FUTURES_TESTNET_URL: &str = "https://testnet.binancefuture.com";

/// Binance USDⓈ-M futures REST client for market data
///
/// Every response is reported to the client's [`RateLedger`]. Clone the
/// ledger handle (see [`FuturesClient::ledger`]) to read usage from elsewhere.
pub struct FuturesClient {
    client: HttpClient,
    base_url: String,
    ledger: RateLedger,
}

impl FuturesClient {
    /// Create a mainnet client with default configuration and a fresh ledger
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    pub fn builder() -> FuturesClientBuilder {
        FuturesClientBuilder::default()
    }

    /// Ledger this client reports usage to
    pub fn ledger(&self) -> &RateLedger {
        &self.ledger
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        self.client.get_json(&url, query, &self.ledger).await
    }

    /// Test connectivity to the REST API
    pub async fn ping(&self) -> Result<()> {
        #[derive(Deserialize)]
        struct Empty {}

        let _: Empty = self.get("/fapi/v1/ping", &[]).await?;
        Ok(())
    }

    pub async fn server_time(&self) -> Result<ServerTime> {
        self.get("/fapi/v1/time", &[]).await
    }

    /// Trading rules, symbols and declared rate limits
    pub async fn exchange_info(&self) -> Result<ExchangeInfo> {
        self.get("/fapi/v1/exchangeInfo", &[]).await
    }

    /// Load declared rate limits into the ledger.
    ///
    /// Ceilings are only replaced once `exchangeInfo` has been fetched and
    /// decoded; on error the previous ceilings stay in place.
    pub async fn refresh_rate_limits(&self) -> Result<LedgerState> {
        let info = self.exchange_info().await?;
        let entries = ceiling_entries(&info.rate_limits);

        info!("Loaded {} rate limit ceilings from exchangeInfo", entries.len());
        self.ledger.refresh_ceilings(entries);

        Ok(self.ledger.snapshot())
    }

    /// Orderbook depth snapshot. Valid limits: 5, 10, 20, 50, 100, 500, 1000
    pub async fn depth(&self, symbol: &str, limit: u16) -> Result<OrderbookSnapshot> {
        self.get("/fapi/v1/depth", &[("symbol", symbol.to_string()), ("limit", limit.to_string())]).await
    }

    pub async fn recent_trades(&self, symbol: &str, limit: Option<u16>) -> Result<Vec<Trade>> {
        let limit = limit.unwrap_or(500).min(1000);
        self.get("/fapi/v1/trades", &[("symbol", symbol.to_string()), ("limit", limit.to_string())]).await
    }

    pub async fn agg_trades(&self, symbol: &str, start_time: Option<u64>, end_time: Option<u64>, limit: Option<u16>) -> Result<Vec<AggTrade>> {
        let mut query = vec![("symbol", symbol.to_string())];
        push_optional(&mut query, "startTime", start_time);
        push_optional(&mut query, "endTime", end_time);
        push_optional(&mut query, "limit", limit.map(|l| l.min(1000)));
        self.get("/fapi/v1/aggTrades", &query).await
    }

    /// Candlesticks, oldest first. At most 1500 per call
    pub async fn klines(
        &self,
        symbol: &str,
        interval: KlineInterval,
        start_time: Option<u64>,
        end_time: Option<u64>,
        limit: Option<u16>,
    ) -> Result<Vec<Kline>> {
        let mut query = vec![("symbol", symbol.to_string()), ("interval", interval.as_str().to_string())];
        push_optional(&mut query, "startTime", start_time);
        push_optional(&mut query, "endTime", end_time);
        push_optional(&mut query, "limit", limit.map(|l| l.min(1500)));
        self.get("/fapi/v1/klines", &query).await
    }

    /// Mark price, index price and current funding rate
    pub async fn mark_price(&self, symbol: &str) -> Result<MarkPrice> {
        self.get("/fapi/v1/premiumIndex", &[("symbol", symbol.to_string())]).await
    }

    pub async fn funding_rate_history(&self, symbol: &str, limit: Option<u16>) -> Result<Vec<FundingRate>> {
        let mut query = vec![("symbol", symbol.to_string())];
        push_optional(&mut query, "limit", limit.map(|l| l.min(1000)));
        self.get("/fapi/v1/fundingRate", &query).await
    }

    pub async fn open_interest(&self, symbol: &str) -> Result<OpenInterest> {
        self.get("/fapi/v1/openInterest", &[("symbol", symbol.to_string())]).await
    }

    /// 24-hour rolling window price change statistics
    pub async fn ticker_24h(&self, symbol: &str) -> Result<Ticker24h> {
        self.get("/fapi/v1/ticker/24hr", &[("symbol", symbol.to_string())]).await
    }

    pub async fn ticker_price(&self, symbol: &str) -> Result<TickerPrice> {
        self.get("/fapi/v1/ticker/price", &[("symbol", symbol.to_string())]).await
    }

    /// Best bid/ask on the book
    pub async fn book_ticker(&self, symbol: &str) -> Result<BookTicker> {
        self.get("/fapi/v1/ticker/bookTicker", &[("symbol", symbol.to_string())]).await
    }
}

fn push_optional<T: ToString>(query: &mut Vec<(&'static str, String)>, key: &'static str, value: Option<T>) {
    if let Some(value) = value {
        query.push((key, value.to_string()));
    }
}

/// Convert declared rate limits, skipping descriptors with an unknown interval
pub fn ceiling_entries(descriptors: &[RateLimitDescriptor]) -> Vec<CeilingEntry> {
    descriptors
        .iter()
        .filter_map(|descriptor| match descriptor.to_ceiling() {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!("Skipping rate limit {}: {err}", descriptor.rate_limit_type);
                None
            }
        })
        .collect()
}

/// Builder for configuring the futures client
pub struct FuturesClientBuilder {
    http_config: HttpClientConfig,
    base_url: String,
    ledger: Option<RateLedger>,
}

impl Default for FuturesClientBuilder {
    fn default() -> Self {
        Self { http_config: HttpClientConfig::default(), base_url: FUTURES_BASE_URL.to_string(), ledger: None }
    }
}

impl FuturesClientBuilder {
    /// Use testnet environment
    pub fn testnet(mut self) -> Self {
        self.base_url = FUTURES_TESTNET_URL.to_string();
        self
    }

    /// Set custom base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Configure HTTP client settings
    pub fn http_config(mut self, config: HttpClientConfig) -> Self {
        self.http_config = config;
        self
    }

    /// Use low-latency transport settings
    pub fn low_latency(mut self) -> Self {
        self.http_config = HttpClientConfig::low_latency();
        self
    }

    /// Report usage to an existing ledger instead of a new one
    pub fn ledger(mut self, ledger: RateLedger) -> Self {
        self.ledger = Some(ledger);
        self
    }

    pub fn build(self) -> Result<FuturesClient> {
        let client = HttpClient::with_config(self.http_config)?;

        Ok(FuturesClient { client, base_url: self.base_url, ledger: self.ledger.unwrap_or_default() })
    }
}
