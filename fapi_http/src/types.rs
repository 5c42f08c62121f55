//! Response types for the USDⓈ-M futures market data endpoints
//!
//! Prices and quantities are i64 fixed-point (see [`crate::serde_helpers`]).

use std::fmt;

use fapi_ratelimit::CeilingEntry;
use fapi_ratelimit::IntervalUnit;
use fapi_ratelimit::window_key;
use serde::Deserialize;
use serde::Deserializer;

use crate::serde_helpers::deserialize_fixed_point_string;
use crate::serde_helpers::deserialize_optional_fixed_point;
use crate::serde_helpers::deserialize_price_levels;
use crate::serde_helpers::parse_field;

#[derive(Debug, Deserialize)]
pub struct ServerTime {
    #[serde(rename = "serverTime")]
    pub server_time: u64,
}

#[derive(Debug, Deserialize)]
pub struct ExchangeInfo {
    pub timezone: String,
    #[serde(rename = "serverTime")]
    pub server_time: u64,
    #[serde(rename = "rateLimits", default)]
    pub rate_limits: Vec<RateLimitDescriptor>,
    #[serde(default)]
    pub symbols: Vec<SymbolInfo>,
}

/// Declared rate limit, e.g. `REQUEST_WEIGHT` 2400 per 1 `MINUTE`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RateLimitDescriptor {
    #[serde(rename = "rateLimitType")]
    pub rate_limit_type: String,
    pub interval: String,
    #[serde(rename = "intervalNum")]
    pub interval_num: u32,
    pub limit: u64,
}

impl RateLimitDescriptor {
    /// Convert into the ledger's ceiling form, deriving the window key
    pub fn to_ceiling(&self) -> fapi_ratelimit::Result<CeilingEntry> {
        let unit: IntervalUnit = self.interval.parse()?;
        Ok(CeilingEntry::new(self.rate_limit_type.clone(), window_key(self.interval_num, unit), self.limit))
    }
}

#[derive(Debug, Deserialize)]
pub struct SymbolInfo {
    pub symbol: String,
    #[serde(default)]
    pub pair: String,
    #[serde(rename = "contractType", default)]
    pub contract_type: String,
    pub status: String,
    #[serde(rename = "baseAsset")]
    pub base_asset: String,
    #[serde(rename = "quoteAsset")]
    pub quote_asset: String,
    #[serde(rename = "marginAsset", default)]
    pub margin_asset: String,
    #[serde(rename = "pricePrecision", default)]
    pub price_precision: u32,
    #[serde(rename = "quantityPrecision", default)]
    pub quantity_precision: u32,
}

#[derive(Debug, Deserialize)]
pub struct OrderbookSnapshot {
    #[serde(rename = "lastUpdateId")]
    pub last_update_id: u64,
    #[serde(rename = "E", default)]
    pub event_time: u64,
    #[serde(rename = "T", default)]
    pub transaction_time: u64,
    #[serde(deserialize_with = "deserialize_price_levels")]
    pub bids: Vec<(i64, i64)>,
    #[serde(deserialize_with = "deserialize_price_levels")]
    pub asks: Vec<(i64, i64)>,
}

#[derive(Debug, Deserialize)]
pub struct Trade {
    pub id: u64,
    #[serde(deserialize_with = "deserialize_fixed_point_string")]
    pub price: i64,
    #[serde(rename = "qty", deserialize_with = "deserialize_fixed_point_string")]
    pub quantity: i64,
    #[serde(rename = "quoteQty", deserialize_with = "deserialize_fixed_point_string")]
    pub quote_quantity: i64,
    pub time: u64,
    #[serde(rename = "isBuyerMaker")]
    pub is_buyer_maker: bool,
}

#[derive(Debug, Deserialize)]
pub struct AggTrade {
    #[serde(rename = "a")]
    pub agg_id: u64,
    #[serde(rename = "p", deserialize_with = "deserialize_fixed_point_string")]
    pub price: i64,
    #[serde(rename = "q", deserialize_with = "deserialize_fixed_point_string")]
    pub quantity: i64,
    #[serde(rename = "f")]
    pub first_trade_id: u64,
    #[serde(rename = "l")]
    pub last_trade_id: u64,
    #[serde(rename = "T")]
    pub time: u64,
    #[serde(rename = "m")]
    pub is_buyer_maker: bool,
}

/// Candlestick interval accepted by the klines endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum KlineInterval {
    #[serde(rename = "1m")]
    OneMinute,
    #[serde(rename = "3m")]
    ThreeMinutes,
    #[serde(rename = "5m")]
    FiveMinutes,
    #[serde(rename = "15m")]
    FifteenMinutes,
    #[serde(rename = "30m")]
    ThirtyMinutes,
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "2h")]
    TwoHours,
    #[serde(rename = "4h")]
    FourHours,
    #[serde(rename = "6h")]
    SixHours,
    #[serde(rename = "8h")]
    EightHours,
    #[serde(rename = "12h")]
    TwelveHours,
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "3d")]
    ThreeDays,
    #[serde(rename = "1w")]
    OneWeek,
    #[serde(rename = "1M")]
    OneMonth,
}

impl KlineInterval {
    pub fn as_str(self) -> &'static str {
        match self {
            KlineInterval::OneMinute => "1m",
            KlineInterval::ThreeMinutes => "3m",
            KlineInterval::FiveMinutes => "5m",
            KlineInterval::FifteenMinutes => "15m",
            KlineInterval::ThirtyMinutes => "30m",
            KlineInterval::OneHour => "1h",
            KlineInterval::TwoHours => "2h",
            KlineInterval::FourHours => "4h",
            KlineInterval::SixHours => "6h",
            KlineInterval::EightHours => "8h",
            KlineInterval::TwelveHours => "12h",
            KlineInterval::OneDay => "1d",
            KlineInterval::ThreeDays => "3d",
            KlineInterval::OneWeek => "1w",
            KlineInterval::OneMonth => "1M",
        }
    }
}

impl fmt::Display for KlineInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One candlestick
///
/// Binance encodes klines as positional arrays, so decoding goes through
/// [`RawKline`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Kline {
    pub open_time: u64,
    pub open: i64,
    pub high: i64,
    pub low: i64,
    pub close: i64,
    pub volume: i64,
    pub close_time: u64,
    pub quote_volume: i64,
    pub trades: u64,
    pub taker_buy_base_volume: i64,
    pub taker_buy_quote_volume: i64,
}

#[derive(Deserialize)]
struct RawKline<'a>(
    u64,
    &'a str,
    &'a str,
    &'a str,
    &'a str,
    &'a str,
    u64,
    &'a str,
    u64,
    &'a str,
    &'a str,
    serde::de::IgnoredAny,
);

impl<'de> Deserialize<'de> for Kline {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawKline::deserialize(deserializer)?;
        let fixed = parse_field::<D::Error>;

        Ok(Kline {
            open_time: raw.0,
            open: fixed(raw.1)?,
            high: fixed(raw.2)?,
            low: fixed(raw.3)?,
            close: fixed(raw.4)?,
            volume: fixed(raw.5)?,
            close_time: raw.6,
            quote_volume: fixed(raw.7)?,
            trades: raw.8,
            taker_buy_base_volume: fixed(raw.9)?,
            taker_buy_quote_volume: fixed(raw.10)?,
        })
    }
}

/// Mark price and funding snapshot from `premiumIndex`
#[derive(Debug, Deserialize)]
pub struct MarkPrice {
    pub symbol: String,
    #[serde(rename = "markPrice", deserialize_with = "deserialize_fixed_point_string")]
    pub mark_price: i64,
    #[serde(rename = "indexPrice", deserialize_with = "deserialize_fixed_point_string")]
    pub index_price: i64,
    #[serde(rename = "estimatedSettlePrice", deserialize_with = "deserialize_fixed_point_string")]
    pub estimated_settle_price: i64,
    #[serde(rename = "lastFundingRate", default, deserialize_with = "deserialize_optional_fixed_point")]
    pub last_funding_rate: Option<i64>,
    #[serde(rename = "interestRate", default, deserialize_with = "deserialize_optional_fixed_point")]
    pub interest_rate: Option<i64>,
    #[serde(rename = "nextFundingTime")]
    pub next_funding_time: u64,
    pub time: u64,
}

#[derive(Debug, Deserialize)]
pub struct FundingRate {
    pub symbol: String,
    #[serde(rename = "fundingRate", deserialize_with = "deserialize_fixed_point_string")]
    pub funding_rate: i64,
    #[serde(rename = "fundingTime")]
    pub funding_time: u64,
    #[serde(rename = "markPrice", default, deserialize_with = "deserialize_optional_fixed_point")]
    pub mark_price: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct OpenInterest {
    pub symbol: String,
    #[serde(rename = "openInterest", deserialize_with = "deserialize_fixed_point_string")]
    pub open_interest: i64,
    pub time: u64,
}

#[derive(Debug, Deserialize)]
pub struct Ticker24h {
    pub symbol: String,
    #[serde(rename = "priceChange", deserialize_with = "deserialize_fixed_point_string")]
    pub price_change: i64,
    #[serde(rename = "priceChangePercent", deserialize_with = "deserialize_fixed_point_string")]
    pub price_change_percent: i64,
    #[serde(rename = "weightedAvgPrice", deserialize_with = "deserialize_fixed_point_string")]
    pub weighted_avg_price: i64,
    #[serde(rename = "lastPrice", deserialize_with = "deserialize_fixed_point_string")]
    pub last_price: i64,
    #[serde(rename = "lastQty", deserialize_with = "deserialize_fixed_point_string")]
    pub last_quantity: i64,
    #[serde(rename = "openPrice", deserialize_with = "deserialize_fixed_point_string")]
    pub open_price: i64,
    #[serde(rename = "highPrice", deserialize_with = "deserialize_fixed_point_string")]
    pub high_price: i64,
    #[serde(rename = "lowPrice", deserialize_with = "deserialize_fixed_point_string")]
    pub low_price: i64,
    #[serde(deserialize_with = "deserialize_fixed_point_string")]
    pub volume: i64,
    #[serde(rename = "quoteVolume", deserialize_with = "deserialize_fixed_point_string")]
    pub quote_volume: i64,
    #[serde(rename = "openTime")]
    pub open_time: u64,
    #[serde(rename = "closeTime")]
    pub close_time: u64,
    #[serde(rename = "firstId")]
    pub first_id: i64,
    #[serde(rename = "lastId")]
    pub last_id: i64,
    pub count: u64,
}

#[derive(Debug, Deserialize)]
pub struct TickerPrice {
    pub symbol: String,
    #[serde(deserialize_with = "deserialize_fixed_point_string")]
    pub price: i64,
    #[serde(default)]
    pub time: u64,
}

#[derive(Debug, Deserialize)]
pub struct BookTicker {
    pub symbol: String,
    #[serde(rename = "bidPrice", deserialize_with = "deserialize_fixed_point_string")]
    pub bid_price: i64,
    #[serde(rename = "bidQty", deserialize_with = "deserialize_fixed_point_string")]
    pub bid_quantity: i64,
    #[serde(rename = "askPrice", deserialize_with = "deserialize_fixed_point_string")]
    pub ask_price: i64,
    #[serde(rename = "askQty", deserialize_with = "deserialize_fixed_point_string")]
    pub ask_quantity: i64,
    #[serde(default)]
    pub time: u64,
}

/// Error body returned by Binance on non-2xx responses
#[derive(Debug, Deserialize)]
pub(crate) struct BinanceError {
    pub code: i64,
    pub msg: String,
}
