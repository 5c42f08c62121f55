use std::time::Duration;

use fapi_app::cli::MonitorArgs;
use fapi_app::config_loader;
use fapi_app::reporting;
use fapi_app::shutdown_handler::ShutdownSignal;
use fapi_http::FuturesClient;
use fapi_http::HttpError;
use fapi_http::serde_helpers::from_fixed_point;
use fapi_http::types::KlineInterval;
use fapi_ratelimit::RateLedger;
use tracing::error;
use tracing::info;
use tracing::warn;

const DEFAULT_CONFIG_PATH: &str = "config/fapi_monitor.toml";

/// Poll market data for one symbol and report rate-limit headroom after each round
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = MonitorArgs::from_env(DEFAULT_CONFIG_PATH);
    let mut config = config_loader::load_monitor_config_or_default(&args.config_path);
    if let Some(symbol) = args.symbol {
        config.symbol = symbol;
    }

    // Keep guard alive for entire application lifetime
    let _guard = fapi_app::tracing_setup::init(&config.logging);

    let ledger = RateLedger::new();
    let mut builder = FuturesClient::builder().http_config(config.http.clone()).ledger(ledger.clone());
    if config.testnet {
        builder = builder.testnet();
    }
    if let Some(url) = &config.base_url {
        builder = builder.base_url(url.clone());
    }
    let client = builder.build()?;

    info!("Starting futures monitor for {} against {}", config.symbol, client.base_url());

    let shutdown = ShutdownSignal::install()?;

    // Ceilings are optional: without them only used counters are reported
    if let Err(err) = client.refresh_rate_limits().await {
        warn!("Failed to load declared rate limits: {err}");
    }

    let poll_interval = Duration::from_millis(config.poll_interval_ms);
    let mut polls: u64 = 0;

    while shutdown.is_running() {
        polls += 1;

        if config.refresh_limits_every > 0 && polls % u64::from(config.refresh_limits_every) == 0 {
            if let Err(err) = client.refresh_rate_limits().await {
                warn!("Failed to refresh declared rate limits: {err}");
            }
        }

        match poll_market(&client, &config.symbol, config.kline_interval).await {
            Ok(()) => {}
            Err(HttpError::RateLimited { status, retry_after }) => {
                let backoff = Duration::from_secs(retry_after.unwrap_or(60));
                error!("Exchange returned HTTP {status}; pausing for {backoff:?}");
                reporting::log_usage(&ledger.snapshot(), config.warn_utilisation);
                shutdown.sleep(backoff).await;
                continue;
            }
            Err(err) => warn!("Market data poll failed: {err}"),
        }

        reporting::log_usage(&ledger.snapshot(), config.warn_utilisation);
        shutdown.sleep(poll_interval).await;
    }

    info!("Futures monitor stopped after {polls} polls");
    Ok(())
}

async fn poll_market(client: &FuturesClient, symbol: &str, interval: KlineInterval) -> fapi_http::Result<()> {
    let (ticker, book, mark, klines) = tokio::try_join!(
        client.ticker_24h(symbol),
        client.book_ticker(symbol),
        client.mark_price(symbol),
        client.klines(symbol, interval, None, None, Some(2)),
    )?;

    info!(
        "{symbol}: last={} bid={} ask={} mark={} funding={:?} 24h_volume={}",
        from_fixed_point(ticker.last_price),
        from_fixed_point(book.bid_price),
        from_fixed_point(book.ask_price),
        from_fixed_point(mark.mark_price),
        mark.last_funding_rate.map(from_fixed_point),
        from_fixed_point(ticker.volume),
    );

    if let Some(kline) = klines.last() {
        info!("{symbol} {interval} candle close={} trades={}", from_fixed_point(kline.close), kline.trades);
    }

    Ok(())
}
