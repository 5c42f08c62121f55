use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::time::Duration;

/// Granularity at which [`ShutdownSignal::sleep`] re-checks the flag
const SLEEP_SLICE: Duration = Duration::from_millis(100);

/// Cloneable running flag cleared by Ctrl+C
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    running: Arc<AtomicBool>,
}

impl ShutdownSignal {
    /// Flag without a signal handler, for tests and embedding
    pub fn new() -> Self {
        Self { running: Arc::new(AtomicBool::new(true)) }
    }

    /// Install the process-wide Ctrl+C handler. Can only be called once
    pub fn install() -> Result<Self, ctrlc::Error> {
        let signal = Self::new();
        let handler = signal.clone();

        ctrlc::set_handler(move || {
            tracing::info!("Shutdown signal received");
            handler.trigger();
        })?;

        Ok(signal)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    pub fn trigger(&self) {
        self.running.store(false, Ordering::Relaxed);
    }

    /// Sleep for `duration`, returning early once shutdown is requested
    pub async fn sleep(&self, duration: Duration) {
        let deadline = tokio::time::Instant::now() + duration;

        while self.is_running() {
            let now = tokio::time::Instant::now();
            if now >= deadline {
                break;
            }
            tokio::time::sleep((deadline - now).min(SLEEP_SLICE)).await;
        }
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}
