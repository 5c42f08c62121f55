//! # fapi_ratelimit
//!
//! Passive rate-limit ledger for the Binance futures REST API.
//!
//! The ledger records the used capacity the exchange reports in response
//! headers and, once ceilings have been loaded from exchange metadata,
//! computes the remaining headroom per time window. It never blocks or
//! rejects a request.

pub mod error;
pub mod ledger;
pub mod window;

pub use error::RateLimitError;
pub use error::Result;
pub use ledger::CeilingEntry;
pub use ledger::Ceilings;
pub use ledger::LedgerState;
pub use ledger::ORDER_COUNT_PREFIX;
pub use ledger::RateLedger;
pub use ledger::Remaining;
pub use ledger::USED_WEIGHT_PREFIX;
pub use ledger::UsageCounters;
pub use ledger::remaining_capacity;
pub use window::IntervalUnit;
pub use window::LimitCategory;
pub use window::parse_window_key;
pub use window::window_key;
