use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;
use tracing::warn;

use crate::error::RateLimitError;
use crate::window::LimitCategory;

/// Header prefix carrying the used request weight, e.g. `X-MBX-USED-WEIGHT-1M`
pub const USED_WEIGHT_PREFIX: &str = "X-MBX-USED-WEIGHT-";

/// Header prefix carrying the used order count, e.g. `X-MBX-ORDER-COUNT-10S`
pub const ORDER_COUNT_PREFIX: &str = "X-MBX-ORDER-COUNT-";

/// Last observed used capacity per window, as reported by the exchange
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsageCounters {
    pub weight: BTreeMap<String, u64>,
    pub orders: BTreeMap<String, u64>,
}

/// Declared maximum capacity per window
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ceilings {
    pub weight: BTreeMap<String, u64>,
    pub orders: BTreeMap<String, u64>,
}

/// Remaining capacity per window with a known ceiling
///
/// Values go negative when usage exceeds the last known ceiling.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Remaining {
    pub weight: BTreeMap<String, i64>,
    pub orders: BTreeMap<String, i64>,
}

/// Point-in-time copy of the whole ledger
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerState {
    pub ceilings: Ceilings,
    pub used: UsageCounters,
}

impl LedgerState {
    /// Remaining capacity for every window present in the ceilings
    pub fn remaining(&self) -> Remaining {
        Remaining {
            weight: headroom(&self.ceilings.weight, &self.used.weight),
            orders: headroom(&self.ceilings.orders, &self.used.orders),
        }
    }
}

/// `limit - used` as a signed value, saturating at the `i64` bounds
pub fn remaining_capacity(limit: u64, used: u64) -> i64 {
    let diff = i128::from(limit) - i128::from(used);
    i64::try_from(diff).unwrap_or(if diff < 0 { i64::MIN } else { i64::MAX })
}

fn headroom(ceilings: &BTreeMap<String, u64>, used: &BTreeMap<String, u64>) -> BTreeMap<String, i64> {
    ceilings
        .iter()
        .map(|(window, &limit)| {
            let used = used.get(window).copied().unwrap_or(0);
            (window.clone(), remaining_capacity(limit, used))
        })
        .collect()
}

/// A declared ceiling as delivered by exchange metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CeilingEntry {
    /// Raw `rateLimitType` tag, e.g. `REQUEST_WEIGHT`
    pub category: String,
    /// Window key, e.g. `1M`
    pub window: String,
    pub limit: u64,
}

impl CeilingEntry {
    pub fn new(category: impl Into<String>, window: impl Into<String>, limit: u64) -> Self {
        Self { category: category.into(), window: window.into(), limit }
    }
}

/// Shared, concurrency-safe record of rate-limit usage and ceilings
///
/// Cloning the ledger clones the handle; all clones observe the same state.
/// Create one per application and hand it to every component that issues
/// requests or reads capacity.
///
/// Writers are serialised by a single lock so a reader always sees whole
/// categories, never a partially applied update.
#[derive(Debug, Clone, Default)]
pub struct RateLedger {
    state: Arc<RwLock<LedgerState>>,
}

impl RateLedger {
    /// Create an empty ledger: no ceilings, no usage
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the used-capacity headers of a completed response
    ///
    /// Only headers starting with [`USED_WEIGHT_PREFIX`] or
    /// [`ORDER_COUNT_PREFIX`] are considered; matching is exact and
    /// case-sensitive. Reported values overwrite the previous value for the
    /// same window. Windows not mentioned keep their last known value, and a
    /// category with no matching header is left untouched.
    ///
    /// A malformed entry is logged and dropped without affecting the others.
    pub fn record_usage<I, K, V>(&self, headers: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut weight = BTreeMap::new();
        let mut orders = BTreeMap::new();

        for (name, value) in headers {
            let name = name.as_ref();
            let (target, window) = if let Some(window) = name.strip_prefix(USED_WEIGHT_PREFIX) {
                (&mut weight, window)
            } else if let Some(window) = name.strip_prefix(ORDER_COUNT_PREFIX) {
                (&mut orders, window)
            } else {
                continue;
            };

            match parse_usage(name, window, value.as_ref()) {
                Ok(used) => {
                    target.insert(window.to_string(), used);
                }
                Err(err) => warn!("Dropping rate limit header: {err}"),
            }
        }

        if weight.is_empty() && orders.is_empty() {
            return;
        }

        let mut state = self.state.write();
        if !weight.is_empty() {
            state.used.weight = merged(&state.used.weight, weight);
        }
        if !orders.is_empty() {
            state.used.orders = merged(&state.used.orders, orders);
        }
    }

    /// Replace all ceilings with the supplied entries
    ///
    /// Entries whose category tag is not recognised are ignored.
    pub fn refresh_ceilings<I>(&self, entries: I)
    where
        I: IntoIterator<Item = CeilingEntry>,
    {
        let mut ceilings = Ceilings::default();

        for entry in entries {
            match LimitCategory::from_tag(&entry.category) {
                Some(LimitCategory::Weight) => {
                    ceilings.weight.insert(entry.window, entry.limit);
                }
                Some(LimitCategory::Orders) => {
                    ceilings.orders.insert(entry.window, entry.limit);
                }
                None => debug!("Ignoring ceiling with unrecognised category {}", entry.category),
            }
        }

        debug!(
            "Refreshed ceilings: {} {} windows, {} {} windows",
            ceilings.weight.len(),
            LimitCategory::Weight.tag(),
            ceilings.orders.len(),
            LimitCategory::Orders.tag()
        );

        self.state.write().ceilings = ceilings;
    }

    /// Copy of the full state
    pub fn snapshot(&self) -> LedgerState {
        self.state.read().clone()
    }

    pub fn used_weight(&self) -> BTreeMap<String, u64> {
        self.state.read().used.weight.clone()
    }

    pub fn used_orders(&self) -> BTreeMap<String, u64> {
        self.state.read().used.orders.clone()
    }

    pub fn ceilings(&self) -> Ceilings {
        self.state.read().ceilings.clone()
    }

    /// Remaining capacity for every window with a known ceiling
    ///
    /// Empty per category until ceilings have been refreshed.
    pub fn remaining(&self) -> Remaining {
        self.state.read().remaining()
    }

    pub fn remaining_weight(&self) -> BTreeMap<String, i64> {
        let state = self.state.read();
        headroom(&state.ceilings.weight, &state.used.weight)
    }

    pub fn remaining_orders(&self) -> BTreeMap<String, i64> {
        let state = self.state.read();
        headroom(&state.ceilings.orders, &state.used.orders)
    }
}

fn parse_usage(header: &str, window: &str, value: &str) -> Result<u64, RateLimitError> {
    if window.is_empty() {
        return Err(RateLimitError::MissingWindow(header.to_string()));
    }

    value.trim().parse().map_err(|_| RateLimitError::InvalidUsage { header: header.to_string(), value: value.to_string() })
}

fn merged(previous: &BTreeMap<String, u64>, observed: BTreeMap<String, u64>) -> BTreeMap<String, u64> {
    let mut next = previous.clone();
    next.extend(observed);
    next
}
