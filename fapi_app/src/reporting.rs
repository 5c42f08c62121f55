//! Human-readable summaries of the rate ledger

use std::collections::BTreeMap;

use fapi_ratelimit::LedgerState;
use fapi_ratelimit::parse_window_key;
use fapi_ratelimit::remaining_capacity;
use tracing::info;
use tracing::warn;

/// Window label with its wall-clock span, e.g. `1M (60s)`
fn window_label(window: &str) -> String {
    match parse_window_key(window) {
        Ok((count, unit)) => format!("{window} ({}s)", (unit.duration() * count).as_secs()),
        Err(_) => window.to_string(),
    }
}

/// Window usage line, e.g. `weight 1M (60s): 6/2400 (remaining 2394)`
fn category_lines(label: &str, used: &BTreeMap<String, u64>, ceilings: &BTreeMap<String, u64>, lines: &mut Vec<String>) {
    let mut windows: Vec<&String> = used.keys().chain(ceilings.keys()).collect();
    windows.sort();
    windows.dedup();

    for window in windows {
        let used_now = used.get(window).copied().unwrap_or(0);
        let window_label = window_label(window);
        match ceilings.get(window) {
            Some(&limit) => {
                lines.push(format!("{label} {window_label}: {used_now}/{limit} (remaining {})", remaining_capacity(limit, used_now)));
            }
            None => lines.push(format!("{label} {window_label}: {used_now}/? (ceiling unknown)")),
        }
    }
}

pub fn usage_lines(state: &LedgerState) -> Vec<String> {
    let mut lines = Vec::new();
    category_lines("weight", &state.used.weight, &state.ceilings.weight, &mut lines);
    category_lines("orders", &state.used.orders, &state.ceilings.orders, &mut lines);
    lines
}

/// Highest used/ceiling ratio over windows with a known ceiling
pub fn peak_utilisation(state: &LedgerState) -> Option<(String, f64)> {
    let weight = state.ceilings.weight.iter().map(|(w, &limit)| (format!("weight {w}"), state.used.weight.get(w).copied().unwrap_or(0), limit));
    let orders = state.ceilings.orders.iter().map(|(w, &limit)| (format!("orders {w}"), state.used.orders.get(w).copied().unwrap_or(0), limit));

    weight
        .chain(orders)
        .filter(|(_, _, limit)| *limit > 0)
        .map(|(window, used, limit)| (window, used as f64 / limit as f64))
        .max_by(|a, b| a.1.total_cmp(&b.1))
}

/// Log the ledger, warning when a window is above `warn_at`
pub fn log_usage(state: &LedgerState, warn_at: f64) {
    for line in usage_lines(state) {
        info!("{line}");
    }

    if let Some((window, ratio)) = peak_utilisation(state) {
        if ratio >= warn_at {
            warn!("Rate limit {window} at {:.1}% of ceiling", ratio * 100.0);
        }
    }
}
