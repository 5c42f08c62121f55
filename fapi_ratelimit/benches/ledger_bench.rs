use std::hint::black_box;

use criterion::Criterion;
use criterion::criterion_group;
use criterion::criterion_main;
use fapi_ratelimit::CeilingEntry;
use fapi_ratelimit::RateLedger;

fn response_headers(used: u64) -> Vec<(String, String)> {
    vec![
        ("Content-Type".to_string(), "application/json".to_string()),
        ("Date".to_string(), "Fri, 16 Oct 2026 12:00:00 GMT".to_string()),
        ("X-MBX-USED-WEIGHT-1M".to_string(), used.to_string()),
        ("X-MBX-ORDER-COUNT-10S".to_string(), (used % 300).to_string()),
        ("X-MBX-ORDER-COUNT-1M".to_string(), (used % 1200).to_string()),
        ("X-Response-Time".to_string(), "3ms".to_string()),
    ]
}

fn bench_record_usage(c: &mut Criterion) {
    c.bench_function("ledger_record_usage", |b| {
        let ledger = RateLedger::new();
        let headers = response_headers(42);

        b.iter(|| {
            ledger.record_usage(black_box(&headers).iter().map(|(k, v)| (k.as_str(), v.as_str())));
        });
    });
}

fn bench_remaining(c: &mut Criterion) {
    c.bench_function("ledger_remaining", |b| {
        let ledger = RateLedger::new();
        ledger.refresh_ceilings([
            CeilingEntry::new("REQUEST_WEIGHT", "1M", 2400),
            CeilingEntry::new("ORDERS", "1M", 1200),
            CeilingEntry::new("ORDERS", "10S", 300),
        ]);
        ledger.record_usage(response_headers(100));

        b.iter(|| black_box(ledger.remaining()));
    });
}

criterion_group!(benches, bench_record_usage, bench_remaining);
criterion_main!(benches);
