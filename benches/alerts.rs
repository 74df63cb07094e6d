use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use chrono::{Duration, TimeZone, Utc};
use shop_ledger::{
    alerts::{compute_alerts, AlertPolicy},
    ledger::{DebtRecord, ExpenseRecord, Frequency, StockItem},
};

const FREQUENCIES: [Frequency; 5] = [
    Frequency::None,
    Frequency::Daily,
    Frequency::Weekly,
    Frequency::Monthly,
    Frequency::Yearly,
];

fn fixture(size: usize) -> (Vec<StockItem>, Vec<DebtRecord>, Vec<ExpenseRecord>) {
    let origin = Utc.with_ymd_and_hms(2023, 1, 31, 8, 0, 0).unwrap();
    let stock = (0..size)
        .map(|i| StockItem::new(format!("item-{i}"), (i % 12) as i64, 1.0, 2.0, origin))
        .collect();
    let debts = (0..size)
        .map(|i| {
            let mut debt = DebtRecord::new(format!("customer-{i}"), 10.0, origin);
            debt.is_paid = i % 3 == 0;
            debt
        })
        .collect();
    let expenses = (0..size)
        .map(|i| {
            ExpenseRecord::new("Rent", 100.0, origin + Duration::days((i % 400) as i64))
                .recurring(FREQUENCIES[i % FREQUENCIES.len()])
        })
        .collect();
    (stock, debts, expenses)
}

fn bench_compute_alerts(c: &mut Criterion) {
    let now = Utc.with_ymd_and_hms(2025, 4, 1, 9, 30, 0).unwrap();
    let policy = AlertPolicy::default();
    let mut group = c.benchmark_group("compute_alerts");

    for size in [10usize, 100, 1_000] {
        let (stock, debts, expenses) = fixture(size);
        group.throughput(Throughput::Elements((size * 3) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                compute_alerts(
                    black_box(&stock),
                    black_box(&debts),
                    black_box(&expenses),
                    now,
                    &policy,
                )
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_compute_alerts);
criterion_main!(benches);
