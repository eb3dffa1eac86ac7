// ============================================================================
// Trade Book Benchmarks
// ============================================================================
//
// Benchmark Categories:
// 1. Queue Operations - Push and pop on a single priority queue
// 2. Full Matching - End-to-end submission through the book
// 3. Snapshots - Depth aggregation over a populated book
// ============================================================================

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rust_decimal::Decimal;
use std::hint::black_box;
use std::sync::Arc;
use trade_book::domain::{AskQueue, QueueEntry};
use trade_book::prelude::*;

fn registry() -> SharedRegistry {
    let mut registry = Registry::new();
    registry.add_asset(Asset::new("asset1", "Asset 1", 1_000_000));
    registry.add_investor(Investor::new("seller"));
    registry.add_investor(Investor::new("buyer"));
    registry.into_shared()
}

fn book() -> Book {
    Book::new(BookConfig::default(), registry(), Arc::new(NoOpEventHandler))
}

// ============================================================================
// Queue Operations
// ============================================================================

fn benchmark_queue_push_pop(c: &mut Criterion) {
    let mut group = c.benchmark_group("queue_push_pop");

    for size in [10, 100, 1000].iter() {
        let entries: Vec<QueueEntry> = (0..*size as u64)
            .map(|i| QueueEntry {
                order_id: OrderId::new(),
                price: Decimal::from(100 + (i % 50)),
                sequence: i,
            })
            .collect();

        group.bench_with_input(BenchmarkId::from_parameter(size), &entries, |b, entries| {
            b.iter(|| {
                let mut queue = AskQueue::new();
                for entry in entries {
                    queue.push(*entry);
                }
                while let Ok(entry) = queue.pop_best() {
                    black_box(entry);
                }
            });
        });
    }

    group.finish();
}

// ============================================================================
// Full Matching
// ============================================================================

fn benchmark_full_match(c: &mut Criterion) {
    c.bench_function("submit_crossing_pair", |b| {
        let mut book = book();
        b.iter(|| {
            book.submit(Order::new("seller", "asset1", Side::Sell, 1, Decimal::from(10)));
            black_box(book.submit(Order::new("buyer", "asset1", Side::Buy, 1, Decimal::from(10))));
        });
    });
}

fn benchmark_deep_book_match(c: &mut Criterion) {
    let mut group = c.benchmark_group("match_against_depth");

    for depth in [100, 1000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(depth), depth, |b, &depth| {
            let mut book = book();
            for i in 0..depth {
                let price = Decimal::from(100 + (i % 100) as i64);
                book.submit(Order::new("seller", "asset1", Side::Sell, 1_000_000, price));
            }
            b.iter(|| {
                black_box(book.submit(Order::new(
                    "buyer",
                    "asset1",
                    Side::Buy,
                    1,
                    Decimal::from(150),
                )))
            });
        });
    }

    group.finish();
}

// ============================================================================
// Snapshots
// ============================================================================

fn benchmark_snapshot(c: &mut Criterion) {
    let mut book = book();
    for i in 0..1000i64 {
        book.submit(Order::new("buyer", "asset1", Side::Buy, 10, Decimal::from(100 + i % 200)));
        book.submit(Order::new("seller", "asset1", Side::Sell, 10, Decimal::from(400 + i % 200)));
    }

    c.bench_function("snapshot_depth_10", |b| {
        b.iter(|| black_box(book.snapshot_with_depth("asset1", 10)))
    });
}

criterion_group!(
    benches,
    benchmark_queue_push_pop,
    benchmark_full_match,
    benchmark_deep_book_match,
    benchmark_snapshot
);
criterion_main!(benches);
