// ============================================================================
// Basic Usage Example
// ============================================================================

use rust_decimal::Decimal;
use std::sync::Arc;
use std::thread;
use trade_book::prelude::*;

fn main() {
    #[cfg(feature = "logging")]
    trade_book::utils::init_logging("trade_book=info");

    println!("=== Trade Book Example ===\n");

    let mut registry = Registry::new();
    registry.add_asset(Asset::new("asset1", "Asset 1", 1000));
    for i in 0..3 {
        registry.add_investor(Investor::new(format!("seller_{}", i)).with_position("asset1", 100));
        registry.add_investor(Investor::new(format!("buyer_{}", i)));
    }
    let registry = registry.into_shared();

    let latch = CompletionLatch::new();
    latch.add(3);

    let handle = BookBuilder::new("demo")
        .with_registry(Arc::clone(&registry))
        .with_event_handler(Arc::new(LoggingEventHandler))
        .with_completion(latch.clone())
        .spawn()
        .unwrap();

    println!("Started book 'demo' for asset1\n");

    // Asks at 10, 11, 12 then bids that each cross one of them
    let producer = {
        let sender = handle.sender();
        thread::spawn(move || {
            for i in 0..3i64 {
                let sell = Order::new(
                    format!("seller_{}", i),
                    "asset1",
                    Side::Sell,
                    10,
                    Decimal::from(10 + i),
                );
                sender.send(sell).unwrap();
            }
            for i in 0..3i64 {
                let buy = Order::new(
                    format!("buyer_{}", i),
                    "asset1",
                    Side::Buy,
                    10,
                    Decimal::from(12),
                );
                sender.send(buy).unwrap();
            }
        })
    };

    // Two published orders per transaction: resting, then incoming
    for _ in 0..3 {
        let resting = handle.published().recv().unwrap();
        let incoming = handle.published().recv().unwrap();
        let transaction = &incoming.transactions()[incoming.transactions_count() - 1];
        println!(
            "Matched {} ({}) with {} ({}): {} @ {} = {}",
            resting.investor_id,
            resting.side,
            incoming.investor_id,
            incoming.side,
            transaction.shares,
            transaction.price,
            transaction.total
        );
    }

    producer.join().unwrap();
    latch.wait();

    let (book, _) = handle.shutdown().unwrap();
    let snapshot = book.snapshot("asset1");
    println!("\nBest bid: {:?}", snapshot.best_bid());
    println!("Best ask: {:?}", snapshot.best_ask());

    println!("\nPositions:");
    let registry = registry.read();
    for i in 0..3 {
        for id in [format!("seller_{}", i), format!("buyer_{}", i)] {
            println!("  {}: {}", id, registry.shares_of(&id, "asset1"));
        }
    }

    println!("\n=== Example Complete ===");
}
