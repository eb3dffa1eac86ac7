// ============================================================================
// Trade Book Library
// Continuous double-auction matching with per-asset priority books
// ============================================================================

//! # Trade Book
//!
//! A continuous double-auction matching engine. Orders arrive on an inbound
//! stream, are queued per asset in a bid and an ask priority queue, and are
//! matched against the best order on the opposite side. Every match produces a
//! transaction that updates both orders and both investors' positions.
//!
//! ## Features
//!
//! - **Price priority** with FIFO tie-break on equal prices
//! - **Resting-price execution**: trades print at the resting order's price
//! - **Streamed results** over crossbeam channels, or tokio with `async`
//! - **Event hooks** for logging and auditing through [`EventHandler`](interfaces::EventHandler)
//!
//! ## Example
//!
//! ```rust
//! use trade_book::prelude::*;
//! use rust_decimal::Decimal;
//!
//! let mut registry = Registry::new();
//! registry.add_asset(Asset::new("ACME", "Acme Corp", 1_000));
//! registry.add_investor(Investor::new("seller").with_position("ACME", 20));
//! registry.add_investor(Investor::new("buyer"));
//!
//! let handle = BookBuilder::new("equities")
//!     .with_registry(registry.into_shared())
//!     .spawn()
//!     .unwrap();
//!
//! handle.submit(Order::new("seller", "ACME", Side::Sell, 20, Decimal::from(10))).unwrap();
//! handle.submit(Order::new("buyer", "ACME", Side::Buy, 20, Decimal::from(10))).unwrap();
//!
//! // Resting order first, then the one that crossed it
//! let resting = handle.published().recv().unwrap();
//! let incoming = handle.published().recv().unwrap();
//! assert_eq!(resting.side, Side::Sell);
//! assert_eq!(incoming.transactions()[0].total, Decimal::from(200));
//!
//! let (book, _) = handle.shutdown().unwrap();
//! assert_eq!(book.registry().read().shares_of("buyer", "ACME"), 20);
//! ```

pub mod domain;
pub mod engine;
pub mod errors;
pub mod interfaces;
pub mod utils;

// Re-exports for convenience
pub mod prelude {
    pub use crate::domain::{
        Asset, AssetPosition, BookConfig, BookSnapshot, Investor, Order, OrderId, OrderRequest,
        OrderStatus, Price, Registry, SharedRegistry, Shares, Side, Transaction,
    };
    pub use crate::engine::{
        create_from_config, run, Book, BookBuilder, BookHandle, CompletionLatch, Submission,
    };
    pub use crate::errors::{BookError, BookResult, RejectReason};
    pub use crate::interfaces::{BookEvent, EventHandler, LoggingEventHandler, NoOpEventHandler};

    #[cfg(feature = "async")]
    pub use crate::engine::{AsyncBookHandle, AsyncOrderSender};
}

#[cfg(test)]
mod integration_tests {
    use super::prelude::*;
    use rust_decimal::Decimal;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    fn registry() -> SharedRegistry {
        let mut registry = Registry::new();
        registry.add_asset(Asset::new("asset1", "Asset 1", 1000));
        registry.add_asset(Asset::new("asset2", "Asset 2", 1000));
        registry.add_investor(Investor::new("investor1").with_position("asset1", 20));
        registry.add_investor(Investor::new("investor2"));
        registry.into_shared()
    }

    #[test]
    fn test_end_to_end_matching() {
        let latch = CompletionLatch::new();
        latch.add(1);

        let handle = BookBuilder::new("e2e")
            .with_registry(registry())
            .with_event_handler(Arc::new(LoggingEventHandler))
            .with_completion(latch.clone())
            .spawn()
            .unwrap();

        let sell = Order::new("investor1", "asset1", Side::Sell, 20, Decimal::from(10));
        let buy = Order::new("investor2", "asset1", Side::Buy, 20, Decimal::from(10));
        let (sell_id, buy_id) = (sell.id, buy.id);

        let producer = {
            let sender = handle.sender();
            thread::spawn(move || {
                sender.send(sell).unwrap();
                sender.send(buy).unwrap();
            })
        };

        let first = handle.published().recv().unwrap();
        let second = handle.published().recv().unwrap();
        producer.join().unwrap();
        assert!(latch.wait_timeout(Duration::from_secs(5)));

        assert_eq!(first.id, sell_id);
        assert_eq!(second.id, buy_id);
        for order in [&first, &second] {
            assert_eq!(order.status(), OrderStatus::Closed);
            assert_eq!(order.pending_shares(), 0);
            assert_eq!(order.transactions_count(), 1);
            assert_eq!(order.transactions()[0].total, Decimal::from(200));
        }

        let (book, remaining) = handle.shutdown().unwrap();
        assert!(remaining.is_empty());

        let registry = book.registry().read();
        assert_eq!(registry.shares_of("investor1", "asset1"), 0);
        assert_eq!(registry.shares_of("investor2", "asset1"), 20);
    }

    #[test]
    fn test_different_assets_never_match() {
        let handle = BookBuilder::new("split")
            .with_registry(registry())
            .spawn()
            .unwrap();

        handle
            .submit(Order::new("investor2", "asset1", Side::Buy, 5, Decimal::from(10)))
            .unwrap();
        handle
            .submit(Order::new("investor1", "asset2", Side::Sell, 3, Decimal::from(10)))
            .unwrap();

        let (book, remaining) = handle.shutdown().unwrap();
        assert!(remaining.is_empty());
        assert!(book.transactions().is_empty());
        assert!(book.orders().all(|o| o.status() == OrderStatus::Open));
        assert_eq!(book.snapshot("asset1").total_bid_shares(), 5);
        assert_eq!(book.snapshot("asset2").total_ask_shares(), 3);
    }

    #[test]
    fn test_many_producers_conserve_shares() {
        let handle = BookBuilder::new("busy")
            .with_registry(registry())
            .with_outbound_capacity(1024)
            .spawn()
            .unwrap();

        let producers: Vec<_> = (0..4)
            .map(|i| {
                let sender = handle.sender();
                thread::spawn(move || {
                    let (investor, side) = if i % 2 == 0 {
                        ("investor1", Side::Sell)
                    } else {
                        ("investor2", Side::Buy)
                    };
                    for _ in 0..50 {
                        let order = Order::new(investor, "asset1", side, 2, Decimal::from(10));
                        sender.send(order).unwrap();
                    }
                })
            })
            .collect();

        for producer in producers {
            producer.join().unwrap();
        }

        let (book, published) = handle.shutdown().unwrap();
        let traded: u64 = book.transactions().iter().map(|t| t.shares).sum();
        assert_eq!(published.len(), book.transactions().len() * 2);

        let registry = book.registry().read();
        assert_eq!(registry.shares_of("investor1", "asset1"), 20 - traded as i64);
        assert_eq!(registry.shares_of("investor2", "asset1"), traded as i64);
    }
}
