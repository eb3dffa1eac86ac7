// ============================================================================
// Book Runner
// Drives a book from an inbound order stream on a dedicated thread
// ============================================================================

use crate::domain::{BookConfig, Order};
use crate::engine::Book;
use crate::errors::{BookError, BookResult};
use crossbeam::channel::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use tracing::{info, warn};

/// Consume `inbound` until every sender is gone.
///
/// Each order is submitted to `book`; when it produces a transaction the
/// resting order is published on `outbound`, then the incoming one. Matching
/// continues if the outbound consumer goes away, but nothing more is published.
pub fn run(book: &mut Book, inbound: Receiver<Order>, outbound: &Sender<Order>) {
    let mut consumer_gone = false;
    let mut received = 0u64;

    info!(book = %book.config().name, "book loop started");

    for order in inbound.iter() {
        received += 1;

        let Some(published) = book.submit(order).into_published() else {
            continue;
        };

        if consumer_gone {
            continue;
        }

        for order in published {
            if outbound.send(order).is_err() {
                warn!(book = %book.config().name, "outbound stream closed, results dropped");
                consumer_gone = true;
                break;
            }
        }
    }

    info!(
        book = %book.config().name,
        received,
        transactions = book.transactions().len(),
        "book loop stopped"
    );
}

/// Create a channel pair sized by `capacity`; `None` is unbounded
fn order_channel(capacity: Option<usize>) -> (Sender<Order>, Receiver<Order>) {
    match capacity {
        Some(capacity) => channel::bounded(capacity),
        None => channel::unbounded(),
    }
}

/// A book running on its own thread.
///
/// Orders go in through [`submit`](Self::submit) or a cloned
/// [`sender`](Self::sender); matched orders come out of
/// [`published`](Self::published). With the default zero outbound capacity
/// the engine waits for each published order to be received before it
/// continues.
pub struct BookHandle {
    sender: Sender<Order>,
    published: Receiver<Order>,
    worker: JoinHandle<Book>,
}

impl BookHandle {
    /// Start `book` on a thread named after its configuration
    pub fn spawn(book: Book) -> BookResult<Self> {
        let config: &BookConfig = book.config();
        config.validate()?;

        let (sender, inbound) = order_channel(config.inbound_capacity);
        let (outbound, published) = channel::bounded(config.outbound_capacity);
        let thread_name = format!("{}-engine", config.name);

        let worker = thread::Builder::new()
            .name(thread_name)
            .spawn(move || {
                let mut book = book;
                run(&mut book, inbound, &outbound);
                book
            })
            .map_err(|e| BookError::Spawn(e.to_string()))?;

        Ok(Self {
            sender,
            published,
            worker,
        })
    }

    /// Queue an order for matching
    pub fn submit(&self, order: Order) -> BookResult<()> {
        self.sender
            .send(order)
            .map_err(|_| BookError::Disconnected)
    }

    /// A producer handle for other threads. Every clone must be dropped
    /// before [`shutdown`](Self::shutdown) can finish.
    pub fn sender(&self) -> Sender<Order> {
        self.sender.clone()
    }

    pub fn published(&self) -> &Receiver<Order> {
        &self.published
    }

    /// Close the inbound stream, collect whatever is still being published
    /// and hand the book back.
    pub fn shutdown(self) -> BookResult<(Book, Vec<Order>)> {
        let Self {
            sender,
            published,
            worker,
        } = self;

        drop(sender);
        let remaining: Vec<Order> = published.iter().collect();
        let book = worker.join().map_err(|_| BookError::WorkerPanicked)?;

        Ok((book, remaining))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Asset, Investor, OrderStatus, Registry, Side};
    use crate::engine::CompletionLatch;
    use crate::interfaces::NoOpEventHandler;
    use rust_decimal::Decimal;
    use std::sync::Arc;
    use std::time::Duration;

    fn book(config: BookConfig) -> Book {
        let mut registry = Registry::new();
        registry.add_asset(Asset::new("X", "Asset X", 1000));
        registry.add_investor(Investor::new("seller").with_position("X", 20));
        registry.add_investor(Investor::new("buyer"));
        Book::new(config, registry.into_shared(), Arc::new(NoOpEventHandler))
    }

    #[test]
    fn test_run_publishes_resting_then_incoming() {
        let mut book = book(BookConfig::default());
        let (in_tx, in_rx) = channel::unbounded();
        let (out_tx, out_rx) = channel::unbounded();

        let sell = Order::new("seller", "X", Side::Sell, 20, Decimal::from(10));
        let buy = Order::new("buyer", "X", Side::Buy, 20, Decimal::from(10));
        let (sell_id, buy_id) = (sell.id, buy.id);
        in_tx.send(sell).unwrap();
        in_tx.send(buy).unwrap();
        drop(in_tx);

        run(&mut book, in_rx, &out_tx);
        drop(out_tx);

        let published: Vec<Order> = out_rx.iter().collect();
        assert_eq!(published.len(), 2);
        assert_eq!(published[0].id, sell_id);
        assert_eq!(published[1].id, buy_id);
        assert!(published.iter().all(|o| o.status() == OrderStatus::Closed));
    }

    #[test]
    fn test_run_keeps_matching_without_consumer() {
        let mut book = book(BookConfig::default());
        let (in_tx, in_rx) = channel::unbounded();
        let (out_tx, out_rx) = channel::bounded(0);
        drop(out_rx);

        for _ in 0..2 {
            in_tx
                .send(Order::new("seller", "X", Side::Sell, 1, Decimal::from(10)))
                .unwrap();
            in_tx
                .send(Order::new("buyer", "X", Side::Buy, 1, Decimal::from(10)))
                .unwrap();
        }
        drop(in_tx);

        run(&mut book, in_rx, &out_tx);
        assert_eq!(book.transactions().len(), 2);
    }

    #[test]
    fn test_handle_rendezvous_round_trip() {
        let latch = CompletionLatch::new();
        latch.add(1);
        let handle = BookHandle::spawn(book(BookConfig::default()).with_completion(latch.clone()))
            .unwrap();

        handle
            .submit(Order::new("seller", "X", Side::Sell, 20, Decimal::from(10)))
            .unwrap();
        handle
            .submit(Order::new("buyer", "X", Side::Buy, 20, Decimal::from(10)))
            .unwrap();

        let resting = handle.published().recv().unwrap();
        let incoming = handle.published().recv().unwrap();
        assert_eq!(resting.side, Side::Sell);
        assert_eq!(incoming.side, Side::Buy);
        assert!(latch.wait_timeout(Duration::from_secs(5)));

        let (book, remaining) = handle.shutdown().unwrap();
        assert!(remaining.is_empty());
        let registry = book.registry().read();
        assert_eq!(registry.shares_of("seller", "X"), 0);
        assert_eq!(registry.shares_of("buyer", "X"), 20);
    }

    #[test]
    fn test_shutdown_drains_buffered_results() {
        let handle = BookHandle::spawn(book(BookConfig::buffered("drain", 8))).unwrap();
        let sender = handle.sender();
        sender
            .send(Order::new("buyer", "X", Side::Buy, 5, Decimal::from(10)))
            .unwrap();
        sender
            .send(Order::new("seller", "X", Side::Sell, 5, Decimal::from(9)))
            .unwrap();
        drop(sender);

        let (book, remaining) = handle.shutdown().unwrap();
        assert_eq!(remaining.len(), 2);
        assert_eq!(remaining[0].side, Side::Buy);
        assert_eq!(book.transactions()[0].price, Decimal::from(10));
    }

    #[test]
    fn test_spawn_rejects_invalid_config() {
        let result = BookHandle::spawn(book(BookConfig::new("x").with_inbound_capacity(0)));
        assert!(matches!(result, Err(BookError::InvalidConfig(_))));
    }
}
