// ============================================================================
// Order Book Domain Model
// Per-side priority queues of resting orders and book snapshots
// ============================================================================

use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;
use std::marker::PhantomData;

use super::{AssetId, OrderId, Price, Shares, Side};
use crate::errors::{BookError, BookResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ============================================================================
// Queue Priority
// ============================================================================

/// Ordering policy of one side of the book.
///
/// `cmp_price` returns `Greater` when `a` is the better price for this side.
pub trait QueuePriority {
    const SIDE: Side;

    fn cmp_price(a: &Price, b: &Price) -> Ordering;
}

/// Bids: highest price first
#[derive(Debug, Clone, Copy)]
pub struct BidPriority;

impl QueuePriority for BidPriority {
    const SIDE: Side = Side::Buy;

    fn cmp_price(a: &Price, b: &Price) -> Ordering {
        a.cmp(b)
    }
}

/// Asks: lowest price first
#[derive(Debug, Clone, Copy)]
pub struct AskPriority;

impl QueuePriority for AskPriority {
    const SIDE: Side = Side::Sell;

    fn cmp_price(a: &Price, b: &Price) -> Ordering {
        b.cmp(a)
    }
}

// ============================================================================
// Queue Entry
// ============================================================================

/// Reference to a resting order, carrying the keys it is ranked by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueEntry {
    pub order_id: OrderId,
    pub price: Price,
    /// Arrival sequence; breaks ties between equal prices, earliest first
    pub sequence: u64,
}

struct Ranked<P> {
    entry: QueueEntry,
    _policy: PhantomData<P>,
}

impl<P> Ranked<P> {
    fn new(entry: QueueEntry) -> Self {
        Self {
            entry,
            _policy: PhantomData,
        }
    }
}

impl<P: QueuePriority> Ord for Ranked<P> {
    fn cmp(&self, other: &Self) -> Ordering {
        P::cmp_price(&self.entry.price, &other.entry.price)
            .then_with(|| other.entry.sequence.cmp(&self.entry.sequence))
    }
}

impl<P: QueuePriority> PartialOrd for Ranked<P> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<P: QueuePriority> PartialEq for Ranked<P> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<P: QueuePriority> Eq for Ranked<P> {}

// ============================================================================
// Order Book Queue
// ============================================================================

/// Binary heap of resting orders for one side of one asset.
///
/// The top of the heap is the top of book for that side: the highest bid or
/// the lowest ask, earliest arrival first among equal prices.
pub struct OrderBookQueue<P: QueuePriority> {
    heap: BinaryHeap<Ranked<P>>,
}

pub type BidQueue = OrderBookQueue<BidPriority>;
pub type AskQueue = OrderBookQueue<AskPriority>;

impl<P: QueuePriority> OrderBookQueue<P> {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
        }
    }

    pub fn side(&self) -> Side {
        P::SIDE
    }

    /// O(log n)
    pub fn push(&mut self, entry: QueueEntry) {
        self.heap.push(Ranked::new(entry));
    }

    pub fn peek_best(&self) -> Option<&QueueEntry> {
        self.heap.peek().map(|ranked| &ranked.entry)
    }

    pub fn best_price(&self) -> Option<Price> {
        self.peek_best().map(|entry| entry.price)
    }

    /// Remove and return the top of book.
    ///
    /// An empty queue is a caller bug and reported as `EmptyQueue`.
    pub fn pop_best(&mut self) -> BookResult<QueueEntry> {
        self.heap
            .pop()
            .map(|ranked| ranked.entry)
            .ok_or(BookError::EmptyQueue { side: P::SIDE })
    }

    /// Withdraw a specific order; O(n). Returns whether it was queued.
    pub fn remove(&mut self, order_id: OrderId) -> bool {
        let before = self.heap.len();
        self.heap.retain(|ranked| ranked.entry.order_id != order_id);
        self.heap.len() != before
    }

    pub fn contains(&self, order_id: OrderId) -> bool {
        self.heap.iter().any(|ranked| ranked.entry.order_id == order_id)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Entries in match order, best first
    pub fn sorted_entries(&self) -> Vec<QueueEntry> {
        let mut ranked: Vec<&Ranked<P>> = self.heap.iter().collect();
        ranked.sort_unstable_by(|a, b| b.cmp(a));
        ranked.into_iter().map(|r| r.entry).collect()
    }

    /// Aggregate the best `num_levels` price levels as `(price, shares)`,
    /// resolving each order's pending shares through `pending`.
    pub fn depth<F>(&self, num_levels: usize, pending: F) -> Vec<(Price, Shares)>
    where
        F: Fn(OrderId) -> Shares,
    {
        let mut levels: Vec<(Price, Shares)> = Vec::new();

        for entry in self.sorted_entries() {
            let shares = pending(entry.order_id);
            match levels.last_mut() {
                Some((price, total)) if *price == entry.price => *total += shares,
                _ => {
                    if levels.len() == num_levels {
                        break;
                    }
                    levels.push((entry.price, shares));
                },
            }
        }

        levels
    }
}

impl<P: QueuePriority> Default for OrderBookQueue<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: QueuePriority> fmt::Debug for OrderBookQueue<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderBookQueue")
            .field("side", &P::SIDE)
            .field("len", &self.heap.len())
            .field("best_price", &self.best_price())
            .finish()
    }
}

// ============================================================================
// Asset Book
// ============================================================================

/// Both sides of the book for one asset
#[derive(Debug, Default)]
pub struct AssetBook {
    pub bids: BidQueue,
    pub asks: AskQueue,
}

impl AssetBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, side: Side, entry: QueueEntry) {
        match side {
            Side::Buy => self.bids.push(entry),
            Side::Sell => self.asks.push(entry),
        }
    }

    pub fn peek_best(&self, side: Side) -> Option<&QueueEntry> {
        match side {
            Side::Buy => self.bids.peek_best(),
            Side::Sell => self.asks.peek_best(),
        }
    }

    pub fn pop_best(&mut self, side: Side) -> BookResult<QueueEntry> {
        match side {
            Side::Buy => self.bids.pop_best(),
            Side::Sell => self.asks.pop_best(),
        }
    }

    pub fn remove(&mut self, side: Side, order_id: OrderId) -> bool {
        match side {
            Side::Buy => self.bids.remove(order_id),
            Side::Sell => self.asks.remove(order_id),
        }
    }

    pub fn len(&self, side: Side) -> usize {
        match side {
            Side::Buy => self.bids.len(),
            Side::Sell => self.asks.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }
}

// ============================================================================
// Book Snapshot
// ============================================================================

/// Immutable snapshot of one asset's book
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BookSnapshot {
    pub asset_id: AssetId,
    /// Bid levels (price, shares), best first
    pub bids: Vec<(Price, Shares)>,
    /// Ask levels (price, shares), best first
    pub asks: Vec<(Price, Shares)>,
    /// Current spread (ask - bid)
    pub spread: Option<Decimal>,
    pub mid_price: Option<Decimal>,
}

impl BookSnapshot {
    pub fn empty(asset_id: AssetId) -> Self {
        Self::with_depth(asset_id, Vec::new(), Vec::new())
    }

    pub fn with_depth(
        asset_id: AssetId,
        bids: Vec<(Price, Shares)>,
        asks: Vec<(Price, Shares)>,
    ) -> Self {
        let (spread, mid_price) = match (bids.first(), asks.first()) {
            (Some((bid, _)), Some((ask, _))) => {
                (Some(ask - bid), Some((bid + ask) / Decimal::from(2)))
            },
            _ => (None, None),
        };

        Self {
            asset_id,
            bids,
            asks,
            spread,
            mid_price,
        }
    }

    pub fn best_bid(&self) -> Option<Price> {
        self.bids.first().map(|(price, _)| *price)
    }

    pub fn best_ask(&self) -> Option<Price> {
        self.asks.first().map(|(price, _)| *price)
    }

    pub fn total_bid_shares(&self) -> Shares {
        self.bids.iter().map(|(_, shares)| shares).sum()
    }

    pub fn total_ask_shares(&self) -> Shares {
        self.asks.iter().map(|(_, shares)| shares).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(price: i64, sequence: u64) -> QueueEntry {
        QueueEntry {
            order_id: OrderId::new(),
            price: Decimal::from(price),
            sequence,
        }
    }

    #[test]
    fn test_bid_queue_highest_first() {
        let mut bids = BidQueue::new();
        bids.push(entry(10, 1));
        bids.push(entry(12, 2));
        bids.push(entry(11, 3));

        assert_eq!(bids.best_price(), Some(Decimal::from(12)));
        assert_eq!(bids.pop_best().unwrap().price, Decimal::from(12));
        assert_eq!(bids.pop_best().unwrap().price, Decimal::from(11));
        assert_eq!(bids.pop_best().unwrap().price, Decimal::from(10));
        assert!(bids.is_empty());
    }

    #[test]
    fn test_ask_queue_lowest_first() {
        let mut asks = AskQueue::new();
        asks.push(entry(10, 1));
        asks.push(entry(8, 2));
        asks.push(entry(9, 3));

        assert_eq!(asks.side(), Side::Sell);
        assert_eq!(asks.peek_best().map(|e| e.price), Some(Decimal::from(8)));
        assert_eq!(asks.len(), 3);
        assert_eq!(asks.pop_best().unwrap().price, Decimal::from(8));
        assert_eq!(asks.pop_best().unwrap().price, Decimal::from(9));
    }

    #[test]
    fn test_equal_prices_pop_in_arrival_order() {
        let mut asks = AskQueue::new();
        let first = entry(10, 1);
        let second = entry(10, 2);
        let third = entry(10, 3);
        asks.push(third);
        asks.push(first);
        asks.push(second);

        assert_eq!(asks.pop_best().unwrap().order_id, first.order_id);
        assert_eq!(asks.pop_best().unwrap().order_id, second.order_id);
        assert_eq!(asks.pop_best().unwrap().order_id, third.order_id);
    }

    #[test]
    fn test_pop_empty_queue_is_error() {
        let mut bids = BidQueue::new();
        assert_eq!(
            bids.pop_best(),
            Err(BookError::EmptyQueue { side: Side::Buy })
        );
        assert!(bids.peek_best().is_none());
    }

    #[test]
    fn test_remove() {
        let mut bids = BidQueue::new();
        let keep = entry(10, 1);
        let gone = entry(11, 2);
        bids.push(keep);
        bids.push(gone);

        assert!(bids.remove(gone.order_id));
        assert!(!bids.remove(gone.order_id));
        assert!(!bids.contains(gone.order_id));
        assert_eq!(bids.peek_best(), Some(&keep));
    }

    #[test]
    fn test_depth_aggregates_levels() {
        let mut bids = BidQueue::new();
        bids.push(entry(10, 1));
        bids.push(entry(10, 2));
        bids.push(entry(9, 3));
        bids.push(entry(8, 4));

        let levels = bids.depth(2, |_| 5);
        assert_eq!(
            levels,
            vec![(Decimal::from(10), 10), (Decimal::from(9), 5)]
        );
    }

    #[test]
    fn test_book_snapshot() {
        let snapshot = BookSnapshot::with_depth(
            "ASSET-1".to_string(),
            vec![(Decimal::from(100), 1)],
            vec![(Decimal::from(102), 2)],
        );

        assert_eq!(snapshot.best_bid(), Some(Decimal::from(100)));
        assert_eq!(snapshot.best_ask(), Some(Decimal::from(102)));
        assert_eq!(snapshot.spread, Some(Decimal::from(2)));
        assert_eq!(snapshot.mid_price, Some(Decimal::from(101)));
        assert_eq!(snapshot.total_ask_shares(), 2);

        let empty = BookSnapshot::empty("ASSET-1".to_string());
        assert!(empty.spread.is_none());
    }
}
