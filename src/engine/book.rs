// ============================================================================
// Book
// Per-asset matching and transaction application
// ============================================================================

use crate::domain::{
    AssetBook, AssetId, BookConfig, BookSnapshot, Order, OrderId, OrderRequest, Price,
    QueueEntry, SharedRegistry, Shares, Side, Transaction, MAX_ORDER_SHARES,
};
use crate::engine::CompletionLatch;
use crate::errors::RejectReason;
use crate::interfaces::{BookEvent, EventHandler};
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Outcome of a single submission
#[derive(Debug, Clone)]
pub enum Submission {
    /// The order crossed a resting order. Both snapshots reflect the applied
    /// transaction.
    Matched {
        transaction: Arc<Transaction>,
        resting: Order,
        incoming: Order,
    },

    /// The order is resting in its queue without a match
    Enqueued { order_id: OrderId },

    /// The order never reached a queue
    Rejected {
        order_id: OrderId,
        reason: RejectReason,
    },
}

impl Submission {
    pub fn is_matched(&self) -> bool {
        matches!(self, Submission::Matched { .. })
    }

    pub fn transaction(&self) -> Option<&Arc<Transaction>> {
        match self {
            Submission::Matched { transaction, .. } => Some(transaction),
            _ => None,
        }
    }

    pub fn reject_reason(&self) -> Option<&RejectReason> {
        match self {
            Submission::Rejected { reason, .. } => Some(reason),
            _ => None,
        }
    }

    /// Orders to publish downstream, resting order first
    pub fn into_published(self) -> Option<[Order; 2]> {
        match self {
            Submission::Matched {
                resting, incoming, ..
            } => Some([resting, incoming]),
            _ => None,
        }
    }
}

/// Continuous double-auction book across any number of assets.
///
/// Owns one bid queue and one ask queue per asset, created on the first order
/// for that asset, plus every order it ever accepted and the ledger of applied
/// transactions. A `Book` is driven by a single owner; see
/// [`BookHandle`](crate::engine::BookHandle) for the threaded loop.
pub struct Book {
    config: BookConfig,

    /// Investors and assets that orders refer to by id
    registry: SharedRegistry,

    /// Priority queues keyed by asset
    books: HashMap<AssetId, AssetBook>,

    /// Every accepted order, open or closed
    orders: HashMap<OrderId, Order>,

    /// Running ledger of applied transactions
    transactions: Vec<Arc<Transaction>>,

    event_handler: Arc<dyn EventHandler>,

    /// Released once per applied transaction
    completion: Option<CompletionLatch>,

    /// Arrival sequence; ties between equal prices go to the lower value
    sequence_counter: u64,
}

impl Book {
    pub fn new(
        config: BookConfig,
        registry: SharedRegistry,
        event_handler: Arc<dyn EventHandler>,
    ) -> Self {
        Self {
            config,
            registry,
            books: HashMap::new(),
            orders: HashMap::new(),
            transactions: Vec::new(),
            event_handler,
            completion: None,
            sequence_counter: 0,
        }
    }

    /// Count applied transactions down on `latch`
    pub fn with_completion(mut self, latch: CompletionLatch) -> Self {
        self.completion = Some(latch);
        self
    }

    /// Submit an order: queue it on its side, then try one match against the
    /// best order on the opposite side of the same asset.
    #[instrument(
        name = "submit",
        skip(self, order),
        fields(book = %self.config.name, order_id = %order.id, side = %order.side)
    )]
    pub fn submit(&mut self, mut order: Order) -> Submission {
        let mut events = vec![BookEvent::OrderReceived {
            order_id: order.id,
            timestamp: Utc::now(),
        }];

        if let Err(reason) = self.validate_order(&order) {
            debug!(%reason, "order rejected");
            events.push(BookEvent::OrderRejected {
                order_id: order.id,
                reason: reason.clone(),
                timestamp: Utc::now(),
            });
            self.event_handler.on_events(events);
            return Submission::Rejected {
                order_id: order.id,
                reason,
            };
        }

        self.sequence_counter += 1;
        order.set_sequence_number(self.sequence_counter);

        let order_id = order.id;
        let side = order.side;
        let asset_id = order.asset_id.clone();

        self.books.entry(asset_id.clone()).or_default().push(
            side,
            QueueEntry {
                order_id,
                price: order.price,
                sequence: self.sequence_counter,
            },
        );
        events.push(BookEvent::OrderEnqueued {
            order_id,
            asset_id: asset_id.clone(),
            side,
            price: order.price,
            pending_shares: order.pending_shares(),
            timestamp: Utc::now(),
        });
        self.orders.insert(order_id, order);

        let submission = match self.match_incoming(order_id, side, &asset_id, &mut events) {
            Some(matched) => matched,
            None => Submission::Enqueued { order_id },
        };

        self.event_handler.on_events(events);
        submission
    }

    /// Interpret a raw request and submit it; an unknown side code is rejected
    pub fn submit_request(&mut self, request: OrderRequest) -> Submission {
        let requested_id = request.order_id.map(OrderId::from_uuid);

        match Order::try_from(request) {
            Ok(order) => self.submit(order),
            Err(reason) => {
                let order_id = requested_id.unwrap_or_default();
                debug!(%order_id, %reason, "order request rejected");
                self.event_handler.on_events(vec![
                    BookEvent::OrderReceived {
                        order_id,
                        timestamp: Utc::now(),
                    },
                    BookEvent::OrderRejected {
                        order_id,
                        reason: reason.clone(),
                        timestamp: Utc::now(),
                    },
                ]);
                Submission::Rejected { order_id, reason }
            },
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn config(&self) -> &BookConfig {
        &self.config
    }

    pub fn registry(&self) -> &SharedRegistry {
        &self.registry
    }

    pub fn order(&self, order_id: OrderId) -> Option<&Order> {
        self.orders.get(&order_id)
    }

    pub fn orders(&self) -> impl Iterator<Item = &Order> {
        self.orders.values()
    }

    /// Applied transactions in execution order
    pub fn transactions(&self) -> &[Arc<Transaction>] {
        &self.transactions
    }

    /// Number of assets that have received at least one order
    pub fn asset_count(&self) -> usize {
        self.books.len()
    }

    pub fn queue_len(&self, asset_id: &str, side: Side) -> usize {
        self.books.get(asset_id).map_or(0, |book| book.len(side))
    }

    pub fn best_bid(&self, asset_id: &str) -> Option<Price> {
        self.books.get(asset_id)?.bids.best_price()
    }

    pub fn best_ask(&self, asset_id: &str) -> Option<Price> {
        self.books.get(asset_id)?.asks.best_price()
    }

    /// Snapshot at the configured default depth
    pub fn snapshot(&self, asset_id: &str) -> BookSnapshot {
        self.snapshot_with_depth(asset_id, self.config.snapshot_depth)
    }

    pub fn snapshot_with_depth(&self, asset_id: &str, depth: usize) -> BookSnapshot {
        let Some(book) = self.books.get(asset_id) else {
            return BookSnapshot::empty(asset_id.to_string());
        };

        let pending = |order_id: OrderId| -> Shares {
            self.orders.get(&order_id).map_or(0, Order::pending_shares)
        };

        BookSnapshot::with_depth(
            asset_id.to_string(),
            book.bids.depth(depth, pending),
            book.asks.depth(depth, pending),
        )
    }

    // ========================================================================
    // Private methods
    // ========================================================================

    fn validate_order(&self, order: &Order) -> Result<(), RejectReason> {
        if order.shares == 0 {
            return Err(RejectReason::ZeroShares);
        }

        if order.price <= Decimal::ZERO {
            return Err(RejectReason::NonPositivePrice);
        }

        if order.shares > MAX_ORDER_SHARES {
            return Err(RejectReason::ExcessiveShares(order.shares));
        }

        // Fills never exceed the buyer's limit value, so this bounds every total
        if order.price.checked_mul(Decimal::from(order.shares)).is_none() {
            return Err(RejectReason::NotionalOverflow);
        }

        if self.orders.contains_key(&order.id) {
            return Err(RejectReason::DuplicateOrderId(order.id));
        }

        let registry = self.registry.read();
        if !registry.contains_investor(&order.investor_id) {
            return Err(RejectReason::UnknownInvestor(order.investor_id.clone()));
        }
        if !registry.contains_asset(&order.asset_id) {
            return Err(RejectReason::UnknownAsset(order.asset_id.clone()));
        }

        Ok(())
    }

    /// Attempt one match for a freshly queued order.
    fn match_incoming(
        &mut self,
        incoming_id: OrderId,
        side: Side,
        asset_id: &str,
        events: &mut Vec<BookEvent>,
    ) -> Option<Submission> {
        let opposite = side.opposite();
        let book = self.books.get_mut(asset_id)?;

        // Empty opposite queue: nothing to match
        let best = *book.peek_best(opposite)?;
        let incoming_price = self.orders.get(&incoming_id)?.price;

        if !prices_cross(side, incoming_price, best.price) {
            return None;
        }

        let resting_pending = self
            .orders
            .get(&best.order_id)
            .map_or(0, Order::pending_shares);
        if resting_pending == 0 {
            warn!(order_id = %best.order_id, "stale entry at top of book");
            return None;
        }

        let resting_entry = book.pop_best(opposite).ok()?;

        let mut resting = self.orders.remove(&resting_entry.order_id)?;
        let Some(mut incoming) = self.orders.remove(&incoming_id) else {
            book.push(opposite, resting_entry);
            self.orders.insert(resting.id, resting);
            return None;
        };

        let shares = resting.pending_shares().min(incoming.pending_shares());
        let transaction = Arc::new(Transaction::between(&resting, &incoming, shares));
        self.execute_transaction(&transaction, &mut resting, &mut incoming);

        events.push(BookEvent::TransactionExecuted {
            transaction: Arc::clone(&transaction),
            timestamp: Utc::now(),
        });

        if let Some(book) = self.books.get_mut(asset_id) {
            if resting.pending_shares() > 0 {
                // Keeps its original arrival sequence
                book.push(opposite, resting_entry);
            }
            if incoming.is_closed() {
                book.remove(side, incoming.id);
            }
        }

        for order in [&resting, &incoming] {
            if order.is_closed() {
                events.push(BookEvent::OrderClosed {
                    order_id: order.id,
                    timestamp: Utc::now(),
                });
            }
        }

        debug!(
            transaction_id = %transaction.id,
            resting_id = %resting.id,
            shares,
            price = %transaction.price,
            "orders matched"
        );

        let submission = Submission::Matched {
            transaction,
            resting: resting.clone(),
            incoming: incoming.clone(),
        };
        self.orders.insert(resting.id, resting);
        self.orders.insert(incoming.id, incoming);

        Some(submission)
    }

    /// Apply a transaction to both orders, both positions and the ledger.
    ///
    /// Runs under the registry write lock so readers never observe a
    /// half-applied trade.
    fn execute_transaction(
        &mut self,
        transaction: &Arc<Transaction>,
        resting: &mut Order,
        incoming: &mut Order,
    ) {
        {
            let mut registry = self.registry.write();

            let (seller, buyer) = match resting.side {
                Side::Sell => (resting, incoming),
                Side::Buy => (incoming, resting),
            };

            seller.liquidate(transaction.shares);
            buyer.liquidate(transaction.shares);
            registry.apply_transfer(transaction);

            seller.add_transaction(Arc::clone(transaction));
            buyer.add_transaction(Arc::clone(transaction));
            self.transactions.push(Arc::clone(transaction));
        }

        if let Some(latch) = &self.completion {
            latch.done();
        }
    }
}

/// Whether an incoming order at `incoming_price` crosses the best resting
/// price on the opposite side
fn prices_cross(incoming_side: Side, incoming_price: Price, resting_price: Price) -> bool {
    match incoming_side {
        Side::Buy => resting_price <= incoming_price,
        Side::Sell => incoming_price <= resting_price,
    }
}
