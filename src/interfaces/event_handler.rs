// ============================================================================
// Event Handler Interface
// Defines the contract for observing book activity
// ============================================================================

use crate::domain::{AssetId, OrderId, Price, Shares, Side, Transaction};
use crate::errors::RejectReason;
use chrono::{DateTime, Utc};
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Events emitted by the book while processing submissions
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BookEvent {
    /// Order taken off the inbound stream
    OrderReceived {
        order_id: OrderId,
        timestamp: DateTime<Utc>,
    },

    /// Order refused before reaching a queue
    OrderRejected {
        order_id: OrderId,
        reason: RejectReason,
        timestamp: DateTime<Utc>,
    },

    /// Order placed in its side's queue
    OrderEnqueued {
        order_id: OrderId,
        asset_id: AssetId,
        side: Side,
        price: Price,
        pending_shares: Shares,
        timestamp: DateTime<Utc>,
    },

    /// Transaction applied to both orders and both positions
    TransactionExecuted {
        transaction: Arc<Transaction>,
        timestamp: DateTime<Utc>,
    },

    /// Order has no pending shares left
    OrderClosed {
        order_id: OrderId,
        timestamp: DateTime<Utc>,
    },
}

/// Observer of book events.
/// Implementations can handle logging, metrics, notifications, etc.
pub trait EventHandler: Send + Sync {
    fn on_event(&self, event: BookEvent);

    fn on_events(&self, events: Vec<BookEvent>) {
        for event in events {
            self.on_event(event);
        }
    }
}

/// No-op event handler for testing
pub struct NoOpEventHandler;

impl EventHandler for NoOpEventHandler {
    fn on_event(&self, _event: BookEvent) {}
}

/// Logging event handler
pub struct LoggingEventHandler;

impl EventHandler for LoggingEventHandler {
    fn on_event(&self, event: BookEvent) {
        match &event {
            BookEvent::OrderRejected { order_id, reason, .. } => {
                tracing::warn!(%order_id, %reason, "order rejected");
            },
            BookEvent::TransactionExecuted { transaction, .. } => {
                tracing::info!(
                    transaction_id = %transaction.id,
                    asset_id = %transaction.asset_id,
                    shares = transaction.shares,
                    price = %transaction.price,
                    total = %transaction.total,
                    "transaction executed"
                );
            },
            _ => tracing::debug!("Book event: {:?}", event),
        }
    }
}
