// ============================================================================
// Book Errors
// Error types for queue contracts, order validation and engine wiring
// ============================================================================

use thiserror::Error;

use crate::domain::{AssetId, InvestorId, OrderId, Shares, Side};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Reasons an order is refused by the book before it reaches a queue.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RejectReason {
    /// Side code the engine does not recognize
    #[error("invalid side: {0:?}")]
    InvalidSide(String),

    #[error("unknown investor {0}")]
    UnknownInvestor(InvestorId),

    #[error("unknown asset {0}")]
    UnknownAsset(AssetId),

    #[error("order must have at least one share")]
    ZeroShares,

    #[error("limit price must be positive")]
    NonPositivePrice,

    /// Share count does not fit a signed position delta
    #[error("{0} shares exceeds the per-order maximum")]
    ExcessiveShares(Shares),

    /// Limit price times shares is beyond decimal range
    #[error("order value out of range")]
    NotionalOverflow,

    /// An order with the same id was already accepted by this book
    #[error("duplicate order id {0}")]
    DuplicateOrderId(OrderId),
}

/// Errors surfaced by book operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookError {
    /// `pop_best` was called on an empty queue
    #[error("pop from empty {side} queue")]
    EmptyQueue { side: Side },

    #[error("order rejected: {0}")]
    Rejected(#[from] RejectReason),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The engine loop has stopped and no longer accepts orders
    #[error("book engine disconnected")]
    Disconnected,

    #[error("failed to start book worker: {0}")]
    Spawn(String),

    #[error("book worker panicked")]
    WorkerPanicked,
}

/// Result type alias for book operations
pub type BookResult<T> = Result<T, BookError>;
