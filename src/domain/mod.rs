// ============================================================================
// Domain Models Module
// Contains all core domain entities and value objects
// ============================================================================

pub mod asset;
pub mod config;
pub mod investor;
pub mod order;
pub mod order_book;
pub mod registry;
pub mod transaction;

pub use asset::Asset;
pub use config::BookConfig;
pub use investor::{AssetPosition, Investor};
pub use order::{Order, OrderId, OrderRequest, OrderStatus, Side, MAX_ORDER_SHARES};
pub use order_book::{
    AskPriority, AskQueue, AssetBook, BidPriority, BidQueue, BookSnapshot, OrderBookQueue,
    QueueEntry, QueuePriority,
};
pub use registry::{Registry, SharedRegistry};
pub use transaction::Transaction;

/// Limit and execution prices
pub type Price = rust_decimal::Decimal;

/// Share counts on orders and transactions
pub type Shares = u64;

pub type AssetId = String;
pub type InvestorId = String;
