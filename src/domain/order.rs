// ============================================================================
// Order Domain Model
// ============================================================================

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

use super::{AssetId, InvestorId, Price, Shares, Transaction};
use crate::errors::RejectReason;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Largest share count a book accepts: every fill must fit a signed
/// position delta.
pub const MAX_ORDER_SHARES: Shares = i64::MAX as Shares;

// ============================================================================
// Value Objects
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrderId(Uuid);

impl OrderId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for OrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "buy"),
            Side::Sell => write!(f, "sell"),
        }
    }
}

/// Numeric side codes as produced by order generators: 1 = buy, 2 = sell.
impl TryFrom<u8> for Side {
    type Error = RejectReason;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Side::Buy),
            2 => Ok(Side::Sell),
            other => Err(RejectReason::InvalidSide(other.to_string())),
        }
    }
}

impl FromStr for Side {
    type Err = RejectReason;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BUY" | "B" => Ok(Side::Buy),
            "SELL" | "S" => Ok(Side::Sell),
            _ => Err(RejectReason::InvalidSide(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OrderStatus {
    Open,
    Closed,
}

// ============================================================================
// Order Entity
// ============================================================================

/// A unit of trading intent.
///
/// Orders are owned by the book once submitted; the copies published on the
/// outbound stream are snapshots taken right after a transaction was applied.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Order {
    pub id: OrderId,
    pub investor_id: InvestorId,
    pub asset_id: AssetId,
    pub side: Side,
    pub price: Price,
    pub shares: Shares,
    pub timestamp: DateTime<Utc>,

    pending_shares: Shares,
    status: OrderStatus,
    transactions: Vec<Arc<Transaction>>,
    sequence_number: u64,
}

impl Order {
    pub fn new(
        investor_id: impl Into<InvestorId>,
        asset_id: impl Into<AssetId>,
        side: Side,
        shares: Shares,
        price: Price,
    ) -> Self {
        Self::with_id(OrderId::new(), investor_id, asset_id, side, shares, price)
    }

    pub fn with_id(
        id: OrderId,
        investor_id: impl Into<InvestorId>,
        asset_id: impl Into<AssetId>,
        side: Side,
        shares: Shares,
        price: Price,
    ) -> Self {
        Self {
            id,
            investor_id: investor_id.into(),
            asset_id: asset_id.into(),
            side,
            price,
            shares,
            timestamp: Utc::now(),
            pending_shares: shares,
            status: OrderStatus::Open,
            transactions: Vec::new(),
            sequence_number: 0,
        }
    }

    // ========================================================================
    // Getters
    // ========================================================================

    pub fn pending_shares(&self) -> Shares {
        self.pending_shares
    }

    pub fn filled_shares(&self) -> Shares {
        self.shares - self.pending_shares
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn is_closed(&self) -> bool {
        self.status == OrderStatus::Closed
    }

    pub fn transactions(&self) -> &[Arc<Transaction>] {
        &self.transactions
    }

    pub fn transactions_count(&self) -> usize {
        self.transactions.len()
    }

    /// Sum of the totals of every transaction this order took part in
    pub fn traded_value(&self) -> Decimal {
        self.transactions
            .iter()
            .fold(Decimal::ZERO, |value, t| value.saturating_add(t.total))
    }

    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    // ========================================================================
    // Book-side mutation
    // ========================================================================

    pub(crate) fn set_sequence_number(&mut self, seq: u64) {
        self.sequence_number = seq;
    }

    /// Reduce pending shares by `shares`, closing the order when nothing is left.
    ///
    /// Callers size fills with `min` of both sides' pending shares, so this
    /// never underflows.
    pub(crate) fn liquidate(&mut self, shares: Shares) {
        debug_assert!(shares <= self.pending_shares, "overfill on order {}", self.id);
        self.pending_shares = self.pending_shares.saturating_sub(shares);
        if self.pending_shares == 0 {
            self.status = OrderStatus::Closed;
        }
    }

    pub(crate) fn add_transaction(&mut self, transaction: Arc<Transaction>) {
        self.transactions.push(transaction);
    }
}

// ============================================================================
// Raw Order Request
// ============================================================================

/// Order intent as it arrives from an order generator, before the side code
/// has been interpreted.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrderRequest {
    pub order_id: Option<Uuid>,
    pub investor_id: InvestorId,
    pub asset_id: AssetId,
    pub side: String,
    pub shares: Shares,
    pub price: Price,
}

#[cfg(feature = "serde")]
impl OrderRequest {
    /// Parse a request from its JSON form, e.g.
    /// `{"investor_id":"a","asset_id":"X","side":"BUY","shares":5,"price":"10"}`
    pub fn from_json(input: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(input)
    }
}

impl TryFrom<OrderRequest> for Order {
    type Error = RejectReason;

    fn try_from(request: OrderRequest) -> Result<Self, Self::Error> {
        let side = request.side.parse::<Side>()?;
        let id = request.order_id.map(OrderId::from_uuid).unwrap_or_default();
        Ok(Order::with_id(
            id,
            request.investor_id,
            request.asset_id,
            side,
            request.shares,
            request.price,
        ))
    }
}
