// ============================================================================
// Transaction Domain Model
// ============================================================================

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::{AssetId, InvestorId, Order, OrderId, Price, Shares, Side};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A completed trade between a selling and a buying order
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Transaction {
    /// Unique transaction identifier
    pub id: Uuid,

    pub asset_id: AssetId,

    pub selling_order_id: OrderId,
    pub buying_order_id: OrderId,

    pub selling_investor_id: InvestorId,
    pub buying_investor_id: InvestorId,

    /// Shares transferred from seller to buyer
    pub shares: Shares,

    /// Execution price, always the resting order's limit price
    pub price: Price,

    /// `price * shares`
    pub total: Decimal,

    pub timestamp: DateTime<Utc>,
}

impl Transaction {
    /// Build the trade between a resting order and the order that crossed it.
    ///
    /// The two orders must be on opposite sides of the same asset.
    pub fn between(resting: &Order, incoming: &Order, shares: Shares) -> Self {
        debug_assert_ne!(resting.side, incoming.side);
        debug_assert_eq!(resting.asset_id, incoming.asset_id);

        let (seller, buyer) = match resting.side {
            Side::Sell => (resting, incoming),
            Side::Buy => (incoming, resting),
        };

        Self::new(seller, buyer, shares, resting.price)
    }

    pub fn new(selling: &Order, buying: &Order, shares: Shares, price: Price) -> Self {
        Self {
            id: Uuid::new_v4(),
            asset_id: selling.asset_id.clone(),
            selling_order_id: selling.id,
            buying_order_id: buying.id,
            selling_investor_id: selling.investor_id.clone(),
            buying_investor_id: buying.investor_id.clone(),
            shares,
            price,
            total: price * Decimal::from(shares),
            timestamp: Utc::now(),
        }
    }

    /// Shares as a position delta. Accepted orders never exceed
    /// [`MAX_ORDER_SHARES`](super::MAX_ORDER_SHARES), so this never clamps.
    pub fn signed_shares(&self) -> i64 {
        i64::try_from(self.shares).unwrap_or(i64::MAX)
    }

    /// Signed position change this trade causes for `investor_id`.
    ///
    /// Zero for investors that are not part of the trade; an investor trading
    /// with themself nets out to zero as well.
    pub fn position_delta(&self, investor_id: &str) -> i64 {
        let shares = self.signed_shares();
        let mut delta = 0;
        if self.buying_investor_id == investor_id {
            delta += shares;
        }
        if self.selling_investor_id == investor_id {
            delta -= shares;
        }
        delta
    }
}
