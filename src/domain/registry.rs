// ============================================================================
// Registry
// Owns the asset and investor records the book resolves ids against
// ============================================================================

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use super::{Asset, AssetId, Investor, InvestorId, Transaction};

/// Registry shared between the book and readers of investor positions.
///
/// Only the book writes, and only while applying a transaction.
pub type SharedRegistry = Arc<RwLock<Registry>>;

#[derive(Debug, Default, Clone)]
pub struct Registry {
    assets: HashMap<AssetId, Asset>,
    investors: HashMap<InvestorId, Investor>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_shared(self) -> SharedRegistry {
        Arc::new(RwLock::new(self))
    }

    /// Register an asset, replacing any previous record with the same id
    pub fn add_asset(&mut self, asset: Asset) -> Option<Asset> {
        self.assets.insert(asset.id.clone(), asset)
    }

    /// Register an investor, replacing any previous record with the same id
    pub fn add_investor(&mut self, investor: Investor) -> Option<Investor> {
        self.investors.insert(investor.id.clone(), investor)
    }

    pub fn asset(&self, id: &str) -> Option<&Asset> {
        self.assets.get(id)
    }

    pub fn investor(&self, id: &str) -> Option<&Investor> {
        self.investors.get(id)
    }

    pub fn contains_asset(&self, id: &str) -> bool {
        self.assets.contains_key(id)
    }

    pub fn contains_investor(&self, id: &str) -> bool {
        self.investors.contains_key(id)
    }

    pub fn assets(&self) -> impl Iterator<Item = &Asset> {
        self.assets.values()
    }

    pub fn investors(&self) -> impl Iterator<Item = &Investor> {
        self.investors.values()
    }

    /// Shares `investor_id` holds in `asset_id`; zero for unknown ids
    pub fn shares_of(&self, investor_id: &str, asset_id: &str) -> i64 {
        self.investor(investor_id)
            .map_or(0, |investor| investor.shares_of(asset_id))
    }

    /// Move the traded shares from the seller's position to the buyer's.
    ///
    /// Both investors were resolved when their orders were accepted; a
    /// missing record here means it was replaced or never registered, and is
    /// created empty so the ledger stays balanced.
    pub(crate) fn apply_transfer(&mut self, transaction: &Transaction) {
        let shares = transaction.signed_shares();

        self.investors
            .entry(transaction.selling_investor_id.clone())
            .or_insert_with(|| Investor::new(transaction.selling_investor_id.clone()))
            .update_position(&transaction.asset_id, -shares);

        self.investors
            .entry(transaction.buying_investor_id.clone())
            .or_insert_with(|| Investor::new(transaction.buying_investor_id.clone()))
            .update_position(&transaction.asset_id, shares);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Order, Side};
    use rust_decimal::Decimal;

    #[test]
    fn test_apply_transfer() {
        let mut registry = Registry::new();
        registry.add_asset(Asset::new("ASSET-1", "Asset 1", 1000));
        registry.add_investor(Investor::new("seller").with_position("ASSET-1", 20));
        registry.add_investor(Investor::new("buyer"));
        registry.add_investor(Investor::new("bystander").with_position("ASSET-1", 7));

        let sell = Order::new("seller", "ASSET-1", Side::Sell, 20, Decimal::from(10));
        let buy = Order::new("buyer", "ASSET-1", Side::Buy, 20, Decimal::from(10));
        registry.apply_transfer(&Transaction::new(&sell, &buy, 15, sell.price));

        assert_eq!(registry.shares_of("seller", "ASSET-1"), 5);
        assert_eq!(registry.shares_of("buyer", "ASSET-1"), 15);
        assert_eq!(registry.shares_of("bystander", "ASSET-1"), 7);
    }

    #[test]
    fn test_lookup() {
        let mut registry = Registry::new();
        assert!(registry.add_asset(Asset::new("A", "Asset A", 10)).is_none());
        assert!(registry.add_asset(Asset::new("A", "Asset A v2", 20)).is_some());

        assert_eq!(registry.asset("A").map(|a| a.market_volume), Some(20));
        assert!(!registry.contains_investor("nobody"));
        assert_eq!(registry.shares_of("nobody", "A"), 0);
    }
}
