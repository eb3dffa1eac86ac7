// ============================================================================
// Investor and Position Ledger
// ============================================================================

use smallvec::SmallVec;

use super::{AssetId, InvestorId};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Net shares an investor holds in one asset
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AssetPosition {
    pub asset_id: AssetId,
    /// Signed: no short-selling guard exists, so disposals may go below zero
    pub shares: i64,
}

impl AssetPosition {
    pub fn new(asset_id: impl Into<AssetId>, shares: i64) -> Self {
        Self {
            asset_id: asset_id.into(),
            shares,
        }
    }
}

/// Investors rarely hold more than a handful of assets, so positions are kept
/// inline and searched linearly.
pub type Positions = SmallVec<[AssetPosition; 4]>;

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Investor {
    pub id: InvestorId,
    pub name: String,
    positions: Positions,
}

impl Investor {
    pub fn new(id: impl Into<InvestorId>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            positions: SmallVec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Builder method: seed a starting holding
    pub fn with_position(mut self, asset_id: impl Into<AssetId>, shares: i64) -> Self {
        let asset_id = asset_id.into();
        self.update_position(&asset_id, shares);
        self
    }

    pub fn positions(&self) -> &[AssetPosition] {
        &self.positions
    }

    pub fn position(&self, asset_id: &str) -> Option<&AssetPosition> {
        self.positions.iter().find(|p| p.asset_id == asset_id)
    }

    /// Shares held in `asset_id`, zero when the investor never traded it
    pub fn shares_of(&self, asset_id: &str) -> i64 {
        self.position(asset_id).map_or(0, |p| p.shares)
    }

    /// Apply a signed share delta, creating the position on first use.
    ///
    /// At most one position exists per asset.
    pub fn update_position(&mut self, asset_id: &str, delta: i64) {
        match self.positions.iter_mut().find(|p| p.asset_id == asset_id) {
            Some(position) => position.shares = position.shares.saturating_add(delta),
            None => self.positions.push(AssetPosition::new(asset_id, delta)),
        }
    }
}
