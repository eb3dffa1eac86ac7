use super::AssetId;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A tradable instrument. Only `id` matters to matching; it partitions the
/// per-asset queues.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Asset {
    pub id: AssetId,
    pub name: String,
    /// Total market volume, informational only
    pub market_volume: u64,
}

impl Asset {
    pub fn new(id: impl Into<AssetId>, name: impl Into<String>, market_volume: u64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            market_volume,
        }
    }
}
