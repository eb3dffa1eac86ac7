// ============================================================================
// Book Configuration
// Stream sizing and snapshot defaults for a running book
// ============================================================================

use crate::errors::{BookError, BookResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for a book engine loop
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BookConfig {
    /// Name used in log spans and the engine thread name
    pub name: String,

    /// Inbound order stream capacity. None means unbounded: producers never
    /// block, the engine waits when the stream is empty.
    pub inbound_capacity: Option<usize>,

    /// Outbound order stream capacity. Zero makes every publish a rendezvous
    /// with the consumer, so matching advances only as fast as results are
    /// drained.
    pub outbound_capacity: usize,

    /// Default number of price levels returned by snapshots
    pub snapshot_depth: usize,
}

impl Default for BookConfig {
    fn default() -> Self {
        Self {
            name: "book".to_string(),
            inbound_capacity: None,
            outbound_capacity: 0,
            snapshot_depth: 10,
        }
    }
}

impl BookConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Builder method: bound the inbound stream
    pub fn with_inbound_capacity(mut self, capacity: usize) -> Self {
        self.inbound_capacity = Some(capacity);
        self
    }

    /// Builder method: buffer published orders
    pub fn with_outbound_capacity(mut self, capacity: usize) -> Self {
        self.outbound_capacity = capacity;
        self
    }

    /// Builder method: set default snapshot depth
    pub fn with_snapshot_depth(mut self, depth: usize) -> Self {
        self.snapshot_depth = depth;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> BookResult<()> {
        if self.name.trim().is_empty() {
            return Err(BookError::InvalidConfig("Book name cannot be empty".to_string()));
        }

        if self.inbound_capacity == Some(0) {
            return Err(BookError::InvalidConfig(
                "Bounded inbound capacity must be positive".to_string(),
            ));
        }

        if self.snapshot_depth == 0 {
            return Err(BookError::InvalidConfig(
                "Snapshot depth must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

// ============================================================================
// Preset Configurations
// ============================================================================

impl BookConfig {
    /// Results are handed over one at a time; matching waits on the consumer
    pub fn synchronous(name: impl Into<String>) -> Self {
        Self::new(name)
    }

    /// Results are buffered so a slow consumer does not stall matching until
    /// `buffer` published orders are outstanding
    pub fn buffered(name: impl Into<String>, buffer: usize) -> Self {
        Self::new(name).with_outbound_capacity(buffer)
    }
}
