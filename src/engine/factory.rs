// ============================================================================
// Book Factory
// Creates books with proper configuration
// ============================================================================

use crate::domain::{BookConfig, Registry, SharedRegistry};
use crate::engine::{Book, BookHandle, CompletionLatch};
use crate::errors::BookResult;
use crate::interfaces::{EventHandler, NoOpEventHandler};
use std::sync::Arc;

// ============================================================================
// Factory Functions
// ============================================================================

/// Creates a book from configuration
///
/// # Example
/// ```
/// use trade_book::prelude::*;
/// use std::sync::Arc;
///
/// let registry = Registry::new().into_shared();
/// let book = create_from_config(
///     BookConfig::synchronous("equities"),
///     registry,
///     Arc::new(NoOpEventHandler),
/// )
/// .unwrap();
/// assert_eq!(book.asset_count(), 0);
/// ```
pub fn create_from_config(
    config: BookConfig,
    registry: SharedRegistry,
    event_handler: Arc<dyn EventHandler>,
) -> BookResult<Book> {
    config.validate()?;

    Ok(Book::new(config, registry, event_handler))
}

// ============================================================================
// Builder Pattern
// ============================================================================

/// Builder for creating books with fluent API
///
/// # Example
/// ```
/// use trade_book::prelude::*;
/// use rust_decimal::Decimal;
///
/// let mut registry = Registry::new();
/// registry.add_asset(Asset::new("ACME", "Acme Corp", 1_000));
/// registry.add_investor(Investor::new("alice"));
///
/// let mut book = BookBuilder::new("equities")
///     .with_registry(registry.into_shared())
///     .with_snapshot_depth(5)
///     .build()
///     .unwrap();
///
/// let order = Order::new("alice", "ACME", Side::Buy, 10, Decimal::from(25));
/// assert!(!book.submit(order).is_matched());
/// assert_eq!(book.best_bid("ACME"), Some(Decimal::from(25)));
/// ```
pub struct BookBuilder {
    config: BookConfig,
    registry: Option<SharedRegistry>,
    event_handler: Arc<dyn EventHandler>,
    completion: Option<CompletionLatch>,
}

impl BookBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self::from_config(BookConfig::new(name))
    }

    pub fn from_config(config: BookConfig) -> Self {
        Self {
            config,
            registry: None,
            event_handler: Arc::new(NoOpEventHandler),
            completion: None,
        }
    }

    // ========================================================================
    // Collaborators
    // ========================================================================

    /// Registry of investors and assets; an empty one is used otherwise
    pub fn with_registry(mut self, registry: SharedRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn with_event_handler(mut self, event_handler: Arc<dyn EventHandler>) -> Self {
        self.event_handler = event_handler;
        self
    }

    pub fn with_completion(mut self, latch: CompletionLatch) -> Self {
        self.completion = Some(latch);
        self
    }

    // ========================================================================
    // Stream Configuration
    // ========================================================================

    pub fn with_inbound_capacity(mut self, capacity: usize) -> Self {
        self.config = self.config.with_inbound_capacity(capacity);
        self
    }

    pub fn with_outbound_capacity(mut self, capacity: usize) -> Self {
        self.config = self.config.with_outbound_capacity(capacity);
        self
    }

    pub fn with_snapshot_depth(mut self, depth: usize) -> Self {
        self.config = self.config.with_snapshot_depth(depth);
        self
    }

    // ========================================================================
    // Build
    // ========================================================================

    pub fn build(self) -> BookResult<Book> {
        let registry = self
            .registry
            .unwrap_or_else(|| Registry::new().into_shared());
        let book = create_from_config(self.config, registry, self.event_handler)?;

        Ok(match self.completion {
            Some(latch) => book.with_completion(latch),
            None => book,
        })
    }

    /// Build and start the book on its own thread
    pub fn spawn(self) -> BookResult<BookHandle> {
        BookHandle::spawn(self.build()?)
    }

    /// Get the configuration without building (for inspection)
    pub fn config(&self) -> &BookConfig {
        &self.config
    }
}
