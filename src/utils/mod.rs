// ============================================================================
// Utilities Module
// Process-level helpers for binaries and demos embedding the book
// ============================================================================

#[cfg(feature = "logging")]
mod logging;

#[cfg(feature = "logging")]
pub use logging::init_logging;
