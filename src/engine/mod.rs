// ============================================================================
// Engine Module
// Contains the matching logic and the loops that drive it
// ============================================================================

mod book;
mod completion;
mod runner;

#[cfg(feature = "async")]
mod async_runner;

pub mod factory;

pub use book::{Book, Submission};
pub use completion::CompletionLatch;
pub use factory::{create_from_config, BookBuilder};
pub use runner::{run, BookHandle};

#[cfg(feature = "async")]
pub use async_runner::{AsyncBookHandle, AsyncOrderSender};
