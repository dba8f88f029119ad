//! Discord command implementations.

/// The `pin` message context-menu command
pub mod pin;

pub use pin::*;
