//! Order vocabulary shared across the workspace.

pub mod order;

// Re-export primary types for convenient access via `bft_core::types::*`.
pub use order::{OrderKind, Side, Symbol, TimeInForce};
