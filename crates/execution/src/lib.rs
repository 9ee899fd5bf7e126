//! # bft-execution
//!
//! Signed REST request construction and dispatch for the Binance USDⓈ-M
//! Futures API: HMAC-SHA256 query-string signing, the transport seam that
//! separates request building from network I/O (and gives dry-run its
//! no-network guarantee), order validation, and exchange filter conformance.

pub mod binance_rest;
pub mod error;
pub mod filters;
pub mod order;
pub mod signing;
pub mod transport;

pub use binance_rest::{FuturesRestClient, SignedRequest};
pub use error::{Error, Result};
pub use order::OrderRequest;
pub use transport::{HttpCall, LiveTransport, NullTransport, Transport};
