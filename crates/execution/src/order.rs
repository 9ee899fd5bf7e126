//! Validated order requests and their mapping onto the wire parameter set.

use rust_decimal::Decimal;

use bft_core::types::{OrderKind, Side, Symbol, TimeInForce};

use crate::binance_rest::FuturesOrderParams;
use crate::error::{Error, Result};

/// A single order as supplied by the caller, prior to validation.
#[derive(Debug, Clone)]
pub struct OrderRequest {
    pub symbol: Symbol,
    pub side: Side,
    pub kind: OrderKind,
    pub quantity: Decimal,
    pub price: Option<Decimal>,
    pub stop_price: Option<Decimal>,
    pub time_in_force: TimeInForce,
}

impl OrderRequest {
    /// Check per-kind field requirements.
    ///
    /// Limit and stop-limit orders require a positive price; stop-limit
    /// additionally requires a positive stop price; every order requires a
    /// positive quantity. A price supplied for a market order is not an
    /// error, it is simply never sent.
    pub fn validate(&self) -> Result<()> {
        if self.quantity <= Decimal::ZERO {
            return Err(Error::validation("quantity must be positive"));
        }
        if self.kind.requires_price() {
            match self.price {
                Some(p) if p > Decimal::ZERO => {}
                _ => {
                    return Err(Error::validation(format!(
                        "price required and must be positive for {} orders",
                        self.kind
                    )))
                }
            }
        }
        if self.kind.requires_stop_price() {
            match self.stop_price {
                Some(p) if p > Decimal::ZERO => {}
                _ => {
                    return Err(Error::validation(
                        "stop_price required and must be positive for stop_limit orders",
                    ))
                }
            }
        }
        Ok(())
    }

    /// Map the validated request onto the Binance Futures parameter set.
    ///
    /// `stop_limit` becomes the Futures `STOP` order type: the limit price
    /// goes in `price`, the trigger in `stopPrice`. Market orders carry
    /// neither price nor time-in-force.
    pub fn to_params(&self) -> FuturesOrderParams {
        match self.kind {
            OrderKind::Market => FuturesOrderParams {
                symbol: self.symbol.as_str().to_string(),
                side: self.side.as_str(),
                order_type: "MARKET",
                time_in_force: None,
                quantity: self.quantity,
                price: None,
                stop_price: None,
            },
            OrderKind::Limit => FuturesOrderParams {
                symbol: self.symbol.as_str().to_string(),
                side: self.side.as_str(),
                order_type: "LIMIT",
                time_in_force: Some(self.time_in_force.as_str()),
                quantity: self.quantity,
                price: self.price,
                stop_price: None,
            },
            OrderKind::StopLimit => FuturesOrderParams {
                symbol: self.symbol.as_str().to_string(),
                side: self.side.as_str(),
                order_type: "STOP",
                time_in_force: Some(self.time_in_force.as_str()),
                quantity: self.quantity,
                price: self.price,
                stop_price: self.stop_price,
            },
        }
    }
}
