//! Exchange trading-filter conformance.
//!
//! Binance rejects orders whose price is off the tick grid or whose quantity
//! is off the lot step. [`SymbolFilters`] extracts the relevant bounds from
//! exchange info and offers either validation (`is_*_valid`) or floor
//! adjustment (`adjust_*`) onto the nearest conforming value.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::binance_rest::SymbolInfo;
use crate::error::{Error, Result};

/// One entry of a symbol's `filters` array, tagged by `filterType`.
///
/// Only the filter kinds this client acts on are modeled; everything else
/// lands in `Other` and is ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "filterType")]
pub enum ExchangeFilter {
    #[serde(rename = "PRICE_FILTER")]
    Price {
        #[serde(rename = "minPrice")]
        min_price: Decimal,
        #[serde(rename = "maxPrice")]
        max_price: Decimal,
        #[serde(rename = "tickSize")]
        tick_size: Decimal,
    },
    #[serde(rename = "LOT_SIZE")]
    LotSize {
        #[serde(rename = "minQty")]
        min_qty: Decimal,
        #[serde(rename = "maxQty")]
        max_qty: Decimal,
        #[serde(rename = "stepSize")]
        step_size: Decimal,
    },
    #[serde(rename = "MARKET_LOT_SIZE")]
    MarketLotSize {
        #[serde(rename = "minQty")]
        min_qty: Decimal,
        #[serde(rename = "maxQty")]
        max_qty: Decimal,
        #[serde(rename = "stepSize")]
        step_size: Decimal,
    },
    #[serde(other)]
    Other,
}

/// Price and lot constraints for one symbol.
///
/// A zero `max` means "unbounded"; a zero tick/step disables the grid check,
/// matching how the exchange publishes placeholder filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolFilters {
    pub symbol: String,
    pub price_min: Decimal,
    pub price_max: Decimal,
    pub tick_size: Decimal,
    pub lot_min: Decimal,
    pub lot_max: Decimal,
    pub step_size: Decimal,
}

impl SymbolFilters {
    /// Collect filters from a symbol's exchange-info entry.
    pub fn from_symbol_info(info: &SymbolInfo) -> Self {
        let mut out = Self {
            symbol: info.symbol.clone(),
            price_min: Decimal::ZERO,
            price_max: Decimal::ZERO,
            tick_size: Decimal::ONE,
            lot_min: Decimal::ZERO,
            lot_max: Decimal::ZERO,
            step_size: Decimal::ONE,
        };
        for filter in &info.filters {
            match filter {
                ExchangeFilter::Price {
                    min_price,
                    max_price,
                    tick_size,
                } => {
                    out.price_min = *min_price;
                    out.price_max = *max_price;
                    out.tick_size = *tick_size;
                }
                ExchangeFilter::LotSize {
                    min_qty,
                    max_qty,
                    step_size,
                }
                | ExchangeFilter::MarketLotSize {
                    min_qty,
                    max_qty,
                    step_size,
                } => {
                    out.lot_min = *min_qty;
                    out.lot_max = *max_qty;
                    out.step_size = *step_size;
                }
                ExchangeFilter::Other => {}
            }
        }
        out
    }

    /// `true` when the price is within bounds and on the tick grid.
    pub fn is_price_valid(&self, price: Decimal) -> bool {
        if self.tick_size <= Decimal::ZERO {
            return true;
        }
        if price < self.price_min {
            return false;
        }
        if self.price_max > Decimal::ZERO && price > self.price_max {
            return false;
        }
        ((price - self.price_min) % self.tick_size).is_zero()
    }

    /// Floor the price to the nearest valid tick multiple above `price_min`.
    ///
    /// Out-of-bounds prices are an error rather than an adjustment: silently
    /// moving a price to the opposite end of its band is never what the
    /// caller meant.
    pub fn adjust_price(&self, price: Decimal) -> Result<Decimal> {
        if self.tick_size <= Decimal::ZERO {
            return Ok(price);
        }
        if price < self.price_min {
            return Err(Error::validation(format!(
                "price {price} below minimum price {}",
                self.price_min
            )));
        }
        if self.price_max > Decimal::ZERO && price > self.price_max {
            return Err(Error::validation(format!(
                "price {price} above maximum price {}",
                self.price_max
            )));
        }
        let steps = ((price - self.price_min) / self.tick_size).floor();
        Ok((self.price_min + steps * self.tick_size).normalize())
    }

    /// `true` when the quantity is within lot bounds and on the step grid.
    pub fn is_qty_valid(&self, qty: Decimal) -> bool {
        if qty < self.lot_min {
            return false;
        }
        if self.lot_max > Decimal::ZERO && qty > self.lot_max {
            return false;
        }
        if self.step_size <= Decimal::ZERO {
            return true;
        }
        ((qty - self.lot_min) % self.step_size).is_zero()
    }

    /// Floor the quantity to the nearest valid step multiple above `lot_min`.
    pub fn adjust_quantity(&self, qty: Decimal) -> Result<Decimal> {
        if qty < self.lot_min {
            return Err(Error::validation(format!(
                "quantity {qty} below minimum quantity {}",
                self.lot_min
            )));
        }
        if self.lot_max > Decimal::ZERO && qty > self.lot_max {
            return Err(Error::validation(format!(
                "quantity {qty} above maximum quantity {}",
                self.lot_max
            )));
        }
        if self.step_size <= Decimal::ZERO {
            return Ok(qty);
        }
        let steps = ((qty - self.lot_min) / self.step_size).floor();
        Ok((self.lot_min + steps * self.step_size).normalize())
    }
}
