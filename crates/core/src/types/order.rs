//! Order-related types: side, order kind, time-in-force, and symbols.
//!
//! `Display` renders each enum exactly as the Binance Futures API expects it
//! on the wire (`BUY`, `MARKET`, `GTC`, ...). `FromStr` is lenient about case
//! so the same types can back CLI argument parsing.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Order side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Side {
    /// Buy / long.
    Buy,
    /// Sell / short.
    Sell,
}

impl Side {
    /// Wire representation (`BUY` / `SELL`).
    pub const fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "BUY" => Ok(Side::Buy),
            "SELL" => Ok(Side::Sell),
            other => Err(format!("invalid side: {other} (expected BUY or SELL)")),
        }
    }
}

/// Order kind as exposed on the CLI.
///
/// `StopLimit` maps to the Binance Futures `STOP` order type (a stop trigger
/// with an attached limit price); the mapping happens at the wire layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderKind {
    /// Fills at the best available price.
    Market,
    /// Limit order with a specified price.
    Limit,
    /// Stop trigger with an attached limit price.
    StopLimit,
}

impl OrderKind {
    /// Whether this kind requires a limit price.
    pub const fn requires_price(&self) -> bool {
        matches!(self, OrderKind::Limit | OrderKind::StopLimit)
    }

    /// Whether this kind requires a stop trigger price.
    pub const fn requires_stop_price(&self) -> bool {
        matches!(self, OrderKind::StopLimit)
    }
}

impl fmt::Display for OrderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderKind::Market => write!(f, "market"),
            OrderKind::Limit => write!(f, "limit"),
            OrderKind::StopLimit => write!(f, "stop_limit"),
        }
    }
}

impl FromStr for OrderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "market" => Ok(OrderKind::Market),
            "limit" => Ok(OrderKind::Limit),
            "stop_limit" => Ok(OrderKind::StopLimit),
            other => Err(format!(
                "invalid order type: {other} (expected market, limit, or stop_limit)"
            )),
        }
    }
}

/// Time-in-force for limit-type orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeInForce {
    /// Good-till-cancelled.
    Gtc,
    /// Immediate-or-cancel.
    Ioc,
    /// Fill-or-kill.
    Fok,
}

impl TimeInForce {
    /// Wire representation (`GTC` / `IOC` / `FOK`).
    pub const fn as_str(&self) -> &'static str {
        match self {
            TimeInForce::Gtc => "GTC",
            TimeInForce::Ioc => "IOC",
            TimeInForce::Fok => "FOK",
        }
    }
}

impl Default for TimeInForce {
    fn default() -> Self {
        TimeInForce::Gtc
    }
}

impl fmt::Display for TimeInForce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeInForce {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GTC" => Ok(TimeInForce::Gtc),
            "IOC" => Ok(TimeInForce::Ioc),
            "FOK" => Ok(TimeInForce::Fok),
            other => Err(format!(
                "invalid time-in-force: {other} (expected GTC, IOC, or FOK)"
            )),
        }
    }
}

/// Trading pair symbol (e.g., "BTCUSDT"). Stored uppercased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol(pub String);

impl Symbol {
    /// Create a new symbol, uppercasing the input.
    pub fn new(s: impl AsRef<str>) -> Self {
        Self(s.as_ref().to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Symbol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err("symbol must not be empty".to_string());
        }
        Ok(Symbol::new(s.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_display() {
        assert_eq!(format!("{}", Side::Buy), "BUY");
        assert_eq!(format!("{}", Side::Sell), "SELL");
    }

    #[test]
    fn test_side_from_str_case_insensitive() {
        assert_eq!("buy".parse::<Side>().unwrap(), Side::Buy);
        assert_eq!("SELL".parse::<Side>().unwrap(), Side::Sell);
        assert!("hold".parse::<Side>().is_err());
    }

    #[test]
    fn test_order_kind_display() {
        assert_eq!(format!("{}", OrderKind::Market), "market");
        assert_eq!(format!("{}", OrderKind::Limit), "limit");
        assert_eq!(format!("{}", OrderKind::StopLimit), "stop_limit");
    }

    #[test]
    fn test_order_kind_from_str() {
        assert_eq!("market".parse::<OrderKind>().unwrap(), OrderKind::Market);
        assert_eq!("LIMIT".parse::<OrderKind>().unwrap(), OrderKind::Limit);
        assert_eq!(
            "stop_limit".parse::<OrderKind>().unwrap(),
            OrderKind::StopLimit
        );
        assert!("stop".parse::<OrderKind>().is_err());
    }

    #[test]
    fn test_order_kind_requirements() {
        assert!(!OrderKind::Market.requires_price());
        assert!(OrderKind::Limit.requires_price());
        assert!(OrderKind::StopLimit.requires_price());
        assert!(!OrderKind::Limit.requires_stop_price());
        assert!(OrderKind::StopLimit.requires_stop_price());
    }

    #[test]
    fn test_time_in_force_default_and_parse() {
        assert_eq!(TimeInForce::default(), TimeInForce::Gtc);
        assert_eq!("ioc".parse::<TimeInForce>().unwrap(), TimeInForce::Ioc);
        assert_eq!(format!("{}", TimeInForce::Fok), "FOK");
        assert!("gtx".parse::<TimeInForce>().is_err());
    }

    #[test]
    fn test_symbol_uppercases() {
        let s: Symbol = "btcusdt".parse().unwrap();
        assert_eq!(s.as_str(), "BTCUSDT");
        assert_eq!(s, Symbol::new("BTCUSDT"));
    }

    #[test]
    fn test_symbol_rejects_empty() {
        assert!("".parse::<Symbol>().is_err());
        assert!("   ".parse::<Symbol>().is_err());
    }

    #[test]
    fn test_serde_wire_names() {
        assert_eq!(serde_json::to_string(&Side::Buy).unwrap(), "\"BUY\"");
        assert_eq!(
            serde_json::to_string(&OrderKind::StopLimit).unwrap(),
            "\"stop_limit\""
        );
        assert_eq!(
            serde_json::to_string(&TimeInForce::Gtc).unwrap(),
            "\"GTC\""
        );
    }
}
