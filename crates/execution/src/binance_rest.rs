//! Binance Futures REST client: signed request construction and dispatch.
//!
//! Signed endpoints follow one canonical parameter order, used identically
//! for signing and transmission: the field declaration order of
//! [`FuturesOrderParams`] (`symbol`, `side`, `type`, `timeInForce`,
//! `quantity`, `price`, `stopPrice`), then `recvWindow`, then `timestamp`,
//! with `signature` appended last. The exchange only requires that the signed
//! bytes equal the transmitted bytes; fixing the order here keeps offline
//! signature verification trivial.

use std::sync::Arc;

use chrono::Utc;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use rust_decimal::Decimal;
use tracing::debug;

use crate::error::Result;
use crate::filters::ExchangeFilter;
use crate::signing::sign_request;
use crate::transport::{HttpCall, Transport};

const ORDER_PATH: &str = "/fapi/v1/order";
const PING_PATH: &str = "/fapi/v1/ping";
const TIME_PATH: &str = "/fapi/v1/time";
const EXCHANGE_INFO_PATH: &str = "/fapi/v1/exchangeInfo";
const BALANCE_PATH: &str = "/fapi/v2/balance";
const ACCOUNT_PATH: &str = "/fapi/v2/account";
const POSITION_RISK_PATH: &str = "/fapi/v2/positionRisk";

/// Wire parameters for `POST /fapi/v1/order`.
///
/// Field declaration order **is** the canonical signing order; absent
/// optionals are skipped entirely rather than sent empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FuturesOrderParams {
    /// Trading pair, uppercased (e.g. "BTCUSDT").
    pub symbol: String,
    /// "BUY" or "SELL".
    pub side: &'static str,
    /// "MARKET", "LIMIT", or "STOP" (stop-limit).
    #[serde(rename = "type")]
    pub order_type: &'static str,
    /// "GTC", "IOC", or "FOK"; omitted for market orders.
    #[serde(rename = "timeInForce", skip_serializing_if = "Option::is_none")]
    pub time_in_force: Option<&'static str>,
    /// Order quantity in base units.
    pub quantity: Decimal,
    /// Limit price; omitted for market orders.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    /// Stop trigger price; stop-limit orders only.
    #[serde(rename = "stopPrice", skip_serializing_if = "Option::is_none")]
    pub stop_price: Option<Decimal>,
}

/// A signed query string, derived deterministically from the ordered
/// parameter set, the secret, `recvWindow`, and a millisecond timestamp.
/// Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    /// The signed bytes: encoded params plus `recvWindow` and `timestamp`.
    pub query_string: String,
    /// Lowercase hex HMAC-SHA256 digest of `query_string`.
    pub signature: String,
}

impl SignedRequest {
    /// Encode `params`, append `recvWindow` and `timestamp`, and sign.
    ///
    /// Pure given its inputs; the timestamp is a parameter so signatures
    /// can be derived and verified offline.
    pub fn build<P: Serialize + ?Sized>(
        params: &P,
        secret: &str,
        recv_window: u64,
        timestamp_ms: u64,
    ) -> Result<Self> {
        let encoded = serde_urlencoded::to_string(params)?;
        let query_string = if encoded.is_empty() {
            format!("recvWindow={recv_window}&timestamp={timestamp_ms}")
        } else {
            format!("{encoded}&recvWindow={recv_window}&timestamp={timestamp_ms}")
        };
        let signature = sign_request(secret, &query_string);
        Ok(Self {
            query_string,
            signature,
        })
    }

    /// The full transmitted query: signed bytes plus `&signature=…`.
    pub fn full_query(&self) -> String {
        format!("{}&signature={}", self.query_string, self.signature)
    }
}

/// Response of `GET /fapi/v1/time`.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ServerTime {
    /// Server clock in epoch milliseconds.
    #[serde(rename = "serverTime")]
    pub server_time: u64,
}

/// One entry of `GET /fapi/v2/balance`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceEntry {
    /// Asset ticker (e.g. "USDT").
    pub asset: String,
    /// Wallet balance.
    pub balance: Decimal,
    /// Balance available for new orders.
    #[serde(rename = "availableBalance", default)]
    pub available_balance: Option<Decimal>,
}

/// One entry of `GET /fapi/v2/positionRisk`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionRisk {
    pub symbol: String,
    /// Signed position size; zero means flat.
    #[serde(rename = "positionAmt")]
    pub position_amt: Decimal,
    #[serde(rename = "entryPrice", default)]
    pub entry_price: Option<Decimal>,
    #[serde(rename = "unRealizedProfit", default)]
    pub unrealized_profit: Option<Decimal>,
}

impl PositionRisk {
    /// `true` when the position size is non-zero.
    pub fn is_open(&self) -> bool {
        self.position_amt != Decimal::ZERO
    }
}

/// Response of `GET /fapi/v1/exchangeInfo`, reduced to what filter
/// validation needs.
#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeInfo {
    #[serde(default)]
    pub symbols: Vec<SymbolInfo>,
}

impl ExchangeInfo {
    /// Look up a symbol entry by (case-insensitive) name.
    pub fn symbol(&self, name: &str) -> Option<&SymbolInfo> {
        self.symbols
            .iter()
            .find(|s| s.symbol.eq_ignore_ascii_case(name))
    }
}

/// Per-symbol metadata and trading filters.
#[derive(Debug, Clone, Deserialize)]
pub struct SymbolInfo {
    pub symbol: String,
    #[serde(default)]
    pub filters: Vec<ExchangeFilter>,
}

/// Futures REST client.
///
/// Holds the signing secret and `recvWindow`; all I/O goes through the
/// injected [`Transport`], so the same client serves both live and dry-run
/// invocations.
#[derive(Clone)]
pub struct FuturesRestClient {
    api_secret: String,
    recv_window: u64,
    transport: Arc<dyn Transport>,
}

impl FuturesRestClient {
    pub fn new(
        api_secret: impl Into<String>,
        recv_window: u64,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            api_secret: api_secret.into(),
            recv_window,
            transport,
        }
    }

    /// Dispatch an unsigned public request.
    async fn public(&self, method: Method, path: &str) -> Result<Value> {
        self.transport
            .execute(HttpCall {
                method,
                path,
                query: None,
            })
            .await
    }

    /// Sign the parameter set with the current timestamp and dispatch.
    async fn signed<P: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        params: &P,
    ) -> Result<Value> {
        let timestamp_ms = Utc::now().timestamp_millis() as u64;
        let signed = SignedRequest::build(params, &self.api_secret, self.recv_window, timestamp_ms)?;
        let query = signed.full_query();
        debug!(path, "signed request built");
        self.transport
            .execute(HttpCall {
                method,
                path,
                query: Some(&query),
            })
            .await
    }

    /// Place a new order: `POST /fapi/v1/order`, signed.
    ///
    /// Returns the decoded JSON body: the exchange acknowledgment on the
    /// live path, the `SIMULATED` echo on the dry-run path.
    pub async fn place_order(&self, params: &FuturesOrderParams) -> Result<Value> {
        self.signed(Method::POST, ORDER_PATH, params).await
    }

    /// Connectivity probe: `GET /fapi/v1/ping`.
    pub async fn ping(&self) -> Result<Value> {
        self.public(Method::GET, PING_PATH).await
    }

    /// Exchange clock: `GET /fapi/v1/time`.
    pub async fn server_time(&self) -> Result<ServerTime> {
        let body = self.public(Method::GET, TIME_PATH).await?;
        Ok(serde_json::from_value(body)?)
    }

    /// Symbols and trading filters: `GET /fapi/v1/exchangeInfo`.
    pub async fn exchange_info(&self) -> Result<ExchangeInfo> {
        let body = self.public(Method::GET, EXCHANGE_INFO_PATH).await?;
        Ok(serde_json::from_value(body)?)
    }

    /// Account balances: `GET /fapi/v2/balance`, signed.
    pub async fn account_balance(&self) -> Result<Vec<BalanceEntry>> {
        let body = self.signed(Method::GET, BALANCE_PATH, &NoParams {}).await?;
        Ok(serde_json::from_value(body)?)
    }

    /// Full account snapshot: `GET /fapi/v2/account`, signed. Returned raw;
    /// callers pick out the handful of counts they need.
    pub async fn account(&self) -> Result<Value> {
        self.signed(Method::GET, ACCOUNT_PATH, &NoParams {}).await
    }

    /// Position risk entries: `GET /fapi/v2/positionRisk`, signed.
    pub async fn position_risk(&self) -> Result<Vec<PositionRisk>> {
        let body = self
            .signed(Method::GET, POSITION_RISK_PATH, &NoParams {})
            .await?;
        Ok(serde_json::from_value(body)?)
    }
}

/// Signed endpoints that take no parameters beyond `recvWindow`/`timestamp`.
#[derive(Serialize)]
struct NoParams {}
