//! Order orchestrator: validate, conform to exchange filters, dispatch.
//!
//! The orchestrator never branches on credential presence. Whether an order
//! actually reaches the exchange is decided once, by which
//! [`Transport`](bft_execution::Transport) the composition root injected into
//! the client. Every outcome is logged and reported; nothing is retried.

use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, warn};

use bft_core::config::Settings;
use bft_execution::binance_rest::{BalanceEntry, PositionRisk};
use bft_execution::filters::SymbolFilters;
use bft_execution::{Error, FuturesRestClient, OrderRequest};

/// Terminal outcome of one order attempt, printed as JSON.
#[derive(Debug, Serialize)]
pub struct OrderOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub data: Value,
}

impl OrderOutcome {
    fn failure(err: &Error) -> Self {
        Self {
            success: false,
            error: Some(err.to_string()),
            data: Value::Null,
        }
    }
}

pub struct Bot {
    settings: Settings,
    client: FuturesRestClient,
}

impl Bot {
    pub fn new(settings: Settings, client: FuturesRestClient) -> Self {
        Self { settings, client }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn client(&self) -> &FuturesRestClient {
        &self.client
    }

    /// Account balances, gated on mode: `Ok(None)` in dry-run, where the
    /// simulator has no account to report and the query is not sent.
    pub async fn account_balances(&self) -> Result<Option<Vec<BalanceEntry>>, Error> {
        if self.settings.dry_run {
            info!("dry-run mode, balance query not sent");
            return Ok(None);
        }
        Ok(Some(self.client.account_balance().await?))
    }

    /// Non-zero positions, gated on mode like [`Bot::account_balances`].
    pub async fn open_positions(&self) -> Result<Option<Vec<PositionRisk>>, Error> {
        if self.settings.dry_run {
            info!("dry-run mode, position query not sent");
            return Ok(None);
        }
        let positions = self.client.position_risk().await?;
        Ok(Some(positions.into_iter().filter(|p| p.is_open()).collect()))
    }

    /// Validate and place a single order.
    ///
    /// In live mode the request is first conformed to the symbol's exchange
    /// filters: prices are floored to the tick grid and quantities to the lot
    /// step, unless `strict` is set, in which case non-conforming values are
    /// rejected instead of adjusted.
    pub async fn place_order(&self, mut req: OrderRequest, strict: bool) -> OrderOutcome {
        info!(
            symbol = %req.symbol,
            side = %req.side,
            kind = %req.kind,
            quantity = %req.quantity,
            "placing order"
        );

        if let Err(err) = req.validate() {
            error!("validation failed: {err}");
            return OrderOutcome::failure(&err);
        }

        if !self.settings.dry_run {
            if let Err(err) = self.conform_to_filters(&mut req, strict).await {
                error!("filter conformance failed: {err}");
                return OrderOutcome::failure(&err);
            }
        }

        match self.client.place_order(&req.to_params()).await {
            Ok(data) => {
                info!(
                    order_id = ?data.get("orderId"),
                    status = ?data.get("status"),
                    "order accepted"
                );
                OrderOutcome {
                    success: true,
                    error: None,
                    data,
                }
            }
            Err(err) => {
                error!("order failed: {err}");
                OrderOutcome::failure(&err)
            }
        }
    }

    /// Fetch the symbol's trading filters and floor (or, with `strict`,
    /// reject) off-grid prices and quantities.
    ///
    /// A symbol absent from exchange info is logged and skipped; the
    /// exchange itself is the final authority on unknown symbols.
    async fn conform_to_filters(
        &self,
        req: &mut OrderRequest,
        strict: bool,
    ) -> Result<(), Error> {
        let info = self.client.exchange_info().await?;
        let Some(symbol_info) = info.symbol(req.symbol.as_str()) else {
            warn!(symbol = %req.symbol, "symbol not in exchange info; skipping filter conformance");
            return Ok(());
        };
        let filters = SymbolFilters::from_symbol_info(symbol_info);

        if !filters.is_qty_valid(req.quantity) {
            if strict {
                return Err(Error::validation(format!(
                    "quantity {} violates lot filter (min {}, step {})",
                    req.quantity, filters.lot_min, filters.step_size
                )));
            }
            let adjusted = filters.adjust_quantity(req.quantity)?;
            warn!(from = %req.quantity, to = %adjusted, "quantity floored to lot step");
            req.quantity = adjusted;
        }

        if let Some(price) = req.price {
            if !filters.is_price_valid(price) {
                if strict {
                    return Err(Error::validation(format!(
                        "price {} violates price filter (min {}, tick {})",
                        price, filters.price_min, filters.tick_size
                    )));
                }
                let adjusted = filters.adjust_price(price)?;
                warn!(from = %price, to = %adjusted, "price floored to tick");
                req.price = Some(adjusted);
            }
        }

        if let Some(stop_price) = req.stop_price {
            if !filters.is_price_valid(stop_price) {
                if strict {
                    return Err(Error::validation(format!(
                        "stop_price {} violates price filter (min {}, tick {})",
                        stop_price, filters.price_min, filters.tick_size
                    )));
                }
                let adjusted = filters.adjust_price(stop_price)?;
                warn!(from = %stop_price, to = %adjusted, "stop price floored to tick");
                req.stop_price = Some(adjusted);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bft_core::types::{OrderKind, Side, Symbol, TimeInForce};
    use bft_execution::{HttpCall, NullTransport, Transport};
    use rust_decimal::Decimal;
    use serde_json::json;
    use std::str::FromStr;
    use std::sync::Arc;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn dry_run_settings() -> Settings {
        Settings {
            api_key: String::new(),
            api_secret: String::new(),
            base_url: "https://testnet.binancefuture.com".to_string(),
            recv_window: 5_000,
            timeout_ms: 10_000,
            dry_run: true,
            log_level: "info".to_string(),
            log_dir: "logs".to_string(),
        }
    }

    fn live_settings() -> Settings {
        Settings {
            api_key: "key".to_string(),
            api_secret: "secret".to_string(),
            dry_run: false,
            ..dry_run_settings()
        }
    }

    fn market_order() -> OrderRequest {
        OrderRequest {
            symbol: Symbol::new("BTCUSDT"),
            side: Side::Buy,
            kind: OrderKind::Market,
            quantity: dec("0.001"),
            price: None,
            stop_price: None,
            time_in_force: TimeInForce::Gtc,
        }
    }

    fn bot_with(settings: Settings, transport: Arc<dyn Transport>) -> Bot {
        let client = FuturesRestClient::new(
            settings.api_secret.clone(),
            settings.recv_window,
            transport,
        );
        Bot::new(settings, client)
    }

    /// Transport double that fails the test if any network dispatch happens.
    struct PanicTransport;

    #[async_trait]
    impl Transport for PanicTransport {
        async fn execute(&self, call: HttpCall<'_>) -> bft_execution::Result<Value> {
            panic!("transport must not be invoked, got {} {}", call.method, call.path);
        }
    }

    /// Transport double returning a fixed error for every call.
    struct ApiErrorTransport;

    #[async_trait]
    impl Transport for ApiErrorTransport {
        async fn execute(&self, _call: HttpCall<'_>) -> bft_execution::Result<Value> {
            Err(Error::api(
                400,
                r#"{"code":-1021,"msg":"Timestamp outside recvWindow"}"#.to_string(),
            ))
        }
    }

    /// Transport double serving exchange info, then a canned order ack.
    struct FilteredExchangeTransport;

    #[async_trait]
    impl Transport for FilteredExchangeTransport {
        async fn execute(&self, call: HttpCall<'_>) -> bft_execution::Result<Value> {
            if call.path == "/fapi/v1/exchangeInfo" {
                return Ok(json!({
                    "symbols": [{
                        "symbol": "BTCUSDT",
                        "filters": [
                            { "filterType": "PRICE_FILTER", "minPrice": "0.10",
                              "maxPrice": "1000000", "tickSize": "0.10" },
                            { "filterType": "LOT_SIZE", "minQty": "0.001",
                              "maxQty": "1000", "stepSize": "0.001" }
                        ]
                    }]
                }));
            }
            // Echo the order query so adjusted values are observable.
            let query = call.query.unwrap_or("");
            let mut body = serde_json::Map::new();
            for (k, v) in serde_urlencoded::from_str::<Vec<(String, String)>>(query).unwrap() {
                body.insert(k, Value::String(v));
            }
            body.insert("orderId".to_string(), json!(42));
            body.insert("status".to_string(), Value::String("NEW".to_string()));
            Ok(Value::Object(body))
        }
    }

    #[tokio::test]
    async fn test_dry_run_market_order_succeeds_without_network() {
        let bot = bot_with(dry_run_settings(), Arc::new(NullTransport));
        let outcome = bot.place_order(market_order(), false).await;

        assert!(outcome.success);
        assert_eq!(outcome.error, None);
        assert_eq!(outcome.data["status"], "SIMULATED");
        assert_eq!(outcome.data["symbol"], "BTCUSDT");
    }

    #[tokio::test]
    async fn test_validation_failure_short_circuits_before_dispatch() {
        // PanicTransport proves no dispatch is even attempted.
        let bot = bot_with(live_settings(), Arc::new(PanicTransport));
        let mut req = market_order();
        req.kind = OrderKind::Limit;
        req.price = None;

        let outcome = bot.place_order(req, false).await;
        assert!(!outcome.success);
        assert!(outcome.error.unwrap().contains("price required"));
    }

    #[tokio::test]
    async fn test_dry_run_skips_filter_fetch() {
        // In dry-run mode only the order dispatch itself reaches the
        // transport; exchange info must not be fetched.
        let bot = bot_with(dry_run_settings(), Arc::new(NullTransport));
        let mut req = market_order();
        // Off-step quantity passes through untouched in dry-run.
        req.quantity = dec("0.0015");

        let outcome = bot.place_order(req, false).await;
        assert!(outcome.success);
        assert_eq!(outcome.data["quantity"], "0.0015");
    }

    #[tokio::test]
    async fn test_api_error_is_surfaced_verbatim() {
        let bot = bot_with(live_settings(), Arc::new(ApiErrorTransport));
        let outcome = bot.place_order(market_order(), false).await;

        assert!(!outcome.success);
        let err = outcome.error.unwrap();
        assert!(err.contains("400"));
        assert!(err.contains("-1021"));
    }

    #[tokio::test]
    async fn test_live_order_floors_price_to_tick() {
        let bot = bot_with(live_settings(), Arc::new(FilteredExchangeTransport));
        let mut req = market_order();
        req.kind = OrderKind::Limit;
        req.price = Some(dec("75000.17"));

        let outcome = bot.place_order(req, false).await;
        assert!(outcome.success);
        assert_eq!(outcome.data["price"], "75000.1");
        assert_eq!(outcome.data["status"], "NEW");
    }

    #[tokio::test]
    async fn test_strict_mode_rejects_off_tick_price() {
        let bot = bot_with(live_settings(), Arc::new(FilteredExchangeTransport));
        let mut req = market_order();
        req.kind = OrderKind::Limit;
        req.price = Some(dec("75000.17"));

        let outcome = bot.place_order(req, true).await;
        assert!(!outcome.success);
        assert!(outcome.error.unwrap().contains("violates price filter"));
    }

    #[tokio::test]
    async fn test_dry_run_balance_query_is_not_sent() {
        // PanicTransport proves the simulator is never even consulted.
        let bot = bot_with(dry_run_settings(), Arc::new(PanicTransport));
        let balances = bot.account_balances().await.unwrap();
        assert!(balances.is_none());
    }

    #[tokio::test]
    async fn test_dry_run_position_query_is_not_sent() {
        let bot = bot_with(dry_run_settings(), Arc::new(PanicTransport));
        let positions = bot.open_positions().await.unwrap();
        assert!(positions.is_none());
    }

    /// Transport double serving balance and position bodies.
    struct AccountTransport;

    #[async_trait]
    impl Transport for AccountTransport {
        async fn execute(&self, call: HttpCall<'_>) -> bft_execution::Result<Value> {
            Ok(match call.path {
                "/fapi/v2/balance" => json!([
                    { "asset": "USDT", "balance": "10000" }
                ]),
                "/fapi/v2/positionRisk" => json!([
                    { "symbol": "BTCUSDT", "positionAmt": "0.5" },
                    { "symbol": "ETHUSDT", "positionAmt": "0" }
                ]),
                other => panic!("unexpected path {other}"),
            })
        }
    }

    #[tokio::test]
    async fn test_live_balance_and_position_queries() {
        let bot = bot_with(live_settings(), Arc::new(AccountTransport));

        let balances = bot.account_balances().await.unwrap().unwrap();
        assert_eq!(balances.len(), 1);
        assert_eq!(balances[0].asset, "USDT");

        // Flat positions are filtered out.
        let positions = bot.open_positions().await.unwrap().unwrap();
        assert_eq!(positions.len(), 1);
        assert_eq!(positions[0].symbol, "BTCUSDT");
    }

    #[tokio::test]
    async fn test_unknown_symbol_skips_filter_conformance() {
        let bot = bot_with(live_settings(), Arc::new(FilteredExchangeTransport));
        let mut req = market_order();
        req.symbol = Symbol::new("DOGEUSDT");

        let outcome = bot.place_order(req, false).await;
        assert!(outcome.success);
        assert_eq!(outcome.data["symbol"], "DOGEUSDT");
    }
}
