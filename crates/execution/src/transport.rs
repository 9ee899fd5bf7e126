//! Transport seam between request construction and network I/O.
//!
//! The client builds and signs requests; a [`Transport`] decides what happens
//! to them. [`LiveTransport`] performs the HTTP round trip, [`NullTransport`]
//! logs the prepared call and fabricates a `SIMULATED` response. Dry-run is
//! therefore a property of the injected transport, not a conditional branch
//! in the orchestrator or client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::error::{Error, Result};

/// A fully prepared HTTP call: method, endpoint path, and (for signed
/// endpoints) the complete query string with the signature appended.
#[derive(Debug, Clone)]
pub struct HttpCall<'a> {
    pub method: Method,
    pub path: &'a str,
    pub query: Option<&'a str>,
}

/// Executes prepared calls. Object-safe so the composition root can inject
/// either variant behind `Arc<dyn Transport>`.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute the call and return the decoded JSON body.
    async fn execute(&self, call: HttpCall<'_>) -> Result<Value>;
}

/// Transport that performs real HTTP calls against the exchange.
pub struct LiveTransport {
    base_url: String,
    api_key: String,
    client: Client,
}

impl LiveTransport {
    /// Create a live transport with an explicit request timeout.
    ///
    /// The API key is attached to every request via the `X-MBX-APIKEY`
    /// header; unsigned public endpoints ignore it.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, timeout_ms: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()?;
        Ok(Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            client,
        })
    }
}

#[async_trait]
impl Transport for LiveTransport {
    async fn execute(&self, call: HttpCall<'_>) -> Result<Value> {
        let mut url = format!("{}{}", self.base_url, call.path);
        if let Some(query) = call.query.filter(|q| !q.is_empty()) {
            url.push('?');
            url.push_str(query);
        }

        debug!(method = %call.method, path = call.path, "dispatching request");

        let resp = self
            .client
            .request(call.method, &url)
            .header("X-MBX-APIKEY", &self.api_key)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;

        let body: Value = serde_json::from_str(&text).unwrap_or_else(|_| json!({ "raw": text }));

        // Binance reports some failures as 2xx with a negative `code`.
        let binance_code = body.get("code").and_then(Value::as_i64);
        if !status.is_success() || binance_code.is_some_and(|c| c < 0) {
            return Err(Error::api(status.as_u16(), text));
        }

        debug!(status = status.as_u16(), path = call.path, "response received");
        Ok(body)
    }
}

/// Transport that performs no I/O.
///
/// Logs the prepared call at info level and echoes the query parameters back
/// as a synthetic `{"status": "SIMULATED"}` body, so the dry-run path
/// produces the same observable request as the live path.
#[derive(Debug, Default, Clone)]
pub struct NullTransport;

#[async_trait]
impl Transport for NullTransport {
    async fn execute(&self, call: HttpCall<'_>) -> Result<Value> {
        let query = call.query.unwrap_or("");
        info!(
            method = %call.method,
            path = call.path,
            query,
            "dry-run: request constructed but not sent"
        );

        let mut body = serde_json::Map::new();
        if !query.is_empty() {
            let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query)
                .map_err(|e| Error::validation(format!("malformed query string: {e}")))?;
            for (k, v) in pairs {
                body.insert(k, Value::String(v));
            }
        }
        body.insert("status".to_string(), Value::String("SIMULATED".to_string()));

        Ok(Value::Object(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_null_transport_echoes_params() {
        let transport = NullTransport;
        let body = transport
            .execute(HttpCall {
                method: Method::POST,
                path: "/fapi/v1/order",
                query: Some("symbol=BTCUSDT&side=BUY&type=MARKET&quantity=0.001"),
            })
            .await
            .expect("null transport never fails on well-formed queries");

        assert_eq!(body["status"], "SIMULATED");
        assert_eq!(body["symbol"], "BTCUSDT");
        assert_eq!(body["side"], "BUY");
        assert_eq!(body["quantity"], "0.001");
    }

    #[tokio::test]
    async fn test_null_transport_without_query() {
        let body = NullTransport
            .execute(HttpCall {
                method: Method::GET,
                path: "/fapi/v1/ping",
                query: None,
            })
            .await
            .unwrap();
        assert_eq!(body, json!({ "status": "SIMULATED" }));
    }

    #[test]
    fn test_transport_is_object_safe() {
        fn _assert_object_safe(_t: &dyn Transport) {}
    }
}
