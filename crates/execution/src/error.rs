//! Error taxonomy for order placement.
//!
//! Every failure is terminal for the single-shot invocation: validation
//! errors stop the flow before dispatch, API and network errors surface the
//! failed round trip verbatim. No variant is retried.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Bad or missing input, detected before any dispatch is attempted.
    #[error("validation error: {0}")]
    Validation(String),

    /// Non-2xx HTTP response, or a 2xx body carrying a negative Binance
    /// error code.
    #[error("api error: HTTP {status} code {code:?}: {msg}")]
    Api {
        status: u16,
        /// Binance-specific numeric error code (e.g. -1021), when present.
        code: Option<i64>,
        msg: String,
        /// Raw response body, preserved for the caller's report.
        body: String,
    },

    /// Transport-level failure: DNS, timeout, connection refused.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Request parameters could not be encoded as a query string.
    #[error("failed to encode request parameters: {0}")]
    Encode(#[from] serde_urlencoded::ser::Error),

    /// Response body could not be decoded into the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl Error {
    /// Build an [`Error::Api`] from a status code and raw body, extracting
    /// the Binance `{"code": …, "msg": …}` envelope when the body carries one.
    pub fn api(status: u16, body: String) -> Self {
        let (code, msg) = match serde_json::from_str::<serde_json::Value>(&body) {
            Ok(v) => (
                v.get("code").and_then(|c| c.as_i64()),
                v.get("msg")
                    .and_then(|m| m.as_str())
                    .unwrap_or(&body)
                    .to_string(),
            ),
            Err(_) => (None, body.clone()),
        };
        Error::Api {
            status,
            code,
            msg,
            body,
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_extracts_binance_envelope() {
        let err = Error::api(
            400,
            r#"{"code":-1021,"msg":"Timestamp outside recvWindow"}"#.to_string(),
        );
        match err {
            Error::Api {
                status, code, msg, ..
            } => {
                assert_eq!(status, 400);
                assert_eq!(code, Some(-1021));
                assert_eq!(msg, "Timestamp outside recvWindow");
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn test_api_error_keeps_non_json_body() {
        let err = Error::api(502, "Bad Gateway".to_string());
        match err {
            Error::Api {
                status, code, body, ..
            } => {
                assert_eq!(status, 502);
                assert_eq!(code, None);
                assert_eq!(body, "Bad Gateway");
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn test_display_includes_status_and_code() {
        let err = Error::api(400, r#"{"code":-1021,"msg":"boom"}"#.to_string());
        let rendered = format!("{err}");
        assert!(rendered.contains("400"));
        assert!(rendered.contains("-1021"));
        assert!(rendered.contains("boom"));
    }

    #[test]
    fn test_validation_display() {
        let err = Error::validation("quantity must be positive");
        assert_eq!(
            format!("{err}"),
            "validation error: quantity must be positive"
        );
    }
}
