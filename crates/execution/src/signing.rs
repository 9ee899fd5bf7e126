//! HMAC-SHA256 request signing for the Binance Futures API.
//!
//! Uses the `ring` crate for constant-time HMAC computation. Signing is a
//! pure function of (query string, secret) so signatures can be verified
//! offline without network access. Secrets are never logged or included in
//! error messages.

use ring::hmac;

/// Sign a Binance REST API request.
///
/// Binance signs the query string: `HMAC-SHA256(secret, query_string)`.
/// The resulting lowercase hex digest is appended as `&signature=...`.
pub fn sign_request(secret: &str, query_string: &str) -> String {
    let key = hmac::Key::new(hmac::HMAC_SHA256, secret.as_bytes());
    let signature = hmac::sign(&key, query_string.as_bytes());
    hex::encode(signature.as_ref())
}
