//! Connectivity and account diagnostics.
//!
//! Each probe runs independently and records either its result or its error,
//! so a failing endpoint never hides what the others report. In dry-run mode
//! no probe runs at all: the transport performs no I/O and has nothing
//! meaningful to probe, so the report only carries the mode marker and the
//! masked key.

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use crate::bot::Bot;

/// Aggregated probe results, printed as JSON.
///
/// `None` fields were not probed (all of them, in dry-run mode); `*_error`
/// fields carry the failure message when a probe ran and failed.
#[derive(Debug, Default, Serialize)]
pub struct DiagnosticsReport {
    /// `true` when no probe ran because the invocation is simulated.
    pub dry_run: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ping: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ping_error: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_time: Option<u64>,
    /// Local clock minus server clock, milliseconds. Large magnitudes are
    /// the usual cause of `-1021` signature rejections.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_delta_ms: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_error: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub exchange_info_symbols: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol_listed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exchange_info_error: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assets: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance_error: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_positions: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_error: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_assets: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_positions: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_error: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key_masked: Option<String>,
}

impl DiagnosticsReport {
    /// `true` when every probe that ran succeeded.
    pub fn all_ok(&self) -> bool {
        self.ping_error.is_none()
            && self.time_error.is_none()
            && self.exchange_info_error.is_none()
            && self.balance_error.is_none()
            && self.position_error.is_none()
            && self.account_error.is_none()
    }
}

/// Run the diagnostic probes against the configured endpoint.
///
/// In dry-run mode the report carries only the mode marker and the masked
/// key: probing a transport that never leaves the process would report
/// simulator artifacts, not endpoint health.
pub async fn run(bot: &Bot, symbol: Option<&str>) -> DiagnosticsReport {
    let client = bot.client();
    let settings = bot.settings();
    let mut report = DiagnosticsReport {
        dry_run: settings.dry_run,
        api_key_masked: settings.masked_api_key(),
        ..DiagnosticsReport::default()
    };

    if settings.dry_run {
        info!("dry-run mode, diagnostics probes skipped");
        return report;
    }

    info!(base_url = %settings.base_url, "running diagnostics");

    match client.ping().await {
        Ok(_) => report.ping = Some(true),
        Err(err) => {
            warn!("ping failed: {err}");
            report.ping = Some(false);
            report.ping_error = Some(err.to_string());
        }
    }

    match client.server_time().await {
        Ok(t) => {
            let local_ms = Utc::now().timestamp_millis();
            report.server_time = Some(t.server_time);
            report.time_delta_ms = Some(local_ms - t.server_time as i64);
        }
        Err(err) => {
            warn!("server time probe failed: {err}");
            report.time_error = Some(err.to_string());
        }
    }

    match client.exchange_info().await {
        Ok(info) => {
            report.exchange_info_symbols = Some(info.symbols.len());
            if let Some(name) = symbol {
                report.symbol_listed = Some(info.symbol(name).is_some());
            }
        }
        Err(err) => {
            warn!("exchange info probe failed: {err}");
            report.exchange_info_error = Some(err.to_string());
        }
    }

    match client.account_balance().await {
        Ok(balances) => {
            report.balance_count = Some(balances.len());
            report.assets = Some(balances.into_iter().map(|b| b.asset).collect());
        }
        Err(err) => {
            warn!("balance probe failed: {err}");
            report.balance_error = Some(err.to_string());
        }
    }

    match client.position_risk().await {
        Ok(positions) => {
            report.open_positions = Some(positions.iter().filter(|p| p.is_open()).count());
        }
        Err(err) => {
            warn!("position probe failed: {err}");
            report.position_error = Some(err.to_string());
        }
    }

    match client.account().await {
        Ok(account) => {
            report.account_assets = account
                .get("assets")
                .and_then(|a| a.as_array())
                .map(Vec::len);
            report.account_positions = account
                .get("positions")
                .and_then(|p| p.as_array())
                .map(Vec::len);
        }
        Err(err) => {
            warn!("account probe failed: {err}");
            report.account_error = Some(err.to_string());
        }
    }

    report
}
