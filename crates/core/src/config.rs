//! Layered settings for the bft trading CLI.
//!
//! Settings are resolved in layers with increasing priority:
//! 1. Compiled-in defaults (Binance Futures testnet base URL, recvWindow 5000)
//! 2. TOML configuration file (if provided)
//! 3. Environment variable overrides (prefix `BFT_`)
//! 4. Dedicated env vars for secrets and common knobs (`BINANCE_API_KEY`,
//!    `BINANCE_API_SECRET`, `BINANCE_RECV_WINDOW`, `DRY_RUN`, `LOG_LEVEL`)
//! 5. CLI flag overrides
//!
//! API keys and secrets **must** come from the environment or CLI flags,
//! never from configuration files, to prevent accidental check-in of
//! credentials. Missing credentials force dry-run mode.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

/// Binance USDⓈ-M Futures testnet REST base URL.
pub const FUTURES_TESTNET_BASE: &str = "https://testnet.binancefuture.com";

fn default_recv_window() -> u64 {
    5_000
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

/// Resolved application settings, constructed once at startup and passed by
/// reference to the orchestrator and client.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// API key, from env (`BINANCE_API_KEY`) or `--api-key`. Empty means absent.
    #[serde(default)]
    pub api_key: String,
    /// API secret, from env (`BINANCE_API_SECRET`) or `--api-secret`.
    #[serde(default)]
    pub api_secret: String,
    /// REST base URL. Defaults to the futures testnet.
    pub base_url: String,
    /// Binance `recvWindow` in milliseconds.
    #[serde(default = "default_recv_window")]
    pub recv_window: u64,
    /// HTTP request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Simulate orders without sending them.
    #[serde(default)]
    pub dry_run: bool,
    /// Minimum log level (overridden by `RUST_LOG` when set).
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Directory for the rotating log file.
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
}

/// CLI-supplied overrides, applied as the highest-priority layer.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub dry_run: bool,
    pub log_level: Option<String>,
}

impl Settings {
    /// Load settings using the layered sources described in the module docs.
    pub fn load(config_path: Option<PathBuf>, overrides: Overrides) -> Result<Self> {
        let mut builder = Config::builder()
            // ── Layer 1: compiled-in defaults ───────────────────────
            .set_default("api_key", "")?
            .set_default("api_secret", "")?
            .set_default("base_url", FUTURES_TESTNET_BASE)?
            .set_default("recv_window", 5_000_i64)?
            .set_default("timeout_ms", 10_000_i64)?
            .set_default("dry_run", false)?
            .set_default("log_level", "info")?
            .set_default("log_dir", "logs")?;

        // ── Layer 2: TOML file ─────────────────────────────────────
        if let Some(path) = config_path {
            let path_str = path.to_str().context("config path is not valid UTF-8")?;
            builder = builder.add_source(File::with_name(path_str).required(true));
        }

        // ── Layer 3: env var overrides (BFT_ prefix) ───────────────
        builder = builder.add_source(
            Environment::with_prefix("BFT")
                .prefix_separator("_")
                .try_parsing(true),
        );

        let mut cfg: Settings = builder
            .build()
            .context("failed to build configuration")?
            .try_deserialize()
            .context("failed to deserialize configuration")?;

        // ── Layer 4: dedicated env vars ────────────────────────────
        if let Ok(v) = std::env::var("BINANCE_API_KEY") {
            cfg.api_key = v;
        }
        if let Ok(v) = std::env::var("BINANCE_API_SECRET") {
            cfg.api_secret = v;
        }
        if let Ok(v) = std::env::var("BINANCE_RECV_WINDOW") {
            cfg.recv_window = v
                .parse()
                .context("BINANCE_RECV_WINDOW is not a valid integer")?;
        }
        if let Ok(v) = std::env::var("DRY_RUN") {
            cfg.dry_run |= matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }
        if let Ok(v) = std::env::var("LOG_LEVEL") {
            cfg.log_level = v;
        }

        // ── Layer 5: CLI overrides ─────────────────────────────────
        if let Some(v) = overrides.api_key {
            cfg.api_key = v;
        }
        if let Some(v) = overrides.api_secret {
            cfg.api_secret = v;
        }
        cfg.dry_run |= overrides.dry_run;
        if let Some(v) = overrides.log_level {
            cfg.log_level = v;
        }

        cfg.validate()?;

        Ok(cfg)
    }

    /// Validate configuration invariants.
    fn validate(&self) -> Result<()> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            bail!("base_url must be an http(s) URL, got {:?}", self.base_url);
        }
        if self.recv_window == 0 {
            bail!("recv_window must be positive");
        }
        if self.timeout_ms == 0 {
            bail!("timeout_ms must be positive");
        }
        Ok(())
    }

    /// `true` when both API key and secret are present.
    pub fn has_credentials(&self) -> bool {
        !self.api_key.is_empty() && !self.api_secret.is_empty()
    }

    /// Force dry-run when credentials are absent.
    ///
    /// Returns `true` if the mode was switched, so the caller can log a
    /// warning once logging is up.
    pub fn enforce_credential_policy(&mut self) -> bool {
        if !self.has_credentials() && !self.dry_run {
            self.dry_run = true;
            return true;
        }
        false
    }

    /// API key with all but the first and last four characters elided,
    /// safe for logs and diagnostic reports.
    ///
    /// Counts characters, not bytes: keys come from arbitrary CLI/env input
    /// and must never panic on a multi-byte boundary.
    pub fn masked_api_key(&self) -> Option<String> {
        if self.api_key.is_empty() {
            return None;
        }
        let chars: Vec<char> = self.api_key.chars().collect();
        if chars.len() <= 8 {
            return Some("***".to_string());
        }
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        Some(format!("{head}***{tail}"))
    }
}
