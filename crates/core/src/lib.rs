//! # bft-core
//!
//! Shared building blocks for the bft trading CLI: the layered settings
//! loader, tracing initialization (console + rotating file), and the order
//! vocabulary types used across the workspace.

pub mod config;
pub mod logging;
pub mod types;
