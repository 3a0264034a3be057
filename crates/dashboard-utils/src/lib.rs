//! Shared utilities for the stock dashboard
//!
//! This crate provides common functionality used across the workspace,
//! including logging setup and deployment configuration.

pub mod config;
pub mod logging;

pub use config::{ConfigError, ServerConfig};
pub use logging::{DEFAULT_LOG_FILTER, init_tracing, init_tracing_with};
