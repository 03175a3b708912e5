//! Tracing setup. stdout carries the MCP stream, so logs go to stderr and an
//! optional append-only log file.

use crate::config::Config;
use crate::error::{Result, ServiceNowError};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const DEFAULT_FILTER: &str = "servicenow_mcp=info,rmcp=info";

pub fn init(config: &Config) -> Result<()> {
    if config.runtime.mcp_no_log {
        return Ok(());
    }

    let filter = EnvFilter::try_new(&config.runtime.log_level)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_ansi(false);

    let file_layer = if config.server.log_file.is_empty() {
        None
    } else {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.server.log_file)?;
        Some(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| ServiceNowError::Internal {
            message: format!("Failed to initialize logging: {}", e),
        })
}
