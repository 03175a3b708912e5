//! Domain-specific error types for servicenow-mcp
//!
//! Remote-call failures never surface here: they are folded into an
//! [`Outcome`](crate::outcome::Outcome) and returned as tool output. This type
//! covers startup and MCP protocol problems only.

use serde_json::json;
use thiserror::Error;

/// Main error type for the servicenow-mcp server
#[derive(Error, Debug)]
pub enum ServiceNowError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("MCP protocol error: {message}")]
    Mcp { message: String },

    #[error("Invalid parameters: {message}")]
    InvalidParams { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error("I/O error: {message}")]
    Io { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl From<anyhow::Error> for ServiceNowError {
    fn from(err: anyhow::Error) -> Self {
        ServiceNowError::Internal {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for ServiceNowError {
    fn from(err: serde_json::Error) -> Self {
        ServiceNowError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for ServiceNowError {
    fn from(err: std::io::Error) -> Self {
        ServiceNowError::Io {
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for ServiceNowError {
    fn from(err: toml::de::Error) -> Self {
        ServiceNowError::Config {
            message: format!("Invalid config file: {}", err),
        }
    }
}

impl From<rmcp::ErrorData> for ServiceNowError {
    fn from(err: rmcp::ErrorData) -> Self {
        ServiceNowError::Mcp {
            message: err.message.to_string(),
        }
    }
}

/// Convert ServiceNowError to MCP error
impl From<ServiceNowError> for rmcp::ErrorData {
    fn from(err: ServiceNowError) -> Self {
        let (code, label, details) = match err {
            ServiceNowError::Config { message } => (
                rmcp::model::ErrorCode::INTERNAL_ERROR,
                "Configuration error",
                message,
            ),
            ServiceNowError::Mcp { message } => (
                rmcp::model::ErrorCode::INVALID_PARAMS,
                "MCP protocol error",
                message,
            ),
            ServiceNowError::InvalidParams { message } => (
                rmcp::model::ErrorCode::INVALID_PARAMS,
                "Invalid parameters",
                message,
            ),
            ServiceNowError::Validation { message } => (
                rmcp::model::ErrorCode::INVALID_PARAMS,
                "Validation error",
                message,
            ),
            ServiceNowError::Serialization { message } => (
                rmcp::model::ErrorCode::INTERNAL_ERROR,
                "Serialization error",
                message,
            ),
            ServiceNowError::Io { message } => (
                rmcp::model::ErrorCode::INTERNAL_ERROR,
                "I/O error",
                message,
            ),
            ServiceNowError::Internal { message } => (
                rmcp::model::ErrorCode::INTERNAL_ERROR,
                "Internal error",
                message,
            ),
        };

        rmcp::ErrorData {
            code,
            message: format!("{label}: {details}").into(),
            data: Some(json!({ "details": details })),
        }
    }
}

/// Result type alias for servicenow-mcp operations
pub type Result<T> = std::result::Result<T, ServiceNowError>;
