//! Server module containing the ServiceNowServer implementation

use crate::client::TableClient;
use crate::config::Config;
use crate::error::{Result, ServiceNowError};
use crate::frameworks::FrameworkStore;
use rmcp::model::{CallToolRequestParam, CallToolResult, Content};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

// Submodules
pub mod router;

/// Main ServiceNow MCP server implementation
#[derive(Clone)]
pub struct ServiceNowServer {
    pub client: Arc<TableClient>,
    pub frameworks: Arc<FrameworkStore>,
    pub config: Arc<Config>,
}

impl ServiceNowServer {
    pub fn new(config: Config, client: Arc<TableClient>) -> Self {
        let frameworks = FrameworkStore::new(config.server.docs_dir.clone());
        Self {
            client,
            frameworks: Arc::new(frameworks),
            config: Arc::new(config),
        }
    }
}

/// Deserialize tool arguments into a typed parameter struct.
/// Missing arguments are treated as an empty object so all-default tools work.
pub fn parse_params<T: DeserializeOwned>(request: CallToolRequestParam) -> Result<T> {
    let args = request.arguments.unwrap_or_default();
    serde_json::from_value(Value::Object(args)).map_err(|e| ServiceNowError::InvalidParams {
        message: format!("Invalid parameters for {}: {}", request.name, e),
    })
}

/// Every tool answers with a single text block.
pub fn text_result(text: impl Into<String>) -> CallToolResult {
    CallToolResult::success(vec![Content::text(text.into())])
}
