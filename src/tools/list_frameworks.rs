//! list_frameworks tool handler: discover available framework documents

use crate::error::Result;
use crate::frameworks::FrameworkStore;
use crate::outcome::ErrorType;
use crate::server::{ServiceNowServer, text_result};
use rmcp::model::{CallToolRequestParam, CallToolResult};
use serde_json::{Value, json};
use tracing::{error, info};

pub async fn list_frameworks(store: &FrameworkStore) -> Value {
    match store.list().await {
        Ok(Some(frameworks)) => json!({"success": true, "frameworks": frameworks}),
        Ok(None) => json!({
            "success": false,
            "error": "docs/ directory not found.",
            "error_type": ErrorType::NotFound,
        }),
        Err(e) => {
            error!(
                "Failed to enumerate frameworks under {}: {}",
                store.root().display(),
                e
            );
            json!({
                "success": false,
                "error": format!("Failed to read docs/ directory: {}", e),
                "error_type": ErrorType::UnexpectedError,
            })
        }
    }
}

impl ServiceNowServer {
    /// Handle the list_frameworks tool call
    pub async fn handle_list_frameworks(
        &self,
        _request: CallToolRequestParam,
    ) -> Result<CallToolResult> {
        info!("Tool called: list_frameworks");
        let listing = list_frameworks(&self.frameworks).await;
        Ok(text_result(serde_json::to_string_pretty(&listing)?))
    }
}
