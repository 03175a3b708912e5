//! read_framework_instructions tool handler: the agentic router
//!
//! Returns a plain-text directive rather than JSON; errors are `Error: ...`
//! lines the agent can read and correct.

use crate::deserializers::de_string_or_empty;
use crate::error::Result;
use crate::server::{ServiceNowServer, parse_params, text_result};
use rmcp::model::{CallToolRequestParam, CallToolResult};
use serde::Deserialize;
use tracing::info;

/// Parameters for the read_framework_instructions tool
#[derive(Debug, Deserialize)]
pub struct ReadFrameworkParams {
    pub domain: String,
    pub framework: String,
    #[serde(default, deserialize_with = "de_string_or_empty")]
    pub target: String,
}

impl ServiceNowServer {
    /// Handle the read_framework_instructions tool call
    pub async fn handle_read_framework_instructions(
        &self,
        request: CallToolRequestParam,
    ) -> Result<CallToolResult> {
        let params: ReadFrameworkParams = parse_params(request)?;
        info!(
            "Tool called: read_framework_instructions for {}/{}",
            params.domain, params.framework
        );

        let directive = self
            .frameworks
            .read_instructions(&params.domain, &params.framework, &params.target)
            .await;
        Ok(text_result(directive))
    }
}
