//! update_record tool handler: patch a record addressed by sys_id

use crate::client::TableClient;
use crate::deserializers::de_payload_json;
use crate::error::Result;
use crate::outcome::{ErrorType, Outcome};
use crate::server::{ServiceNowServer, parse_params, text_result};
use crate::tools::create_record::parse_payload;
use once_cell::sync::Lazy;
use regex::Regex;
use rmcp::model::{CallToolRequestParam, CallToolResult};
use serde::Deserialize;
use tracing::info;

static SYS_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9a-f]{32}$").expect("sys_id pattern should compile"));

pub fn is_valid_sys_id(sys_id: &str) -> bool {
    SYS_ID.is_match(sys_id)
}

/// Parameters for the update_record tool
#[derive(Debug, Deserialize)]
pub struct UpdateRecordParams {
    pub table_name: String,
    pub sys_id: String,
    #[serde(deserialize_with = "de_payload_json")]
    pub payload_json: String,
}

pub async fn update_record(client: &TableClient, params: &UpdateRecordParams) -> Outcome {
    if !is_valid_sys_id(&params.sys_id) {
        return Outcome::failure(
            ErrorType::InvalidSysIdFormat,
            format!(
                "Invalid sys_id format: '{}'. Must be a 32-character hex string.",
                params.sys_id
            ),
        );
    }

    let payload = match parse_payload(&params.payload_json) {
        Ok(payload) => payload,
        Err(outcome) => return outcome,
    };
    client
        .modify(&params.table_name, &params.sys_id, &payload)
        .await
}

impl ServiceNowServer {
    /// Handle the update_record tool call
    pub async fn handle_update_record(
        &self,
        request: CallToolRequestParam,
    ) -> Result<CallToolResult> {
        let params: UpdateRecordParams = parse_params(request)?;
        info!(
            "Tool called: update_record for {} in {}",
            params.sys_id, params.table_name
        );

        let outcome = update_record(&self.client, &params).await;
        Ok(text_result(outcome.to_json_pretty()))
    }
}
