//! get_single_record tool handler: fetch one record by number or any field

use crate::client::TableClient;
use crate::deserializers::de_field_list;
use crate::error::Result;
use crate::outcome::{ErrorType, Outcome};
use crate::server::{ServiceNowServer, parse_params, text_result};
use rmcp::model::{CallToolRequestParam, CallToolResult};
use serde::Deserialize;
use tracing::info;

fn default_query_field() -> String {
    "number".to_string()
}

/// Parameters for the get_single_record tool
#[derive(Debug, Deserialize)]
pub struct GetSingleRecordParams {
    pub table_name: String,
    pub record_number: String,
    #[serde(default = "default_query_field")]
    pub query_field: String,
    #[serde(default, deserialize_with = "de_field_list")]
    pub fields: String,
}

pub async fn get_single_record(client: &TableClient, params: &GetSingleRecordParams) -> Outcome {
    let query_field = if params.query_field.trim().is_empty() {
        "number"
    } else {
        params.query_field.as_str()
    };

    let mut query: Vec<(&str, String)> = vec![
        (
            "sysparm_query",
            format!("{}={}", query_field, params.record_number),
        ),
        ("sysparm_limit", "1".to_string()),
        ("sysparm_display_value", "true".to_string()),
    ];
    if !params.fields.is_empty() {
        query.push(("sysparm_fields", params.fields.clone()));
    }

    let outcome = client.list(&params.table_name, &query).await;

    // An empty match is reported the same way as a missing record
    if outcome.is_success() && outcome.count().unwrap_or(0) == 0 {
        return Outcome::failure(
            ErrorType::NotFound,
            format!(
                "Record {} not found in {}",
                params.record_number, params.table_name
            ),
        );
    }
    outcome
}

impl ServiceNowServer {
    /// Handle the get_single_record tool call
    pub async fn handle_get_single_record(
        &self,
        request: CallToolRequestParam,
    ) -> Result<CallToolResult> {
        let params: GetSingleRecordParams = parse_params(request)?;
        info!(
            "Tool called: get_single_record for {} in {}",
            params.record_number, params.table_name
        );

        let outcome = get_single_record(&self.client, &params).await;
        Ok(text_result(outcome.to_json_pretty()))
    }
}
