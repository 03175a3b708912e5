//! query_records tool handler: list records from any table

use crate::client::TableClient;
use crate::deserializers::{de_field_list, de_option_i64_forgiving, de_string_or_empty};
use crate::error::Result;
use crate::outcome::Outcome;
use crate::server::{ServiceNowServer, parse_params, text_result};
use rmcp::model::{CallToolRequestParam, CallToolResult};
use serde::Deserialize;
use tracing::info;

pub const DEFAULT_LIMIT: i64 = 10;
/// Hard cap on page size regardless of what the caller asks for
pub const MAX_LIMIT: i64 = 100;

/// Parameters for the query_records tool
#[derive(Debug, Deserialize)]
pub struct QueryRecordsParams {
    pub table_name: String,
    #[serde(default, deserialize_with = "de_string_or_empty")]
    pub query: String,
    #[serde(default, deserialize_with = "de_option_i64_forgiving")]
    pub limit: Option<i64>,
    #[serde(default, deserialize_with = "de_field_list")]
    pub fields: String,
}

/// Page size actually sent downstream.
pub fn effective_limit(requested: Option<i64>) -> i64 {
    requested.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT)
}

pub async fn query_records(client: &TableClient, params: &QueryRecordsParams) -> Outcome {
    let mut query: Vec<(&str, String)> = vec![
        ("sysparm_limit", effective_limit(params.limit).to_string()),
        // Human-readable (local) values instead of backend UTC encodings
        ("sysparm_display_value", "true".to_string()),
    ];
    if !params.query.is_empty() {
        query.push(("sysparm_query", params.query.clone()));
    }
    if !params.fields.is_empty() {
        query.push(("sysparm_fields", params.fields.clone()));
    }

    client.list(&params.table_name, &query).await
}

impl ServiceNowServer {
    /// Handle the query_records tool call
    pub async fn handle_query_records(
        &self,
        request: CallToolRequestParam,
    ) -> Result<CallToolResult> {
        let params: QueryRecordsParams = parse_params(request)?;
        info!("Tool called: query_records on {}", params.table_name);

        let outcome = query_records(&self.client, &params).await;
        Ok(text_result(outcome.to_json_pretty()))
    }
}
