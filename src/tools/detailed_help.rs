//! detailed_help tool handler to provide structured help for tools

use crate::error::{Result, ServiceNowError};
use crate::server::{ServiceNowServer, text_result};
use rmcp::model::{CallToolRequestParam, CallToolResult};
use serde_json::{Value, json};
use tracing::info;

/// Structured help for one tool, or `None` if the name is unknown.
pub fn help_for(tool: &str) -> Option<Value> {
    let help = match tool {
        "query_records" => json!({
            "name": "query_records",
            "description": "Query ANY ServiceNow table and return a list of records with display values.",
            "arguments": {
                "table_name": "string (required) — system table name, e.g. 'incident'",
                "query": "string — encoded query, e.g. 'active=true^priority=1'",
                "limit": "integer — max records (default 10, capped at 100)",
                "fields": "string — comma-separated field list"
            },
            "returns": {"success": "boolean", "data": "array", "count": "number"},
            "examples": [{
                "request": {"name": "query_records", "arguments": {"table_name": "incident", "query": "active=true", "limit": 5}},
                "response": {"success": true, "data": [{"number": "INC0010001"}], "count": 1}
            }]
        }),
        "get_single_record" => json!({
            "name": "get_single_record",
            "description": "Fetch one record by its number or any other field; zero matches is reported as not_found.",
            "arguments": {
                "table_name": "string (required)",
                "record_number": "string (required) — e.g. 'CHG0030001'",
                "query_field": "string — field to match (default 'number')",
                "fields": "string — comma-separated field list"
            },
            "returns": {"success": "boolean", "data": "array (one record)", "count": "number"}
        }),
        "create_record" => json!({
            "name": "create_record",
            "description": "Create a record in ANY table. Dates are interpreted as local display values.",
            "arguments": {
                "table_name": "string (required)",
                "payload_json": "string (required) — JSON object of field values"
            },
            "returns": {"success": "boolean", "data": "object — the created record including sys_id"},
            "errors": ["invalid_payload_json", "http_error", "network_error", "timeout"]
        }),
        "update_record" => json!({
            "name": "update_record",
            "description": "Update a record in ANY table by sys_id. Deletion is not available.",
            "arguments": {
                "table_name": "string (required)",
                "sys_id": "string (required) — 32-character lowercase hex",
                "payload_json": "string (required) — JSON object of fields to change"
            },
            "returns": {"success": "boolean", "data": "object — the updated record"},
            "errors": ["invalid_sys_id_format", "invalid_payload_json", "http_error"]
        }),
        "list_frameworks" => json!({
            "name": "list_frameworks",
            "description": "List available framework documents grouped by domain.",
            "arguments": {},
            "returns": {"success": "boolean", "frameworks": "object — domain → [framework names]"}
        }),
        "read_framework_instructions" => json!({
            "name": "read_framework_instructions",
            "description": "Load a framework (plus its domain standards) and return the directive to follow.",
            "arguments": {
                "domain": "string (required) — [a-zA-Z0-9_-]+",
                "framework": "string (required) — [a-zA-Z0-9_-]+",
                "target": "string — optional record number to act on"
            },
            "returns": "string — directive text, or a line starting with 'Error:'"
        }),
        _ => return None,
    };
    Some(help)
}

impl ServiceNowServer {
    /// Handle the detailed_help tool call
    pub async fn handle_detailed_help(
        &self,
        request: CallToolRequestParam,
    ) -> Result<CallToolResult> {
        let args = request.arguments.ok_or_else(|| ServiceNowError::Mcp {
            message: "Missing parameters".into(),
        })?;

        let tool = args.get("tool").and_then(|v| v.as_str()).ok_or_else(|| {
            ServiceNowError::Validation {
                message: "'tool' parameter is required".into(),
            }
        })?;
        let format = args
            .get("format")
            .and_then(|v| v.as_str())
            .unwrap_or("full");
        info!("Tool called: detailed_help for {}", tool);

        let help = help_for(tool).ok_or_else(|| ServiceNowError::Validation {
            message: format!("Unknown tool: {}", tool),
        })?;

        let output = if format == "compact" {
            json!({
                "tool": tool,
                "summary": help.get("description").cloned().unwrap_or(json!("")),
                "arguments": help.get("arguments").cloned().unwrap_or(json!({}))
            })
        } else {
            help
        };

        Ok(text_result(serde_json::to_string_pretty(&output)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_listed_tool_has_help() {
        for tool in [
            "query_records",
            "get_single_record",
            "create_record",
            "update_record",
            "list_frameworks",
            "read_framework_instructions",
        ] {
            let help = help_for(tool).unwrap();
            assert_eq!(help["name"], tool);
        }
        assert!(help_for("delete_record").is_none());
    }
}
