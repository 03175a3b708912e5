//! create_record tool handler: insert a record into any table

use crate::client::TableClient;
use crate::deserializers::de_payload_json;
use crate::error::Result;
use crate::outcome::{ErrorType, Outcome};
use crate::server::{ServiceNowServer, parse_params, text_result};
use rmcp::model::{CallToolRequestParam, CallToolResult};
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

/// Parameters for the create_record tool
#[derive(Debug, Deserialize)]
pub struct CreateRecordParams {
    pub table_name: String,
    #[serde(deserialize_with = "de_payload_json")]
    pub payload_json: String,
}

/// Parse a record payload; malformed JSON never reaches the network.
pub fn parse_payload(payload_json: &str) -> std::result::Result<Value, Outcome> {
    serde_json::from_str(payload_json).map_err(|e| {
        warn!("Rejected malformed payload JSON: {}", e);
        Outcome::failure(
            ErrorType::InvalidPayloadJson,
            format!("Invalid JSON string provided for payload: {}", e),
        )
    })
}

pub async fn create_record(client: &TableClient, params: &CreateRecordParams) -> Outcome {
    let payload = match parse_payload(&params.payload_json) {
        Ok(payload) => payload,
        Err(outcome) => return outcome,
    };
    client.insert(&params.table_name, &payload).await
}

impl ServiceNowServer {
    /// Handle the create_record tool call
    pub async fn handle_create_record(
        &self,
        request: CallToolRequestParam,
    ) -> Result<CallToolResult> {
        let params: CreateRecordParams = parse_params(request)?;
        info!("Tool called: create_record in {}", params.table_name);

        let outcome = create_record(&self.client, &params).await;
        Ok(text_result(outcome.to_json_pretty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_payload_is_typed() {
        let outcome = parse_payload("{\"short_description\": ").unwrap_err();
        assert_eq!(outcome.error_type(), Some(ErrorType::InvalidPayloadJson));
        assert!(!outcome.is_success());
    }

    #[test]
    fn well_formed_payload_parses() {
        let value = parse_payload(r#"{"short_description":"test"}"#).unwrap();
        assert_eq!(value["short_description"], "test");
    }
}
