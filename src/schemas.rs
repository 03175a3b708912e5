use serde_json::{Map, Value, json};
use std::sync::Arc;

pub fn query_records_schema() -> Arc<Map<String, Value>> {
    let schema = json!({
        "type": "object",
        "properties": {
            "table_name": {"type": "string", "description": "System name of the table, e.g. 'incident', 'change_request', 'cmdb_ci'"},
            "query": {"type": "string", "description": "Optional encoded query, e.g. 'active=true^priority=1'", "default": ""},
            "limit": {"type": ["integer", "string"], "description": "Maximum records to return (capped at 100)", "default": 10},
            "fields": {"type": ["string", "array"], "items": {"type": "string"}, "description": "Comma-separated fields to return, e.g. 'number,short_description'", "default": ""}
        },
        "required": ["table_name"]
    });
    Arc::new(schema.as_object().cloned().unwrap_or_else(Map::new))
}

pub fn get_single_record_schema() -> Arc<Map<String, Value>> {
    let schema = json!({
        "type": "object",
        "properties": {
            "table_name": {"type": "string"},
            "record_number": {"type": "string", "description": "Display number (e.g. 'CHG0030001') or other search value"},
            "query_field": {"type": "string", "description": "Field to match record_number against", "default": "number"},
            "fields": {"type": ["string", "array"], "items": {"type": "string"}, "default": ""}
        },
        "required": ["table_name", "record_number"]
    });
    Arc::new(schema.as_object().cloned().unwrap_or_else(Map::new))
}

pub fn create_record_schema() -> Arc<Map<String, Value>> {
    let schema = json!({
        "type": "object",
        "properties": {
            "table_name": {"type": "string"},
            "payload_json": {"type": ["string", "object"], "description": "JSON string with the field values of the new record"}
        },
        "required": ["table_name", "payload_json"]
    });
    Arc::new(schema.as_object().cloned().unwrap_or_else(Map::new))
}

pub fn update_record_schema() -> Arc<Map<String, Value>> {
    let schema = json!({
        "type": "object",
        "properties": {
            "table_name": {"type": "string"},
            "sys_id": {"type": "string", "pattern": "^[0-9a-f]{32}$", "description": "32-character hex sys_id of the record"},
            "payload_json": {"type": ["string", "object"], "description": "JSON string with the fields to update"}
        },
        "required": ["table_name", "sys_id", "payload_json"]
    });
    Arc::new(schema.as_object().cloned().unwrap_or_else(Map::new))
}

pub fn list_frameworks_schema() -> Arc<Map<String, Value>> {
    let schema = json!({
        "type": "object",
        "properties": {}
    });
    Arc::new(schema.as_object().cloned().unwrap_or_else(Map::new))
}

pub fn read_framework_instructions_schema() -> Arc<Map<String, Value>> {
    let schema = json!({
        "type": "object",
        "properties": {
            "domain": {"type": "string", "pattern": "^[a-zA-Z0-9_-]+$", "description": "Folder name, e.g. 'change', 'incident'"},
            "framework": {"type": "string", "pattern": "^[a-zA-Z0-9_-]+$", "description": "Document name without .md, e.g. 'draft_normal_change'"},
            "target": {"type": "string", "description": "Optional record number to act on, e.g. 'CHG0030001'", "default": ""}
        },
        "required": ["domain", "framework"]
    });
    Arc::new(schema.as_object().cloned().unwrap_or_else(Map::new))
}

pub fn detailed_help_schema() -> Arc<Map<String, Value>> {
    let schema = json!({
        "type": "object",
        "properties": {
            "tool": {"type": "string", "enum": [
                "query_records", "get_single_record", "create_record",
                "update_record", "list_frameworks", "read_framework_instructions"
            ]},
            "format": {"type": "string", "enum": ["compact", "full"], "default": "full"}
        },
        "required": ["tool"]
    });
    Arc::new(schema.as_object().cloned().unwrap_or_else(Map::new))
}
