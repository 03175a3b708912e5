//! Tool handlers for the servicenow-mcp server

pub mod create_record;
pub mod detailed_help;
pub mod get_single_record;
pub mod list_frameworks;
pub mod query_records;
pub mod read_framework_instructions;
pub mod update_record;
