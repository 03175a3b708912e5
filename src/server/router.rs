use crate::server::ServiceNowServer;
use rmcp::{
    ErrorData as McpError,
    handler::server::ServerHandler,
    model::{
        CallToolRequestParam, CallToolResult, Implementation, InitializeRequestParam,
        InitializeResult, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo, Tool, ToolsCapability,
    },
    service::{RequestContext, RoleServer},
};
use tracing::info;

/// Names of every tool the server exposes, in listing order
pub const TOOL_NAMES: [&str; 7] = [
    "query_records",
    "get_single_record",
    "create_record",
    "update_record",
    "list_frameworks",
    "read_framework_instructions",
    "detailed_help",
];

/// Tool definitions advertised by `tools/list`
pub fn tool_definitions() -> Vec<Tool> {
    vec![
        Tool {
            name: "query_records".into(),
            title: Some("Query Records".into()),
            description: Some(
                "Query ANY ServiceNow table for a list of records. For complex ITIL workflows, call `read_framework_instructions` first to load the applicable SOP."
                    .into(),
            ),
            input_schema: crate::schemas::query_records_schema(),
            icons: None,
            annotations: None,
            output_schema: None,
            meta: None,
        },
        Tool {
            name: "get_single_record".into(),
            title: Some("Get Single Record".into()),
            description: Some(
                "Fetch a SINGLE record from ANY table by its number (or another field).".into(),
            ),
            input_schema: crate::schemas::get_single_record_schema(),
            icons: None,
            annotations: None,
            output_schema: None,
            meta: None,
        },
        Tool {
            name: "create_record".into(),
            title: Some("Create Record".into()),
            description: Some(
                "Create a new record in ANY ServiceNow table. Before creating records for ITIL processes, call `read_framework_instructions` first."
                    .into(),
            ),
            input_schema: crate::schemas::create_record_schema(),
            icons: None,
            annotations: None,
            output_schema: None,
            meta: None,
        },
        Tool {
            name: "update_record".into(),
            title: Some("Update Record".into()),
            description: Some(
                "Update an existing record in ANY ServiceNow table by its 32-character sys_id. Before updating records for ITIL processes, call `read_framework_instructions` first."
                    .into(),
            ),
            input_schema: crate::schemas::update_record_schema(),
            icons: None,
            annotations: None,
            output_schema: None,
            meta: None,
        },
        Tool {
            name: "list_frameworks".into(),
            title: Some("List Frameworks".into()),
            description: Some(
                "List available framework documents by domain. Call this FIRST when the user mentions an ITIL domain (change, incident, problem, CMDB, ...) to see which SOPs exist."
                    .into(),
            ),
            input_schema: crate::schemas::list_frameworks_schema(),
            icons: None,
            annotations: None,
            output_schema: None,
            meta: None,
        },
        Tool {
            name: "read_framework_instructions".into(),
            title: Some("Read Framework Instructions".into()),
            description: Some(
                "Universal router for standard operating procedures. Call before executing any complex workflow; returns the rules and next steps to follow."
                    .into(),
            ),
            input_schema: crate::schemas::read_framework_instructions_schema(),
            icons: None,
            annotations: None,
            output_schema: None,
            meta: None,
        },
        Tool {
            name: "detailed_help".into(),
            title: Some("Detailed Help".into()),
            description: Some("Get detailed help for a specific tool".into()),
            input_schema: crate::schemas::detailed_help_schema(),
            icons: None,
            annotations: None,
            output_schema: None,
            meta: None,
        },
    ]
}

impl ServerHandler for ServiceNowServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: Some(false),
                }),
                ..Default::default()
            },
            server_info: Implementation {
                name: "servicenow-mcp".to_string(),
                title: Some("ServiceNow MCP".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                website_url: None,
                icons: None,
            },
            instructions: Some(
                "Generic ServiceNow Table API tools. Call `list_frameworks` and `read_framework_instructions` before ITIL workflows. Records cannot be deleted through this server."
                    .to_string(),
            ),
            ..Default::default()
        }
    }

    async fn initialize(
        &self,
        request: InitializeRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> std::result::Result<InitializeResult, McpError> {
        let mut info = self.get_info();
        info.protocol_version = request.protocol_version.clone();
        Ok(info)
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> std::result::Result<ListToolsResult, McpError> {
        info!("tools/list requested");
        Ok(ListToolsResult {
            tools: tool_definitions(),
            ..Default::default()
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> std::result::Result<CallToolResult, McpError> {
        // Route to appropriate tool handler. There is deliberately no delete tool.
        match request.name.as_ref() {
            // Table API
            "query_records" => self
                .handle_query_records(request)
                .await
                .map_err(|e| e.into()),
            "get_single_record" => self
                .handle_get_single_record(request)
                .await
                .map_err(|e| e.into()),
            "create_record" => self
                .handle_create_record(request)
                .await
                .map_err(|e| e.into()),
            "update_record" => self
                .handle_update_record(request)
                .await
                .map_err(|e| e.into()),

            // Framework router
            "list_frameworks" => self
                .handle_list_frameworks(request)
                .await
                .map_err(|e| e.into()),
            "read_framework_instructions" => self
                .handle_read_framework_instructions(request)
                .await
                .map_err(|e| e.into()),

            // Help
            "detailed_help" => self
                .handle_detailed_help(request)
                .await
                .map_err(|e| e.into()),
            _ => Err(McpError {
                code: rmcp::model::ErrorCode::METHOD_NOT_FOUND,
                message: format!("Unknown tool: {}", request.name).into(),
                data: None,
            }),
        }
    }
}
