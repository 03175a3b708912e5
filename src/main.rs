mod http;

use anyhow::Result;
use clap::Parser;
use rmcp::{ServiceExt, transport::stdio};
use servicenow_mcp::{
    ClientGuard, ServiceNowServer, TableClient, config::Config, logging,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "servicenow-mcp", version, about = "ServiceNow Table API tools over MCP")]
struct Cli {
    /// Transport to serve on: stdio or http (overrides SN_TRANSPORT)
    #[arg(long)]
    transport: Option<String>,

    /// Framework document root (overrides SN_DOCS_DIR)
    #[arg(long)]
    docs_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Invalid configuration halts startup; there is no degraded mode.
    let mut config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration validation failed: {}", e);
            std::process::exit(1);
        }
    };
    config.apply_cli_overrides(cli.transport, cli.docs_dir);
    if let Err(e) = config.validate() {
        eprintln!("Configuration validation failed: {}", e);
        std::process::exit(1);
    }

    logging::init(&config)?;

    match &config.source {
        Some(path) => info!("Loaded config file {}", path.display()),
        None => warn!("No config file found, using defaults"),
    }
    info!("Configuration validation successful");

    info!("{}", "=".repeat(70));
    info!("ServiceNow MCP Server starting (Universal Table API)");
    info!("Instance: {}", config.runtime.instance_url);
    info!("User: {}", config.runtime.masked_username());
    info!("Frameworks: {}", config.server.docs_dir.display());
    info!("{}", "=".repeat(70));

    let client = Arc::new(TableClient::new(
        &config.runtime.instance_url,
        &config.runtime.username,
        &config.runtime.password,
    )?);
    // Released when this scope ends, whichever way it ends
    let guard = ClientGuard::new(client);

    let server = ServiceNowServer::new(config, guard.client());
    let result = serve(server).await;
    if let Err(e) = &result {
        error!("Server error: {:#}", e);
    }

    drop(guard);
    info!("ServiceNow MCP Server stopped");
    result
}

async fn serve(server: ServiceNowServer) -> Result<()> {
    match server.config.server.transport.as_str() {
        "http" => {
            http::start_http_server(server, async {
                let _ = tokio::signal::ctrl_c().await;
                info!("Server shutdown requested");
            })
            .await?;
        }
        _ => {
            let service = server.serve(stdio()).await.map_err(|e| {
                anyhow::anyhow!("Failed to start MCP service: {}", e)
            })?;
            info!("MCP Server ready - waiting for requests...");
            tokio::select! {
                res = service.waiting() => {
                    res?;
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Server shutdown requested");
                }
            }
        }
    }
    Ok(())
}
