//! HTTP transport module for servicenow-mcp
//!
//! Serves MCP over Streamable HTTP with an unauthenticated `/health` route and
//! optional bearer authentication for everything else.

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    middleware,
    response::IntoResponse,
    routing::get,
};
use rmcp::transport::streamable_http_server::{
    session::local::LocalSessionManager,
    tower::{StreamableHttpServerConfig, StreamableHttpService},
};
use servicenow_mcp::error::{Result, ServiceNowError};
use servicenow_mcp::server::ServiceNowServer;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};

const SSE_KEEPALIVE: Duration = Duration::from_secs(15);

/// Health check endpoint
pub async fn health_handler() -> impl IntoResponse {
    "ok"
}

fn unauthorized() -> axum::response::Response {
    (
        StatusCode::UNAUTHORIZED,
        [(header::CONTENT_TYPE, "application/json")],
        serde_json::json!({"error": {"code": 401, "message": "Unauthorized"}}).to_string(),
    )
        .into_response()
}

fn bearer_matches(headers: &HeaderMap, expected: &str) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .is_some_and(|token| token == expected)
}

/// Serve until `shutdown` resolves.
pub async fn start_http_server(
    server: ServiceNowServer,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let bind = server.config.server.http_bind;
    let path = server.config.server.http_path.clone();
    let token = server.config.runtime.bearer_token.clone();
    if token.is_none() {
        tracing::warn!("SN_BEARER_TOKEN is not set; HTTP transport is unauthenticated");
    }

    let session_mgr = Arc::new(LocalSessionManager::default());
    let server_factory = server.clone();
    let mcp_service: StreamableHttpService<ServiceNowServer, _> = StreamableHttpService::new(
        move || Ok(server_factory.clone()),
        session_mgr,
        StreamableHttpServerConfig {
            stateful_mode: true,
            sse_keep_alive: Some(SSE_KEEPALIVE),
            ..Default::default()
        },
    );

    let app = Router::new()
        .route("/health", get(health_handler))
        .nest_service(path.as_str(), mcp_service)
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any))
        .layer(middleware::from_fn_with_state(
            token,
            |State(token): State<Option<String>>,
             req: axum::http::Request<Body>,
             next: axum::middleware::Next| async move {
                if req.uri().path() == "/health" {
                    return next.run(req).await;
                }
                match token {
                    Some(expected) if !bearer_matches(req.headers(), &expected) => unauthorized(),
                    _ => next.run(req).await,
                }
            },
        ));

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .map_err(|e| ServiceNowError::Io {
            message: format!("Failed to bind HTTP listener on {}: {}", bind, e),
        })?;

    tracing::info!("Starting HTTP server on {} (MCP at {})", bind, path);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| ServiceNowError::Internal {
            message: format!("HTTP server error: {}", e),
        })?;

    Ok(())
}
