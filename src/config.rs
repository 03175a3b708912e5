use crate::error::{Result, ServiceNowError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variables that must be present for the server to start
pub const REQUIRED_ENV_VARS: [&str; 3] = ["SN_INSTANCE", "SN_USERNAME", "SN_PASSWORD"];

/// Main configuration structure loaded from servicenow_mcp.toml and environment variables
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    /// Credentials and instance endpoint, loaded from the environment only
    #[serde(skip)]
    pub runtime: RuntimeConfig,
    /// TOML file the settings were read from, if one was found
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

/// Non-secret settings that may come from the TOML file
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub docs_dir: PathBuf,
    pub transport: String,
    pub http_bind: std::net::SocketAddr,
    pub http_path: String,
    /// Empty disables the log file
    pub log_file: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            docs_dir: PathBuf::from("docs"),
            transport: "stdio".to_string(),
            http_bind: std::net::SocketAddr::from(([127, 0, 0, 1], 8787)),
            http_path: "/mcp".to_string(),
            log_file: "servicenow_mcp.log".to_string(),
        }
    }
}

/// Runtime configuration loaded from environment variables
#[derive(Clone)]
pub struct RuntimeConfig {
    pub instance_url: String,
    pub username: String,
    pub password: String,
    pub bearer_token: Option<String>,
    pub log_level: String,
    pub mcp_no_log: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            instance_url: String::new(),
            username: String::new(),
            password: String::new(),
            bearer_token: None,
            log_level: "servicenow_mcp=info,rmcp=info".to_string(),
            mcp_no_log: false,
        }
    }
}

impl std::fmt::Debug for RuntimeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeConfig")
            .field("instance_url", &self.instance_url)
            .field("username", &self.masked_username())
            .field("password", &"***")
            .field("bearer_token", &self.bearer_token.as_ref().map(|_| "***"))
            .field("log_level", &self.log_level)
            .field("mcp_no_log", &self.mcp_no_log)
            .finish()
    }
}

impl RuntimeConfig {
    /// Load runtime configuration from environment variables, failing on
    /// missing credentials or a non-HTTPS instance.
    pub fn load_from_env() -> Result<Self> {
        let missing: Vec<&str> = REQUIRED_ENV_VARS
            .iter()
            .copied()
            .filter(|name| std::env::var(name).map(|v| v.is_empty()).unwrap_or(true))
            .collect();
        if !missing.is_empty() {
            return Err(ServiceNowError::Config {
                message: format!(
                    "Missing required environment variables: {}",
                    missing.join(", ")
                ),
            });
        }

        let instance_url = std::env::var("SN_INSTANCE").unwrap_or_default();
        validate_instance_url(&instance_url)?;

        Ok(Self {
            instance_url: instance_url.trim_end_matches('/').to_string(),
            username: std::env::var("SN_USERNAME").unwrap_or_default(),
            password: std::env::var("SN_PASSWORD").unwrap_or_default(),
            bearer_token: std::env::var("SN_BEARER_TOKEN")
                .ok()
                .filter(|t| !t.trim().is_empty()),
            log_level: std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "servicenow_mcp=info,rmcp=info".to_string()),
            mcp_no_log: std::env::var("MCP_NO_LOG")
                .ok()
                .is_some_and(|v| v == "true" || v == "1"),
        })
    }

    /// First two characters followed by `***`
    pub fn masked_username(&self) -> String {
        if self.username.chars().count() > 2 {
            let head: String = self.username.chars().take(2).collect();
            format!("{}***", head)
        } else {
            "***".to_string()
        }
    }
}

pub fn validate_instance_url(url: &str) -> Result<()> {
    if !url.starts_with("https://") {
        return Err(ServiceNowError::Config {
            message: format!("SN_INSTANCE must start with 'https://'. Got: {}", url),
        });
    }
    if url.trim_end_matches('/').len() <= "https://".len() {
        return Err(ServiceNowError::Config {
            message: format!("SN_INSTANCE is missing a hostname. Got: {}", url),
        });
    }
    Ok(())
}

impl Config {
    /// Load configuration from TOML file and environment variables
    /// Uses SERVICENOW_MCP_CONFIG environment variable or defaults to "servicenow_mcp.toml"
    ///
    /// Call [`Config::validate`] once every override has been applied.
    pub fn load() -> Result<Self> {
        // Load environment variables with fallbacks:
        // 1) SN_ENV_FILE if set
        // 2) ./.env
        // 3) ../.env when the credentials are still missing
        if let Ok(env_path) = std::env::var("SN_ENV_FILE") {
            let _ = dotenvy::from_path(env_path);
        } else {
            let _ = dotenvy::from_path(".env");
            if std::env::var("SN_INSTANCE").is_err() {
                let _ = dotenvy::from_path("../.env");
            }
        }

        let config_path = std::env::var("SERVICENOW_MCP_CONFIG")
            .unwrap_or_else(|_| "servicenow_mcp.toml".to_string());

        let content = std::fs::read_to_string(&config_path).ok();
        let mut config = Self::from_toml(content.as_deref(), &config_path)?;

        config.apply_env_overrides()?;
        config.runtime = RuntimeConfig::load_from_env()?;
        Ok(config)
    }

    /// Parse the TOML settings; `None` means no file was found.
    /// Nothing is validated here, see [`Config::validate`].
    pub fn from_toml(content: Option<&str>, path: &str) -> Result<Self> {
        match content {
            Some(content) => {
                let mut config: Config = toml::from_str(content)?;
                config.source = Some(PathBuf::from(path));
                Ok(config)
            }
            None => Ok(Self::default()),
        }
    }

    /// Command-line flags win over the file and the environment.
    pub fn apply_cli_overrides(&mut self, transport: Option<String>, docs_dir: Option<PathBuf>) {
        if let Some(transport) = transport {
            self.server.transport = transport;
        }
        if let Some(docs_dir) = docs_dir {
            self.server.docs_dir = docs_dir;
        }
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(dir) = std::env::var("SN_DOCS_DIR") {
            self.server.docs_dir = PathBuf::from(dir);
        }
        if let Ok(transport) = std::env::var("SN_TRANSPORT") {
            self.server.transport = transport;
        }
        if let Ok(v) = std::env::var("SN_HTTP_BIND") {
            self.server.http_bind = v.parse().map_err(|_| ServiceNowError::Config {
                message: format!("SN_HTTP_BIND must be host:port. Got: {}", v),
            })?;
        }
        if let Ok(path) = std::env::var("SN_HTTP_PATH") {
            self.server.http_path = path;
        }
        if let Ok(log_file) = std::env::var("SN_LOG_FILE") {
            self.server.log_file = log_file;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        match self.server.transport.as_str() {
            "stdio" | "http" => {}
            other => {
                return Err(ServiceNowError::Config {
                    message: format!("Unknown transport '{}'. Use 'stdio' or 'http'.", other),
                });
            }
        }
        if !self.server.http_path.starts_with('/') {
            return Err(ServiceNowError::Config {
                message: format!(
                    "http_path must start with '/'. Got: {}",
                    self.server.http_path
                ),
            });
        }
        validate_instance_url(&self.runtime.instance_url)
    }
}
