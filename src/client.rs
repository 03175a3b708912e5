//! ServiceNow Table API client.
//!
//! One pooled `reqwest::Client` serves every tool call for the lifetime of the
//! process. All three operations go through [`normalize`] and therefore
//! return an [`Outcome`] instead of an error.

use crate::error::{Result, ServiceNowError};
use crate::outcome::{ErrorType, Outcome, normalize};
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{info, warn};

/// Per-request deadline
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// Upper bound on concurrent in-flight requests
pub const MAX_CONNECTIONS: usize = 10;
/// Idle connections kept alive in the pool
pub const MAX_IDLE_CONNECTIONS: usize = 5;

/// Makes the instance read supplied date/time values as local display values.
const INPUT_DISPLAY_VALUE: (&str, &str) = ("sysparm_input_display_value", "true");

pub struct TableClient {
    http: reqwest::Client,
    instance: String,
    username: String,
    password: String,
    permits: Semaphore,
    closed: AtomicBool,
}

impl TableClient {
    /// Build the pooled client. TLS verification is always on.
    pub fn new(instance: &str, username: &str, password: &str) -> Result<Self> {
        Self::with_timeout(instance, username, password, REQUEST_TIMEOUT)
    }

    /// Same as [`TableClient::new`] with a custom per-request deadline.
    ///
    /// Redirects are never followed: a 3xx from the instance (typically an
    /// SSO or login bounce) is reported as `http_error`.
    pub fn with_timeout(
        instance: &str,
        username: &str,
        password: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(MAX_IDLE_CONNECTIONS)
            .redirect(reqwest::redirect::Policy::none())
            .danger_accept_invalid_certs(false)
            .build()
            .map_err(|e| ServiceNowError::Config {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        info!(
            "ServiceNow client initialized with TLS verification and {}s timeout",
            timeout.as_secs()
        );

        Ok(Self {
            http,
            instance: instance.trim_end_matches('/').to_string(),
            username: username.to_string(),
            password: password.to_string(),
            permits: Semaphore::new(MAX_CONNECTIONS),
            closed: AtomicBool::new(false),
        })
    }

    fn collection_url(&self, table: &str) -> String {
        format!("{}/api/now/table/{}", self.instance, table)
    }

    fn record_url(&self, table: &str, sys_id: &str) -> String {
        format!("{}/api/now/table/{}/{}", self.instance, table, sys_id)
    }

    /// GET records from a table. The payload is always returned as a list.
    pub async fn list(&self, table: &str, params: &[(&str, String)]) -> Outcome {
        info!("Querying table: {}", table);
        let request = self
            .http
            .get(self.collection_url(table))
            .basic_auth(&self.username, Some(&self.password))
            .header(reqwest::header::ACCEPT, "application/json")
            .query(params);

        let outcome = self.send(request).await.into_list();
        if let Some(count) = outcome.count() {
            info!("Successfully retrieved {} record(s) from {}", count, table);
        }
        outcome
    }

    /// POST a new record into a table.
    pub async fn insert(&self, table: &str, payload: &Value) -> Outcome {
        info!("Inserting record into table: {}", table);
        let request = self
            .http
            .post(self.collection_url(table))
            .query(&[INPUT_DISPLAY_VALUE])
            .basic_auth(&self.username, Some(&self.password))
            .header(reqwest::header::ACCEPT, "application/json")
            .json(payload);
        self.send(request).await
    }

    /// PATCH an existing record addressed by sys_id.
    pub async fn modify(&self, table: &str, sys_id: &str, payload: &Value) -> Outcome {
        info!("Modifying record {} in table: {}", sys_id, table);
        let request = self
            .http
            .patch(self.record_url(table, sys_id))
            .query(&[INPUT_DISPLAY_VALUE])
            .basic_auth(&self.username, Some(&self.password))
            .header(reqwest::header::ACCEPT, "application/json")
            .json(payload);
        self.send(request).await
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Outcome {
        if self.is_closed() {
            return Outcome::failure(
                ErrorType::NetworkError,
                "Network error: ServiceNow client connection has been closed",
            );
        }
        let _permit = match self.permits.acquire().await {
            Ok(permit) => permit,
            Err(_) => {
                return Outcome::failure(
                    ErrorType::NetworkError,
                    "Network error: ServiceNow client connection has been closed",
                );
            }
        };
        normalize(request.send()).await
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Release the connection pool. Only the first call has any effect.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.permits.close();
        info!("ServiceNow client connection closed");
    }
}

/// Closes the shared client when dropped, including during unwinding.
pub struct ClientGuard {
    client: Arc<TableClient>,
}

impl ClientGuard {
    pub fn new(client: Arc<TableClient>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> Arc<TableClient> {
        self.client.clone()
    }
}

impl Drop for ClientGuard {
    fn drop(&mut self) {
        if std::thread::panicking() {
            warn!("Releasing ServiceNow client during panic unwind");
        }
        self.client.close();
    }
}
