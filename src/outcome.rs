//! Uniform result shape for every remote-call-backed operation.
//!
//! [`normalize`] is the single boundary where transport failures are turned
//! into values. Callers above it only ever see an [`Outcome`].

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::future::Future;
use tracing::error;

/// Number of body characters echoed back in diagnostic messages
pub const BODY_PREVIEW_CHARS: usize = 500;

const HIBERNATION_MARKER: &str = "Instance Hibernating";
const HIBERNATION_HINT: &str = " — Your ServiceNow instance appears to be hibernating. Wake it up via a browser first, then retry.";

/// Machine-readable failure classification carried in `error_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    // Remote call failures
    EmptyResponse,
    UnexpectedContent,
    HttpError,
    NetworkError,
    Timeout,
    JsonError,
    UnexpectedError,
    // Local validation failures raised by the tool surface
    InvalidPayloadJson,
    InvalidSysIdFormat,
    NotFound,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::EmptyResponse => "empty_response",
            ErrorType::UnexpectedContent => "unexpected_content",
            ErrorType::HttpError => "http_error",
            ErrorType::NetworkError => "network_error",
            ErrorType::Timeout => "timeout",
            ErrorType::JsonError => "json_error",
            ErrorType::UnexpectedError => "unexpected_error",
            ErrorType::InvalidPayloadJson => "invalid_payload_json",
            ErrorType::InvalidSysIdFormat => "invalid_sys_id_format",
            ErrorType::NotFound => "not_found",
        }
    }
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a remote call (or of a local check standing in for one).
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success {
        data: Value,
        count: Option<usize>,
    },
    Failure {
        error: String,
        error_type: ErrorType,
        status_code: Option<u16>,
    },
}

impl Outcome {
    pub fn success(data: Value) -> Self {
        Outcome::Success { data, count: None }
    }

    pub fn failure(error_type: ErrorType, error: impl Into<String>) -> Self {
        Outcome::Failure {
            error: error.into(),
            error_type,
            status_code: None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    pub fn data(&self) -> Option<&Value> {
        match self {
            Outcome::Success { data, .. } => Some(data),
            Outcome::Failure { .. } => None,
        }
    }

    pub fn count(&self) -> Option<usize> {
        match self {
            Outcome::Success { count, .. } => *count,
            Outcome::Failure { .. } => None,
        }
    }

    pub fn error_type(&self) -> Option<ErrorType> {
        match self {
            Outcome::Success { .. } => None,
            Outcome::Failure { error_type, .. } => Some(*error_type),
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Outcome::Success { .. } => None,
            Outcome::Failure { error, .. } => Some(error),
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Outcome::Success { .. } => None,
            Outcome::Failure { status_code, .. } => *status_code,
        }
    }

    /// Coerce a successful payload into a sequence and record its length.
    /// A single object becomes a one-element sequence.
    pub fn into_list(self) -> Self {
        match self {
            Outcome::Success { data, .. } => {
                let items = match data {
                    Value::Array(items) => items,
                    other => vec![other],
                };
                let count = items.len();
                Outcome::Success {
                    data: Value::Array(items),
                    count: Some(count),
                }
            }
            failure => failure,
        }
    }

    /// Pretty JSON text, the wire form handed back to the calling agent.
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| {
            format!(
                "{{\"success\": false, \"error\": \"Failed to serialize result: {}\", \"error_type\": \"unexpected_error\"}}",
                e
            )
        })
    }
}

impl Serialize for Outcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Outcome::Success { data, count } => {
                let mut map = serializer.serialize_map(None)?;
                map.serialize_entry("success", &true)?;
                map.serialize_entry("data", data)?;
                if let Some(count) = count {
                    map.serialize_entry("count", count)?;
                }
                map.end()
            }
            Outcome::Failure {
                error,
                error_type,
                status_code,
            } => {
                let mut map = serializer.serialize_map(None)?;
                map.serialize_entry("success", &false)?;
                map.serialize_entry("error", error)?;
                map.serialize_entry("error_type", error_type)?;
                if let Some(code) = status_code {
                    map.serialize_entry("status_code", code)?;
                }
                map.end()
            }
        }
    }
}

/// Await an HTTP call and classify whatever comes back.
pub async fn normalize<F>(request: F) -> Outcome
where
    F: Future<Output = reqwest::Result<reqwest::Response>>,
{
    let response = match request.await {
        Ok(response) => response,
        Err(err) => return from_transport_error(err),
    };

    let status = response.status().as_u16();
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    let body = match response.text().await {
        Ok(body) => body,
        Err(err) => return from_transport_error(err),
    };

    classify(status, &content_type, &body)
}

/// Classify a completed HTTP exchange.
pub fn classify(status: u16, content_type: &str, body: &str) -> Outcome {
    if !(200..300).contains(&status) {
        let message = format!("HTTP {} error: {}", status, body);
        error!("{}", message);
        return Outcome::Failure {
            error: message,
            error_type: ErrorType::HttpError,
            status_code: Some(status),
        };
    }

    if body.trim().is_empty() {
        let message = format!(
            "ServiceNow returned HTTP {} but with an empty response body.",
            status
        );
        error!("{}", message);
        return Outcome::failure(ErrorType::EmptyResponse, message);
    }

    if !is_json_media_type(content_type) {
        let mut message = format!(
            "Expected JSON response but got Content-Type: {}. Body preview: {}",
            content_type,
            preview(body)
        );
        error!("{}", message);
        if looks_like_hibernation_page(body) {
            message.push_str(HIBERNATION_HINT);
        }
        return Outcome::failure(ErrorType::UnexpectedContent, message);
    }

    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(err) => {
            let message = format!(
                "Invalid JSON response: {}. Body preview: {}",
                err,
                preview(body)
            );
            error!("{}", message);
            return Outcome::failure(ErrorType::JsonError, message);
        }
    };

    let data = match value {
        Value::Object(mut map) => match map.remove("result") {
            Some(inner) => inner,
            None => Value::Object(map),
        },
        other => other,
    };
    Outcome::success(data)
}

fn from_transport_error(err: reqwest::Error) -> Outcome {
    let detail = error_chain(&err);
    if err.is_timeout() {
        let message = format!("Request timeout: {}", detail);
        error!("{}", message);
        Outcome::failure(ErrorType::Timeout, message)
    } else if err.is_connect() || err.is_request() || err.is_body() || err.is_redirect() {
        let message = format!("Network error: {}", detail);
        error!("{}", message);
        Outcome::failure(ErrorType::NetworkError, message)
    } else {
        error!(error = ?err, "Unexpected error during ServiceNow request");
        Outcome::failure(ErrorType::UnexpectedError, format!("Unexpected error: {}", err))
    }
}

/// `application/json` or any `+json` structured suffix, parameters ignored.
fn is_json_media_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    essence == "application/json" || essence.ends_with("+json")
}

fn looks_like_hibernation_page(body: &str) -> bool {
    body.contains(HIBERNATION_MARKER) || body.to_lowercase().contains("<html")
}

fn preview(body: &str) -> String {
    body.chars().take(BODY_PREVIEW_CHARS).collect()
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}
