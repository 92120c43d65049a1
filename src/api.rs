//! Backend API client.
//!
//! The backend speaks an action-tagged protocol: every request is a JSON
//! object `{ "action": ..., "data": ... }` POSTed to the address the web
//! content supplied, and every response is an object with an optional `err`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::registration::DeviceRegistration;

/// Requests understood by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "data")]
pub enum ApiRequest {
    /// Store a device ↔ account registration.
    #[serde(rename = "addDevice")]
    AddDevice(DeviceRegistration),
}

impl ApiRequest {
    /// The wire action name.
    pub fn action(&self) -> &'static str {
        match self {
            Self::AddDevice(_) => "addDevice",
        }
    }
}

/// Backend response. Only the error field is interpreted.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ApiResponse {
    #[serde(default)]
    err: Option<serde_json::Value>,
    /// Action-specific payload, passed through untouched.
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

impl ApiResponse {
    /// Response carrying a backend-reported error code.
    pub fn error(code: impl Into<String>) -> Self {
        Self {
            err: Some(serde_json::Value::String(code.into())),
            data: None,
        }
    }

    /// Backend-reported error, rendered as text.
    ///
    /// `null`, `false` and the empty string count as "no error".
    pub fn err(&self) -> Option<String> {
        match self.err.as_ref()? {
            serde_json::Value::Null | serde_json::Value::Bool(false) => None,
            serde_json::Value::String(s) if s.is_empty() => None,
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// Errors talking to the backend (as opposed to errors the backend reports).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The request never produced a response.
    Transport(String),
    /// Non-success HTTP status without a backend error body.
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly empty.
        body: String,
    },
    /// The response body was not a backend response object.
    Decode(String),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(msg) => write!(f, "Request failed: {msg}"),
            Self::Status { status, body } if body.is_empty() => write!(f, "HTTP {status}"),
            Self::Status { status, body } => write!(f, "HTTP {status}: {body}"),
            Self::Decode(msg) => write!(f, "Invalid response: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

/// Single request/response call to the backend at `api_host`.
#[async_trait]
pub trait ApiClient: Send + Sync {
    /// Send `request` and return the backend's response.
    async fn call(&self, api_host: &str, request: &ApiRequest) -> Result<ApiResponse, ApiError>;
}

/// reqwest-backed [`ApiClient`].
#[derive(Debug, Clone)]
pub struct HttpApiClient {
    client: reqwest::Client,
}

impl HttpApiClient {
    /// Client with the given per-request timeout.
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("webshell/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    /// Wrap an existing client (shares its connection pool).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ApiClient for HttpApiClient {
    async fn call(&self, api_host: &str, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        log::debug!("[Api] {} -> {}", request.action(), api_host);

        let response = self
            .client
            .post(api_host)
            .json(request)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        if body.trim().is_empty() {
            return if status.is_success() {
                Ok(ApiResponse::default())
            } else {
                Err(ApiError::Status {
                    status: status.as_u16(),
                    body,
                })
            };
        }

        match serde_json::from_str::<ApiResponse>(&body) {
            Ok(parsed) if status.is_success() || parsed.err().is_some() => Ok(parsed),
            Ok(_) => Err(ApiError::Status {
                status: status.as_u16(),
                body,
            }),
            Err(_) if !status.is_success() => Err(ApiError::Status {
                status: status.as_u16(),
                body,
            }),
            Err(e) => Err(ApiError::Decode(e.to_string())),
        }
    }
}
