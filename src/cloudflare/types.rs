//! Request and response shapes shared by every Cloudflare API call.

use crate::errors::{Error, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Error code Cloudflare returns when an R2 bucket does not exist.
pub const BUCKET_NOT_FOUND_CODE: i64 = 10006;

/// A `{code, message}` entry from an envelope's `errors` or `messages` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiMessage {
    /// Numeric Cloudflare error or info code
    #[serde(default)]
    pub code: i64,
    /// Human-readable description
    #[serde(default)]
    pub message: String,
}

/// The wrapper around every Cloudflare API response.
///
/// `success` is the only outcome signal that counts. The HTTP status and the
/// presence of `result` are deliberately ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    /// Payload, when the endpoint returns one
    pub result: Option<T>,
    /// Failure details
    #[serde(default)]
    pub errors: Vec<ApiMessage>,
    /// Informational notices
    #[serde(default)]
    pub messages: Vec<ApiMessage>,
    /// Whether the call succeeded
    pub success: bool,
}

impl<T: DeserializeOwned> ApiEnvelope<T> {
    /// Parses a raw response body into an envelope.
    pub fn decode(operation: &'static str, body: &str) -> Result<Self> {
        serde_json::from_str(body).map_err(|source| Error::MalformedResponse { operation, source })
    }
}

impl<T> ApiEnvelope<T> {
    /// Converts a failed envelope into [`Error::ApiFailure`], passing successful ones through.
    pub fn check(self, operation: &'static str) -> Result<Self> {
        if self.success {
            Ok(self)
        } else {
            Err(Error::ApiFailure {
                operation,
                errors: self.errors,
            })
        }
    }

    /// True when any entry in `errors` carries `code`.
    #[must_use]
    pub fn has_error_code(&self, code: i64) -> bool {
        self.errors.iter().any(|e| e.code == code)
    }
}

/// A D1 database as listed by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct D1Database {
    /// Database name, unique per account
    pub name: String,
    /// Identifier assigned by Cloudflare; empty when the API omitted it.
    #[serde(default)]
    pub uuid: String,
    /// Storage backend version, e.g. `production`
    #[serde(default)]
    pub version: String,
    /// Number of tables
    #[serde(default)]
    pub num_tables: i64,
    /// Size on disk in bytes
    #[serde(default)]
    pub file_size: i64,
    /// Creation time
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body of `POST .../d1/database` and `POST .../r2/buckets`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateResourceRequest {
    /// Name of the database or bucket to create
    pub name: String,
}

/// A single SQL statement with positional parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementRequest {
    /// SQL text with `?` placeholders
    pub sql: String,
    /// Values bound to the placeholders, in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<String>,
}

impl StatementRequest {
    /// A statement without parameters.
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }
}

/// An R2 bucket as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct R2Bucket {
    /// Bucket name
    pub name: String,
    /// RFC 3339 creation time as reported by the API
    #[serde(default)]
    pub creation_date: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub storage_class: Option<String>,
}
