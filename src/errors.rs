//! Unified error type for pin-archiver.
//!
//! Every fallible operation returns [`Result`]. Display strings never carry
//! credentials or the Cloudflare account id: transport errors have their
//! request URL stripped before they are stored.

use crate::cloudflare::types::ApiMessage;
use std::fmt;
use thiserror::Error;

/// Stage of startup provisioning that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionStage {
    /// Initial lookup of existing resources
    List,
    /// Creation of a missing resource
    Create,
    /// Re-lookup after creation
    Verify,
    /// Creation of the message table
    Schema,
}

impl fmt::Display for ProvisionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage = match self {
            Self::List => "list",
            Self::Create => "create",
            Self::Verify => "verify",
            Self::Schema => "schema",
        };
        f.write_str(stage)
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Transport error during {operation}: {source}")]
    Transport {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("Malformed response during {operation}: {source}")]
    MalformedResponse {
        operation: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Cloudflare API reported failure during {operation}: {}", describe_messages(.errors))]
    ApiFailure {
        operation: &'static str,
        errors: Vec<ApiMessage>,
    },

    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Unsupported statement parameter: {value}")]
    UnsupportedParameter { value: String },

    #[error("Statement failed: {sql}: {source}")]
    Statement {
        sql: String,
        #[source]
        source: Box<Error>,
    },

    #[error("Provisioning failed at {stage} stage: {source}")]
    Provision {
        stage: ProvisionStage,
        #[source]
        source: Box<Error>,
    },

    #[error("Failed to record message {message_id}: {source}")]
    Record {
        message_id: String,
        #[source]
        source: Box<Error>,
    },

    #[error("Invalid message: {message}")]
    InvalidMessage { message: String },

    #[error("Serenity/Poise framework error: {0}")]
    #[allow(clippy::enum_variant_names)]
    FrameworkError(Box<poise::serenity_prelude::Error>),
}

impl Error {
    /// Wraps a reqwest error, dropping the request URL (it embeds the account id).
    #[must_use]
    pub fn transport(operation: &'static str, source: reqwest::Error) -> Self {
        Self::Transport {
            operation,
            source: source.without_url(),
        }
    }

    pub(crate) fn provision(stage: ProvisionStage, source: Self) -> Self {
        Self::Provision {
            stage,
            source: Box::new(source),
        }
    }

    /// Returns the provisioning stage if this is a provisioning failure.
    #[must_use]
    pub const fn provision_stage(&self) -> Option<ProvisionStage> {
        match self {
            Self::Provision { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::FrameworkError(Box::new(value))
    }
}

fn describe_messages(messages: &[ApiMessage]) -> String {
    if messages.is_empty() {
        return "no error details".to_string();
    }
    messages
        .iter()
        .map(|m| format!("[{}] {}", m.code, m.message))
        .collect::<Vec<_>>()
        .join("; ")
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
