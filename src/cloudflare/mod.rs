//! Cloudflare API access - D1 databases and R2 buckets over HTTP.
//!
//! The core never talks to reqwest directly; it goes through [`CloudflareApi`],
//! which hands back raw [`ApiEnvelope`]s and leaves their interpretation to the
//! caller. Transport problems and undecodable bodies surface as errors here.

/// reqwest-backed implementation of [`CloudflareApi`]
pub mod client;
/// Shared request/response data model
pub mod types;

pub use client::HttpCloudflareClient;
pub use types::{ApiEnvelope, ApiMessage, D1Database, R2Bucket, StatementRequest};

use crate::errors::Result;
use async_trait::async_trait;

/// The Cloudflare endpoints the bot needs, scoped to one account.
#[async_trait]
pub trait CloudflareApi: Send + Sync {
    /// `GET /accounts/{account}/d1/database`
    async fn list_databases(&self) -> Result<ApiEnvelope<Vec<D1Database>>>;

    /// `POST /accounts/{account}/d1/database`
    async fn create_database(&self, name: &str) -> Result<ApiEnvelope<D1Database>>;

    /// `POST /accounts/{account}/d1/database/{id}/query`
    async fn query(
        &self,
        database_id: &str,
        statement: &StatementRequest,
    ) -> Result<ApiEnvelope<serde_json::Value>>;

    /// `GET /accounts/{account}/r2/buckets/{name}`
    async fn get_bucket(&self, name: &str) -> Result<ApiEnvelope<R2Bucket>>;

    /// `POST /accounts/{account}/r2/buckets`
    async fn create_bucket(&self, name: &str) -> Result<ApiEnvelope<R2Bucket>>;
}
