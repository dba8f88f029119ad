use super::types::{ApiEnvelope, CreateResourceRequest, D1Database, R2Bucket, StatementRequest};
use super::CloudflareApi;
use crate::config::CloudflareConfig;
use crate::errors::{Error, Result};
use async_trait::async_trait;
use reqwest::Url;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use tracing::debug;

/// HTTP client for the Cloudflare v4 API, authenticated with email + API key.
#[derive(Debug, Clone)]
pub struct HttpCloudflareClient {
    client: reqwest::Client,
    base_url: String,
    account_id: String,
}

impl HttpCloudflareClient {
    /// Builds a client from the Cloudflare section of the configuration.
    ///
    /// Fails when the account id, email or API key is blank, or when the
    /// credentials cannot be encoded as header values.
    pub fn new(config: &CloudflareConfig) -> Result<Self> {
        require("account id", &config.account_id)?;
        require("account email", &config.email)?;
        require("API key", &config.api_key)?;

        let mut headers = HeaderMap::new();
        headers.insert("X-Auth-Email", sensitive_header("account email", &config.email)?);
        headers.insert("X-Auth-Key", sensitive_header("API key", &config.api_key)?);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::transport("client setup", e))?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            account_id: config.account_id.clone(),
        })
    }

    fn account_url(&self, path: &str) -> String {
        format!("{}/accounts/{}/{}", self.base_url, self.account_id, path)
    }

    /// `account_url(path)` followed by `segments`, each percent-encoded as a
    /// single path segment.
    fn account_url_with(&self, path: &str, segments: &[&str]) -> Result<Url> {
        let invalid = || Error::Config {
            message: "Cloudflare API base URL is not a valid absolute URL".to_string(),
        };
        let mut url = Url::parse(&self.account_url(path)).map_err(|_| invalid())?;
        url.path_segments_mut().map_err(|()| invalid())?.extend(segments.iter().copied());
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<ApiEnvelope<T>> {
        let response = request
            .send()
            .await
            .map_err(|e| Error::transport(operation, e))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::transport(operation, e))?;
        debug!(operation, %status, "Cloudflare API responded");
        ApiEnvelope::decode(operation, &body)
    }
}

fn require(what: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::Config {
            message: format!("Cloudflare {what} is not set"),
        });
    }
    Ok(())
}

fn sensitive_header(what: &str, value: &str) -> Result<HeaderValue> {
    let mut header = HeaderValue::from_str(value).map_err(|_| Error::Config {
        message: format!("Cloudflare {what} contains characters not allowed in a header"),
    })?;
    header.set_sensitive(true);
    Ok(header)
}

#[async_trait]
impl CloudflareApi for HttpCloudflareClient {
    async fn list_databases(&self) -> Result<ApiEnvelope<Vec<D1Database>>> {
        let request = self.client.get(self.account_url("d1/database"));
        self.send("list databases", request).await
    }

    async fn create_database(&self, name: &str) -> Result<ApiEnvelope<D1Database>> {
        let request = self
            .client
            .post(self.account_url("d1/database"))
            .json(&CreateResourceRequest {
                name: name.to_string(),
            });
        self.send("create database", request).await
    }

    async fn query(
        &self,
        database_id: &str,
        statement: &StatementRequest,
    ) -> Result<ApiEnvelope<serde_json::Value>> {
        let request = self
            .client
            .post(self.account_url_with("d1/database", &[database_id, "query"])?)
            .json(statement);
        self.send("query", request).await
    }

    async fn get_bucket(&self, name: &str) -> Result<ApiEnvelope<R2Bucket>> {
        let request = self
            .client
            .get(self.account_url_with("r2/buckets", &[name])?);
        self.send("get bucket", request).await
    }

    async fn create_bucket(&self, name: &str) -> Result<ApiEnvelope<R2Bucket>> {
        let request = self
            .client
            .post(self.account_url("r2/buckets"))
            .json(&CreateResourceRequest {
                name: name.to_string(),
            });
        self.send("create bucket", request).await
    }
}
