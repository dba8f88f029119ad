//! Shared test utilities for pin-archiver.
//!
//! [`FakeCloudflareApi`] replays scripted envelopes and records every call so
//! tests can assert on call order; [`RecordingSurface`] does the same for chat
//! output.

#![allow(clippy::unwrap_used)]

use crate::cloudflare::{ApiEnvelope, ApiMessage, CloudflareApi, D1Database, R2Bucket, StatementRequest};
use crate::config::{CloudflareConfig, DEFAULT_API_BASE_URL, DEFAULT_TIMEOUT};
use crate::core::pin::{PinSurface, PinnedMessage};
use crate::errors::{Error, Result};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::collections::VecDeque;
use std::sync::Mutex;

/// A successful envelope carrying `result`.
pub fn succeeded<T>(result: Option<T>) -> ApiEnvelope<T> {
    ApiEnvelope {
        result,
        errors: Vec::new(),
        messages: Vec::new(),
        success: true,
    }
}

/// A failed envelope with a single error entry.
pub fn failed<T>(code: i64, message: &str) -> ApiEnvelope<T> {
    ApiEnvelope {
        result: None,
        errors: vec![ApiMessage {
            code,
            message: message.to_string(),
        }],
        messages: Vec::new(),
        success: false,
    }
}

/// A listed database with the given name and identifier.
pub fn database(name: &str, uuid: &str) -> D1Database {
    D1Database {
        name: name.to_string(),
        uuid: uuid.to_string(),
        version: "production".to_string(),
        num_tables: 0,
        file_size: 0,
        created_at: None,
    }
}

/// Cloudflare settings with placeholder credentials.
pub fn cloudflare_config() -> CloudflareConfig {
    CloudflareConfig {
        account_id: "acct-1".to_string(),
        email: "bot@example.test".to_string(),
        api_key: "test-key".to_string(),
        database_name: "bot-log".to_string(),
        bucket_name: None,
        api_base_url: DEFAULT_API_BASE_URL.to_string(),
        timeout: DEFAULT_TIMEOUT,
    }
}

/// Message 555 by user 42 ("tester"), content "hello", posted 2024-01-01T00:00:00Z.
pub fn pinned_message() -> PinnedMessage {
    PinnedMessage {
        message_id: "555".to_string(),
        author_id: "42".to_string(),
        author_name: "tester".to_string(),
        content: "hello".to_string(),
        attachment_urls: Vec::new(),
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    }
}

/// One call made against [`FakeCloudflareApi`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    ListDatabases,
    CreateDatabase(String),
    Query {
        database_id: String,
        statement: StatementRequest,
    },
    GetBucket(String),
    CreateBucket(String),
}

type ErrorFactory = Box<dyn Fn() -> Error + Send + Sync>;

#[derive(Default)]
struct FakeState {
    calls: Vec<ApiCall>,
    lists: VecDeque<ApiEnvelope<Vec<D1Database>>>,
    creates: VecDeque<ApiEnvelope<D1Database>>,
    queries: VecDeque<ApiEnvelope<serde_json::Value>>,
    buckets: VecDeque<ApiEnvelope<R2Bucket>>,
    bucket_creates: VecDeque<ApiEnvelope<R2Bucket>>,
    query_error: Option<ErrorFactory>,
}

/// In-memory [`CloudflareApi`]. Unscripted calls succeed: lists are empty,
/// creations and queries report success, buckets exist.
#[derive(Default)]
pub struct FakeCloudflareApi {
    state: Mutex<FakeState>,
}

impl FakeCloudflareApi {
    pub fn push_list(&self, envelope: ApiEnvelope<Vec<D1Database>>) {
        self.state.lock().unwrap().lists.push_back(envelope);
    }

    pub fn push_create_database(&self, envelope: ApiEnvelope<D1Database>) {
        self.state.lock().unwrap().creates.push_back(envelope);
    }

    pub fn push_query(&self, envelope: ApiEnvelope<serde_json::Value>) {
        self.state.lock().unwrap().queries.push_back(envelope);
    }

    pub fn push_get_bucket(&self, envelope: ApiEnvelope<R2Bucket>) {
        self.state.lock().unwrap().buckets.push_back(envelope);
    }

    pub fn push_create_bucket(&self, envelope: ApiEnvelope<R2Bucket>) {
        self.state.lock().unwrap().bucket_creates.push_back(envelope);
    }

    /// Makes every query fail before an envelope is produced, like a timeout would.
    pub fn fail_query_with<F>(&self, make: F)
    where
        F: Fn() -> Error + Send + Sync + 'static,
    {
        self.state.lock().unwrap().query_error = Some(Box::new(make));
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.state.lock().unwrap().calls.clone()
    }

    fn record(&self, call: ApiCall) -> std::sync::MutexGuard<'_, FakeState> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        state
    }
}

#[async_trait]
impl CloudflareApi for FakeCloudflareApi {
    async fn list_databases(&self) -> Result<ApiEnvelope<Vec<D1Database>>> {
        let mut state = self.record(ApiCall::ListDatabases);
        Ok(state
            .lists
            .pop_front()
            .unwrap_or_else(|| succeeded(Some(Vec::new()))))
    }

    async fn create_database(&self, name: &str) -> Result<ApiEnvelope<D1Database>> {
        let mut state = self.record(ApiCall::CreateDatabase(name.to_string()));
        Ok(state
            .creates
            .pop_front()
            .unwrap_or_else(|| succeeded(Some(database(name, "")))))
    }

    async fn query(
        &self,
        database_id: &str,
        statement: &StatementRequest,
    ) -> Result<ApiEnvelope<serde_json::Value>> {
        let mut state = self.record(ApiCall::Query {
            database_id: database_id.to_string(),
            statement: statement.clone(),
        });
        if let Some(make) = &state.query_error {
            return Err(make());
        }
        Ok(state.queries.pop_front().unwrap_or_else(|| succeeded(None)))
    }

    async fn get_bucket(&self, name: &str) -> Result<ApiEnvelope<R2Bucket>> {
        let mut state = self.record(ApiCall::GetBucket(name.to_string()));
        Ok(state.buckets.pop_front().unwrap_or_else(|| {
            succeeded(Some(R2Bucket {
                name: name.to_string(),
                creation_date: None,
                location: None,
                storage_class: None,
            }))
        }))
    }

    async fn create_bucket(&self, name: &str) -> Result<ApiEnvelope<R2Bucket>> {
        let mut state = self.record(ApiCall::CreateBucket(name.to_string()));
        Ok(state
            .bucket_creates
            .pop_front()
            .unwrap_or_else(|| succeeded(None)))
    }
}

/// Chat output captured by [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEvent {
    Log(String),
    Acknowledge(String),
}

/// [`PinSurface`] that remembers what would have been sent.
#[derive(Default)]
pub struct RecordingSurface {
    events: Mutex<Vec<SurfaceEvent>>,
    fail_log: bool,
}

impl RecordingSurface {
    /// A surface whose log channel rejects every message.
    pub fn failing_log() -> Self {
        Self {
            fail_log: true,
            ..Self::default()
        }
    }

    pub fn events(&self) -> Vec<SurfaceEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl PinSurface for RecordingSurface {
    async fn send_log(&self, content: &str) -> Result<()> {
        if self.fail_log {
            return Err(Error::NotFound {
                resource: "log channel".to_string(),
            });
        }
        self.events
            .lock()
            .unwrap()
            .push(SurfaceEvent::Log(content.to_string()));
        Ok(())
    }

    async fn acknowledge(&self, content: &str) -> Result<()> {
        self.events
            .lock()
            .unwrap()
            .push(SurfaceEvent::Acknowledge(content.to_string()));
        Ok(())
    }
}
