pub mod file;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::engine::RequestExecutor;
use crate::error::GladiatorError;
use crate::plan::model::TargetApi;
use crate::plan::validation::validate_target_url;

pub use file::FileRegistry;

pub const DEFAULT_CATEGORY: &str = "REST";

// ---------------------------------------------------------------------------
// ApiRecord
// ---------------------------------------------------------------------------

/// A registered API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ApiRecord {
    pub id: Uuid,
    pub name: String,
    pub url: String,
    /// Full `Authorization` header value, e.g. `Bearer abc`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_header: Option<String>,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub registered_at: DateTime<Utc>,
}

impl ApiRecord {
    /// The endpoint and headers a load test should use.
    pub fn target(&self) -> TargetApi {
        let target = TargetApi::new(self.url.clone());
        match &self.auth_header {
            Some(value) => target.with_authorization(value.clone()),
            None => target,
        }
    }
}

/// Input for registering a new API.
#[derive(Debug, Clone, Default)]
pub struct NewApi {
    pub url: String,
    pub name: Option<String>,
    pub auth_header: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
}

impl NewApi {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Validate the input and mint a record with a fresh id.
    ///
    /// A missing name defaults to `API-` followed by the first eight
    /// characters of the id; a missing category defaults to `REST`.
    pub fn into_record(self) -> Result<ApiRecord, GladiatorError> {
        let url = self.url.trim().to_string();
        validate_target_url(&url)?;

        let id = Uuid::new_v4();
        let name = non_blank(self.name).unwrap_or_else(|| {
            let short: String = id.to_string().chars().take(8).collect();
            format!("API-{short}")
        });

        Ok(ApiRecord {
            id,
            name,
            url,
            auth_header: non_blank(self.auth_header),
            category: non_blank(self.category).unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            description: non_blank(self.description),
            registered_at: Utc::now(),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// ---------------------------------------------------------------------------
// ApiRegistry
// ---------------------------------------------------------------------------

/// Maps API ids to concrete endpoints.
#[async_trait]
pub trait ApiRegistry: Send + Sync {
    /// Store a new record. Registering an id twice is a validation error.
    async fn register(&self, record: ApiRecord) -> Result<ApiRecord, GladiatorError>;

    /// # Errors
    ///
    /// [`GladiatorError::NotFound`] when no API has this id.
    async fn get_record(&self, api_id: Uuid) -> Result<ApiRecord, GladiatorError>;

    /// All records in registration order, optionally for one category
    /// (case-insensitive).
    async fn list(&self, category: Option<&str>) -> Result<Vec<ApiRecord>, GladiatorError>;

    /// Resolve an id to the endpoint and headers to test.
    async fn get(&self, api_id: Uuid) -> Result<TargetApi, GladiatorError> {
        Ok(self.get_record(api_id).await?.target())
    }
}

pub(crate) fn not_found(api_id: Uuid) -> GladiatorError {
    GladiatorError::NotFound(format!("API {api_id}"))
}

pub(crate) fn filter_by_category(records: &[ApiRecord], category: Option<&str>) -> Vec<ApiRecord> {
    records
        .iter()
        .filter(|r| category.map_or(true, |c| r.category.eq_ignore_ascii_case(c)))
        .cloned()
        .collect()
}

// ---------------------------------------------------------------------------
// InMemoryRegistry
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct InMemoryRegistry {
    records: Mutex<Vec<ApiRecord>>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ApiRegistry for InMemoryRegistry {
    async fn register(&self, record: ApiRecord) -> Result<ApiRecord, GladiatorError> {
        let mut records = self.records.lock().await;
        if records.iter().any(|r| r.id == record.id) {
            return Err(GladiatorError::Validation(format!(
                "API {} is already registered",
                record.id
            )));
        }
        records.push(record.clone());
        Ok(record)
    }

    async fn get_record(&self, api_id: Uuid) -> Result<ApiRecord, GladiatorError> {
        let records = self.records.lock().await;
        records
            .iter()
            .find(|r| r.id == api_id)
            .cloned()
            .ok_or_else(|| not_found(api_id))
    }

    async fn list(&self, category: Option<&str>) -> Result<Vec<ApiRecord>, GladiatorError> {
        let records = self.records.lock().await;
        Ok(filter_by_category(&records, category))
    }
}

// ---------------------------------------------------------------------------
// Reachability probe
// ---------------------------------------------------------------------------

/// Check that an endpoint answers at all before it is registered.
///
/// Any HTTP response counts as reachable and its status is returned. A
/// transport failure returns its description.
pub async fn probe_endpoint(
    executor: &RequestExecutor,
    target: &TargetApi,
    timeout: Duration,
) -> Result<u16, String> {
    let result = executor
        .execute_with_timeout(&target.url, &target.headers, timeout)
        .await;
    match result.error {
        Some(error) => Err(error),
        None => Ok(result.status_code),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
