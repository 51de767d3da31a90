use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::GladiatorError;
use crate::registry::{filter_by_category, not_found, ApiRecord, ApiRegistry};

/// Registry persisted as one pretty-printed JSON array on disk.
///
/// Every call re-reads the file, so separate processes see each other's
/// registrations. Writes within one process are serialized by a lock.
pub struct FileRegistry {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<Vec<ApiRecord>, GladiatorError> {
        if !tokio::fs::try_exists(&self.path).await? {
            return Ok(Vec::new());
        }
        let content = tokio::fs::read_to_string(&self.path).await?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    async fn write_all(&self, records: &[ApiRecord]) -> Result<(), GladiatorError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(records)?;
        tokio::fs::write(&self.path, content).await?;
        Ok(())
    }
}

#[async_trait]
impl ApiRegistry for FileRegistry {
    async fn register(&self, record: ApiRecord) -> Result<ApiRecord, GladiatorError> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.read_all().await?;
        if records.iter().any(|r| r.id == record.id) {
            return Err(GladiatorError::Validation(format!(
                "API {} is already registered",
                record.id
            )));
        }
        records.push(record.clone());
        self.write_all(&records).await?;
        tracing::debug!(api_id = %record.id, path = %self.path.display(), "registered API");
        Ok(record)
    }

    async fn get_record(&self, api_id: Uuid) -> Result<ApiRecord, GladiatorError> {
        self.read_all()
            .await?
            .into_iter()
            .find(|r| r.id == api_id)
            .ok_or_else(|| not_found(api_id))
    }

    async fn list(&self, category: Option<&str>) -> Result<Vec<ApiRecord>, GladiatorError> {
        let records = self.read_all().await?;
        Ok(filter_by_category(&records, category))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
