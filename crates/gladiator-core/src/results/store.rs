use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::GladiatorError;
use crate::plan::model::TestType;
use crate::results::{ResultSummaryEntry, TestRunResult};

// ---------------------------------------------------------------------------
// ResultFilter
// ---------------------------------------------------------------------------

/// Selection applied when listing stored runs. Empty fields match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultFilter {
    pub api_id: Option<Uuid>,
    pub test_type: Option<TestType>,
    /// Maximum number of entries returned, newest first.
    pub limit: Option<usize>,
}

impl ResultFilter {
    pub fn for_api(api_id: Uuid) -> Self {
        Self {
            api_id: Some(api_id),
            ..Self::default()
        }
    }

    pub fn matches(&self, run: &TestRunResult) -> bool {
        if let Some(api_id) = self.api_id {
            if run.api_id != Some(api_id) {
                return false;
            }
        }
        if let Some(test_type) = self.test_type {
            if run.test_type != test_type {
                return false;
            }
        }
        true
    }
}

/// Sort newest first, filter, and truncate to the filter's limit.
fn select<'a>(
    runs: impl Iterator<Item = &'a TestRunResult>,
    filter: &ResultFilter,
) -> Vec<ResultSummaryEntry> {
    let mut matching: Vec<&TestRunResult> = runs.filter(|r| filter.matches(r)).collect();
    // Stable sort keeps insertion order (already newest first) for equal timestamps.
    matching.sort_by(|a, b| b.started_at.cmp(&a.started_at));
    let limit = filter.limit.unwrap_or(usize::MAX);
    matching
        .into_iter()
        .take(limit)
        .map(ResultSummaryEntry::from_run)
        .collect()
}

// ---------------------------------------------------------------------------
// ResultStore
// ---------------------------------------------------------------------------

/// Persistence for completed runs.
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Persist a run and return its id.
    async fn save(&self, run: &TestRunResult) -> Result<Uuid, GladiatorError>;

    async fn get(&self, run_id: Uuid) -> Result<Option<TestRunResult>, GladiatorError>;

    /// List matching runs, newest first.
    async fn list(&self, filter: &ResultFilter) -> Result<Vec<ResultSummaryEntry>, GladiatorError>;

    /// Most recent run for `api_id`, optionally restricted to one test type.
    async fn latest(
        &self,
        api_id: Uuid,
        test_type: Option<TestType>,
    ) -> Result<Option<TestRunResult>, GladiatorError>;
}

// ---------------------------------------------------------------------------
// InMemoryResultStore
// ---------------------------------------------------------------------------

/// Keeps the last `max_runs` runs in memory, evicting the oldest.
pub struct InMemoryResultStore {
    runs: Mutex<Vec<TestRunResult>>,
    max_runs: usize,
}

impl InMemoryResultStore {
    pub fn new(max_runs: usize) -> Self {
        Self {
            runs: Mutex::new(Vec::new()),
            max_runs: max_runs.max(1),
        }
    }
}

impl Default for InMemoryResultStore {
    fn default() -> Self {
        Self::new(100)
    }
}

#[async_trait]
impl ResultStore for InMemoryResultStore {
    async fn save(&self, run: &TestRunResult) -> Result<Uuid, GladiatorError> {
        let mut runs = self.runs.lock().await;
        if runs.len() >= self.max_runs {
            runs.remove(0);
        }
        runs.push(run.clone());
        Ok(run.run_id)
    }

    async fn get(&self, run_id: Uuid) -> Result<Option<TestRunResult>, GladiatorError> {
        let runs = self.runs.lock().await;
        Ok(runs.iter().find(|r| r.run_id == run_id).cloned())
    }

    async fn list(&self, filter: &ResultFilter) -> Result<Vec<ResultSummaryEntry>, GladiatorError> {
        let runs = self.runs.lock().await;
        Ok(select(runs.iter().rev(), filter))
    }

    async fn latest(
        &self,
        api_id: Uuid,
        test_type: Option<TestType>,
    ) -> Result<Option<TestRunResult>, GladiatorError> {
        let filter = ResultFilter {
            api_id: Some(api_id),
            test_type,
            limit: None,
        };
        let runs = self.runs.lock().await;
        Ok(runs
            .iter()
            .rev()
            .filter(|r| filter.matches(r))
            .max_by_key(|r| r.started_at)
            .cloned())
    }
}

// ---------------------------------------------------------------------------
// FileResultStore
// ---------------------------------------------------------------------------

/// Stores each run as `<run_id>.json` inside one directory.
pub struct FileResultStore {
    dir: PathBuf,
}

impl FileResultStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn run_path(&self, run_id: Uuid) -> PathBuf {
        self.dir.join(format!("{run_id}.json"))
    }

    /// Read every run in the directory. Unreadable files are skipped with a
    /// warning so one corrupt file does not hide the rest.
    async fn load_all(&self) -> Result<Vec<TestRunResult>, GladiatorError> {
        if !tokio::fs::try_exists(&self.dir).await? {
            return Ok(Vec::new());
        }

        let mut runs = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match read_run(&path).await {
                Ok(run) => runs.push(run),
                Err(e) => tracing::warn!(path = %path.display(), "skipping unreadable result: {e}"),
            }
        }
        Ok(runs)
    }
}

async fn read_run(path: &Path) -> Result<TestRunResult, GladiatorError> {
    let content = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&content)?)
}

#[async_trait]
impl ResultStore for FileResultStore {
    async fn save(&self, run: &TestRunResult) -> Result<Uuid, GladiatorError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let content = serde_json::to_string_pretty(run)?;
        tokio::fs::write(self.run_path(run.run_id), content).await?;
        tracing::debug!(run_id = %run.run_id, dir = %self.dir.display(), "saved run");
        Ok(run.run_id)
    }

    async fn get(&self, run_id: Uuid) -> Result<Option<TestRunResult>, GladiatorError> {
        let path = self.run_path(run_id);
        if !tokio::fs::try_exists(&path).await? {
            return Ok(None);
        }
        read_run(&path).await.map(Some)
    }

    async fn list(&self, filter: &ResultFilter) -> Result<Vec<ResultSummaryEntry>, GladiatorError> {
        let runs = self.load_all().await?;
        Ok(select(runs.iter(), filter))
    }

    async fn latest(
        &self,
        api_id: Uuid,
        test_type: Option<TestType>,
    ) -> Result<Option<TestRunResult>, GladiatorError> {
        let filter = ResultFilter {
            api_id: Some(api_id),
            test_type,
            limit: None,
        };
        let runs = self.load_all().await?;
        Ok(runs
            .into_iter()
            .filter(|r| filter.matches(r))
            .max_by_key(|r| r.started_at))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
