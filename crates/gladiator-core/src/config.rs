use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::GladiatorError;

pub const DEFAULT_REGION: &str = "us-west-2";
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Application-wide settings.
///
/// This is an explicit value handed to whatever needs it (the HTTP client
/// builder, the test service). Nothing reads it from global state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct AppConfig {
    /// Deployment region of the hosted backend, if one is used.
    pub region: String,
    /// Named credential profile for the hosted backend.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    /// Timeout applied to each load-test request (ms).
    pub request_timeout_ms: u64,
    /// Timeout of the reachability probe made at registration (ms).
    pub probe_timeout_ms: u64,
    pub user_agent: String,
    pub max_idle_per_host: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            profile: None,
            request_timeout_ms: 30_000,
            probe_timeout_ms: 5_000,
            user_agent: format!("gladiator/{}", env!("CARGO_PKG_VERSION")),
            max_idle_per_host: 100,
        }
    }
}

/// Path of the config file inside a data directory.
pub fn config_path(data_dir: impl AsRef<Path>) -> PathBuf {
    data_dir.as_ref().join(CONFIG_FILE_NAME)
}

/// Read the config file at `path`, writing the defaults there first if it
/// does not exist yet.
pub async fn load_or_init(path: impl AsRef<Path>) -> Result<AppConfig, GladiatorError> {
    let path = path.as_ref();
    if tokio::fs::try_exists(path).await? {
        let content = tokio::fs::read_to_string(path).await?;
        let config: AppConfig = serde_json::from_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded config");
        return Ok(config);
    }

    let config = AppConfig::default();
    write_config(&config, path).await?;
    tracing::info!(path = %path.display(), "created default config");
    Ok(config)
}

/// Write `config` to `path` as pretty-printed JSON, creating parent
/// directories as needed.
pub async fn write_config(config: &AppConfig, path: impl AsRef<Path>) -> Result<(), GladiatorError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let content = serde_json::to_string_pretty(config)?;
    tokio::fs::write(path, content).await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
