use crate::error::GladiatorError;
use crate::plan::model::TestConfiguration;

/// Longest accepted run (24 hours).
pub const MAX_DURATION_SECONDS: u64 = 86_400;

/// Most requests accepted in flight per round.
pub const MAX_CONCURRENCY: u32 = 10_000;

/// Check a [`TestConfiguration`] before a run starts.
///
/// Every problem is reported in a single [`GladiatorError::Configuration`]
/// so the caller sees all of them at once. No request is ever issued for a
/// configuration that fails here.
pub fn validate_configuration(config: &TestConfiguration) -> Result<(), GladiatorError> {
    let mut problems = Vec::new();

    if config.duration_seconds == 0 {
        problems.push("duration_seconds must be greater than 0".to_string());
    } else if config.duration_seconds > MAX_DURATION_SECONDS {
        problems.push(format!(
            "duration_seconds must be at most {MAX_DURATION_SECONDS} (got {})",
            config.duration_seconds
        ));
    }

    if config.concurrency == 0 {
        problems.push("concurrency must be at least 1".to_string());
    } else if config.concurrency > MAX_CONCURRENCY {
        problems.push(format!(
            "concurrency must be at most {MAX_CONCURRENCY} (got {})",
            config.concurrency
        ));
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(GladiatorError::Configuration(problems.join("; ")))
    }
}

/// Check that `url` is an absolute http(s) URL.
pub fn validate_target_url(url: &str) -> Result<(), GladiatorError> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(GladiatorError::Validation("URL must not be empty".to_string()));
    }

    let parsed = reqwest::Url::parse(trimmed)
        .map_err(|e| GladiatorError::Validation(format!("invalid URL '{trimmed}': {e}")))?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(GladiatorError::Validation(format!(
            "URL must use http:// or https:// (got scheme '{other}')"
        ))),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
