use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// TestType
// ---------------------------------------------------------------------------

/// The kind of performance test being run.
///
/// The engine drives all three the same way; the type is carried through to
/// the stored result so that runs can be filtered and compared by kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestType {
    #[default]
    Latency,
    Throughput,
    Errors,
}

impl std::fmt::Display for TestType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TestType::Latency => "latency",
            TestType::Throughput => "throughput",
            TestType::Errors => "errors",
        };
        write!(f, "{s}")
    }
}

impl FromStr for TestType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "latency" => Ok(TestType::Latency),
            "throughput" => Ok(TestType::Throughput),
            "errors" => Ok(TestType::Errors),
            other => Err(format!(
                "unknown test type '{other}' (expected latency, throughput or errors)"
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// TargetApi
// ---------------------------------------------------------------------------

/// A concrete endpoint to load-test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TargetApi {
    pub url: String,
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

impl TargetApi {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: HashMap::new(),
        }
    }

    /// Attach an `Authorization` header value, replacing any existing one.
    pub fn with_authorization(mut self, value: impl Into<String>) -> Self {
        self.headers
            .insert("Authorization".to_string(), value.into());
        self
    }
}

// ---------------------------------------------------------------------------
// TestConfiguration
// ---------------------------------------------------------------------------

/// Parameters of a single load-test run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TestConfiguration {
    #[serde(rename = "type", default)]
    pub test_type: TestType,
    /// Soft wall-clock budget. Checked only between rounds.
    pub duration_seconds: u64,
    /// Number of requests launched per round.
    pub concurrency: u32,
    /// Spacing between launches inside a round (intra-round launch
    /// throttling). Zero launches the whole round at once.
    #[serde(default)]
    pub delay_ms: u64,
}

impl Default for TestConfiguration {
    fn default() -> Self {
        Self {
            test_type: TestType::Latency,
            duration_seconds: 10,
            concurrency: 10,
            delay_ms: 0,
        }
    }
}
