use std::collections::HashMap;
use std::error::Error as _;
use std::time::{Duration, Instant};

use chrono::Utc;

use crate::http::HttpClient;
use crate::results::RequestResult;

/// Performs single timed GET requests and classifies their outcome.
///
/// One call is exactly one attempt; there are no retries.
#[derive(Debug, Clone)]
pub struct RequestExecutor {
    client: HttpClient,
}

impl RequestExecutor {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    /// Execute one GET using the client's configured timeout.
    pub async fn execute(&self, url: &str, headers: &HashMap<String, String>) -> RequestResult {
        self.execute_with_timeout(url, headers, self.client.timeout())
            .await
    }

    /// Execute one GET against `url` with its own `timeout`.
    ///
    /// Any HTTP response, whatever its status, is recorded without an error.
    /// Transport failures are captured in [`RequestResult::error`] and never
    /// propagated. Latency covers sending plus reading the full body.
    pub async fn execute_with_timeout(
        &self,
        url: &str,
        headers: &HashMap<String, String>,
        timeout: Duration,
    ) -> RequestResult {
        let timestamp = Utc::now();
        let start = Instant::now();
        let outcome = send_get(self.client.inner(), url, headers, timeout).await;
        let latency_ms = start.elapsed().as_secs_f64() * 1000.0;

        match outcome {
            Ok((status_code, size_bytes)) => {
                RequestResult::response(timestamp, latency_ms, status_code, size_bytes)
            }
            Err(err) => {
                tracing::trace!(url, "request failed: {err}");
                RequestResult::transport_failure(timestamp, latency_ms, err)
            }
        }
    }
}

/// Send the request and drain the body, returning `(status, body length)`.
async fn send_get(
    client: &reqwest::Client,
    url: &str,
    headers: &HashMap<String, String>,
    timeout: Duration,
) -> Result<(u16, u64), String> {
    let mut builder = client.get(url).timeout(timeout);
    for (key, value) in headers {
        builder = builder.header(key, value);
    }

    let response = builder.send().await.map_err(|e| describe_error(&e))?;
    let status_code = response.status().as_u16();

    // Body length in bytes. Compressed responses are counted after decoding.
    let body = response.bytes().await.map_err(|e| describe_error(&e))?;

    Ok((status_code, body.len() as u64))
}

/// Turn a reqwest error into a message that names the failure kind and
/// includes the underlying cause (e.g. "Connection refused").
fn describe_error(err: &reqwest::Error) -> String {
    let kind = if err.is_timeout() {
        "Request timed out"
    } else if err.is_connect() {
        "Connection failed"
    } else if err.is_builder() {
        "Invalid request"
    } else if err.is_body() || err.is_decode() {
        "Error reading response body"
    } else if err.is_redirect() {
        "Redirect error"
    } else {
        "Network error"
    };

    let mut message = format!("{kind}: {err}");
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
