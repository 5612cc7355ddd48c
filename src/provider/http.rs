//! Shared HTTP client, SSE parsing, and auth utilities.

use std::sync::OnceLock;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};

use crate::error::CodexError;

static SHARED_CLIENT: OnceLock<reqwest::Client> = OnceLock::new();

/// Get (or create) the shared reqwest client.
///
/// Only connection setup is bounded; a streaming body may stay open for as
/// long as the provider keeps sending.
pub fn shared_client() -> &'static reqwest::Client {
    SHARED_CLIENT.get_or_init(|| {
        reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(30))
            .pool_max_idle_per_host(10)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new())
    })
}

/// Build default headers for a Bearer-token API.
pub fn bearer_headers(api_key: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Ok(val) = HeaderValue::from_str(&format!("Bearer {api_key}")) {
        headers.insert(AUTHORIZATION, val);
    }
    headers
}

/// One parsed SSE `data:` line.
#[derive(Debug, PartialEq, Eq)]
pub enum SseData<'a> {
    Json(&'a str),
    Done,
}

/// Parse an SSE line. Returns `None` for anything that is not a data line.
pub fn parse_sse_data(line: &str) -> Option<SseData<'_>> {
    let data = line.strip_prefix("data:")?.trim_start();
    if data == "[DONE]" {
        return Some(SseData::Done);
    }
    Some(SseData::Json(data))
}

/// Map a non-success HTTP status to an error.
pub fn status_to_error(status: u16, body: &str) -> CodexError {
    match status {
        429 => CodexError::RateLimited {
            retry_after_ms: extract_retry_after(body),
        },
        _ => CodexError::api(status, body),
    }
}

fn extract_retry_after(body: &str) -> Option<u64> {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("retry_after"))
                .and_then(|r| r.as_f64())
                .map(|s| (s * 1000.0) as u64)
        })
}
