use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The only failure message shown to users, whatever went wrong.
pub const GENERIC_ERROR: &str = "Something went wrong while contacting the server.";

/// Where the doubling service lives.
#[derive(Debug, Clone)]
pub struct DoubleClientConfig {
    pub base_url: String,
}

impl DoubleClientConfig {
    /// Loads config from env vars:
    /// - `DOUBLE_API_URL` (default: `http://localhost:3000`)
    pub fn from_env() -> Self {
        let base_url = std::env::var("DOUBLE_API_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());
        Self { base_url }
    }
}

/// Minimal client for `POST /double` (blocking HTTP, no retries).
#[derive(Debug, Clone)]
pub struct DoubleClient {
    http: Client,
    base_url: Url,
}

impl DoubleClient {
    pub fn new(config: DoubleClientConfig) -> Result<Self> {
        let base_url = validate_base_url(&config.base_url)?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { http, base_url })
    }

    pub fn endpoint(&self) -> Result<Url> {
        self.base_url
            .join("double")
            .context("Failed to build /double URL")
    }

    /// Sends `value` (a number or a numeric string) and returns the doubled result.
    pub fn double(&self, value: impl Into<Value>) -> Result<f64> {
        let endpoint = self.endpoint()?;
        let request = DoubleRequest {
            value: value.into(),
        };

        let response: DoubleResponse = self
            .http
            .post(endpoint.clone())
            .json(&request)
            .send()
            .with_context(|| format!("POST {endpoint} failed"))?
            .error_for_status()
            .with_context(|| format!("POST {endpoint} returned non-success status"))?
            .json()
            .with_context(|| format!("Failed to parse JSON response from {endpoint}"))?;

        Ok(response.result)
    }

    /// Issues a request for `slot` and records its outcome there. Returns false when a
    /// newer request was issued meanwhile and this result was discarded.
    pub fn double_into(&self, slot: &ResultSlot, value: impl Into<Value>) -> bool {
        let ticket = slot.begin();
        let result = self.double(value);
        slot.complete(ticket, result)
    }
}

fn validate_base_url(base_url: &str) -> Result<Url> {
    let url = Url::parse(base_url).with_context(|| format!("Invalid DOUBLE_API_URL: {base_url}"))?;

    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(anyhow!(
                "Unsupported scheme '{other}' for DOUBLE_API_URL (use http:// or https://)"
            ))
        }
    }

    if url.host_str().is_none() {
        return Err(anyhow!("DOUBLE_API_URL is missing a host"));
    }

    Ok(url)
}

#[derive(Debug, Serialize)]
struct DoubleRequest {
    value: Value,
}

#[derive(Debug, Deserialize)]
struct DoubleResponse {
    result: f64,
}

/// Identifies one issued request. Later tickets supersede earlier ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Idle,
    Pending,
    Ready(f64),
    Failed(&'static str),
}

#[derive(Debug)]
struct SlotState {
    latest: u64,
    outcome: Outcome,
}

/// Displayed result of the doubling form.
///
/// Requests in flight are never cancelled; only the most recently issued one may write
/// its outcome, so a slow earlier response can't overwrite a newer one.
#[derive(Debug)]
pub struct ResultSlot {
    state: Mutex<SlotState>,
}

impl ResultSlot {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SlotState {
                latest: 0,
                outcome: Outcome::Idle,
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SlotState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn begin(&self) -> Ticket {
        let mut state = self.lock();
        state.latest += 1;
        state.outcome = Outcome::Pending;
        Ticket(state.latest)
    }

    pub fn complete(&self, ticket: Ticket, result: Result<f64>) -> bool {
        let mut state = self.lock();
        if ticket.0 != state.latest {
            tracing::debug!(ticket = ticket.0, latest = state.latest, "discarding superseded response");
            return false;
        }
        state.outcome = match result {
            Ok(value) => Outcome::Ready(value),
            Err(err) => {
                tracing::warn!(error = %err, "doubling request failed");
                Outcome::Failed(GENERIC_ERROR)
            }
        };
        true
    }

    pub fn outcome(&self) -> Outcome {
        self.lock().outcome.clone()
    }
}

impl Default for ResultSlot {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_base_url() {
        assert!(validate_base_url("http://localhost:3000").is_ok());
        assert!(validate_base_url("https://budget.example.com").is_ok());
        assert!(validate_base_url("ftp://localhost").is_err());
        assert!(validate_base_url("not a url").is_err());
    }

    #[test]
    fn test_endpoint_joins_double() {
        let client = DoubleClient::new(DoubleClientConfig {
            base_url: "http://localhost:3000/".to_string(),
        })
        .unwrap();
        assert_eq!(client.endpoint().unwrap().as_str(), "http://localhost:3000/double");
    }

    #[test]
    fn test_latest_issued_request_wins() {
        let slot = ResultSlot::new();
        assert_eq!(slot.outcome(), Outcome::Idle);

        let first = slot.begin();
        let second = slot.begin();
        assert_eq!(slot.outcome(), Outcome::Pending);

        // second answers first, then the stale first response arrives
        assert!(slot.complete(second, Ok(24.0)));
        assert!(!slot.complete(first, Ok(2.0)));
        assert_eq!(slot.outcome(), Outcome::Ready(24.0));
    }

    #[test]
    fn test_failures_show_generic_message() {
        let slot = ResultSlot::new();
        let ticket = slot.begin();
        assert!(slot.complete(ticket, Err(anyhow!("connection refused"))));
        assert_eq!(slot.outcome(), Outcome::Failed(GENERIC_ERROR));
    }

    #[test]
    fn test_unreachable_server_fails_into_slot() {
        // port 9 (discard) is not expected to run an HTTP server
        let client = DoubleClient::new(DoubleClientConfig {
            base_url: "http://127.0.0.1:9".to_string(),
        })
        .unwrap();
        let slot = ResultSlot::new();
        assert!(client.double_into(&slot, "12"));
        assert_eq!(slot.outcome(), Outcome::Failed(GENERIC_ERROR));
    }
}
