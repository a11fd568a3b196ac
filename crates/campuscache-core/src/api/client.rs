//! HTTP client for the staff directory endpoint.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::directory::StaffQuery;
use crate::models::StaffRecord;

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
/// 30s allows for slow cold-started backends while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum number of retries for rate-limited (429) requests.
/// 3 retries with exponential backoff usually succeeds without excessive delay.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
/// 1 second is polite to the server while not making users wait too long.
const INITIAL_BACKOFF_MS: u64 = 1000;

/// API client for the staff directory endpoint.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new API client against the given endpoint URL
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the lookup URL with encoded query parameters.
    fn staff_url(&self, query: &StaffQuery) -> Result<Url> {
        let mut params: Vec<(&str, &str)> = Vec::with_capacity(2);
        if let Some(ref school) = query.school {
            params.push(("school", school));
        }
        params.push(("role", &query.role));

        Url::parse_with_params(&self.base_url, params)
            .with_context(|| format!("Invalid API base URL: {}", self.base_url))
    }

    /// Check if response is successful, returning an error with body if not.
    /// Returns Ok(Some(response)) for success, Ok(None) for rate limit (should retry),
    /// or Err for other errors.
    async fn check_response_for_retry(
        response: reqwest::Response,
    ) -> Result<Option<reqwest::Response>> {
        if response.status().is_success() {
            Ok(Some(response))
        } else if response.status().as_u16() == 429 {
            // Rate limited - signal to retry
            Ok(None)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    /// Fetch the staff records matching a query.
    ///
    /// An empty array is a valid outcome (nobody matched), not an error.
    pub async fn fetch_staff(&self, query: &StaffQuery) -> Result<Vec<StaffRecord>> {
        let url = self.staff_url(query)?;
        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            let response = self
                .client
                .get(url.clone())
                .send()
                .await
                .with_context(|| format!("Failed to send GET request to {}", url))?;

            match Self::check_response_for_retry(response).await? {
                Some(response) => {
                    let text = response
                        .text()
                        .await
                        .context("Failed to read staff response body")?;
                    debug!(query = %query.describe(), "Staff response received");
                    return Self::parse_staff(&text);
                }
                None => {
                    // Rate limited
                    retries += 1;
                    if retries > MAX_RATE_LIMIT_RETRIES {
                        return Err(ApiError::RateLimited.into());
                    }
                    warn!(url = %url, retry = retries, backoff_ms, "Rate limited, backing off");
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms *= 2; // Exponential backoff
                }
            }
        }
    }

    /// Parse the response body, tolerating a wrapped array.
    fn parse_staff(text: &str) -> Result<Vec<StaffRecord>> {
        // Try to parse as array directly first, then as wrapped object
        if let Ok(records) = serde_json::from_str::<Vec<StaffRecord>>(text) {
            return Ok(records);
        }

        // `data` is deliberately required so arbitrary objects (error pages,
        // misconfigured endpoints) surface as a parse failure, not as an
        // empty roster.
        #[derive(Deserialize)]
        struct StaffWrapper {
            data: Vec<StaffRecord>,
        }

        if let Ok(wrapper) = serde_json::from_str::<StaffWrapper>(text) {
            return Ok(wrapper.data);
        }

        warn!("Failed to parse staff response");
        Err(ApiError::InvalidResponse(format!(
            "Unexpected staff payload, starts with: {}",
            &text[..text.len().min(200)]
        ))
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ApiClient {
        ApiClient::new("https://directory.example.org/staff").unwrap()
    }

    #[test]
    fn test_staff_url_role_only() {
        let url = client()
            .staff_url(&StaffQuery::for_role("Principal"))
            .unwrap();
        assert_eq!(url.query(), Some("role=Principal"));
    }

    #[test]
    fn test_staff_url_encodes_school_and_role() {
        let url = client()
            .staff_url(&StaffQuery::scoped("Lotus School", "Ops Manager"))
            .unwrap();
        let query = url.query().unwrap();
        assert!(query.starts_with("school="));
        assert!(query.contains("role="));
        assert!(!query.contains(' '), "spaces must be encoded: {}", query);
    }

    #[test]
    fn test_parse_staff_array_and_wrapper() {
        let body = r#"[{"principalName": "Asha Verma", "contactNumber": "9876543210",
                        "school": "Lotus School", "role": "Principal", "location": "North"}]"#;
        let records = ApiClient::parse_staff(body).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Asha Verma");

        let wrapped = format!(r#"{{"data": {}}}"#, body);
        let records = ApiClient::parse_staff(&wrapped).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_parse_staff_empty_array_is_ok() {
        assert!(ApiClient::parse_staff("[]").unwrap().is_empty());
    }

    #[test]
    fn test_parse_staff_garbage_is_an_error() {
        assert!(ApiClient::parse_staff("<html>oops</html>").is_err());
    }
}
