//! NASA NEO feed API client.
//!
//! One blocking GET per query window. The upstream rejects windows wider than
//! [`MAX_WINDOW_DAYS`], so that constraint is enforced locally before any
//! network I/O. No caching, no internal retries: retry/backoff policy belongs
//! to the caller.

use std::collections::HashMap;
use std::time::Duration;

use chrono::NaiveDate;
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::debug;

use crate::domain::{MAX_WINDOW_DAYS, NeoRecord};
use crate::error::AppError;

const BASE_URL: &str = "https://api.nasa.gov/neo/rest/v1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Success envelope: per-day record lists keyed by ISO date.
#[derive(Debug, Deserialize)]
struct FeedResponse {
    near_earth_objects: HashMap<String, Vec<NeoRecord>>,
}

/// Error envelope on non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

pub struct FeedClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl FeedClient {
    /// Client against the production feed endpoint.
    pub fn new(api_key: impl Into<String>) -> Result<Self, AppError> {
        Self::with_base_url(api_key, BASE_URL)
    }

    /// Client with the API key taken from `NASA_API_KEY` (`.env` supported).
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let api_key = std::env::var("NASA_API_KEY").map_err(|_| AppError::MissingCredential)?;
        Self::new(api_key)
    }

    /// Client against an alternate endpoint (used by tests with a mock server).
    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::Upstream(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into(),
        })
    }

    /// Fetch the raw per-day records for the closed window `[start, end]`.
    ///
    /// The whole window comes back in one response; callers index it per day
    /// rather than requesting each day separately.
    pub fn fetch_window(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<HashMap<String, Vec<NeoRecord>>, AppError> {
        let span = (end - start).num_days();
        if span < 0 || span as usize >= MAX_WINDOW_DAYS {
            return Err(AppError::InvalidRange { start, end });
        }

        debug!(%start, %end, "fetching feed window");
        let url = format!("{}/feed", self.base_url);
        let resp = self
            .client
            .get(&url)
            .query(&[
                ("start_date", start.to_string()),
                ("end_date", end.to_string()),
                ("api_key", self.api_key.clone()),
            ])
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::Timeout
                } else {
                    AppError::Upstream(format!("feed request failed: {e}"))
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp
                .json::<ErrorBody>()
                .map(|body| body.error.message)
                .unwrap_or_else(|_| status.to_string());
            return Err(AppError::Upstream(message));
        }

        let body: FeedResponse = resp
            .json()
            .map_err(|e| AppError::Upstream(format!("failed to parse feed response: {e}")))?;
        Ok(body.near_earth_objects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn d(s: &str) -> NaiveDate {
        crate::dates::parse_date(s).unwrap()
    }

    // The blocking client is exercised from the test thread while the mock
    // server runs on this runtime's worker threads.
    fn mock_server() -> (tokio::runtime::Runtime, MockServer) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let server = rt.block_on(MockServer::start());
        (rt, server)
    }

    #[test]
    fn fetch_window_parses_feed_response() {
        let (rt, server) = mock_server();
        let body = json!({
            "near_earth_objects": {
                "2023-08-25": [{"name": "Test1", "absolute_magnitude_h": 20.1}]
            }
        });
        rt.block_on(
            Mock::given(method("GET"))
                .and(path("/feed"))
                .and(query_param("start_date", "2023-08-25"))
                .and(query_param("end_date", "2023-08-25"))
                .and(query_param("api_key", "test-key"))
                .respond_with(ResponseTemplate::new(200).set_body_json(&body))
                .mount(&server),
        );

        let client = FeedClient::with_base_url("test-key", server.uri()).unwrap();
        let days = client.fetch_window(d("2023-08-25"), d("2023-08-25")).unwrap();
        assert_eq!(days.len(), 1);
        assert_eq!(days["2023-08-25"].len(), 1);
        assert_eq!(days["2023-08-25"][0].get("name"), Some(&json!("Test1")));
    }

    #[test]
    fn fetch_window_surfaces_upstream_error_message() {
        let (rt, server) = mock_server();
        rt.block_on(
            Mock::given(method("GET"))
                .and(path("/feed"))
                .respond_with(
                    ResponseTemplate::new(429)
                        .set_body_json(json!({"error": {"message": "rate limited"}})),
                )
                .mount(&server),
        );

        let client = FeedClient::with_base_url("test-key", server.uri()).unwrap();
        match client.fetch_window(d("2023-08-25"), d("2023-08-25")) {
            Err(AppError::Upstream(message)) => assert_eq!(message, "rate limited"),
            other => panic!("expected Upstream, got {other:?}"),
        }
    }

    #[test]
    fn fetch_window_falls_back_to_status_text() {
        let (rt, server) = mock_server();
        rt.block_on(
            Mock::given(method("GET"))
                .and(path("/feed"))
                .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
                .mount(&server),
        );

        let client = FeedClient::with_base_url("test-key", server.uri()).unwrap();
        match client.fetch_window(d("2023-08-25"), d("2023-08-25")) {
            Err(AppError::Upstream(message)) => assert!(message.contains("500")),
            other => panic!("expected Upstream, got {other:?}"),
        }
    }

    #[test]
    fn fetch_window_rejects_wide_window_locally() {
        // Unroutable endpoint: the guard must fire before any network I/O.
        let client = FeedClient::with_base_url("test-key", "http://127.0.0.1:9").unwrap();
        assert!(matches!(
            client.fetch_window(d("2023-08-25"), d("2023-09-05")),
            Err(AppError::InvalidRange { .. })
        ));
        assert!(matches!(
            client.fetch_window(d("2023-08-25"), d("2023-08-24")),
            Err(AppError::InvalidRange { .. })
        ));
    }
}
