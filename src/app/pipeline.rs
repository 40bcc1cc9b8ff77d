//! Shared download pipeline used by both CLI subcommands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! date sequence -> 8-day windows -> one feed request per window ->
//! per-day accumulation -> flatten
//!
//! The CLI front-ends then focus on presentation (CSV vs preview).

use tracing::debug;

use crate::data::FeedClient;
use crate::dates;
use crate::domain::{DayRecords, FlatTable};
use crate::error::AppError;
use crate::flatten;

/// Download the requested date range and flatten it into one table.
///
/// Date validation happens before any network call. Any upstream or schema
/// failure aborts the whole call; a partial table is never returned. Request
/// count is `ceil(days / 8)`: one call per window, with the window-wide
/// response indexed per day.
pub fn download(start: &str, end: &str, client: &FeedClient) -> Result<FlatTable, AppError> {
    let days = download_days(start, end, client)?;
    flatten::flatten(&days)
}

/// Fetch the raw per-day records for the range without flattening.
///
/// Useful when a caller wants to re-flatten without re-fetching.
pub fn download_days(
    start: &str,
    end: &str,
    client: &FeedClient,
) -> Result<Vec<DayRecords>, AppError> {
    let sequence = dates::sequence(start, end)?;
    let mut out = Vec::with_capacity(sequence.len());

    for window in dates::windows(&sequence)? {
        let (Some(&first), Some(&last)) = (window.first(), window.last()) else {
            continue;
        };
        debug!(%first, %last, days = window.len(), "downloading feed window");
        let mut by_day = client.fetch_window(first, last)?;

        // The feed returns every day of the window in one response; index it
        // per day instead of issuing one request per day.
        for &date in window {
            let key = date.format("%Y-%m-%d").to_string();
            let records = by_day.remove(&key).ok_or_else(|| {
                AppError::Upstream(format!(
                    "feed response for window {first}..{last} is missing day {key}"
                ))
            })?;
            out.push(DayRecords { date, records });
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Map, Value, json};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn mock_server() -> (tokio::runtime::Runtime, MockServer) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let server = rt.block_on(MockServer::start());
        (rt, server)
    }

    fn neo_record(name: &str) -> Value {
        json!({
            "id": "54016",
            "name": name,
            "absolute_magnitude_h": 22.5,
            "estimated_diameter": {
                "kilometers": {"estimated_diameter_min": 0.05, "estimated_diameter_max": 0.11},
                "meters": {"estimated_diameter_min": 50.0, "estimated_diameter_max": 110.0},
                "miles": {"estimated_diameter_min": 0.03, "estimated_diameter_max": 0.07},
                "feet": {"estimated_diameter_min": 160.0, "estimated_diameter_max": 360.0}
            },
            "is_potentially_hazardous_asteroid": true,
            "close_approach_data": [{
                "close_approach_date": "2023-08-25",
                "relative_velocity": {
                    "kilometers_per_second": "8.2",
                    "kilometers_per_hour": "29520.7",
                    "miles_per_hour": "18343.1"
                },
                "miss_distance": {
                    "astronomical": "0.12",
                    "lunar": "46.7",
                    "kilometers": "17900000.4",
                    "miles": "11122000.9"
                },
                "orbiting_body": "Earth"
            }]
        })
    }

    /// `{"near_earth_objects": {day: records, ...}}` for the given days.
    fn feed_body(days: &[(&str, Vec<Value>)]) -> Value {
        let mut by_day = Map::new();
        for (day, records) in days {
            by_day.insert((*day).to_string(), Value::Array(records.clone()));
        }
        json!({"near_earth_objects": by_day})
    }

    #[test]
    fn single_day_download_produces_one_row() {
        let (rt, server) = mock_server();
        let body = feed_body(&[("2023-08-25", vec![neo_record("Test1")])]);
        rt.block_on(
            Mock::given(method("GET"))
                .and(path("/feed"))
                .and(query_param("start_date", "2023-08-25"))
                .and(query_param("end_date", "2023-08-25"))
                .respond_with(ResponseTemplate::new(200).set_body_json(&body))
                .expect(1)
                .mount(&server),
        );

        let client = FeedClient::with_base_url("test-key", server.uri()).unwrap();
        let table = download("2023-08-25", "2023-08-25", &client).unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(table.skipped, 0);
        assert_eq!(table.value(0, "name"), Some(&json!("Test1")));
        assert_eq!(table.value(0, "date"), Some(&json!("2023-08-25")));
        assert_eq!(table.value(0, "relative_velocity_km/h"), Some(&json!("29520.7")));
        assert_eq!(table.value(0, "miss_dist_km"), Some(&json!("17900000.4")));

        rt.block_on(server.verify());
    }

    #[test]
    fn nine_day_range_fetches_two_windows() {
        let (rt, server) = mock_server();

        // First window: 2023-08-25 ..= 2023-09-01 (8 days, no records).
        let first_days: Vec<(String, Vec<Value>)> = crate::dates::sequence("2023-08-25", "2023-09-01")
            .unwrap()
            .into_iter()
            .map(|d| (d.format("%Y-%m-%d").to_string(), Vec::new()))
            .collect();
        let first_refs: Vec<(&str, Vec<Value>)> = first_days
            .iter()
            .map(|(d, r)| (d.as_str(), r.clone()))
            .collect();
        rt.block_on(
            Mock::given(method("GET"))
                .and(path("/feed"))
                .and(query_param("start_date", "2023-08-25"))
                .and(query_param("end_date", "2023-09-01"))
                .respond_with(ResponseTemplate::new(200).set_body_json(&feed_body(&first_refs)))
                .expect(1)
                .mount(&server),
        );

        // Second window: the single remaining day.
        rt.block_on(
            Mock::given(method("GET"))
                .and(path("/feed"))
                .and(query_param("start_date", "2023-09-02"))
                .and(query_param("end_date", "2023-09-02"))
                .respond_with(ResponseTemplate::new(200).set_body_json(&feed_body(&[(
                    "2023-09-02",
                    vec![neo_record("Tail")],
                )])))
                .expect(1)
                .mount(&server),
        );

        let client = FeedClient::with_base_url("test-key", server.uri()).unwrap();
        let table = download("2023-08-25", "2023-09-02", &client).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.value(0, "date"), Some(&json!("2023-09-02")));

        rt.block_on(server.verify());
    }

    #[test]
    fn upstream_failure_returns_no_partial_table() {
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
        match download("2023-08-25", "2023-08-26", &client) {
            Err(AppError::Upstream(message)) => assert_eq!(message, "rate limited"),
            other => panic!("expected Upstream, got {other:?}"),
        }
    }

    #[test]
    fn invalid_dates_fail_before_any_request() {
        // Unroutable endpoint: validation must fire first.
        let client = FeedClient::with_base_url("test-key", "http://127.0.0.1:9").unwrap();
        assert!(matches!(
            download("2023-08-25", "2023-08-24", &client),
            Err(AppError::InvalidRange { .. })
        ));
        assert!(matches!(
            download("25-08-2023", "2023-08-26", &client),
            Err(AppError::InvalidDateFormat(_))
        ));
    }

    #[test]
    fn missing_day_in_response_is_upstream_error() {
        let (rt, server) = mock_server();
        // Two days requested, only one present in the response.
        let body = feed_body(&[("2023-08-25", vec![neo_record("Test1")])]);
        rt.block_on(
            Mock::given(method("GET"))
                .and(path("/feed"))
                .respond_with(ResponseTemplate::new(200).set_body_json(&body))
                .mount(&server),
        );

        let client = FeedClient::with_base_url("test-key", server.uri()).unwrap();
        match download("2023-08-25", "2023-08-26", &client) {
            Err(AppError::Upstream(message)) => assert!(message.contains("2023-08-26")),
            other => panic!("expected Upstream, got {other:?}"),
        }
    }

    #[test]
    fn skipped_records_surface_in_the_table() {
        let (rt, server) = mock_server();
        let mut broken = neo_record("NoApproach");
        broken["close_approach_data"] = json!([]);
        let body = feed_body(&[("2023-08-25", vec![broken, neo_record("Good")])]);
        rt.block_on(
            Mock::given(method("GET"))
                .and(path("/feed"))
                .respond_with(ResponseTemplate::new(200).set_body_json(&body))
                .mount(&server),
        );

        let client = FeedClient::with_base_url("test-key", server.uri()).unwrap();
        let table = download("2023-08-25", "2023-08-25", &client).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.skipped, 1);
        assert_eq!(table.value(0, "name"), Some(&json!("Good")));
    }
}
