//! Calls to the Västtrafik REST v2 API. The caller's access token is passed through as is.
use std::time::Duration;

use chrono::DateTime;
use chrono_tz::Tz;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::{Instrument, info, info_span, warn};

use crate::{
    error::{ApiError, NOTHING_FOUND},
    model::vasttrafik_api_model::{
        DepartureBoardResponse, LocationList, LocationListResponse, VasttrafikDeparture,
    },
};

/// The board error that means the time window was too short rather than something being wrong
pub const NO_JOURNEYS_FOUND: &str = "No journeys found";

/// Departure board windows in minutes, tried in order while the board comes back empty
pub const TIME_SPANS: [u32; 2] = [90, 1440];

#[derive(Debug, Clone)]
pub struct VasttrafikClient {
    http: Client,
    base_url: String,
}

impl VasttrafikClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(VasttrafikClient {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Gets the departures from a stop starting at `now`.
    /// An empty board is retried with the next larger window from [`TIME_SPANS`].
    #[tracing::instrument(err, skip(self, access_token, now))]
    pub async fn departures(
        &self,
        stop_id: &str,
        access_token: &str,
        now: DateTime<Tz>,
    ) -> Result<Vec<VasttrafikDeparture>, ApiError> {
        for (attempt, time_span) in TIME_SPANS.iter().enumerate() {
            let board = self
                .departure_board(stop_id, access_token, now, *time_span)
                .await?
                .departure_board;

            match board.error.as_deref() {
                None => {
                    let departures = board.departures.unwrap_or_default();
                    info!("got {} departures", departures.len());
                    return Ok(departures);
                }
                Some(NO_JOURNEYS_FOUND) if attempt + 1 < TIME_SPANS.len() => {
                    info!("no journeys within {time_span} minutes, widening the window");
                }
                Some(error) => {
                    warn!(
                        "departure board error {error}: {}",
                        board.error_text.as_deref().unwrap_or_default()
                    );
                    return Err(ApiError::NotFound(NOTHING_FOUND.to_string()));
                }
            }
        }

        Err(ApiError::NotFound(NOTHING_FOUND.to_string()))
    }

    async fn departure_board(
        &self,
        stop_id: &str,
        access_token: &str,
        now: DateTime<Tz>,
        time_span: u32,
    ) -> Result<DepartureBoardResponse, ApiError> {
        let date = now.format("%Y-%m-%d").to_string();
        let time = now.format("%H:%M").to_string();
        let time_span = time_span.to_string();

        let response = self
            .http
            .get(format!("{}/departureBoard", self.base_url))
            .bearer_auth(access_token)
            .query(&[
                ("id", stop_id),
                ("date", date.as_str()),
                ("time", time.as_str()),
                ("format", "json"),
                ("timeSpan", time_span.as_str()),
                ("maxDeparturesPerLine", "2"),
                ("needJourneyDetail", "0"),
            ])
            .send()
            .instrument(info_span!("Fetching departure board", time_span = %time_span))
            .await?;

        read_json(response).await
    }

    #[tracing::instrument(err, skip(self, access_token))]
    pub async fn nearby_stops(
        &self,
        latitude: f64,
        longitude: f64,
        access_token: &str,
    ) -> Result<LocationList, ApiError> {
        let response = self
            .http
            .get(format!("{}/location.nearbystops", self.base_url))
            .bearer_auth(access_token)
            .query(&[
                ("originCoordLat", latitude.to_string()),
                ("originCoordLong", longitude.to_string()),
                ("format", "json".to_string()),
            ])
            .send()
            .instrument(info_span!("Fetching nearby stops"))
            .await?;

        let list: LocationListResponse = read_json(response).await?;

        Ok(log_location_error(list.location_list))
    }

    #[tracing::instrument(err, skip(self, access_token))]
    pub async fn search_stops(
        &self,
        search: &str,
        access_token: &str,
    ) -> Result<LocationList, ApiError> {
        let response = self
            .http
            .get(format!("{}/location.name", self.base_url))
            .bearer_auth(access_token)
            .query(&[("input", search), ("format", "json")])
            .send()
            .instrument(info_span!("Searching stops"))
            .await?;

        let list: LocationListResponse = read_json(response).await?;

        Ok(log_location_error(list.location_list))
    }
}

fn log_location_error(list: LocationList) -> LocationList {
    if let Some(error) = &list.error {
        warn!("location list error {error}");
    }

    list
}

/// Non-2xx answers become an [`ApiError::UpstreamFailure`] carrying the upstream body
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();

    let body = response
        .text()
        .instrument(info_span!("Reading body of response"))
        .await?;

    if !status.is_success() {
        let message = match body.trim() {
            "" => status.to_string(),
            description => description.to_string(),
        };
        return Err(ApiError::UpstreamFailure(message));
    }

    Ok(serde_json::from_str(&body)?)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::TimeZone;
    use chrono_tz::Europe::Stockholm;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{header, method, path, query_param},
    };

    use super::VasttrafikClient;
    use crate::error::ApiError;

    fn client(server: &MockServer) -> VasttrafikClient {
        VasttrafikClient::new(&server.uri(), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_departure_board_query() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/departureBoard"))
            .and(header("Authorization", "Bearer secret"))
            .and(query_param("id", "9021014001760000"))
            .and(query_param("date", "2024-03-01"))
            .and(query_param("time", "08:05"))
            .and(query_param("timeSpan", "90"))
            .and(query_param("maxDeparturesPerLine", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"DepartureBoard": {"Departure": {"name": "Buss 16", "time": "08:10", "date": "2024-03-01"}}}"#,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let now = Stockholm.with_ymd_and_hms(2024, 3, 1, 8, 5, 0).unwrap();
        let departures = client(&server)
            .departures("9021014001760000", "secret", now)
            .await
            .unwrap();

        assert_eq!(departures.len(), 1);
        assert_eq!(departures[0].name.as_deref(), Some("Buss 16"));
    }

    #[tokio::test]
    async fn test_no_journeys_on_every_window_is_not_found() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/departureBoard"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"DepartureBoard": {"error": "No journeys found", "errorText": "No journeys found"}}"#,
            ))
            .expect(2)
            .mount(&server)
            .await;

        let now = Stockholm.with_ymd_and_hms(2024, 3, 1, 23, 50, 0).unwrap();
        let err = client(&server).departures("1", "secret", now).await.unwrap_err();

        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_other_board_error_is_not_retried() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/departureBoard"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"DepartureBoard": {"error": "R0007", "errorText": "Invalid stop id"}}"#,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let now = Stockholm.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let err = client(&server).departures("nope", "secret", now).await.unwrap_err();

        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_non_success_status_keeps_upstream_description() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/location.name"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Invalid credentials"))
            .mount(&server)
            .await;

        let err = client(&server).search_stops("Brunnsparken", "expired").await.unwrap_err();

        match err {
            ApiError::UpstreamFailure(message) => assert_eq!(message, "Invalid credentials"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_timeout_is_upstream_failure() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/location.nearbystops"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"LocationList": {}}"#)
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let client = VasttrafikClient::new(&server.uri(), Duration::from_millis(50)).unwrap();
        let err = client.nearby_stops(57.7, 11.97, "secret").await.unwrap_err();

        assert!(matches!(err, ApiError::UpstreamFailure(_)));
    }
}
