//! HTTP surface used by the mobile app
use axum::{
    Json, Router,
    extract::{FromRequestParts, State, rejection::JsonRejection},
    http::request::Parts,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{
    error::ApiError,
    model::{
        departure::Departure, stop_summary::StopSummary, vasttrafik_api_model::StopCandidate,
    },
    services::{departures::normalize_departures, stops},
    vasttrafik_client::VasttrafikClient,
};

#[derive(Debug, Clone)]
pub struct AppState {
    pub client: VasttrafikClient,
    /// Zone the departure board times are given in
    pub timezone: Tz,
}

impl AppState {
    fn now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.timezone)
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(hello_world))
        .route("/api/vasttrafik/departures", post(departures))
        .route("/api/vasttrafik/gps", post(nearby_stops))
        .route("/api/vasttrafik/stops", post(search_stops))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// The caller's Västtrafik token from the `access_token` header
#[derive(Debug)]
pub struct AccessToken(String);

impl<S> FromRequestParts<S> for AccessToken
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get("access_token")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| AccessToken(v.to_string()))
            .ok_or_else(|| ApiError::BadRequest("Missing access_token header".to_string()))
    }
}

fn read_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

#[derive(Debug, Deserialize)]
pub struct DeparturesRequest {
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct DeparturesResponse {
    pub departures: Vec<Departure>,
    pub timestamp: String,
}

#[derive(Debug, Deserialize)]
pub struct NearbyStopsRequest {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Deserialize)]
pub struct SearchStopsRequest {
    pub search: String,
}

#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub data: Vec<T>,
    pub timestamp: String,
}

async fn hello_world() -> &'static str {
    "Hello, World!"
}

#[tracing::instrument(skip_all)]
async fn departures(
    State(state): State<AppState>,
    AccessToken(access_token): AccessToken,
    payload: Result<Json<DeparturesRequest>, JsonRejection>,
) -> Result<Json<DeparturesResponse>, ApiError> {
    let request = read_body(payload)?;
    let stop_id = request.id.trim();
    if stop_id.is_empty() {
        return Err(ApiError::BadRequest("id must not be empty".to_string()));
    }

    info!("get_departures for {stop_id}");

    let now = state.now();
    let raw = state.client.departures(stop_id, &access_token, now).await?;

    Ok(Json(DeparturesResponse {
        departures: normalize_departures(raw, now),
        timestamp: now.to_rfc3339(),
    }))
}

#[tracing::instrument(skip_all)]
async fn nearby_stops(
    State(state): State<AppState>,
    AccessToken(access_token): AccessToken,
    payload: Result<Json<NearbyStopsRequest>, JsonRejection>,
) -> Result<Json<DataResponse<StopCandidate>>, ApiError> {
    let request = read_body(payload)?;
    if !(-90.0..=90.0).contains(&request.latitude) || !(-180.0..=180.0).contains(&request.longitude)
    {
        return Err(ApiError::BadRequest(
            "latitude must be -90 to 90 and longitude -180 to 180".to_string(),
        ));
    }

    info!(
        "get_nearby_stops for {},{}",
        request.latitude, request.longitude
    );

    let list = state
        .client
        .nearby_stops(request.latitude, request.longitude, &access_token)
        .await?;

    Ok(Json(DataResponse {
        data: stops::nearby_stops(list)?,
        timestamp: state.now().to_rfc3339(),
    }))
}

#[tracing::instrument(skip_all)]
async fn search_stops(
    State(state): State<AppState>,
    AccessToken(access_token): AccessToken,
    payload: Result<Json<SearchStopsRequest>, JsonRejection>,
) -> Result<Json<DataResponse<StopSummary>>, ApiError> {
    let request = read_body(payload)?;
    let search = request.search.trim();
    if search.is_empty() {
        return Err(ApiError::BadRequest("search must not be empty".to_string()));
    }

    info!("search_stops for {search}");

    let list = state.client.search_stops(search, &access_token).await?;

    Ok(Json(DataResponse {
        data: stops::search_results(list)?,
        timestamp: state.now().to_rfc3339(),
    }))
}
