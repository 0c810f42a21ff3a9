use itertools::Itertools;
use tracing::info;

use crate::{
    error::{ApiError, NO_STOPS_MATCHED, NOTHING_FOUND},
    model::{
        stop_summary::StopSummary,
        vasttrafik_api_model::{LocationList, StopCandidate},
    },
};

pub const MAX_SEARCH_RESULTS: usize = 10;

/// Stops near a coordinate, without the platform level entries.
/// The remaining stops are returned untouched.
pub fn nearby_stops(list: LocationList) -> Result<Vec<StopCandidate>, ApiError> {
    let stops = list
        .stop_locations
        .ok_or_else(|| ApiError::NotFound(NOTHING_FOUND.to_string()))?;

    let stops = stops
        .into_iter()
        .filter(|s| !s.is_platform())
        .collect_vec();

    info!("found {} nearby stops", stops.len());

    Ok(stops)
}

/// The first [`MAX_SEARCH_RESULTS`] stops matching a name search, in the order the API ranked them
pub fn search_results(list: LocationList) -> Result<Vec<StopSummary>, ApiError> {
    let stops = list
        .stop_locations
        .unwrap_or_default()
        .into_iter()
        .take(MAX_SEARCH_RESULTS)
        .map(StopSummary::from)
        .collect_vec();

    if stops.is_empty() {
        return Err(ApiError::NotFound(NO_STOPS_MATCHED.to_string()));
    }

    Ok(stops)
}
