use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::utils::one_or_many;

#[derive(Debug, Deserialize)]
pub struct DepartureBoardResponse {
    #[serde(rename = "DepartureBoard")]
    pub departure_board: DepartureBoard,
}

#[derive(Debug, Deserialize)]
pub struct DepartureBoard {
    /// Set instead of `Departure` when the board couldn't be produced,
    /// e.g. "No journeys found"
    pub error: Option<String>,
    #[serde(rename = "errorText")]
    pub error_text: Option<String>,
    /// A bare object when only one departure matched
    #[serde(rename = "Departure", default, deserialize_with = "one_or_many")]
    pub departures: Option<Vec<VasttrafikDeparture>>,
}

/// One row of the departure board. Every field is optional on the wire.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct VasttrafikDeparture {
    pub name: Option<String>,
    pub sname: Option<String>,
    /// Can contain a "via X" suffix
    pub direction: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub track: Option<String>,
    pub accessibility: Option<String>,
    #[serde(rename = "bgColor")]
    pub bg_color: Option<String>,
    #[serde(rename = "fgColor")]
    pub fg_color: Option<String>,
    pub journeyid: Option<String>,
    /// Scheduled, `%Y-%m-%d`
    pub date: Option<String>,
    /// Scheduled, `%H:%M`
    pub time: Option<String>,
    /// Real time prediction, only present for live departures
    #[serde(rename = "rtDate")]
    pub rt_date: Option<String>,
    #[serde(rename = "rtTime")]
    pub rt_time: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LocationListResponse {
    #[serde(rename = "LocationList")]
    pub location_list: LocationList,
}

#[derive(Debug, Deserialize)]
pub struct LocationList {
    pub error: Option<String>,
    #[serde(rename = "StopLocation", default, deserialize_with = "one_or_many")]
    pub stop_locations: Option<Vec<StopCandidate>>,
}

/// A stop as returned by `location.nearbystops` and `location.name`.
///
/// Keys other than `id` and `name` are kept as-is so the stop can be handed
/// back to the client unmodified.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct StopCandidate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

impl StopCandidate {
    /// Platform level results carry the platform in `track`
    pub fn is_platform(&self) -> bool {
        self.rest.contains_key("track")
    }
}
