use serde::Serialize;

/// A departure as shown by the client. After merging there is at most one per
/// `(name, direction)` pair, carrying the first and, if there is one, the
/// following departure time.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Departure {
    pub name: String,
    pub sname: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// Direction with the via part removed
    pub direction: String,
    /// "via X", or empty
    pub via: String,
    pub track: String,
    pub accessibility: String,
    pub bg_color: String,
    pub fg_color: String,
    pub journeyid: String,
    pub is_live: bool,
    /// `%H:%M` of the first departure
    pub clock_left: String,
    pub clock_next: Option<String>,
    /// Minutes until the first departure, never negative
    pub time_left: i64,
    pub time_next: Option<i64>,
}
