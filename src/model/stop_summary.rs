use serde::Serialize;

use super::vasttrafik_api_model::StopCandidate;

/// What the client gets back from a stop name search
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StopSummary {
    pub id: String,
    pub name: String,
}

impl From<StopCandidate> for StopSummary {
    fn from(value: StopCandidate) -> Self {
        StopSummary {
            id: value.id.unwrap_or_default(),
            name: value.name.unwrap_or_default(),
        }
    }
}
