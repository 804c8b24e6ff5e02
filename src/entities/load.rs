use serde::{Deserialize, Serialize};

/// The parts of a load that a bid listing carries along for display and search.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadSummary {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub pickup_location: String,
    #[serde(default)]
    pub delivery_location: String,
    #[serde(default)]
    pub cargo_type: String,
}
