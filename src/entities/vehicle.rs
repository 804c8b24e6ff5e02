use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VehicleDetails {
    #[serde(rename = "type")]
    pub vehicle_type: VehicleType,
    /// Tonnes.
    pub capacity: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleType {
    Pickup,
    Van,
    SmallTruck,
    MediumTruck,
    LargeTruck,
    HeavyTruck,
    Trailer,
    Refrigerated,
    Flatbed,
    Container,
    #[serde(other)]
    Other,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Kes,
    Usd,
    Ugx,
    Tzs,
}

impl Currency {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Kes => "KES",
            Self::Usd => "USD",
            Self::Ugx => "UGX",
            Self::Tzs => "TZS",
        }
    }
}
