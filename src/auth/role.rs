use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    CargoOwner,
    Driver,
}

impl Role {
    pub fn name(&self) -> &'static str {
        match self {
            Self::CargoOwner => "cargo_owner",
            Self::Driver => "driver",
        }
    }

    pub fn other(&self) -> Role {
        match self {
            Self::CargoOwner => Self::Driver,
            Self::Driver => Self::CargoOwner,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "cargo_owner" | "owner" | "shipper" => Ok(Self::CargoOwner),
            "driver" | "transporter" => Ok(Self::Driver),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}
