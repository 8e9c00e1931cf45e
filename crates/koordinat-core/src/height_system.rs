use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Vertical reference a height value is expressed in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HeightSystem {
    /// Height above the reference ellipsoid.
    #[default]
    Ellipsoidal,
    /// Swedish national height system, via the SWEN17 geoid grid.
    Rh2000,
    /// Empirical polynomial used alongside RR92.
    Rfn,
}

impl HeightSystem {
    pub fn as_str(self) -> &'static str {
        match self {
            HeightSystem::Ellipsoidal => "ELLIPSOIDAL",
            HeightSystem::Rh2000 => "RH2000",
            HeightSystem::Rfn => "RFN",
        }
    }
}

impl fmt::Display for HeightSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown height system '{0}'")]
pub struct UnknownHeightSystem(pub String);

impl FromStr for HeightSystem {
    type Err = UnknownHeightSystem;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ELLIPSOIDAL" => Ok(HeightSystem::Ellipsoidal),
            "RH2000" => Ok(HeightSystem::Rh2000),
            "RFN" => Ok(HeightSystem::Rfn),
            _ => Err(UnknownHeightSystem(s.trim().to_string())),
        }
    }
}
