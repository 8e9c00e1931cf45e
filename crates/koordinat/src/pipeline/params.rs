use std::fmt;
use std::str::FromStr;

use koordinat_core::{CrsCode, HeightSystem, UnknownCrs};
use serde::{Deserialize, Serialize};

/// MGRS precision used when none is configured (1 m).
pub const DEFAULT_MGRS_PRECISION: u8 = 5;

/// One requested output: a registered CRS or an MGRS grid string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Target {
    Crs(CrsCode),
    Mgrs,
}

impl Target {
    /// Key of this target in [`ConversionResults`](super::ConversionResults).
    pub fn key(self) -> &'static str {
        match self {
            Target::Crs(code) => code.as_str(),
            Target::Mgrs => "MGRS",
        }
    }

    /// Every registered CRS followed by MGRS.
    pub fn all() -> Vec<Target> {
        CrsCode::ALL
            .into_iter()
            .map(Target::Crs)
            .chain(std::iter::once(Target::Mgrs))
            .collect()
    }
}

impl From<CrsCode> for Target {
    fn from(code: CrsCode) -> Self {
        Target::Crs(code)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Target {
    type Err = UnknownCrs;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("MGRS") {
            Ok(Target::Mgrs)
        } else {
            s.parse().map(Target::Crs)
        }
    }
}

impl TryFrom<String> for Target {
    type Error = UnknownCrs;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Target> for String {
    fn from(target: Target) -> Self {
        target.key().to_string()
    }
}

fn default_mgrs_precision() -> u8 {
    DEFAULT_MGRS_PRECISION
}

/// Per-request conversion options.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvertOptions {
    /// Height system of the `HEIGHT` entry.
    #[serde(default)]
    pub height_target: HeightSystem,
    /// MGRS digits per axis, 0 (100 km) to 5 (1 m).
    #[serde(default = "default_mgrs_precision")]
    pub mgrs_precision: u8,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            height_target: HeightSystem::Ellipsoidal,
            mgrs_precision: DEFAULT_MGRS_PRECISION,
        }
    }
}

impl ConvertOptions {
    pub fn with_height_target(mut self, system: HeightSystem) -> Self {
        self.height_target = system;
        self
    }

    pub fn with_mgrs_precision(mut self, precision: u8) -> Self {
        self.mgrs_precision = precision;
        self
    }
}
