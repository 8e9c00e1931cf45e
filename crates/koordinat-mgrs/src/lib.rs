//! Military Grid Reference System over UTM / WGS 84.
//!
//! - [`encode`] truncates a position to the south-west corner of its cell at
//!   0–5 digits per axis (5 = 1 m),
//! - [`decode`] returns the *centre* of the referenced cell, so an encode /
//!   decode round trip stays within half a cell diagonal.
//!
//! Only the UTM part of MGRS (80°S to 84°N) is covered; the polar UPS
//! lettering is not.

mod error;
mod grid;
mod letters;

pub use error::MgrsError;
pub use grid::{GridReference, MAX_PRECISION};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Encode `(lat, lon)` in WGS 84 degrees as an MGRS string.
#[cfg_attr(feature = "tracing", instrument(level = "trace"))]
pub fn encode(lat: f64, lon: f64, precision: u8) -> Result<String, MgrsError> {
    GridReference::from_lat_lon(lat, lon, precision).map(|r| r.to_string())
}

/// Decode an MGRS string to the `(lat, lon)` of the cell centre.
#[cfg_attr(feature = "tracing", instrument(level = "trace"))]
pub fn decode(text: &str) -> Result<(f64, f64), MgrsError> {
    text.parse::<GridReference>()?.to_lat_lon()
}
