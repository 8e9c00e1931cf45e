//! Coordinate reference system codes and their definitions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ellipsoid::Ellipsoid;
use crate::helmert::{Helmert, RT90_TO_WGS84};
use crate::tmerc::TransverseMercatorParams;

/// Every coordinate reference system the workspace knows about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CrsCode {
    #[serde(rename = "WGS84_GEO")]
    Wgs84Geo,
    #[serde(rename = "SWEREF99_GEO")]
    Sweref99Geo,
    #[serde(rename = "RT90_3021")]
    Rt90,
    #[serde(rename = "WGS84_XYZ")]
    Wgs84Xyz,
    #[serde(rename = "RR92_XYZ")]
    Rr92Xyz,
}

impl CrsCode {
    /// Stable listing order.
    pub const ALL: [CrsCode; 5] = [
        CrsCode::Wgs84Geo,
        CrsCode::Sweref99Geo,
        CrsCode::Rt90,
        CrsCode::Wgs84Xyz,
        CrsCode::Rr92Xyz,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CrsCode::Wgs84Geo => "WGS84_GEO",
            CrsCode::Sweref99Geo => "SWEREF99_GEO",
            CrsCode::Rt90 => "RT90_3021",
            CrsCode::Wgs84Xyz => "WGS84_XYZ",
            CrsCode::Rr92Xyz => "RR92_XYZ",
        }
    }
}

impl fmt::Display for CrsCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lookup of a CRS code that is not registered.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown CRS code '{0}'")]
pub struct UnknownCrs(pub String);

impl FromStr for CrsCode {
    type Err = UnknownCrs;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        CrsCode::ALL
            .into_iter()
            .find(|code| code.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownCrs(wanted.to_string()))
    }
}

/// Axis order of user-facing tuples.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisOrder {
    LatLon,
    LonLat,
    /// Swedish grid convention: x = northing, y = easting.
    Xy,
    Xyz,
}

/// Geodetic datum a CRS is realized in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Datum {
    Wgs84,
    Sweref99,
    Rt90,
    /// Only reachable through the RR92 Helmert transform.
    Rr92,
}

impl Datum {
    /// Shift from this datum to WGS 84, if the projection engine has one.
    pub fn shift_to_wgs84(self) -> Option<Helmert> {
        match self {
            Datum::Wgs84 | Datum::Sweref99 => Some(Helmert::identity()),
            Datum::Rt90 => Some(Helmert::new(&RT90_TO_WGS84)),
            Datum::Rr92 => None,
        }
    }
}

/// How engine-order tuples relate to the ellipsoid.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Projection {
    /// Engine order `(lon, lat[, h])`.
    Geographic,
    /// Engine order `(northing, easting[, h])`.
    TransverseMercator(TransverseMercatorParams),
    /// Engine order `(x, y, z)`.
    Geocentric,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ProjectionDef {
    pub projection: Projection,
    pub ellipsoid: Ellipsoid,
    pub datum: Datum,
}

/// Registry entry for one CRS.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CrsInfo {
    pub code: CrsCode,
    pub definition: ProjectionDef,
    pub axis_order: AxisOrder,
    pub dimensionality: usize,
    pub description: &'static str,
}

impl CrsInfo {
    /// User-order tuple → engine-order tuple.
    ///
    /// Missing trailing values are padded with zero up to the
    /// dimensionality, lat/lon is swapped to lon/lat and at most three
    /// values are kept.
    pub fn prepare_input(&self, values: &[f64]) -> Vec<f64> {
        let mut out: Vec<f64> = values.iter().copied().take(3).collect();
        while out.len() < self.dimensionality {
            out.push(0.0);
        }
        if self.axis_order == AxisOrder::LatLon && out.len() >= 2 {
            out.swap(0, 1);
        }
        out
    }

    /// Engine-order tuple → user-order tuple truncated to the dimensionality.
    pub fn restore_output(&self, values: &[f64]) -> Vec<f64> {
        let mut out = values.to_vec();
        if self.axis_order == AxisOrder::LatLon && out.len() >= 2 {
            out.swap(0, 1);
        }
        out.truncate(self.dimensionality);
        out
    }
}
