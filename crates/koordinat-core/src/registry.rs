//! Immutable CRS table plus a memoized transformer cache.

use std::sync::Arc;

use dashmap::DashMap;

use crate::crs::{AxisOrder, CrsCode, CrsInfo, Datum, Projection, ProjectionDef, UnknownCrs};
use crate::ellipsoid::{Ellipsoid, BESSEL_1841, GRS80, WGS84};
use crate::helmert::Helmert;
use crate::tmerc::{TransverseMercator, TransverseMercatorParams};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Failure to build or apply a transformer.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    #[error(transparent)]
    UnknownCrs(#[from] UnknownCrs),
    #[error("no datum path between {src} and {dst}; RR92 goes through the Helmert transform")]
    NoDatumPath { src: CrsCode, dst: CrsCode },
    #[error("coordinate input must be at least two finite values, got {0:?}")]
    NonFinite(Vec<f64>),
}

/// RT 90 2.5 gon V, EPSG:3021.
const RT90_PARAMS: TransverseMercatorParams = TransverseMercatorParams {
    central_meridian: 15.0 + 48.0 / 60.0 + 29.8 / 3600.0,
    scale: 1.0,
    false_northing: 0.0,
    false_easting: 1_500_000.0,
};

fn builtin_table() -> Vec<CrsInfo> {
    let def = |projection, ellipsoid, datum| ProjectionDef {
        projection,
        ellipsoid,
        datum,
    };
    vec![
        CrsInfo {
            code: CrsCode::Wgs84Geo,
            definition: def(Projection::Geographic, WGS84, Datum::Wgs84),
            axis_order: AxisOrder::LatLon,
            dimensionality: 3,
            description: "WGS 84 geographic latitude/longitude/height",
        },
        CrsInfo {
            code: CrsCode::Sweref99Geo,
            definition: def(Projection::Geographic, GRS80, Datum::Sweref99),
            axis_order: AxisOrder::LatLon,
            dimensionality: 2,
            description: "SWEREF 99 geographic latitude/longitude",
        },
        CrsInfo {
            code: CrsCode::Rt90,
            definition: def(
                Projection::TransverseMercator(RT90_PARAMS),
                BESSEL_1841,
                Datum::Rt90,
            ),
            axis_order: AxisOrder::Xy,
            dimensionality: 2,
            description: "RT 90 2.5 gon V grid (northing, easting)",
        },
        CrsInfo {
            code: CrsCode::Wgs84Xyz,
            definition: def(Projection::Geocentric, WGS84, Datum::Wgs84),
            axis_order: AxisOrder::Xyz,
            dimensionality: 3,
            description: "WGS 84 geocentric X/Y/Z",
        },
        CrsInfo {
            code: CrsCode::Rr92Xyz,
            definition: def(Projection::Geocentric, GRS80, Datum::Rr92),
            axis_order: AxisOrder::Xyz,
            dimensionality: 3,
            description: "RR92 geocentric X/Y/Z",
        },
    ]
}

/// One side of a transformer: engine-order tuple ⇄ WGS 84 geocentric.
#[derive(Clone, Debug)]
struct Stage {
    ellipsoid: Ellipsoid,
    grid: Option<TransverseMercator>,
    geocentric: bool,
    shift: Helmert,
}

impl Stage {
    fn new(info: &CrsInfo) -> Option<Self> {
        let ProjectionDef {
            projection,
            ellipsoid,
            datum,
        } = info.definition;
        let shift = datum.shift_to_wgs84()?;
        let grid = match projection {
            Projection::TransverseMercator(params) => {
                Some(TransverseMercator::new(&ellipsoid, params))
            }
            _ => None,
        };
        Some(Self {
            ellipsoid,
            grid,
            geocentric: projection == Projection::Geocentric,
            shift,
        })
    }

    fn to_wgs84(&self, v: &[f64]) -> [f64; 3] {
        let third = v.get(2).copied().unwrap_or(0.0);
        let local = if self.geocentric {
            [v[0], v[1], third]
        } else if let Some(tm) = &self.grid {
            let (lat, lon) = tm.inverse(v[0], v[1]);
            self.ellipsoid.geodetic_to_geocentric(lat, lon, third)
        } else {
            self.ellipsoid.geodetic_to_geocentric(v[1], v[0], third)
        };
        self.shift.forward(local[0], local[1], local[2])
    }

    fn from_wgs84(&self, xyz: [f64; 3]) -> Vec<f64> {
        let local = self.shift.inverse(xyz[0], xyz[1], xyz[2]);
        if self.geocentric {
            return local.to_vec();
        }
        let [lat, lon, h] = self
            .ellipsoid
            .geocentric_to_geodetic(local[0], local[1], local[2]);
        match &self.grid {
            Some(tm) => {
                let (northing, easting) = tm.forward(lat, lon);
                vec![northing, easting, h]
            }
            None => vec![lon, lat, h],
        }
    }
}

/// Reusable mapping between two registered CRSes, in engine order.
#[derive(Clone, Debug)]
pub struct Transformer {
    src: CrsCode,
    dst: CrsCode,
    from: Stage,
    to: Stage,
}

impl Transformer {
    fn new(src: &CrsInfo, dst: &CrsInfo) -> Result<Self, TransformError> {
        let no_path = || TransformError::NoDatumPath {
            src: src.code,
            dst: dst.code,
        };
        Ok(Self {
            src: src.code,
            dst: dst.code,
            from: Stage::new(src).ok_or_else(no_path)?,
            to: Stage::new(dst).ok_or_else(no_path)?,
        })
    }

    pub fn source(&self) -> CrsCode {
        self.src
    }

    pub fn target(&self) -> CrsCode {
        self.dst
    }

    /// Map an engine-order tuple (two or three values) into the target CRS.
    ///
    /// The result always has three components; callers truncate through
    /// [`CrsInfo::restore_output`].
    pub fn transform(&self, values: &[f64]) -> Result<Vec<f64>, TransformError> {
        if values.len() < 2 || values.iter().any(|v| !v.is_finite()) {
            return Err(TransformError::NonFinite(values.to_vec()));
        }
        let xyz = self.from.to_wgs84(values);
        let out = self.to.from_wgs84(xyz);
        // far outside the projection's domain the series overflow
        if out.iter().any(|v| !v.is_finite()) {
            return Err(TransformError::NonFinite(values.to_vec()));
        }
        Ok(out)
    }
}

/// The registry of supported CRSes.
///
/// Construction is cheap and the table is immutable; transformers are built
/// on first use and shared afterwards.
#[derive(Debug)]
pub struct CrsRegistry {
    table: Vec<CrsInfo>,
    cache: DashMap<(CrsCode, CrsCode), Arc<Transformer>>,
}

impl Default for CrsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CrsRegistry {
    pub fn new() -> Self {
        Self {
            table: builtin_table(),
            cache: DashMap::new(),
        }
    }

    pub fn get_crs_info(&self, code: CrsCode) -> Result<&CrsInfo, UnknownCrs> {
        self.table
            .iter()
            .find(|info| info.code == code)
            .ok_or_else(|| UnknownCrs(code.to_string()))
    }

    /// String lookup, e.g. from configuration.
    pub fn lookup(&self, code: &str) -> Result<&CrsInfo, UnknownCrs> {
        self.get_crs_info(code.parse()?)
    }

    pub fn list_supported_codes(&self) -> Vec<CrsCode> {
        self.table.iter().map(|info| info.code).collect()
    }

    /// Cached transformer for the ordered pair `(src, dst)`.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn get_transformer(
        &self,
        src: CrsCode,
        dst: CrsCode,
    ) -> Result<Arc<Transformer>, TransformError> {
        if let Some(hit) = self.cache.get(&(src, dst)) {
            return Ok(Arc::clone(hit.value()));
        }

        let src_info = self.get_crs_info(src)?;
        let dst_info = self.get_crs_info(dst)?;
        let entry = self.cache.entry((src, dst)).or_try_insert_with(|| {
            log::debug!("building transformer {src} -> {dst}");
            Transformer::new(src_info, dst_info).map(Arc::new)
        })?;
        Ok(Arc::clone(entry.value()))
    }

    /// Number of memoized transformers.
    pub fn cached_transformers(&self) -> usize {
        self.cache.len()
    }
}
