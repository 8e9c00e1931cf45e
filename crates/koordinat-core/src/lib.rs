//! Geodetic building blocks for Swedish and international reference frames.
//!
//! This crate is purely numeric and does no I/O. It provides:
//! - reference ellipsoids and geodetic ⇄ geocentric conversion,
//! - a Gauss–Krüger Transverse Mercator projection,
//! - the seven-parameter Helmert transform (RR92 ⇄ SWEREF 99, RT 90 → WGS 84),
//! - the CRS registry with memoized [`Transformer`]s pivoting through WGS 84
//!   geocentric coordinates.

mod crs;
mod ellipsoid;
mod height_system;
mod helmert;
mod logger;
mod registry;
mod tmerc;

pub use crs::{AxisOrder, CrsCode, CrsInfo, Datum, Projection, ProjectionDef, UnknownCrs};
pub use ellipsoid::{Ellipsoid, BESSEL_1841, GRS80, WGS84};
pub use height_system::{HeightSystem, UnknownHeightSystem};
pub use helmert::{
    rr92_to_sweref99, sweref99_to_rr92, Helmert, HelmertParameters, RR92_TO_SWEREF99,
    RT90_TO_WGS84,
};
pub use registry::{CrsRegistry, TransformError, Transformer};
pub use tmerc::{TransverseMercator, TransverseMercatorParams};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_from_env, init_with_level, LOG_LEVEL_ENV};
