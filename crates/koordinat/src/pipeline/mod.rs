//! Conversion pipeline.
//!
//! Every conversion goes through one pivot: the parsed input is turned into a
//! [`CanonicalCoordinate`] (WGS84 geocentric XYZ plus geographic lat/lon/h),
//! its height is normalized to ellipsoidal, and each requested target is
//! derived from that pivot.

mod converter;
mod error;
mod params;
mod result;

pub use converter::Converter;
pub use error::ConvertError;
pub use params::{ConvertOptions, Target, DEFAULT_MGRS_PRECISION};
pub use result::{CanonicalCoordinate, ConversionResults, TargetValue, HEIGHT_KEY};
