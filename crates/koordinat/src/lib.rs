//! High-level facade crate for the `koordinat-*` workspace.
//!
//! This crate provides:
//! - stable, convenient re-exports of the underlying crates
//! - the conversion pipeline ([`Converter`]) that takes a parsed coordinate
//!   through a WGS84 pivot to any set of targets
//! - a JSON [`ConverterConfig`]
//!
//! ## Quickstart
//!
//! ```no_run
//! use koordinat::{ConvertOptions, Converter, Target};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let converter = Converter::new();
//! let parsed = converter.parse("59°19'45\"N 18°04'30\"E")?;
//! let targets = ["RT90_3021".parse::<Target>()?, Target::Mgrs];
//! let results = converter.convert_to_targets(&parsed, &targets, &ConvertOptions::default())?;
//! println!("{:?}", results.coordinates("RT90_3021"));
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `koordinat::core`: CRS registry, ellipsoids, Transverse Mercator, Helmert.
//! - `koordinat::parse`: free-text coordinate parser.
//! - `koordinat::mgrs`: MGRS encode/decode.
//! - `koordinat::height`: RH2000 geoid grid, RFN surface, artifact cache.

pub use koordinat_core as core;
pub use koordinat_height as height;
pub use koordinat_mgrs as mgrs;
pub use koordinat_parse as parse;

pub use koordinat_core::{CrsCode, CrsRegistry, HeightSystem, TransformError, UnknownCrs};
pub use koordinat_height::{GeoidUnavailable, HeightError, HeightModels, RfnHeightUnavailable};
pub use koordinat_mgrs::MgrsError;
pub use koordinat_parse::{ParseError, ParsedCoordinate, SourceFormat};

mod config;
mod pipeline;

pub use config::{ConfigError, ConverterConfig};
pub use pipeline::{
    CanonicalCoordinate, ConversionResults, ConvertError, ConvertOptions, Converter, Target,
    TargetValue, DEFAULT_MGRS_PRECISION, HEIGHT_KEY,
};
