//! Vertical reference models for Swedish heights.
//!
//! - [`Rh2000Geoid`]: SWEN17 RH2000 geoid separations from a GTX grid,
//!   resolved through an [`ArtifactSource`] and loaded on first use,
//! - [`RfnModel`]: the empirical RFN polynomial, valid over mainland Sweden,
//! - [`HeightModels`]: both behind `to_ellipsoidal` / `from_ellipsoidal`.

pub mod artifacts;
mod geoid;
mod models;
mod rfn;

pub use artifacts::{
    ArtifactCache, ArtifactDownloadError, ArtifactSource, ArtifactSpec, FixedArtifact,
    SWEN17_ARTIFACT_NAME,
};
pub use geoid::{GeoidGrid, GeoidUnavailable, GridHeader, Rh2000Geoid, GTX_NO_DATA};
pub use koordinat_core::HeightSystem;
pub use models::{HeightConversion, HeightError, HeightModels};
pub use rfn::{RfnHeightUnavailable, RfnModel};
