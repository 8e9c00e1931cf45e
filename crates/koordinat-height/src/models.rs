use std::sync::Arc;

use koordinat_core::HeightSystem;
use serde::Serialize;

use crate::artifacts::{ArtifactCache, ArtifactSource};
use crate::geoid::{GeoidUnavailable, Rh2000Geoid};
use crate::rfn::{RfnHeightUnavailable, RfnModel};

#[cfg(feature = "tracing")]
use tracing::instrument;

#[derive(thiserror::Error, Debug)]
pub enum HeightError {
    #[error(transparent)]
    Geoid(#[from] GeoidUnavailable),
    #[error(transparent)]
    Rfn(#[from] RfnHeightUnavailable),
}

/// A converted height plus the separation that was applied, if any.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct HeightConversion {
    pub height: f64,
    pub separation: Option<f64>,
}

/// Both vertical models behind one interface.
#[derive(Debug)]
pub struct HeightModels {
    geoid: Rh2000Geoid,
    rfn: RfnModel,
}

impl Default for HeightModels {
    /// Geoid grid from the default artifact cache.
    fn default() -> Self {
        Self::new(Arc::new(ArtifactCache::from_env()))
    }
}

impl HeightModels {
    pub fn new(source: Arc<dyn ArtifactSource>) -> Self {
        Self::with_rfn(source, RfnModel::default())
    }

    pub fn with_rfn(source: Arc<dyn ArtifactSource>, rfn: RfnModel) -> Self {
        Self {
            geoid: Rh2000Geoid::new(source),
            rfn,
        }
    }

    pub fn geoid(&self) -> &Rh2000Geoid {
        &self.geoid
    }

    pub fn rfn(&self) -> &RfnModel {
        &self.rfn
    }

    /// Separation applied for `system`; `None` for ellipsoidal heights.
    fn separation(
        &self,
        system: HeightSystem,
        lat: f64,
        lon: f64,
    ) -> Result<Option<f64>, HeightError> {
        Ok(match system {
            HeightSystem::Ellipsoidal => None,
            HeightSystem::Rh2000 => Some(self.geoid.separation(lat, lon)?),
            HeightSystem::Rfn => Some(self.rfn.separation(lat, lon)?),
        })
    }

    /// Height in `system` → ellipsoidal height.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip(self)))]
    pub fn to_ellipsoidal(
        &self,
        system: HeightSystem,
        lat: f64,
        lon: f64,
        height: f64,
    ) -> Result<HeightConversion, HeightError> {
        let separation = self.separation(system, lat, lon)?;
        Ok(HeightConversion {
            height: height + separation.unwrap_or(0.0),
            separation,
        })
    }

    /// Ellipsoidal height → height in `system`.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip(self)))]
    pub fn from_ellipsoidal(
        &self,
        system: HeightSystem,
        lat: f64,
        lon: f64,
        height: f64,
    ) -> Result<HeightConversion, HeightError> {
        let separation = self.separation(system, lat, lon)?;
        Ok(HeightConversion {
            height: height - separation.unwrap_or(0.0),
            separation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::FixedArtifact;
    use crate::geoid::{GeoidGrid, GridHeader};
    use approx::assert_abs_diff_eq;

    fn models_with_flat_geoid(dir: &std::path::Path, value: f32) -> HeightModels {
        let path = dir.join("geoid.gtx");
        let grid = GeoidGrid::new(
            GridHeader {
                lat0: 54.0,
                lon0: 10.0,
                dlat: 1.0,
                dlon: 1.0,
                rows: 17,
                cols: 16,
            },
            vec![value; 17 * 16],
        )
        .unwrap();
        grid.write_gtx(std::fs::File::create(&path).unwrap()).unwrap();
        HeightModels::new(Arc::new(FixedArtifact::new(path)))
    }

    #[test]
    fn ellipsoidal_is_identity() {
        let models = HeightModels::new(Arc::new(FixedArtifact::new("/nonexistent.gtx")));
        let out = models
            .to_ellipsoidal(HeightSystem::Ellipsoidal, 0.0, 0.0, 12.5)
            .unwrap();
        assert_eq!(
            out,
            HeightConversion {
                height: 12.5,
                separation: None
            }
        );
        assert!(!models.geoid().is_loaded());
    }

    #[test]
    fn rh2000_applies_the_same_separation_both_ways() {
        let dir = tempfile::tempdir().unwrap();
        let models = models_with_flat_geoid(dir.path(), 24.25);

        let ell = models
            .to_ellipsoidal(HeightSystem::Rh2000, 59.3, 18.0, 10.0)
            .unwrap();
        assert_abs_diff_eq!(ell.height, 34.25, epsilon = 1e-6);
        assert_eq!(ell.separation, Some(24.25));

        let back = models
            .from_ellipsoidal(HeightSystem::Rh2000, 59.3, 18.0, ell.height)
            .unwrap();
        assert_abs_diff_eq!(back.height, 10.0, epsilon = 1e-9);
    }

    #[test]
    fn missing_geoid_surfaces_as_error() {
        let models = HeightModels::new(Arc::new(FixedArtifact::new("/nonexistent.gtx")));
        assert!(matches!(
            models.from_ellipsoidal(HeightSystem::Rh2000, 59.3, 18.0, 10.0),
            Err(HeightError::Geoid(GeoidUnavailable::Artifact(_)))
        ));
    }

    #[test]
    fn rfn_outside_sweden_is_unavailable() {
        let models = HeightModels::new(Arc::new(FixedArtifact::new("/nonexistent.gtx")));
        assert!(matches!(
            models.to_ellipsoidal(HeightSystem::Rfn, 48.0, 2.0, 0.0),
            Err(HeightError::Rfn(_))
        ));
        let inside = models
            .to_ellipsoidal(HeightSystem::Rfn, 62.0, 15.0, 0.0)
            .unwrap();
        assert_abs_diff_eq!(inside.height, 0.42, epsilon = 1e-12);
    }
}
