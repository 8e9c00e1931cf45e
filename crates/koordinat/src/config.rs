//! JSON configuration for a [`Converter`].

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::{env, fs};

use koordinat_core::{CrsCode, HeightSystem};
use koordinat_height::artifacts::ARTIFACTS_DIR_ENV;
use koordinat_height::{ArtifactCache, ArtifactSource, FixedArtifact, HeightModels};
use serde::{Deserialize, Serialize};

use crate::pipeline::{ConvertOptions, Converter, Target, DEFAULT_MGRS_PRECISION};

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

fn default_crs() -> CrsCode {
    CrsCode::Sweref99Geo
}

fn default_mgrs_precision() -> u8 {
    DEFAULT_MGRS_PRECISION
}

fn default_targets() -> Vec<Target> {
    Target::all()
}

/// Converter settings, usually loaded from a JSON file.
///
/// Every field is optional in the file. Unknown CRS codes are rejected at
/// load time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConverterConfig {
    /// CRS for plain latitude/longitude input.
    #[serde(default = "default_crs")]
    pub default_crs: CrsCode,
    #[serde(default = "default_targets")]
    pub targets: Vec<Target>,
    #[serde(default = "default_mgrs_precision")]
    pub mgrs_precision: u8,
    #[serde(default)]
    pub height_target: HeightSystem,
    /// Artifact cache directory; `$COORDINATE_ARTIFACTS_DIR` or
    /// `~/.coordinate_converter/artifacts` when unset.
    #[serde(default)]
    pub artifacts_dir: Option<PathBuf>,
    /// Explicit geoid grid file. Takes precedence over the cache and skips
    /// checksum verification.
    #[serde(default)]
    pub geoid_grid_path: Option<PathBuf>,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            default_crs: default_crs(),
            targets: default_targets(),
            mgrs_precision: DEFAULT_MGRS_PRECISION,
            height_target: HeightSystem::Ellipsoidal,
            artifacts_dir: None,
            geoid_grid_path: None,
        }
    }
}

impl ConverterConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Let `$COORDINATE_ARTIFACTS_DIR` override `artifacts_dir`.
    pub fn with_env_overrides(self) -> Self {
        self.with_artifacts_override(env::var_os(ARTIFACTS_DIR_ENV))
    }

    fn with_artifacts_override(mut self, dir: Option<OsString>) -> Self {
        if let Some(dir) = dir.filter(|d| !d.is_empty()) {
            self.artifacts_dir = Some(PathBuf::from(dir));
        }
        self
    }

    pub fn convert_options(&self) -> ConvertOptions {
        ConvertOptions {
            height_target: self.height_target,
            mgrs_precision: self.mgrs_precision,
        }
    }

    /// Where the geoid grid comes from.
    pub fn artifact_source(&self) -> Arc<dyn ArtifactSource> {
        match (&self.geoid_grid_path, &self.artifacts_dir) {
            (Some(path), _) => Arc::new(FixedArtifact::new(path)),
            (None, Some(dir)) => Arc::new(ArtifactCache::new(dir)),
            (None, None) => Arc::new(ArtifactCache::from_env()),
        }
    }

    /// Build a converter from this config.
    pub fn build_converter(&self) -> Converter {
        let heights = HeightModels::new(self.artifact_source());
        Converter::with_height_models(heights).with_default_crs(self.default_crs)
    }
}
