//! Local resolution of auxiliary grid files.
//!
//! Grids are looked up in a cache directory and verified by SHA-256 before
//! use. Nothing here touches the network: a downloader can implement
//! [`ArtifactSource`] and be handed to the height models instead.

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

/// File name of the SWEN17 RH2000 geoid grid.
pub const SWEN17_ARTIFACT_NAME: &str = "SWEN17_RH2000.gtx";

/// Overrides the cache directory.
pub const ARTIFACTS_DIR_ENV: &str = "COORDINATE_ARTIFACTS_DIR";

const BUFFER_SIZE: usize = 64 * 1024;

/// A known artifact and its expected digest.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArtifactSpec {
    pub name: String,
    /// Lowercase hex SHA-256.
    pub sha256: String,
}

impl ArtifactSpec {
    pub fn new(name: impl Into<String>, sha256: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sha256: sha256.into(),
        }
    }
}

/// Built-in artifact table.
pub fn known_artifacts() -> Vec<ArtifactSpec> {
    vec![ArtifactSpec::new(
        SWEN17_ARTIFACT_NAME,
        "86ea0ff37304358e184375e8c820799a5586f3a9e5c3142742b57c755c6de370",
    )]
}

#[derive(thiserror::Error, Debug)]
pub enum ArtifactDownloadError {
    #[error("unknown artifact '{0}'")]
    UnknownArtifact(String),
    #[error("artifact {name} is not present in {}", .dir.display())]
    Missing { name: String, dir: PathBuf },
    #[error("checksum verification failed for {name}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        name: String,
        expected: String,
        actual: String,
    },
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Where the height models get their grid files from.
pub trait ArtifactSource: Send + Sync + fmt::Debug {
    /// Path to a verified, ready-to-read copy of `name`.
    fn ensure_artifact(&self, name: &str) -> Result<PathBuf, ArtifactDownloadError>;

    /// Path where `name` lives, if present, without verification.
    fn artifact_path(&self, name: &str) -> Result<PathBuf, ArtifactDownloadError>;
}

/// Lowercase hex SHA-256 of a file.
pub fn file_sha256(path: &Path) -> Result<String, ArtifactDownloadError> {
    let io_err = |source| ArtifactDownloadError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut file = File::open(path).map_err(io_err)?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; BUFFER_SIZE];
    loop {
        let n = file.read(&mut buffer).map_err(io_err)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// Checksummed cache directory.
#[derive(Clone, Debug)]
pub struct ArtifactCache {
    dir: PathBuf,
    specs: Vec<ArtifactSpec>,
}

impl ArtifactCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            specs: known_artifacts(),
        }
    }

    /// Cache with a custom artifact table.
    pub fn with_specs(dir: impl Into<PathBuf>, specs: Vec<ArtifactSpec>) -> Self {
        Self {
            dir: dir.into(),
            specs,
        }
    }

    /// Cache rooted at `$COORDINATE_ARTIFACTS_DIR` or
    /// `~/.coordinate_converter/artifacts`.
    pub fn from_env() -> Self {
        Self::new(Self::default_dir())
    }

    pub fn default_dir() -> PathBuf {
        if let Some(dir) = std::env::var_os(ARTIFACTS_DIR_ENV).filter(|d| !d.is_empty()) {
            return PathBuf::from(dir);
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".coordinate_converter")
            .join("artifacts")
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn spec(&self, name: &str) -> Result<&ArtifactSpec, ArtifactDownloadError> {
        self.specs
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| ArtifactDownloadError::UnknownArtifact(name.to_string()))
    }
}

impl ArtifactSource for ArtifactCache {
    fn ensure_artifact(&self, name: &str) -> Result<PathBuf, ArtifactDownloadError> {
        let spec = self.spec(name)?;
        let path = self.artifact_path(name)?;
        let actual = file_sha256(&path)?;
        if actual != spec.sha256 {
            return Err(ArtifactDownloadError::ChecksumMismatch {
                name: name.to_string(),
                expected: spec.sha256.clone(),
                actual,
            });
        }
        log::debug!("artifact {name} verified at {}", path.display());
        Ok(path)
    }

    fn artifact_path(&self, name: &str) -> Result<PathBuf, ArtifactDownloadError> {
        let path = self.dir.join(name);
        if path.is_file() {
            Ok(path)
        } else {
            Err(ArtifactDownloadError::Missing {
                name: name.to_string(),
                dir: self.dir.clone(),
            })
        }
    }
}

/// An explicitly configured file, used as-is for every artifact request.
#[derive(Clone, Debug)]
pub struct FixedArtifact {
    path: PathBuf,
}

impl FixedArtifact {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ArtifactSource for FixedArtifact {
    fn ensure_artifact(&self, name: &str) -> Result<PathBuf, ArtifactDownloadError> {
        self.artifact_path(name)
    }

    fn artifact_path(&self, name: &str) -> Result<PathBuf, ArtifactDownloadError> {
        if self.path.is_file() {
            Ok(self.path.clone())
        } else {
            Err(ArtifactDownloadError::Missing {
                name: name.to_string(),
                dir: self
                    .path
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_default(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_artifact_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ArtifactCache::new(dir.path());
        assert!(matches!(
            cache.ensure_artifact(SWEN17_ARTIFACT_NAME),
            Err(ArtifactDownloadError::Missing { .. })
        ));
    }

    #[test]
    fn unknown_artifact_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ArtifactCache::new(dir.path());
        assert!(matches!(
            cache.ensure_artifact("EGM2008.gtx"),
            Err(ArtifactDownloadError::UnknownArtifact(_))
        ));
    }

    #[test]
    fn corrupted_artifact_fails_verification() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(SWEN17_ARTIFACT_NAME), b"not a grid").unwrap();
        let cache = ArtifactCache::new(dir.path());
        assert!(cache.artifact_path(SWEN17_ARTIFACT_NAME).is_ok());
        assert!(matches!(
            cache.ensure_artifact(SWEN17_ARTIFACT_NAME),
            Err(ArtifactDownloadError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn matching_checksum_resolves() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.gtx");
        std::fs::write(&path, b"abc").unwrap();
        let cache = ArtifactCache::with_specs(
            dir.path(),
            vec![ArtifactSpec::new(
                "grid.gtx",
                "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad",
            )],
        );
        assert_eq!(cache.ensure_artifact("grid.gtx").unwrap(), path);
    }

    #[test]
    fn fixed_artifact_requires_an_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.gtx");
        let fixed = FixedArtifact::new(&path);
        assert!(fixed.ensure_artifact(SWEN17_ARTIFACT_NAME).is_err());
        std::fs::write(&path, b"x").unwrap();
        assert_eq!(fixed.ensure_artifact(SWEN17_ARTIFACT_NAME).unwrap(), path);
    }
}
