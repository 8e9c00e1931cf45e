//! GTX geoid grids and the lazily loaded RH2000 evaluator.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use serde::Serialize;

use crate::artifacts::{ArtifactDownloadError, ArtifactSource, SWEN17_ARTIFACT_NAME};

/// Node value GTX uses for "no data".
pub const GTX_NO_DATA: f32 = -88.8888;

const HEADER_LEN: usize = 40;

#[derive(thiserror::Error, Debug)]
pub enum GeoidUnavailable {
    #[error("SWEN17_RH2000 geoid grid could not be resolved: {0}")]
    Artifact(#[from] ArtifactDownloadError),
    #[error("failed to read geoid grid {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed GTX grid: {0}")]
    Malformed(String),
    #[error("({lat:.6}, {lon:.6}) lies outside the geoid grid")]
    OutsideGrid { lat: f64, lon: f64 },
    #[error("geoid grid has no data at ({lat:.6}, {lon:.6})")]
    NoData { lat: f64, lon: f64 },
}

/// Geometry of a GTX grid. Nodes run south→north, west→east from the
/// south-west corner `(lat0, lon0)`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct GridHeader {
    pub lat0: f64,
    pub lon0: f64,
    pub dlat: f64,
    pub dlon: f64,
    pub rows: usize,
    pub cols: usize,
}

impl GridHeader {
    pub fn lat_max(&self) -> f64 {
        self.lat0 + self.dlat * (self.rows - 1) as f64
    }

    pub fn lon_max(&self) -> f64 {
        self.lon0 + self.dlon * (self.cols - 1) as f64
    }
}

/// Geoid separations on a regular lat/lon grid.
#[derive(Clone, Debug)]
pub struct GeoidGrid {
    header: GridHeader,
    data: Vec<f32>,
}

fn be_f64(bytes: &[u8], at: usize) -> f64 {
    let mut b = [0u8; 8];
    b.copy_from_slice(&bytes[at..at + 8]);
    f64::from_be_bytes(b)
}

fn be_i32(bytes: &[u8], at: usize) -> i32 {
    let mut b = [0u8; 4];
    b.copy_from_slice(&bytes[at..at + 4]);
    i32::from_be_bytes(b)
}

impl GeoidGrid {
    pub fn new(header: GridHeader, data: Vec<f32>) -> Result<Self, GeoidUnavailable> {
        if header.rows < 2 || header.cols < 2 {
            return Err(GeoidUnavailable::Malformed(format!(
                "grid must have at least 2x2 nodes, got {}x{}",
                header.rows, header.cols
            )));
        }
        if !(header.dlat > 0.0 && header.dlon > 0.0) {
            return Err(GeoidUnavailable::Malformed(format!(
                "non-positive spacing ({}, {})",
                header.dlat, header.dlon
            )));
        }
        if data.len() != header.rows * header.cols {
            return Err(GeoidUnavailable::Malformed(format!(
                "expected {} nodes, found {}",
                header.rows * header.cols,
                data.len()
            )));
        }
        Ok(Self { header, data })
    }

    /// Parse a big-endian GTX file image.
    pub fn from_gtx_bytes(bytes: &[u8]) -> Result<Self, GeoidUnavailable> {
        if bytes.len() < HEADER_LEN {
            return Err(GeoidUnavailable::Malformed(format!(
                "file is {} bytes, shorter than the {HEADER_LEN}-byte header",
                bytes.len()
            )));
        }
        let rows = be_i32(bytes, 32);
        let cols = be_i32(bytes, 36);
        let (rows, cols) = match (usize::try_from(rows), usize::try_from(cols)) {
            (Ok(r), Ok(c)) => (r, c),
            _ => {
                return Err(GeoidUnavailable::Malformed(format!(
                    "negative dimensions {rows}x{cols}"
                )))
            }
        };
        let header = GridHeader {
            lat0: be_f64(bytes, 0),
            lon0: be_f64(bytes, 8),
            dlat: be_f64(bytes, 16),
            dlon: be_f64(bytes, 24),
            rows,
            cols,
        };

        let body = &bytes[HEADER_LEN..];
        let expected = rows
            .checked_mul(cols)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| GeoidUnavailable::Malformed("grid dimensions overflow".into()))?;
        if body.len() < expected {
            return Err(GeoidUnavailable::Malformed(format!(
                "truncated body: expected {expected} bytes, found {}",
                body.len()
            )));
        }
        let data = body[..expected]
            .chunks_exact(4)
            .map(|c| f32::from_be_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        Self::new(header, data)
    }

    pub fn load(path: &Path) -> Result<Self, GeoidUnavailable> {
        let bytes = std::fs::read(path).map_err(|source| GeoidUnavailable::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_gtx_bytes(&bytes)
    }

    /// Serialize as big-endian GTX.
    pub fn write_gtx<W: Write>(&self, mut w: W) -> std::io::Result<()> {
        let h = &self.header;
        for v in [h.lat0, h.lon0, h.dlat, h.dlon] {
            w.write_all(&v.to_be_bytes())?;
        }
        for v in [h.rows, h.cols] {
            let v = i32::try_from(v).map_err(|_| {
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "grid too large for GTX")
            })?;
            w.write_all(&v.to_be_bytes())?;
        }
        for v in &self.data {
            w.write_all(&v.to_be_bytes())?;
        }
        w.flush()
    }

    pub fn header(&self) -> &GridHeader {
        &self.header
    }

    #[inline]
    fn node(&self, row: usize, col: usize) -> f32 {
        self.data[row * self.header.cols + col]
    }

    /// Bilinearly interpolated separation at `(lat, lon)` in metres.
    pub fn separation(&self, lat: f64, lon: f64) -> Result<f64, GeoidUnavailable> {
        let h = &self.header;
        // GTX longitudes may be stored in 0..360
        let lon = if lon < h.lon0 { lon + 360.0 } else { lon };

        let y = (lat - h.lat0) / h.dlat;
        let x = (lon - h.lon0) / h.dlon;
        let (max_y, max_x) = ((h.rows - 1) as f64, (h.cols - 1) as f64);
        if !(0.0..=max_y).contains(&y) || !(0.0..=max_x).contains(&x) {
            return Err(GeoidUnavailable::OutsideGrid { lat, lon });
        }

        // keep the upper neighbour in range on the last row/column
        let y0 = (y.floor() as usize).min(h.rows - 2);
        let x0 = (x.floor() as usize).min(h.cols - 2);
        let fy = y - y0 as f64;
        let fx = x - x0 as f64;

        let corners = [
            self.node(y0, x0),
            self.node(y0, x0 + 1),
            self.node(y0 + 1, x0),
            self.node(y0 + 1, x0 + 1),
        ];
        if corners
            .iter()
            .any(|&v| !v.is_finite() || (v - GTX_NO_DATA).abs() < 1e-3)
        {
            return Err(GeoidUnavailable::NoData { lat, lon });
        }
        let [p00, p10, p01, p11] = corners.map(f64::from);

        let a = p00 + fx * (p10 - p00);
        let b = p01 + fx * (p11 - p01);
        Ok(a + fy * (b - a))
    }
}

/// SWEN17 RH2000 geoid, loaded from an [`ArtifactSource`] on first use.
///
/// Lookups after a successful load are lock-free. Loads are serialized and a
/// failed load is retried on the next call.
#[derive(Debug)]
pub struct Rh2000Geoid {
    source: Arc<dyn ArtifactSource>,
    grid: OnceLock<GeoidGrid>,
    build: Mutex<()>,
}

impl Rh2000Geoid {
    pub fn new(source: Arc<dyn ArtifactSource>) -> Self {
        Self {
            source,
            grid: OnceLock::new(),
            build: Mutex::new(()),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.grid.get().is_some()
    }

    pub fn grid(&self) -> Result<&GeoidGrid, GeoidUnavailable> {
        if let Some(grid) = self.grid.get() {
            return Ok(grid);
        }

        let _guard = self.build.lock();
        if let Some(grid) = self.grid.get() {
            return Ok(grid);
        }
        let path = self.source.ensure_artifact(SWEN17_ARTIFACT_NAME)?;
        let grid = GeoidGrid::load(&path)?;
        log::debug!(
            "loaded geoid grid {} ({}x{} nodes)",
            path.display(),
            grid.header.rows,
            grid.header.cols
        );
        Ok(self.grid.get_or_init(|| grid))
    }

    /// Ellipsoid minus RH2000 at `(lat, lon)`.
    pub fn separation(&self, lat: f64, lon: f64) -> Result<f64, GeoidUnavailable> {
        self.grid()?.separation(lat, lon)
    }
}
