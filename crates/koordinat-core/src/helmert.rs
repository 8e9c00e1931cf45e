//! Seven-parameter Helmert similarity transform between geocentric frames.

use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

/// Published transform constants.
///
/// Translations in metres, rotations in arc-seconds (position-vector
/// convention), scale in parts per million.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HelmertParameters {
    pub tx: f64,
    pub ty: f64,
    pub tz: f64,
    pub rx: f64,
    pub ry: f64,
    pub rz: f64,
    pub scale_ppm: f64,
}

/// RR92 → SWEREF 99.
pub const RR92_TO_SWEREF99: HelmertParameters = HelmertParameters {
    tx: 0.0048,
    ty: -0.0012,
    tz: 0.0065,
    rx: -0.00083,
    ry: 0.00143,
    rz: -0.00129,
    scale_ppm: -0.0012,
};

/// RT 90 (Bessel 1841) → WGS 84.
pub const RT90_TO_WGS84: HelmertParameters = HelmertParameters {
    tx: 414.1,
    ty: 41.3,
    tz: 603.1,
    rx: -0.855,
    ry: 2.141,
    rz: -7.023,
    scale_ppm: 0.0,
};

#[inline]
fn arcsec_to_rad(v: f64) -> f64 {
    (v / 3600.0).to_radians()
}

/// A ready-to-apply Helmert transform.
///
/// The rotation matrix is built from exact sines and cosines, no
/// small-angle linearization.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Helmert {
    pub rotation: Matrix3<f64>,
    pub translation: Vector3<f64>,
    pub scale: f64,
}

impl Helmert {
    pub fn new(params: &HelmertParameters) -> Self {
        let (sx, cx) = arcsec_to_rad(params.rx).sin_cos();
        let (sy, cy) = arcsec_to_rad(params.ry).sin_cos();
        let (sz, cz) = arcsec_to_rad(params.rz).sin_cos();

        let rotation = Matrix3::new(
            cy * cz,
            cz * sx * sy - cx * sz,
            sx * sz + cx * cz * sy, //
            cy * sz,
            cx * cz + sx * sy * sz,
            cx * sy * sz - cz * sx, //
            -sy,
            cy * sx,
            cx * cy,
        );

        Self {
            rotation,
            translation: Vector3::new(params.tx, params.ty, params.tz),
            scale: 1.0 + params.scale_ppm * 1e-6,
        }
    }

    pub fn identity() -> Self {
        Self {
            rotation: Matrix3::identity(),
            translation: Vector3::zeros(),
            scale: 1.0,
        }
    }

    /// Source frame → target frame: rotate, scale, translate.
    #[inline]
    pub fn forward(&self, x: f64, y: f64, z: f64) -> [f64; 3] {
        let v = self.rotation * Vector3::new(x, y, z) * self.scale + self.translation;
        [v.x, v.y, v.z]
    }

    /// Target frame → source frame.
    #[inline]
    pub fn inverse(&self, x: f64, y: f64, z: f64) -> [f64; 3] {
        let shifted = (Vector3::new(x, y, z) - self.translation) / self.scale;
        let v = self.rotation.transpose() * shifted;
        [v.x, v.y, v.z]
    }
}

/// Geocentric RR92 → SWEREF 99.
pub fn rr92_to_sweref99(x: f64, y: f64, z: f64) -> [f64; 3] {
    Helmert::new(&RR92_TO_SWEREF99).forward(x, y, z)
}

/// Geocentric SWEREF 99 → RR92.
pub fn sweref99_to_rr92(x: f64, y: f64, z: f64) -> [f64; 3] {
    Helmert::new(&RR92_TO_SWEREF99).inverse(x, y, z)
}
