#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum MgrsError {
    #[error("invalid MGRS reference '{text}': {reason}")]
    InvalidReference { text: String, reason: &'static str },
    #[error("latitude {lat:.6} outside the UTM range of MGRS (80°S to 84°N); polar UPS is not supported")]
    OutOfRange { lat: f64, lon: f64 },
    #[error("non-finite position ({lat}, {lon})")]
    NonFinite { lat: f64, lon: f64 },
    #[error("MGRS precision must be 0-5 digits, got {0}")]
    Precision(u8),
}
