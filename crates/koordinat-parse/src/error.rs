use koordinat_mgrs::MgrsError;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("empty coordinate string")]
    Empty,
    #[error("invalid MGRS string: {0}")]
    InvalidMgrs(#[from] MgrsError),
    #[error("could not identify latitude/longitude in '{0}'")]
    NoLatLon(String),
    #[error("invalid angle '{token}': {reason}")]
    InvalidAngle { token: String, reason: &'static str },
    #[error("{axis} {value} is out of range")]
    OutOfRange { axis: &'static str, value: f64 },
}
