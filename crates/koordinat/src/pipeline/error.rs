use koordinat_core::{TransformError, UnknownCrs};
use koordinat_parse::ParseError;

/// Errors that abort a conversion.
///
/// Height-model failures never show up here; they are reported inside
/// [`ConversionResults`](super::ConversionResults).
#[derive(thiserror::Error, Debug)]
pub enum ConvertError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    UnknownCrs(#[from] UnknownCrs),
    #[error(transparent)]
    Transform(#[from] TransformError),
}
