//! Single-angle parsing for DD, DDM and DMS tokens.

use regex::Regex;
use std::sync::OnceLock;

use crate::{ParseError, SourceFormat};

const ANGLE_SYMBOLS: [char; 6] = ['°', 'º', '\'', '"', '′', '″'];

static_regex!(unsigned_number_regex, r"\d+(?:[.,]\d+)?");

/// One parsed angle and what it looked like.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Angle {
    pub degrees: f64,
    pub parts: usize,
    pub symbols: bool,
}

/// Parse `59°19'45"N`, `-33 52.1`, `18.0686E`, ... into signed decimal degrees.
///
/// The sign comes from an S/W hemisphere letter or a leading minus and is
/// applied to the whole `deg + min/60 + sec/3600` sum.
pub(crate) fn parse_angle(token: &str) -> Result<Angle, ParseError> {
    let invalid = |reason| ParseError::InvalidAngle {
        token: token.trim().to_string(),
        reason,
    };

    let parts: Vec<f64> = unsigned_number_regex()
        .find_iter(token)
        .filter_map(|m| crate::input::clean_number(m.as_str()))
        .collect();
    let upper = token.to_ascii_uppercase();
    let negative = upper.trim_start().starts_with('-') || upper.contains(['S', 'W']);
    let symbols = token.contains(ANGLE_SYMBOLS);

    let magnitude = match parts.as_slice() {
        [] => return Err(invalid("no numeric value")),
        [d] => *d,
        [d, m] => {
            if *m >= 60.0 {
                return Err(invalid("minutes must be below 60"));
            }
            d + m / 60.0
        }
        [d, m, s, ..] => {
            if *m >= 60.0 || *s >= 60.0 {
                return Err(invalid("minutes and seconds must be below 60"));
            }
            d + m / 60.0 + s / 3600.0
        }
    };

    Ok(Angle {
        degrees: if negative { -magnitude } else { magnitude },
        parts: parts.len(),
        symbols,
    })
}

/// Format tag for a latitude/longitude pair.
pub(crate) fn classify(lat: &Angle, lon: &Angle) -> SourceFormat {
    let parts = lat.parts.max(lon.parts);
    if parts == 2 {
        SourceFormat::Ddm
    } else if parts >= 3 || lat.symbols || lon.symbols {
        SourceFormat::Dms
    } else {
        SourceFormat::Dd
    }
}
