//! The ordered detector cascade.
//!
//! Each detector either claims the input (`Ok(Some(_))`), passes
//! (`Ok(None)`) or rejects it outright (`Err(_)`). The first claim wins.

use std::sync::OnceLock;

use koordinat_core::{CrsCode, HeightSystem};
use regex::Regex;

use crate::angle::{classify, parse_angle};
use crate::input::{clean_number, numbers, Input};
use crate::{ParseError, ParsedCoordinate, SourceFormat};

pub(crate) type Detector = fn(&Input<'_>) -> Result<Option<ParsedCoordinate>, ParseError>;

/// Detectors in evaluation order.
pub(crate) const DETECTORS: [(&str, Detector); 5] = [
    ("mgrs", detect_mgrs),
    ("labelled", detect_labelled),
    ("hinted-xyz", detect_hinted_xyz),
    ("magnitude", detect_magnitude),
    ("lat-lon", detect_lat_lon),
];

/// Geocentric components are at least this large in magnitude.
const XYZ_MIN_MAGNITUDE: f64 = 1_000.0;
/// RT 90 grid values exceed this in at least one axis.
const GRID_MIN_MAGNITUDE: f64 = 100_000.0;

static_regex!(mgrs_regex, r"^\d{1,2}[C-HJ-NP-X][A-Z]{2}\d{2,10}$");

static_regex!(
    labelled_axis_regex,
    r"(?i)\b(LATITUDE|LONGITUDE|NORTHING|EASTING|LAT|LONG|LON|[XYZ]|N|E)\s*[:=]\s*([+-]?\d+(?:[.,]\d+)?)"
);

static_regex!(
    height_label_regex,
    r"(?i)\b(?:HEIGHT|ELEV|ALT|H|Z)\s*[:=]?\s*([+-]?\d+(?:[.,]\d+)?)"
);

static_regex!(
    /// A hemisphere-prefixed number group, or a number group with an optional
    /// hemisphere suffix. Groups hold up to three numbers joined by
    /// non-alphanumeric separators.
    coordinate_group_regex,
    r#"(?i)\b[NSEW]\s*[+-]?\d+(?:[.,]\d+)?(?:[^0-9A-Za-z]+[+-]?\d+(?:[.,]\d+)?){0,2}|[+-]?\d+(?:[.,]\d+)?(?:[^0-9A-Za-z]+[+-]?\d+(?:[.,]\d+)?){0,2}(?:[\s"'″]*[NSEW]\b)?"#
);

static_regex!(
    /// Text with no letters left once hint words are blanked out.
    letter_free_regex,
    r"^[^A-Za-z]*$"
);

fn height_system(input: &Input<'_>, height: Option<f64>) -> HeightSystem {
    if input.hints.rh2000 && height.is_some() {
        HeightSystem::Rh2000
    } else {
        HeightSystem::Ellipsoidal
    }
}

fn check_lat_lon(lat: f64, lon: f64) -> Result<(), ParseError> {
    if !(-90.0..=90.0).contains(&lat) {
        return Err(ParseError::OutOfRange {
            axis: "latitude",
            value: lat,
        });
    }
    if !(-180.0..=180.0).contains(&lon) {
        return Err(ParseError::OutOfRange {
            axis: "longitude",
            value: lon,
        });
    }
    Ok(())
}

fn geocentric(input: &Input<'_>, values: &[f64]) -> ParsedCoordinate {
    let crs = input.geocentric_crs();
    let format = if crs == CrsCode::Rr92Xyz {
        SourceFormat::Rr92Xyz
    } else {
        SourceFormat::Xyz
    };
    ParsedCoordinate::new(crs, values[..3].to_vec(), format)
}

pub(crate) fn detect_mgrs(input: &Input<'_>) -> Result<Option<ParsedCoordinate>, ParseError> {
    let candidate: String = input
        .raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_uppercase();
    if !mgrs_regex().is_match(&candidate) {
        return Ok(None);
    }
    let (lat, lon) = koordinat_mgrs::decode(&candidate)?;
    Ok(Some(
        ParsedCoordinate::new(CrsCode::Wgs84Geo, vec![lat, lon], SourceFormat::Mgrs)
            .with_warning("Parsed as MGRS (WGS84 grid)"),
    ))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Axis {
    X,
    Y,
    Z,
    Lat,
    Lon,
    North,
    East,
}

impl Axis {
    fn from_label(label: &str) -> Option<Self> {
        Some(match label.to_ascii_uppercase().as_str() {
            "X" => Axis::X,
            "Y" => Axis::Y,
            "Z" => Axis::Z,
            "LAT" | "LATITUDE" => Axis::Lat,
            "LON" | "LONG" | "LONGITUDE" => Axis::Lon,
            "N" | "NORTHING" => Axis::North,
            "E" | "EASTING" => Axis::East,
            _ => return None,
        })
    }
}

/// `KEY: value` / `KEY=value` pairs.
pub(crate) fn detect_labelled(input: &Input<'_>) -> Result<Option<ParsedCoordinate>, ParseError> {
    let mut labels: Vec<(Axis, f64)> = Vec::new();
    for caps in labelled_axis_regex().captures_iter(&input.stripped) {
        let (Some(axis), Some(value)) = (
            Axis::from_label(&caps[1]),
            clean_number(&caps[2]),
        ) else {
            continue;
        };
        if !labels.iter().any(|(a, _)| *a == axis) {
            labels.push((axis, value));
        }
    }
    let get = |axis| labels.iter().find(|(a, _)| *a == axis).map(|(_, v)| *v);

    if let (Some(x), Some(y), Some(z)) = (get(Axis::X), get(Axis::Y), get(Axis::Z)) {
        return Ok(Some(geocentric(input, &[x, y, z])));
    }

    if let (Some(lat), Some(lon)) = (get(Axis::Lat), get(Axis::Lon)) {
        check_lat_lon(lat, lon)?;
        let height = height_label_regex()
            .captures(&input.stripped)
            .and_then(|c| clean_number(&c[1]));
        return Ok(Some(
            ParsedCoordinate::lat_lon(
                input.geographic_crs(),
                lat,
                lon,
                height,
                SourceFormat::Dd,
            )
            .with_height_system(height_system(input, height)),
        ));
    }

    if let (Some(n), Some(e)) = (get(Axis::North), get(Axis::East)) {
        if n.abs() > GRID_MIN_MAGNITUDE || e.abs() > GRID_MIN_MAGNITUDE {
            return Ok(Some(ParsedCoordinate::new(
                CrsCode::Rt90,
                vec![n, e],
                SourceFormat::Rt90,
            )));
        }
    }
    Ok(None)
}

/// Three numbers next to an `RR92`, `RFN` or `XYZ` word.
pub(crate) fn detect_hinted_xyz(
    input: &Input<'_>,
) -> Result<Option<ParsedCoordinate>, ParseError> {
    if !(input.hints.rr92 || input.hints.xyz) {
        return Ok(None);
    }
    let values = numbers(&input.stripped);
    if values.len() < 3 {
        return Ok(None);
    }
    Ok(Some(geocentric(input, &values)))
}

/// Geocentric or RT 90 by value size alone.
pub(crate) fn detect_magnitude(input: &Input<'_>) -> Result<Option<ParsedCoordinate>, ParseError> {
    let values = numbers(&input.stripped);
    if values.len() >= 3 && values[..3].iter().all(|v| v.abs() > XYZ_MIN_MAGNITUDE) {
        return Ok(Some(geocentric(input, &values)));
    }
    if values.len() >= 2 && values[..2].iter().any(|v| v.abs() > GRID_MIN_MAGNITUDE) {
        return Ok(Some(ParsedCoordinate::new(
            CrsCode::Rt90,
            values[..2].to_vec(),
            SourceFormat::Rt90,
        )));
    }
    Ok(None)
}

/// Latitude/longitude in DD, DDM or DMS, with an optional height.
pub(crate) fn detect_lat_lon(input: &Input<'_>) -> Result<Option<ParsedCoordinate>, ParseError> {
    let mut warnings = Vec::new();

    let (label_height, text) = match height_label_regex().captures(&input.stripped) {
        Some(caps) => {
            let whole = caps.get(0).map_or(0..0, |m| m.range());
            let mut rest = input.stripped.clone();
            rest.replace_range(whole, " ");
            (clean_number(&caps[1]), rest)
        }
        None => (None, input.stripped.clone()),
    };

    let groups: Vec<&str> = coordinate_group_regex()
        .find_iter(&text)
        .map(|m| m.as_str().trim())
        .collect();

    let (lat, lon, extra, format) = if groups.len() >= 2 {
        let lat = parse_angle(groups[0])?;
        let lon = parse_angle(groups[1])?;
        let extra: Vec<f64> = groups[2..]
            .iter()
            .filter_map(|g| numbers(g).first().copied())
            .collect();
        (lat.degrees, lon.degrees, extra, classify(&lat, &lon))
    } else if letter_free_regex().is_match(text.trim()) {
        let values = numbers(&text);
        if values.len() < 2 {
            return Err(ParseError::NoLatLon(input.raw.to_string()));
        }
        (values[0], values[1], values[2..].to_vec(), SourceFormat::Dd)
    } else {
        return Err(ParseError::NoLatLon(input.raw.to_string()));
    };

    check_lat_lon(lat, lon)?;

    let height = match (label_height, extra.first()) {
        (Some(h), Some(_)) => {
            warnings.push("Third value ignored: height label takes precedence".to_string());
            Some(h)
        }
        (Some(h), None) => Some(h),
        (None, third) => third.copied(),
    };
    if extra.len() > 1 {
        warnings.push(format!(
            "Ignored {} extra value(s) after the height",
            extra.len() - 1
        ));
    }

    let mut parsed = ParsedCoordinate::lat_lon(input.geographic_crs(), lat, lon, height, format)
        .with_height_system(height_system(input, height));
    parsed.warnings.extend(warnings);
    Ok(Some(parsed))
}
