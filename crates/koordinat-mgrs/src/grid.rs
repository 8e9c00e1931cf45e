//! Grid references and their conversion to and from geodetic positions.

use std::fmt;
use std::str::FromStr;

use koordinat_core::{TransverseMercator, TransverseMercatorParams, WGS84};
use serde::{Deserialize, Serialize};

use crate::letters::{
    band_letter, band_south_edge, central_meridian, column_easting, column_letter, is_southern,
    row_letter, row_northing, zone_number, BANDS, MAX_LAT, MIN_LAT, ROW_CYCLE, SQUARE_SIZE,
};
use crate::MgrsError;

/// Finest supported precision (1 m).
pub const MAX_PRECISION: u8 = 5;

const UTM_SCALE: f64 = 0.9996;
const UTM_FALSE_EASTING: f64 = 500_000.0;
const UTM_FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;
/// Slack below the band's southern edge when recovering the full northing.
const BAND_NORTHING_SLACK: f64 = 200_000.0;

fn utm(zone: u8, southern: bool) -> TransverseMercator {
    TransverseMercator::new(
        &WGS84,
        TransverseMercatorParams {
            central_meridian: central_meridian(zone),
            scale: UTM_SCALE,
            false_northing: if southern {
                UTM_FALSE_NORTHING_SOUTH
            } else {
                0.0
            },
            false_easting: UTM_FALSE_EASTING,
        },
    )
}

/// A parsed MGRS reference: zone, band, 100 km square and truncated offsets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridReference {
    pub zone: u8,
    pub band: char,
    pub column: char,
    pub row: char,
    /// Easting within the square, in units of the precision.
    pub easting: u32,
    /// Northing within the square, in units of the precision.
    pub northing: u32,
    /// Digits per axis, 0–5.
    pub precision: u8,
}

impl GridReference {
    /// Side of the cell this reference denotes, in metres.
    pub fn resolution(&self) -> f64 {
        10f64.powi(i32::from(MAX_PRECISION - self.precision))
    }

    /// Reference of the cell containing `(lat, lon)`.
    pub fn from_lat_lon(lat: f64, lon: f64, precision: u8) -> Result<Self, MgrsError> {
        if precision > MAX_PRECISION {
            return Err(MgrsError::Precision(precision));
        }
        if !lat.is_finite() || !lon.is_finite() {
            return Err(MgrsError::NonFinite { lat, lon });
        }
        if !(MIN_LAT..=MAX_LAT).contains(&lat) {
            return Err(MgrsError::OutOfRange { lat, lon });
        }

        let zone = zone_number(lat, lon);
        let band = band_letter(lat);
        let (northing, easting) = utm(zone, lat < 0.0).forward(lat, lon);
        let column = column_letter(zone, easting).ok_or(MgrsError::OutOfRange { lat, lon })?;
        let row = row_letter(zone, northing);

        let res = 10f64.powi(i32::from(MAX_PRECISION - precision));
        let digits = |v: f64| (v.rem_euclid(SQUARE_SIZE) / res).floor() as u32;

        Ok(Self {
            zone,
            band: char::from(band),
            column: char::from(column),
            row: char::from(row),
            easting: digits(easting),
            northing: digits(northing),
            precision,
        })
    }

    /// Centre of the referenced cell as `(lat, lon)` in degrees.
    pub fn to_lat_lon(&self) -> Result<(f64, f64), MgrsError> {
        let invalid = |reason| MgrsError::InvalidReference {
            text: self.to_string(),
            reason,
        };
        let band = self.band as u8;
        let band_edge = band_south_edge(band).ok_or_else(|| invalid("unknown latitude band"))?;
        let col_e = column_easting(self.zone, self.column as u8)
            .ok_or_else(|| invalid("column letter not used in this zone"))?;
        let row_n =
            row_northing(self.zone, self.row as u8).ok_or_else(|| invalid("invalid row letter"))?;

        let res = self.resolution();
        let easting = col_e + f64::from(self.easting) * res + res / 2.0;
        let mut sw_northing = row_n + f64::from(self.northing) * res;

        let tm = utm(self.zone, is_southern(band));
        let (band_northing, _) = tm.forward(band_edge, central_meridian(self.zone));
        let min_northing = band_northing - BAND_NORTHING_SLACK;
        while sw_northing + res < min_northing {
            sw_northing += ROW_CYCLE;
        }

        Ok(tm.inverse(sw_northing + res / 2.0, easting))
    }
}

impl fmt::Display for GridReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}{}{}{}", self.zone, self.band, self.column, self.row)?;
        if self.precision > 0 {
            let w = usize::from(self.precision);
            write!(f, "{:0w$}{:0w$}", self.easting, self.northing, w = w)?;
        }
        Ok(())
    }
}

impl FromStr for GridReference {
    type Err = MgrsError;

    /// Accepts upper or lower case with embedded whitespace, e.g. `34V CL 33230 80391`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text: String = s
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| c.to_ascii_uppercase())
            .collect();
        let invalid = |reason| MgrsError::InvalidReference {
            text: s.trim().to_string(),
            reason,
        };

        let zone_len = text.chars().take_while(|c| c.is_ascii_digit()).count();
        if !(1..=2).contains(&zone_len) {
            return Err(invalid("expected a 1-2 digit zone number"));
        }
        let zone: u8 = text[..zone_len]
            .parse()
            .map_err(|_| invalid("expected a 1-2 digit zone number"))?;
        if !(1..=60).contains(&zone) {
            return Err(invalid("zone must be 1-60"));
        }

        let mut letters = text[zone_len..].chars();
        let band = letters.next().ok_or_else(|| invalid("missing latitude band"))?;
        if !band.is_ascii() || !BANDS.contains(&(band as u8)) {
            return Err(invalid("unknown latitude band"));
        }
        let column = letters
            .next()
            .filter(char::is_ascii_uppercase)
            .ok_or_else(|| invalid("missing 100 km column letter"))?;
        let row = letters
            .next()
            .filter(char::is_ascii_uppercase)
            .ok_or_else(|| invalid("missing 100 km row letter"))?;

        let digits = letters.as_str();
        if !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("trailing characters after the square letters"));
        }
        if digits.len() % 2 != 0 {
            return Err(invalid("odd number of easting/northing digits"));
        }
        if digits.len() > 2 * usize::from(MAX_PRECISION) {
            return Err(invalid("more than 5 digits per axis"));
        }
        let precision = (digits.len() / 2) as u8;
        let (e, n) = digits.split_at(digits.len() / 2);
        let parse_axis = |d: &str| -> Result<u32, MgrsError> {
            if d.is_empty() {
                Ok(0)
            } else {
                d.parse().map_err(|_| invalid("invalid digits"))
            }
        };

        let reference = Self {
            zone,
            band,
            column,
            row,
            easting: parse_axis(e)?,
            northing: parse_axis(n)?,
            precision,
        };
        if column_easting(zone, column as u8).is_none() {
            return Err(invalid("column letter not used in this zone"));
        }
        if row_northing(zone, row as u8).is_none() {
            return Err(invalid("invalid row letter"));
        }
        Ok(reference)
    }
}
