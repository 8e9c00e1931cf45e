//! Zone, latitude band and 100 km square lettering.

/// Latitude bands from 80°S northwards, 8° each (X is 12°).
pub(crate) const BANDS: &[u8; 20] = b"CDEFGHJKLMNPQRSTUVWX";

/// Row letters repeat every 2 000 km of northing.
pub(crate) const ROW_LETTERS: &[u8; 20] = b"ABCDEFGHJKLMNPQRSTUV";

/// Column letters cycle through three sets of eight across zones.
pub(crate) const COLUMN_SETS: [&[u8; 8]; 3] = [b"ABCDEFGH", b"JKLMNPQR", b"STUVWXYZ"];

/// Southern limit of the UTM part of MGRS.
pub(crate) const MIN_LAT: f64 = -80.0;
/// Northern limit of the UTM part of MGRS.
pub(crate) const MAX_LAT: f64 = 84.0;

pub(crate) const SQUARE_SIZE: f64 = 100_000.0;
pub(crate) const ROW_CYCLE: f64 = 2_000_000.0;

/// UTM zone number, including the Norway and Svalbard exceptions.
pub(crate) fn zone_number(lat: f64, lon: f64) -> u8 {
    let lon = if lon >= 180.0 { lon - 360.0 } else { lon };
    let mut zone = ((lon + 180.0) / 6.0).floor() as i32 + 1;
    zone = zone.clamp(1, 60);

    if (56.0..64.0).contains(&lat) && (3.0..12.0).contains(&lon) {
        zone = 32;
    }
    if (72.0..=MAX_LAT).contains(&lat) {
        zone = match lon {
            l if (0.0..9.0).contains(&l) => 31,
            l if (9.0..21.0).contains(&l) => 33,
            l if (21.0..33.0).contains(&l) => 35,
            l if (33.0..42.0).contains(&l) => 37,
            _ => zone,
        };
    }
    zone as u8
}

/// Central meridian of a UTM zone in degrees.
#[inline]
pub(crate) fn central_meridian(zone: u8) -> f64 {
    f64::from(zone) * 6.0 - 183.0
}

pub(crate) fn band_letter(lat: f64) -> u8 {
    let idx = ((lat - MIN_LAT) / 8.0).floor() as i32;
    BANDS[idx.clamp(0, 19) as usize]
}

/// Southern edge of a latitude band in degrees.
pub(crate) fn band_south_edge(band: u8) -> Option<f64> {
    let idx = BANDS.iter().position(|&b| b == band)?;
    Some(MIN_LAT + idx as f64 * 8.0)
}

#[inline]
pub(crate) fn is_southern(band: u8) -> bool {
    band < b'N'
}

#[inline]
fn set_index(zone: u8) -> usize {
    (usize::from(zone) - 1) % 6
}

#[inline]
fn row_offset(zone: u8) -> usize {
    if set_index(zone) % 2 == 1 {
        5
    } else {
        0
    }
}

/// Column letter for a full UTM easting, or `None` outside the lettered range.
pub(crate) fn column_letter(zone: u8, easting: f64) -> Option<u8> {
    let col = (easting / SQUARE_SIZE).floor() as i64 - 1;
    let set = COLUMN_SETS[set_index(zone) % 3];
    usize::try_from(col).ok().and_then(|c| set.get(c)).copied()
}

pub(crate) fn row_letter(zone: u8, northing: f64) -> u8 {
    let row = (northing / SQUARE_SIZE).floor() as i64 + row_offset(zone) as i64;
    ROW_LETTERS[row.rem_euclid(20) as usize]
}

/// Easting of the western edge of the column lettered `letter`.
pub(crate) fn column_easting(zone: u8, letter: u8) -> Option<f64> {
    let set = COLUMN_SETS[set_index(zone) % 3];
    let idx = set.iter().position(|&c| c == letter)?;
    Some((idx as f64 + 1.0) * SQUARE_SIZE)
}

/// Northing of the southern edge of row `letter`, modulo 2 000 km.
pub(crate) fn row_northing(zone: u8, letter: u8) -> Option<f64> {
    let idx = ROW_LETTERS.iter().position(|&c| c == letter)? as i64;
    let row = (idx - row_offset(zone) as i64).rem_euclid(20);
    Some(row as f64 * SQUARE_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zone_exceptions() {
        assert_eq!(zone_number(59.33, 18.07), 34);
        assert_eq!(zone_number(60.0, 5.0), 32);
        assert_eq!(zone_number(55.0, 5.0), 31);
        assert_eq!(zone_number(78.2, 15.6), 33);
        assert_eq!(zone_number(78.2, 8.9), 31);
        assert_eq!(zone_number(0.0, 180.0), 1);
    }

    #[test]
    fn bands_clamp_at_84_north() {
        assert_eq!(band_letter(59.33), b'V');
        assert_eq!(band_letter(84.0), b'X');
        assert_eq!(band_letter(-80.0), b'C');
        assert_eq!(band_letter(0.0), b'N');
    }

    #[test]
    fn letters_invert() {
        for zone in [31u8, 32, 34] {
            for e in [150_000.0, 450_000.0, 850_000.0] {
                let letter = column_letter(zone, e).unwrap();
                assert_eq!(column_easting(zone, letter), Some((e / 1e5).floor() * 1e5));
            }
            let letter = row_letter(zone, 6_580_000.0);
            assert_eq!(row_northing(zone, letter), Some(500_000.0));
        }
        assert_eq!(column_letter(34, 50_000.0), None);
    }
}
