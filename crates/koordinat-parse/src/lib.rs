//! Free-text coordinate parsing.
//!
//! [`parse`] runs an ordered list of detectors over the input and returns
//! the first interpretation that claims it:
//!
//! 1. MGRS grid references (`34VCL3323080391`),
//! 2. labelled axes (`X=… Y=… Z=…`, `lat: … lon: …`, `N=… E=…`),
//! 3. three numbers next to an `RR92`/`RFN`/`XYZ` word,
//! 4. magnitude heuristics for geocentric XYZ and RT 90 grid values,
//! 5. latitude/longitude in DD, DDM or DMS with an optional height.
//!
//! Non-fatal observations are collected in [`ParsedCoordinate::warnings`].

#[macro_use]
mod input;

mod angle;
mod coordinate;
mod detectors;
mod error;

pub use coordinate::{ParsedCoordinate, SourceFormat};
pub use error::ParseError;

use koordinat_core::CrsCode;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Parse `text` into a coordinate; geographic results default to `default_crs`.
#[cfg_attr(feature = "tracing", instrument(level = "debug", fields(len = text.len())))]
pub fn parse(text: &str, default_crs: CrsCode) -> Result<ParsedCoordinate, ParseError> {
    let raw = text.trim();
    if raw.is_empty() {
        return Err(ParseError::Empty);
    }

    let input = input::Input::new(raw, default_crs);
    for (name, detect) in detectors::DETECTORS {
        if let Some(parsed) = detect(&input)? {
            log::debug!("'{raw}' parsed by {name} detector as {}", parsed.source_format);
            return Ok(parsed);
        }
    }
    Err(ParseError::NoLatLon(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use koordinat_core::HeightSystem;

    fn parse_sweref(text: &str) -> ParsedCoordinate {
        parse(text, CrsCode::Sweref99Geo).unwrap()
    }

    #[test]
    fn plain_decimal_degrees_use_default_crs() {
        let p = parse_sweref("59.3293 18.0686");
        assert_eq!(p.crs, CrsCode::Sweref99Geo);
        assert_eq!(p.source_format, SourceFormat::Dd);
        assert_eq!(p.values, vec![59.3293, 18.0686]);
        assert_eq!(p.height, None);
    }

    #[test]
    fn dms_with_height_label() {
        let p = parse("59°19'45\"N 18°04'30\"E h=12.3", CrsCode::Wgs84Geo).unwrap();
        assert_eq!(p.crs, CrsCode::Wgs84Geo);
        assert_eq!(p.source_format, SourceFormat::Dms);
        assert_abs_diff_eq!(p.values[0], 59.0 + 19.0 / 60.0 + 45.0 / 3600.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p.values[1], 18.0 + 4.0 / 60.0 + 30.0 / 3600.0, epsilon = 1e-12);
        assert_eq!(p.values[2], 12.3);
        assert_eq!(p.height, Some(12.3));
    }

    #[test]
    fn degrees_decimal_minutes() {
        let p = parse_sweref("59°19.750' N 18°3.200' E");
        assert_eq!(p.source_format, SourceFormat::Ddm);
        assert_abs_diff_eq!(p.values[0], 59.0 + 19.75 / 60.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p.values[1], 18.0 + 3.2 / 60.0, epsilon = 1e-12);
    }

    #[test]
    fn large_pairs_are_rt90() {
        let p = parse_sweref("6583052 1627548");
        assert_eq!(p.crs, CrsCode::Rt90);
        assert_eq!(p.source_format, SourceFormat::Rt90);
        assert_eq!(p.values, vec![6_583_052.0, 1_627_548.0]);
    }

    #[test]
    fn labelled_rr92_xyz() {
        let p = parse_sweref("RR92 X=3660000 Y=132000 Z=5205000");
        assert_eq!(p.crs, CrsCode::Rr92Xyz);
        assert_eq!(p.source_format, SourceFormat::Rr92Xyz);
        assert_eq!(p.values, vec![3_660_000.0, 132_000.0, 5_205_000.0]);
    }

    #[test]
    fn labelled_xyz_without_hint_is_wgs84() {
        let p = parse_sweref("X=3099568 Y=1000967 Z=5464110");
        assert_eq!(p.crs, CrsCode::Wgs84Xyz);
        assert_eq!(p.source_format, SourceFormat::Xyz);
        assert_eq!(p.values, vec![3_099_568.0, 1_000_967.0, 5_464_110.0]);
    }

    #[test]
    fn xyz_word_makes_small_numbers_geocentric() {
        let p = parse_sweref("XYZ 100 200 300");
        assert_eq!(p.crs, CrsCode::Wgs84Xyz);
        assert_eq!(p.source_format, SourceFormat::Xyz);
        assert_eq!(p.values, vec![100.0, 200.0, 300.0]);
    }

    #[test]
    fn rfn_word_makes_three_numbers_rr92() {
        let p = parse_sweref("RFN 59.3 18.0 12");
        assert_eq!(p.crs, CrsCode::Rr92Xyz);
        assert_eq!(p.source_format, SourceFormat::Rr92Xyz);
        assert_eq!(p.values, vec![59.3, 18.0, 12.0]);
    }

    #[test]
    fn rr92_word_wins_over_grid_magnitudes() {
        // without the hint this pair would be read as RT 90
        let p = parse_sweref("RR92 6583052 1627548 10");
        assert_eq!(p.crs, CrsCode::Rr92Xyz);
        assert_eq!(p.values, vec![6_583_052.0, 1_627_548.0, 10.0]);

        let p = parse_sweref("6583052 1627548 10");
        assert_eq!(p.crs, CrsCode::Rt90);
    }

    #[test]
    fn unlabelled_xyz_by_magnitude() {
        let p = parse_sweref("3099568.4 1000967.3 5464110.6");
        assert_eq!(p.crs, CrsCode::Wgs84Xyz);
        assert_eq!(p.source_format, SourceFormat::Xyz);
    }

    #[test]
    fn hint_digits_do_not_count_as_values() {
        // "84" and "92" must not be read as coordinates
        let p = parse("WGS84 59.3293 18.0686", CrsCode::Sweref99Geo).unwrap();
        assert_eq!(p.crs, CrsCode::Wgs84Geo);
        assert_eq!(p.values, vec![59.3293, 18.0686]);

        let p = parse_sweref("SWEREF 99: 59.3293, 18.0686");
        assert_eq!(p.crs, CrsCode::Sweref99Geo);
        assert_eq!(p.values, vec![59.3293, 18.0686]);
    }

    #[test]
    fn mgrs_is_detected_first() {
        let p = parse_sweref("34V CL 33230 80391");
        assert_eq!(p.crs, CrsCode::Wgs84Geo);
        assert_eq!(p.source_format, SourceFormat::Mgrs);
        assert_abs_diff_eq!(p.values[0], 59.3293, epsilon = 1e-4);
        assert_abs_diff_eq!(p.values[1], 18.0686, epsilon = 1e-4);
        assert_eq!(p.warnings, vec!["Parsed as MGRS (WGS84 grid)".to_string()]);
    }

    #[test]
    fn mgrs_grammar_match_that_fails_to_decode_is_an_error() {
        assert!(matches!(
            parse("34VCL123", CrsCode::Sweref99Geo),
            Err(ParseError::InvalidMgrs(_))
        ));
        assert!(matches!(
            parse("34VIL1234", CrsCode::Sweref99Geo),
            Err(ParseError::InvalidMgrs(_))
        ));
    }

    #[test]
    fn labelled_lat_lon_ignores_text_order() {
        let p = parse_sweref("lon: 18.0686, lat: 59.3293, height: 25");
        assert_eq!(p.values, vec![59.3293, 18.0686, 25.0]);
        assert_eq!(p.source_format, SourceFormat::Dd);
    }

    #[test]
    fn labelled_northing_easting_is_rt90() {
        let p = parse_sweref("Easting: 1627548 Northing: 6583052");
        assert_eq!(p.crs, CrsCode::Rt90);
        assert_eq!(p.values, vec![6_583_052.0, 1_627_548.0]);
    }

    #[test]
    fn hemisphere_letters_set_the_sign() {
        let p = parse_sweref("33.8688 S 151.2093 E");
        assert_eq!(p.values, vec![-33.8688, 151.2093]);
        let p = parse_sweref("S 33.8688 E 151.2093");
        assert_eq!(p.values, vec![-33.8688, 151.2093]);
        let p = parse_sweref("40.7484N 73.9857W");
        assert_eq!(p.values, vec![40.7484, -73.9857]);
    }

    #[test]
    fn negative_dms_applies_sign_to_the_whole_angle() {
        let p = parse_sweref("-33°52'07\" 151°12'33\"");
        assert_abs_diff_eq!(
            p.values[0],
            -(33.0 + 52.0 / 60.0 + 7.0 / 3600.0),
            epsilon = 1e-12
        );
    }

    #[test]
    fn third_number_is_height() {
        let p = parse_sweref("59.3293, 18.0686, 45.5");
        assert_eq!(p.height, Some(45.5));
        assert_eq!(p.values.len(), 3);
    }

    #[test]
    fn height_label_wins_over_third_group() {
        let p = parse_sweref("59°19'45\"N 18°04'30\"E 99 h=12.3");
        assert_eq!(p.height, Some(12.3));
        assert_eq!(p.warnings.len(), 1);
    }

    #[test]
    fn decimal_commas() {
        let p = parse_sweref("59,3293 18,0686");
        assert_eq!(p.values, vec![59.3293, 18.0686]);
    }

    #[test]
    fn rh2000_hint_tags_the_height() {
        let p = parse_sweref("59.3293 18.0686 h=25 RH2000");
        assert_eq!(p.height, Some(25.0));
        assert_eq!(p.height_system, HeightSystem::Rh2000);
    }

    #[test]
    fn failures() {
        assert_eq!(parse_sweref_err("   "), ParseError::Empty);
        assert!(matches!(
            parse_sweref_err("hello world"),
            ParseError::NoLatLon(_)
        ));
        assert!(matches!(
            parse_sweref_err("95.0 18.0"),
            ParseError::OutOfRange { axis: "latitude", .. }
        ));
    }

    fn parse_sweref_err(text: &str) -> ParseError {
        parse(text, CrsCode::Sweref99Geo).unwrap_err()
    }

    #[test]
    fn detector_order_is_stable() {
        let names: Vec<&str> = detectors::DETECTORS.iter().map(|(n, _)| *n).collect();
        assert_eq!(
            names,
            ["mgrs", "labelled", "hinted-xyz", "magnitude", "lat-lon"]
        );
    }

    #[test]
    fn labels_beat_magnitude() {
        // magnitude alone would call this XYZ; the labels say lat/lon
        let p = parse_sweref("LAT=59.5 LON=18.25 Z=1500");
        assert_eq!(p.source_format, SourceFormat::Dd);
        assert_eq!(p.height, Some(1500.0));
    }

    proptest::proptest! {
        #[test]
        fn formatted_dms_parses_back(lat in -89.9f64..89.9, lon in -179.9f64..179.9) {
            let dms = |v: f64, pos: char, neg: char| {
                let hemi = if v < 0.0 { neg } else { pos };
                let total = (v.abs() * 3600.0).round() as u64;
                format!("{}°{:02}'{:02}\"{hemi}", total / 3600, total / 60 % 60, total % 60)
            };
            let text = format!("{} {}", dms(lat, 'N', 'S'), dms(lon, 'E', 'W'));
            let p = parse(&text, CrsCode::Wgs84Geo).unwrap();
            proptest::prop_assert!((p.values[0] - lat).abs() < 1.0 / 3600.0, "{text}");
            proptest::prop_assert!((p.values[1] - lon).abs() < 1.0 / 3600.0, "{text}");
        }

        #[test]
        fn decimal_pairs_parse_exactly(lat in -90.0f64..90.0, lon in -180.0f64..180.0) {
            let text = format!("{lat:.6}, {lon:.6}");
            let p = parse(&text, CrsCode::Sweref99Geo).unwrap();
            proptest::prop_assert_eq!(p.source_format, SourceFormat::Dd);
            proptest::prop_assert!((p.values[0] - lat).abs() < 1e-6);
            proptest::prop_assert!((p.values[1] - lon).abs() < 1e-6);
        }
    }

    #[test]
    fn parsed_coordinate_serializes_with_registry_codes() {
        let p = parse_sweref("6583052 1627548");
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["crs"], "RT90_3021");
        assert_eq!(json["source_format"], "RT90");
        assert_eq!(json["height_system"], "ELLIPSOIDAL");
    }
}
