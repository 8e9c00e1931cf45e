//! Normalized view of the input text shared by all detectors.

use std::sync::OnceLock;

use koordinat_core::CrsCode;
use regex::Regex;

macro_rules! static_regex {
    ($(#[$meta:meta])* $name:ident, $pattern:expr) => {
        $(#[$meta])*
        pub(crate) fn $name() -> &'static Regex {
            static PATTERN: OnceLock<Regex> = OnceLock::new();
            PATTERN.get_or_init(|| Regex::new($pattern).expect("static pattern compiles"))
        }
    };
}

static_regex!(
    /// Signed decimal number with `.` or `,` as decimal separator.
    number_regex,
    r"[+-]?\d+(?:[.,]\d+)?"
);

static_regex!(
    /// CRS and height-system words whose digits must not be read as values.
    hint_regex,
    r"(?i)RR\s*92|RFN|SWEREF\s*99(?:_GEO|\s*TM)?|WGS\s*84(?:_GEO|_XYZ)?|RT\s*90(?:_3021)?|RH\s*2000|XYZ"
);

/// Parse a number matched by [`number_regex`].
pub(crate) fn clean_number(text: &str) -> Option<f64> {
    text.replace(',', ".").parse().ok()
}

/// Every signed number in `text`, in order.
pub(crate) fn numbers(text: &str) -> Vec<f64> {
    number_regex()
        .find_iter(text)
        .filter_map(|m| clean_number(m.as_str()))
        .collect()
}

/// Words found in the text that steer detection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Hints {
    /// `RR92` or `RFN`.
    pub rr92: bool,
    pub sweref99: bool,
    pub wgs84: bool,
    pub xyz: bool,
    pub rh2000: bool,
}

pub(crate) struct Input<'a> {
    pub raw: &'a str,
    /// `raw` with hint words blanked out.
    pub stripped: String,
    pub hints: Hints,
    pub default_crs: CrsCode,
}

impl<'a> Input<'a> {
    pub fn new(raw: &'a str, default_crs: CrsCode) -> Self {
        let mut hints = Hints::default();
        for m in hint_regex().find_iter(raw) {
            let word: String = m
                .as_str()
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect::<String>()
                .to_ascii_uppercase();
            if word.starts_with("RR92") || word == "RFN" {
                hints.rr92 = true;
            } else if word.starts_with("SWEREF99") {
                hints.sweref99 = true;
            } else if word.starts_with("WGS84") {
                hints.wgs84 = true;
            } else if word.starts_with("RH2000") {
                hints.rh2000 = true;
            }
            if word.ends_with("XYZ") {
                hints.xyz = true;
            }
        }

        Self {
            raw,
            stripped: hint_regex().replace_all(raw, " ").into_owned(),
            hints,
            default_crs,
        }
    }

    /// CRS for geographic results: the default unless a datum word overrides it.
    pub fn geographic_crs(&self) -> CrsCode {
        if self.hints.sweref99 {
            CrsCode::Sweref99Geo
        } else if self.hints.wgs84 {
            CrsCode::Wgs84Geo
        } else {
            self.default_crs
        }
    }

    pub fn geocentric_crs(&self) -> CrsCode {
        if self.hints.rr92 {
            CrsCode::Rr92Xyz
        } else {
            CrsCode::Wgs84Xyz
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_commas_are_numbers() {
        assert_eq!(numbers("59,3293 18,0686"), vec![59.3293, 18.0686]);
        assert_eq!(numbers("59.3293, -18.0686"), vec![59.3293, -18.0686]);
    }

    #[test]
    fn hint_words_are_stripped() {
        let input = Input::new("SWEREF 99 59.3 18.0 RH2000", CrsCode::Wgs84Geo);
        assert!(input.hints.sweref99 && input.hints.rh2000);
        assert_eq!(numbers(&input.stripped), vec![59.3, 18.0]);
        assert_eq!(input.geographic_crs(), CrsCode::Sweref99Geo);
    }

    #[test]
    fn rfn_counts_as_rr92() {
        let input = Input::new("rfn 1 2 3", CrsCode::Wgs84Geo);
        assert!(input.hints.rr92);
        assert_eq!(input.geocentric_crs(), CrsCode::Rr92Xyz);
    }
}
