use koordinat_core::{
    rr92_to_sweref99, sweref99_to_rr92, CrsCode, CrsRegistry, HeightSystem, TransformError,
};
use koordinat_height::HeightModels;
use koordinat_parse::{ParseError, ParsedCoordinate};

use super::{
    CanonicalCoordinate, ConversionResults, ConvertError, ConvertOptions, Target, TargetValue,
    HEIGHT_KEY,
};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Parses free text and fans a coordinate out to any set of targets.
///
/// Holds the CRS registry (with its transformer cache) and the height
/// models. Share one instance across threads; it is `Send + Sync`.
#[derive(Debug)]
pub struct Converter {
    registry: CrsRegistry,
    heights: HeightModels,
    default_crs: CrsCode,
}

impl Default for Converter {
    fn default() -> Self {
        Self::new()
    }
}

impl Converter {
    /// Converter using the geoid grid from the default artifact cache.
    pub fn new() -> Self {
        Self::with_height_models(HeightModels::default())
    }

    pub fn with_height_models(heights: HeightModels) -> Self {
        Self {
            registry: CrsRegistry::new(),
            heights,
            default_crs: CrsCode::Sweref99Geo,
        }
    }

    /// CRS assumed for plain latitude/longitude input.
    pub fn with_default_crs(mut self, crs: CrsCode) -> Self {
        self.default_crs = crs;
        self
    }

    #[inline]
    pub fn registry(&self) -> &CrsRegistry {
        &self.registry
    }

    #[inline]
    pub fn height_models(&self) -> &HeightModels {
        &self.heights
    }

    #[inline]
    pub fn default_crs(&self) -> CrsCode {
        self.default_crs
    }

    pub fn parse(&self, text: &str) -> Result<ParsedCoordinate, ParseError> {
        koordinat_parse::parse(text, self.default_crs)
    }

    /// Canonical pivot for `parsed`, with its height already ellipsoidal.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, parsed), fields(crs = %parsed.crs))
    )]
    pub fn to_canonical(
        &self,
        parsed: &ParsedCoordinate,
    ) -> Result<CanonicalCoordinate, ConvertError> {
        let xyz = self.wgs84_xyz(parsed)?;
        let mut canonical = CanonicalCoordinate::from_xyz(xyz);
        self.normalize_height(parsed, &mut canonical);
        Ok(canonical)
    }

    /// Canonical pivot → values in `target`, in that CRS's user axis order.
    pub fn from_canonical(
        &self,
        canonical: &CanonicalCoordinate,
        target: CrsCode,
    ) -> Result<Vec<f64>, ConvertError> {
        let [x, y, z] = canonical.xyz;
        match target {
            CrsCode::Rr92Xyz => Ok(sweref99_to_rr92(x, y, z).to_vec()),
            CrsCode::Wgs84Xyz => Ok(canonical.xyz.to_vec()),
            _ => {
                let info = self.registry.get_crs_info(target)?;
                let transformer = self.registry.get_transformer(CrsCode::Wgs84Xyz, target)?;
                Ok(info.restore_output(&transformer.transform(&canonical.xyz)?))
            }
        }
    }

    /// Convert `parsed` to every target plus a `HEIGHT` entry.
    ///
    /// Only CRS lookup and transform failures are returned as errors. MGRS
    /// and height failures become [`TargetValue::Error`] entries so the
    /// spatial results stay available.
    #[cfg_attr(
        feature = "tracing",
        instrument(
            level = "info",
            skip(self, parsed, targets),
            fields(crs = %parsed.crs, targets = targets.len())
        )
    )]
    pub fn convert_to_targets(
        &self,
        parsed: &ParsedCoordinate,
        targets: &[Target],
        options: &ConvertOptions,
    ) -> Result<ConversionResults, ConvertError> {
        let canonical = self.to_canonical(parsed)?;
        let mut results = ConversionResults {
            warnings: parsed.warnings.clone(),
            ..ConversionResults::default()
        };
        results.warnings.extend(canonical.warnings.iter().cloned());

        for &target in targets {
            let value = match target {
                Target::Mgrs => mgrs_value(&canonical, options.mgrs_precision),
                Target::Crs(code) => {
                    TargetValue::Coordinates(self.from_canonical(&canonical, code)?)
                }
            };
            results.insert(target.key(), value);
        }

        results.insert(
            HEIGHT_KEY,
            self.output_height(&canonical, options.height_target),
        );
        Ok(results)
    }

    /// Parse `text` and convert it in one go.
    pub fn convert_text(
        &self,
        text: &str,
        targets: &[Target],
        options: &ConvertOptions,
    ) -> Result<ConversionResults, ConvertError> {
        let parsed = self.parse(text)?;
        self.convert_to_targets(&parsed, targets, options)
    }

    fn wgs84_xyz(&self, parsed: &ParsedCoordinate) -> Result<[f64; 3], ConvertError> {
        if parsed.crs == CrsCode::Rr92Xyz {
            let mut v = [0.0; 3];
            for (slot, value) in v.iter_mut().zip(&parsed.values) {
                *slot = *value;
            }
            if v.iter().any(|c| !c.is_finite()) {
                return Err(TransformError::NonFinite(parsed.values.clone()).into());
            }
            // SWEREF 99 and WGS 84 coincide at this accuracy
            let xyz = rr92_to_sweref99(v[0], v[1], v[2]);
            if xyz.iter().any(|c| !c.is_finite()) {
                return Err(TransformError::NonFinite(parsed.values.clone()).into());
            }
            return Ok(xyz);
        }

        let info = self.registry.get_crs_info(parsed.crs)?;
        let engine = info.prepare_input(&parsed.values);
        let transformer = self.registry.get_transformer(parsed.crs, CrsCode::Wgs84Xyz)?;
        match transformer.transform(&engine)?.as_slice() {
            [x, y, z, ..] => Ok([*x, *y, *z]),
            _ => Err(TransformError::NonFinite(parsed.values.clone()).into()),
        }
    }

    /// Turn an RH2000/RFN input height into an ellipsoidal one.
    ///
    /// On failure the raw value is kept as if it were ellipsoidal and a
    /// warning is recorded.
    fn normalize_height(&self, parsed: &ParsedCoordinate, canonical: &mut CanonicalCoordinate) {
        let Some(height) = parsed.height else {
            return;
        };
        let system = parsed.height_system;
        if system == HeightSystem::Ellipsoidal {
            return;
        }

        match self
            .heights
            .to_ellipsoidal(system, canonical.lat(), canonical.lon(), height)
        {
            Ok(converted) => canonical.set_ellipsoidal_height(converted.height),
            Err(err) => {
                log::warn!("{system} input height left unconverted: {err}");
                canonical.warnings.push(format!(
                    "{system} height could not be converted ({err}); treating it as ellipsoidal"
                ));
                canonical.set_ellipsoidal_height(height);
            }
        }
    }

    fn output_height(&self, canonical: &CanonicalCoordinate, system: HeightSystem) -> TargetValue {
        match self.heights.from_ellipsoidal(
            system,
            canonical.lat(),
            canonical.lon(),
            canonical.ellipsoidal_height(),
        ) {
            Ok(converted) => TargetValue::Height {
                value: converted.height,
                separation: converted.separation,
            },
            Err(err) => {
                log::warn!("{system} output height unavailable: {err}");
                TargetValue::Error(err.to_string())
            }
        }
    }
}

fn mgrs_value(canonical: &CanonicalCoordinate, precision: u8) -> TargetValue {
    match koordinat_mgrs::encode(canonical.lat(), canonical.lon(), precision) {
        Ok(grid) => TargetValue::Grid(grid),
        Err(err) => {
            log::warn!("MGRS encoding failed: {err}");
            TargetValue::Error(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use koordinat_height::FixedArtifact;
    use std::sync::Arc;

    fn converter_without_geoid() -> Converter {
        let missing = FixedArtifact::new("/nonexistent/SWEN17_RH2000.gtx");
        Converter::with_height_models(HeightModels::new(Arc::new(missing)))
    }

    fn stockholm() -> ParsedCoordinate {
        koordinat_parse::parse("59.3293 18.0686", CrsCode::Wgs84Geo).unwrap()
    }

    #[test]
    fn converter_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Converter>();
    }

    #[test]
    fn canonical_forms_agree() {
        let c = converter_without_geoid().to_canonical(&stockholm()).unwrap();
        assert_abs_diff_eq!(c.lat(), 59.3293, epsilon = 1e-9);
        assert_abs_diff_eq!(c.lon(), 18.0686, epsilon = 1e-9);
        assert_abs_diff_eq!(c.ellipsoidal_height(), 0.0, epsilon = 1e-6);
        let xyz = koordinat_core::WGS84.geodetic_to_geocentric(59.3293, 18.0686, 0.0);
        for (a, b) in c.xyz.iter().zip(xyz) {
            assert_abs_diff_eq!(*a, b, epsilon = 1e-6);
        }
    }

    #[test]
    fn stockholm_fans_out() {
        let converter = converter_without_geoid();
        let targets = Target::all();
        let r = converter
            .convert_to_targets(&stockholm(), &targets, &ConvertOptions::default())
            .unwrap();

        let rt90 = r.coordinates("RT90_3021").unwrap();
        assert_eq!(rt90.len(), 2);
        assert!((rt90[0] - 6_580_908.6).abs() < 1.0, "{rt90:?}");
        assert!((rt90[1] - 1_628_832.5).abs() < 1.0, "{rt90:?}");

        let sweref = r.coordinates("SWEREF99_GEO").unwrap();
        assert_eq!(sweref.len(), 2);
        assert_abs_diff_eq!(sweref[0], 59.3293, epsilon = 1e-9);

        assert_eq!(r.coordinates("WGS84_GEO").unwrap().len(), 3);
        assert_eq!(r.coordinates("RR92_XYZ").unwrap().len(), 3);
        assert_eq!(r.grid("MGRS"), Some("34VCL3323080391"));
        match r.height() {
            Some(TargetValue::Height { value, separation }) => {
                assert_abs_diff_eq!(*value, 0.0, epsilon = 1e-6);
                assert_eq!(*separation, None);
            }
            other => panic!("unexpected height entry {other:?}"),
        }
    }

    #[test]
    fn rr92_input_goes_through_helmert() {
        let parsed =
            koordinat_parse::parse("RR92 X=3660000 Y=132000 Z=5205000", CrsCode::Wgs84Geo)
                .unwrap();
        let converter = converter_without_geoid();
        let c = converter.to_canonical(&parsed).unwrap();
        assert_abs_diff_eq!(c.xyz[0], 3660000.0373189505, epsilon = 1e-6);
        assert_abs_diff_eq!(c.xyz[1], 131999.99669628488, epsilon = 1e-6);
        assert_abs_diff_eq!(c.xyz[2], 5204999.974348661, epsilon = 1e-6);

        let back = converter.from_canonical(&c, CrsCode::Rr92Xyz).unwrap();
        assert_abs_diff_eq!(back[0], 3_660_000.0, epsilon = 1e-6);
        assert_abs_diff_eq!(back[1], 132_000.0, epsilon = 1e-6);
        assert_abs_diff_eq!(back[2], 5_205_000.0, epsilon = 1e-6);
    }

    #[test]
    fn mgrs_failures_are_entries() {
        let converter = converter_without_geoid();
        let polar = koordinat_parse::parse("85.0 10.0", CrsCode::Wgs84Geo).unwrap();
        let r = converter
            .convert_to_targets(&polar, &[Target::Mgrs], &ConvertOptions::default())
            .unwrap();
        assert!(r.get("MGRS").is_some_and(TargetValue::is_error));

        let opts = ConvertOptions::default().with_mgrs_precision(6);
        let r = converter
            .convert_to_targets(&stockholm(), &[Target::Mgrs], &opts)
            .unwrap();
        assert!(r.get("MGRS").is_some_and(TargetValue::is_error));
    }

    #[test]
    fn rfn_output_height() {
        let converter = converter_without_geoid();
        let parsed = koordinat_parse::parse("62.0 15.0 h=100", CrsCode::Wgs84Geo).unwrap();
        let opts = ConvertOptions::default().with_height_target(HeightSystem::Rfn);
        let r = converter.convert_to_targets(&parsed, &[], &opts).unwrap();
        match r.height() {
            Some(TargetValue::Height { value, separation }) => {
                assert_abs_diff_eq!(*value, 100.0 - 0.42, epsilon = 1e-6);
                assert_abs_diff_eq!(separation.unwrap(), 0.42, epsilon = 1e-12);
            }
            other => panic!("unexpected height entry {other:?}"),
        }
    }

    #[test]
    fn missing_geoid_degrades_to_warning_and_error_entry() {
        let converter = converter_without_geoid();
        let parsed =
            koordinat_parse::parse("59.3293 18.0686 h=25 RH2000", CrsCode::Wgs84Geo).unwrap();
        let opts = ConvertOptions::default().with_height_target(HeightSystem::Rh2000);
        let r = converter
            .convert_to_targets(&parsed, &[Target::Crs(CrsCode::Wgs84Geo)], &opts)
            .unwrap();

        assert_abs_diff_eq!(r.coordinates("WGS84_GEO").unwrap()[2], 25.0, epsilon = 1e-6);
        assert!(r.warnings.iter().any(|w| w.contains("treating it as ellipsoidal")));
        assert!(r.height().is_some_and(TargetValue::is_error));
    }

    #[test]
    fn rfn_input_height_is_normalized_before_fan_out() {
        let converter = converter_without_geoid();
        let mut parsed = koordinat_parse::parse("62.0 15.0 h=100", CrsCode::Wgs84Geo).unwrap();
        parsed.height_system = HeightSystem::Rfn;
        let r = converter
            .convert_to_targets(
                &parsed,
                &[Target::Crs(CrsCode::Wgs84Geo)],
                &ConvertOptions::default(),
            )
            .unwrap();
        assert_abs_diff_eq!(r.coordinates("WGS84_GEO").unwrap()[2], 100.42, epsilon = 1e-6);
        assert!(r.warnings.is_empty());
    }

    #[test]
    fn non_finite_input_is_fatal() {
        let converter = converter_without_geoid();
        let parsed = ParsedCoordinate::new(
            CrsCode::Rr92Xyz,
            vec![f64::NAN, 0.0, 0.0],
            koordinat_parse::SourceFormat::Rr92Xyz,
        );
        assert!(matches!(
            converter.to_canonical(&parsed),
            Err(ConvertError::Transform(TransformError::NonFinite(_)))
        ));
    }

    #[test]
    fn grid_values_far_outside_the_projection_are_fatal() {
        let converter = converter_without_geoid();
        let parsed = converter.parse("6583052000 1627548000").unwrap();
        assert_eq!(parsed.crs, CrsCode::Rt90);
        assert!(matches!(
            converter.to_canonical(&parsed),
            Err(ConvertError::Transform(TransformError::NonFinite(_)))
        ));

        // the outcome must not depend on which targets were asked for
        for targets in [
            vec![Target::Crs(CrsCode::Wgs84Xyz), Target::Mgrs],
            Target::all(),
        ] {
            assert!(matches!(
                converter.convert_to_targets(&parsed, &targets, &ConvertOptions::default()),
                Err(ConvertError::Transform(TransformError::NonFinite(_)))
            ));
        }
    }
}
