use super::coordinates::{geodetic_to_eci, julian_date, sun_position, Geodetic};
use super::satinfo::SatelliteInfo;
use super::Propagator;
use crate::domain::ElementRecord;
use crate::errors::AstroError;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::f64::consts::PI;

/// Sampling interval of [`magnitude_range`] in seconds when none is given
pub const DEFAULT_MAGNITUDE_STEP: i64 = 60;

const SUN_MAGNITUDE: f64 = -26.7;

/// One sample of a pass
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ApparentMagnitude {
    pub at: DateTime<Utc>,
    pub magnitude: f64,
}

/// Observer to satellite distance in km and Sun-satellite-observer phase angle in radians
struct Geometry {
    distance: f64,
    phase_angle: f64,
}

fn geometry(
    propagator: &dyn Propagator,
    record: &ElementRecord,
    observer: &Geodetic,
    at: DateTime<Utc>,
) -> Result<Geometry, AstroError> {
    let jd = julian_date(at);
    let satellite = propagator.position_at(record, at)?;
    let observer_to_satellite = satellite - geodetic_to_eci(observer, jd);
    let sun_to_satellite = satellite - sun_position(jd);

    Ok(Geometry {
        distance: observer_to_satellite.magnitude(),
        phase_angle: observer_to_satellite.separation(&sun_to_satellite),
    })
}

fn simplified(intrinsic: f64, geometry: &Geometry) -> f64 {
    let illuminated = (1.0 + geometry.phase_angle.cos()) / 2.0;
    intrinsic + 5.0 * (geometry.distance / 1000.0).log10() - 2.5 * illuminated.log10()
}

/// Simplified apparent magnitude from the satellite's intrinsic magnitude,
/// its range and the fraction of its disc that is lit.
///
/// A satellite seen exactly against the Sun has no lit fraction and comes
/// out as `+inf`.
pub fn magnitude_at(
    propagator: &dyn Propagator,
    record: &ElementRecord,
    observer: &Geodetic,
    at: DateTime<Utc>,
) -> Result<f64, AstroError> {
    let info = SatelliteInfo::from_norad(record.norad_index)
        .ok_or(AstroError::IntrinsicMagnitudeNotFound(record.norad_index))?;
    let geometry = geometry(propagator, record, observer, at)?;
    Ok(simplified(info.intrinsic_magnitude(), &geometry))
}

/// Sample [`magnitude_at`] from `rise` to `set` inclusive.
///
/// `step` defaults to [`DEFAULT_MAGNITUDE_STEP`]; a non-positive step is
/// replaced by the default. A `set` before `rise` gives an empty pass.
pub fn magnitude_range(
    propagator: &dyn Propagator,
    record: &ElementRecord,
    observer: &Geodetic,
    rise: DateTime<Utc>,
    set: DateTime<Utc>,
    step: Option<Duration>,
) -> Result<Vec<ApparentMagnitude>, AstroError> {
    let info = SatelliteInfo::from_norad(record.norad_index)
        .ok_or(AstroError::IntrinsicMagnitudeNotFound(record.norad_index))?;
    let step = step
        .filter(|step| *step > Duration::zero())
        .unwrap_or_else(|| Duration::seconds(DEFAULT_MAGNITUDE_STEP));

    let mut samples = Vec::new();
    let mut at = rise;
    while at <= set {
        let geometry = geometry(propagator, record, observer, at)?;
        samples.push(ApparentMagnitude {
            at,
            magnitude: simplified(info.intrinsic_magnitude(), &geometry),
        });
        at += step;
    }
    Ok(samples)
}

/// Apparent magnitude from the satellite's cross-section and albedo with a
/// diffuse sphere phase function
pub fn precise_magnitude(
    propagator: &dyn Propagator,
    record: &ElementRecord,
    observer: &Geodetic,
    at: DateTime<Utc>,
) -> Result<f64, AstroError> {
    let info = SatelliteInfo::from_norad(record.norad_index)
        .ok_or(AstroError::AreaAndAlbedoNotFound(record.norad_index))?;
    let Geometry {
        distance,
        phase_angle,
    } = geometry(propagator, record, observer, at)?;

    let phase_function =
        2.0 / (3.0 * PI * PI) * ((PI - phase_angle) * phase_angle.cos() + phase_angle.sin());
    let reflected = info.area() * info.albedo() * phase_function;
    Ok(SUN_MAGNITUDE - 2.5 * reflected.log10() + 5.0 * distance.log10())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::astro::EciPosition;
    use crate::domain::tests::sample_record;
    use chrono::TimeZone;

    /// Puts the satellite `distance` km from the observer along `direction`
    struct FixedOffset {
        observer: Geodetic,
        direction: EciPosition,
        distance: f64,
    }

    impl Propagator for FixedOffset {
        fn position_at(
            &self,
            _record: &ElementRecord,
            at: DateTime<Utc>,
        ) -> Result<EciPosition, AstroError> {
            let unit = self.direction * (1.0 / self.direction.magnitude());
            Ok(geodetic_to_eci(&self.observer, julian_date(at)) + unit * self.distance)
        }
    }

    struct Failing;

    impl Propagator for Failing {
        fn position_at(
            &self,
            record: &ElementRecord,
            _at: DateTime<Utc>,
        ) -> Result<EciPosition, AstroError> {
            Err(AstroError::Propagation(format!("decayed {}", record.norad_index)))
        }
    }

    fn paris() -> Geodetic {
        Geodetic::new(48.85, 2.35, 0.035)
    }

    fn equinox() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 20, 3, 6, 0).unwrap()
    }

    /// Satellite on the far side from the Sun, so it is seen fully lit
    fn opposite_sun(distance: f64) -> FixedOffset {
        FixedOffset {
            observer: paris(),
            direction: EciPosition::new(-1.0, 0.0, 0.0),
            distance,
        }
    }

    #[test]
    fn test_fully_lit_at_reference_range_is_intrinsic() {
        let iss = sample_record(25544, "ISS (ZARYA)");
        let magnitude = magnitude_at(&opposite_sun(1000.0), &iss, &paris(), equinox()).unwrap();
        assert!((magnitude - -1.8).abs() < 1e-3, "{magnitude}");
    }

    #[test]
    fn test_doubling_range_dims_by_five_log_two() {
        let iss = sample_record(25544, "ISS (ZARYA)");
        let near = magnitude_at(&opposite_sun(800.0), &iss, &paris(), equinox()).unwrap();
        let far = magnitude_at(&opposite_sun(1600.0), &iss, &paris(), equinox()).unwrap();
        assert!((far - near - 5.0 * 2f64.log10()).abs() < 1e-3);

        let near = precise_magnitude(&opposite_sun(800.0), &iss, &paris(), equinox()).unwrap();
        let far = precise_magnitude(&opposite_sun(1600.0), &iss, &paris(), equinox()).unwrap();
        assert!((far - near - 5.0 * 2f64.log10()).abs() < 1e-3);
    }

    #[test]
    fn test_precise_magnitude_fully_lit() {
        let iss = sample_record(25544, "ISS (ZARYA)");
        let magnitude = precise_magnitude(&opposite_sun(1000.0), &iss, &paris(), equinox()).unwrap();
        let full_phase = 2.0 / (3.0 * PI);
        let expected = SUN_MAGNITUDE - 2.5 * (0.0025 * 0.4 * full_phase).log10() + 15.0;
        assert!((magnitude - expected).abs() < 1e-3, "{magnitude} vs {expected}");
    }

    #[test]
    fn test_unknown_satellite() {
        let unknown = sample_record(43641, "SAOCOM 1A");
        let propagator = opposite_sun(1000.0);
        assert!(matches!(
            magnitude_at(&propagator, &unknown, &paris(), equinox()),
            Err(AstroError::IntrinsicMagnitudeNotFound(43641))
        ));
        assert!(matches!(
            precise_magnitude(&propagator, &unknown, &paris(), equinox()),
            Err(AstroError::AreaAndAlbedoNotFound(43641))
        ));
    }

    #[test]
    fn test_propagation_failure_is_reported() {
        let iss = sample_record(25544, "ISS (ZARYA)");
        assert!(matches!(
            magnitude_at(&Failing, &iss, &paris(), equinox()),
            Err(AstroError::Propagation(_))
        ));
    }

    #[test]
    fn test_range_sampling() {
        let iss = sample_record(25544, "ISS (ZARYA)");
        let propagator = opposite_sun(1000.0);
        let rise = equinox();
        let set = rise + Duration::minutes(10);

        let pass = magnitude_range(&propagator, &iss, &paris(), rise, set, None).unwrap();
        assert_eq!(pass.len(), 11);
        assert_eq!(pass[0].at, rise);
        assert_eq!(pass[10].at, set);

        let fine = magnitude_range(
            &propagator,
            &iss,
            &paris(),
            rise,
            set,
            Some(Duration::seconds(30)),
        )
        .unwrap();
        assert_eq!(fine.len(), 21);

        let fallback =
            magnitude_range(&propagator, &iss, &paris(), rise, set, Some(Duration::zero())).unwrap();
        assert_eq!(fallback.len(), 11);

        let backwards = magnitude_range(&propagator, &iss, &paris(), set, rise, None).unwrap();
        assert!(backwards.is_empty());
    }
}
