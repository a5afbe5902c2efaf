use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};
use std::ops::{Add, Mul, Sub};

/// WGS84 equatorial radius in km
const EARTH_RADIUS_KM: f64 = 6378.137;
const FLATTENING: f64 = 1.0 / 298.257223563;
const AU_KM: f64 = 149_597_870.7;
const J2000_JD: f64 = 2_451_545.0;
const UNIX_EPOCH_JD: f64 = 2_440_587.5;

/// Earth-centred inertial position in km
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EciPosition {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl EciPosition {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn magnitude(&self) -> f64 {
        self.dot(self).sqrt()
    }

    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Angle between two vectors in radians, 0 if either is null
    pub fn separation(&self, other: &Self) -> f64 {
        let norms = self.magnitude() * other.magnitude();
        if norms == 0.0 {
            return 0.0;
        }
        (self.dot(other) / norms).clamp(-1.0, 1.0).acos()
    }
}

impl Add for EciPosition {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for EciPosition {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for EciPosition {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// Latitude and longitude in degrees, altitude in km above the ellipsoid
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Geodetic {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
}

impl Geodetic {
    pub fn new(latitude: f64, longitude: f64, altitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude,
        }
    }
}

pub fn julian_date(at: DateTime<Utc>) -> f64 {
    at.timestamp_millis() as f64 / 86_400_000.0 + UNIX_EPOCH_JD
}

/// Greenwich mean sidereal time in radians, in [0, 2π)
pub fn gmst(julian_date: f64) -> f64 {
    let t = (julian_date - J2000_JD) / 36_525.0;
    let seconds = 67_310.548_41
        + (876_600.0 * 3_600.0 + 8_640_184.812_866) * t
        + 0.093_104 * t * t
        - 6.2e-6 * t * t * t;
    (seconds.rem_euclid(86_400.0) / 240.0).to_radians()
}

/// Low precision position of the Sun, accurate to about 0.01°
pub fn sun_position(julian_date: f64) -> EciPosition {
    let n = julian_date - J2000_JD;
    let mean_longitude = 280.460 + 0.985_647_4 * n;
    let mean_anomaly = (357.528 + 0.985_600_3 * n).to_radians();
    let ecliptic_longitude = (mean_longitude
        + 1.915 * mean_anomaly.sin()
        + 0.020 * (2.0 * mean_anomaly).sin())
    .to_radians();
    let obliquity = (23.439 - 0.000_000_4 * n).to_radians();
    let distance_au =
        1.000_14 - 0.016_71 * mean_anomaly.cos() - 0.000_14 * (2.0 * mean_anomaly).cos();

    let distance = distance_au * AU_KM;
    EciPosition::new(
        distance * ecliptic_longitude.cos(),
        distance * obliquity.cos() * ecliptic_longitude.sin(),
        distance * obliquity.sin() * ecliptic_longitude.sin(),
    )
}

pub fn geodetic_to_eci(position: &Geodetic, julian_date: f64) -> EciPosition {
    let latitude = position.latitude.to_radians();
    let theta = (gmst(julian_date) + position.longitude.to_radians()).rem_euclid(TAU);

    let c = 1.0 / (1.0 + FLATTENING * (FLATTENING - 2.0) * latitude.sin().powi(2)).sqrt();
    let s = (1.0 - FLATTENING).powi(2) * c;
    let radial = (EARTH_RADIUS_KM * c + position.altitude) * latitude.cos();

    EciPosition::new(
        radial * theta.cos(),
        radial * theta.sin(),
        (EARTH_RADIUS_KM * s + position.altitude) * latitude.sin(),
    )
}

/// Inverse of [`geodetic_to_eci`]. Latitude is refined iteratively until it
/// moves by less than 1e-10 rad. Longitude is in [-180, 180).
pub fn eci_to_geodetic(position: &EciPosition, julian_date: f64) -> Geodetic {
    let theta = position.y.atan2(position.x);
    let longitude = (theta - gmst(julian_date) + PI).rem_euclid(TAU) - PI;
    let r = position.x.hypot(position.y);
    let e2 = FLATTENING * (2.0 - FLATTENING);

    let mut latitude = position.z.atan2(r);
    let mut c;
    let mut iterations = 0;
    loop {
        let previous = latitude;
        c = 1.0 / (1.0 - e2 * previous.sin().powi(2)).sqrt();
        latitude = (position.z + EARTH_RADIUS_KM * c * e2 * previous.sin()).atan2(r);
        iterations += 1;
        if (latitude - previous).abs() < 1e-10 || iterations >= 10 {
            break;
        }
    }

    Geodetic {
        latitude: latitude.to_degrees(),
        longitude: longitude.to_degrees(),
        altitude: r / latitude.cos() - EARTH_RADIUS_KM * c,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_julian_date_reference_points() {
        let epoch = Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(julian_date(epoch), UNIX_EPOCH_JD);

        let j2000 = Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap();
        assert!((julian_date(j2000) - J2000_JD).abs() < 1e-9);
    }

    #[test]
    fn test_gmst_at_j2000() {
        assert!((gmst(J2000_JD).to_degrees() - 280.460_618_37).abs() < 1e-6);
        let later = gmst(J2000_JD + 1234.567);
        assert!((0.0..TAU).contains(&later));
    }

    #[test]
    fn test_sun_distance_is_about_one_au() {
        for offset in [0.0, 91.0, 182.0, 273.0, 9000.0] {
            let au = sun_position(J2000_JD + offset).magnitude() / AU_KM;
            assert!((0.983..1.017).contains(&au), "{au} AU at +{offset} days");
        }
    }

    #[test]
    fn test_sun_near_vernal_equinox_direction() {
        let equinox = Utc.with_ymd_and_hms(2024, 3, 20, 3, 6, 0).unwrap();
        let sun = sun_position(julian_date(equinox));
        let towards_equinox = EciPosition::new(1.0, 0.0, 0.0);
        assert!(sun.separation(&towards_equinox).to_degrees() < 0.5);
    }

    #[test]
    fn test_geodetic_round_trip() {
        let jd = julian_date(Utc.with_ymd_and_hms(2025, 3, 27, 18, 30, 0).unwrap());
        for place in [
            Geodetic::new(45.0, 10.0, 0.5),
            Geodetic::new(-33.9, 151.2, 0.05),
            Geodetic::new(0.0, -179.5, 420.0),
            Geodetic::new(78.2, 15.6, 35_786.0),
        ] {
            let back = eci_to_geodetic(&geodetic_to_eci(&place, jd), jd);
            assert!((back.latitude - place.latitude).abs() < 1e-6, "{place:?}");
            assert!((back.longitude - place.longitude).abs() < 1e-6, "{place:?}");
            assert!((back.altitude - place.altitude).abs() < 1e-3, "{place:?}");
        }
    }

    #[test]
    fn test_equator_sits_on_equatorial_radius() {
        let eci = geodetic_to_eci(&Geodetic::new(0.0, 0.0, 0.0), J2000_JD);
        assert!((eci.magnitude() - EARTH_RADIUS_KM).abs() < 1e-9);
        assert!(eci.z.abs() < 1e-9);
    }

    #[test]
    fn test_separation() {
        let x = EciPosition::new(2.0, 0.0, 0.0);
        let y = EciPosition::new(0.0, 3.0, 0.0);
        assert!((x.separation(&y) - PI / 2.0).abs() < 1e-12);
        assert!((x.separation(&(x * -1.0)) - PI).abs() < 1e-12);
        assert_eq!(x.separation(&EciPosition::default()), 0.0);
    }
}
