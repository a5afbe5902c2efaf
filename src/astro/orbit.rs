use super::coordinates::{eci_to_geodetic, julian_date, Geodetic};
use super::Propagator;
use crate::domain::ElementRecord;
use crate::errors::AstroError;
use chrono::{DateTime, Duration, Utc};

/// Span of [`orbit_path`], roughly one revolution in low Earth orbit
pub const ORBIT_PATH_MINUTES: u32 = 90;

/// Ground track over the next [`ORBIT_PATH_MINUTES`], one point per minute
/// with both ends included
pub fn orbit_path(
    propagator: &dyn Propagator,
    record: &ElementRecord,
    start: DateTime<Utc>,
) -> Result<Vec<Geodetic>, AstroError> {
    orbit_path_over(propagator, record, start, ORBIT_PATH_MINUTES)
}

/// Ground track over `minutes`, for orbits slower than low Earth orbit.
/// Longitudes are normalized to [-180, 180).
pub fn orbit_path_over(
    propagator: &dyn Propagator,
    record: &ElementRecord,
    start: DateTime<Utc>,
    minutes: u32,
) -> Result<Vec<Geodetic>, AstroError> {
    (0..=minutes)
        .map(|minute| {
            let at = start + Duration::minutes(i64::from(minute));
            let position = propagator
                .position_at(record, at)
                .map_err(|e| AstroError::OrbitPath(format!("minute {minute}: {e}")))?;
            let mut point = eci_to_geodetic(&position, julian_date(at));
            point.longitude -= ((point.longitude + 180.0) / 360.0).floor() * 360.0;
            Ok(point)
        })
        .collect()
}
