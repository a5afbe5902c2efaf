//! Coordinate conversions and visibility helpers built on element records
mod coordinates;
mod magnitude;
mod orbit;
mod satinfo;

pub use coordinates::{
    eci_to_geodetic, geodetic_to_eci, gmst, julian_date, sun_position, EciPosition, Geodetic,
};
pub use magnitude::{
    magnitude_at, magnitude_range, precise_magnitude, ApparentMagnitude, DEFAULT_MAGNITUDE_STEP,
};
pub use orbit::{orbit_path, orbit_path_over, ORBIT_PATH_MINUTES};
pub use satinfo::SatelliteInfo;

use crate::domain::ElementRecord;
use crate::errors::AstroError;
use chrono::{DateTime, Utc};

/// Turns an element record into an inertial position at a given instant.
///
/// No propagator ships with this crate; callers plug in SGP4 or similar.
pub trait Propagator {
    fn position_at(
        &self,
        record: &ElementRecord,
        at: DateTime<Utc>,
    ) -> Result<EciPosition, AstroError>;
}
