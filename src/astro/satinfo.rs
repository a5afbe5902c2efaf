use serde::Serialize;

/// Photometric presets for commonly observed satellites.
///
/// The intrinsic magnitude feeds the simplified magnitude model, area and
/// albedo feed the precise one. Areas are in km², which is what makes the
/// precise model agree with observed brightness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SatelliteInfo {
    Iss,
    Hubble,
    Tiangong,
    BlueWalker3,
    SolarSail,
    Envisat,
}

impl SatelliteInfo {
    pub const ALL: [SatelliteInfo; 6] = [
        SatelliteInfo::Iss,
        SatelliteInfo::Hubble,
        SatelliteInfo::Tiangong,
        SatelliteInfo::BlueWalker3,
        SatelliteInfo::SolarSail,
        SatelliteInfo::Envisat,
    ];

    pub fn from_norad(norad_index: u32) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|info| info.norad_index() == norad_index)
    }

    pub fn norad_index(self) -> u32 {
        match self {
            SatelliteInfo::Iss => 25544,
            SatelliteInfo::Hubble => 20580,
            SatelliteInfo::Tiangong => 48274,
            SatelliteInfo::BlueWalker3 => 53807,
            SatelliteInfo::SolarSail => 59588,
            SatelliteInfo::Envisat => 27386,
        }
    }

    /// Magnitude at 1000 km, fully lit
    pub fn intrinsic_magnitude(self) -> f64 {
        match self {
            SatelliteInfo::Iss => -1.8,
            SatelliteInfo::Hubble => 2.2,
            SatelliteInfo::Tiangong => 0.0,
            SatelliteInfo::BlueWalker3 => 3.5,
            SatelliteInfo::SolarSail => 2.0,
            SatelliteInfo::Envisat => 3.7,
        }
    }

    pub fn area(self) -> f64 {
        match self {
            SatelliteInfo::Iss => 0.0025,
            SatelliteInfo::Hubble => 0.000_03,
            SatelliteInfo::Tiangong => 0.0007,
            SatelliteInfo::BlueWalker3 => 0.000_012,
            SatelliteInfo::SolarSail => 0.000_015,
            SatelliteInfo::Envisat => 0.0001,
        }
    }

    pub fn albedo(self) -> f64 {
        match self {
            SatelliteInfo::Iss => 0.4,
            SatelliteInfo::Hubble => 0.35,
            SatelliteInfo::Tiangong => 0.45,
            SatelliteInfo::BlueWalker3 => 0.65,
            SatelliteInfo::SolarSail => 0.85,
            SatelliteInfo::Envisat => 0.35,
        }
    }
}
