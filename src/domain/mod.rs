//! Domain models for orbital element sets
use crate::errors::{ElementsError, ElementsResult};
use crate::formats::{self, Format};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Name carried by the empty sentinel catalog
pub const EMPTY_CATALOG_NAME: &str = "empty";

/// One satellite's mean orbital elements at an epoch.
///
/// Angles are in degrees, mean motion in revolutions per day. Records are
/// built by the format parsers, which call [`ElementRecord::validate`] so
/// every record inside a [`Catalog`] holds finite values, an eccentricity in
/// `[0, 1)` and a positive mean motion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementRecord {
    pub norad_index: u32,
    pub common_name: String,
    /// International designator, e.g. `1998-067A` or `98067A`
    pub launch_name: String,
    pub epoch: DateTime<Utc>,
    pub eccentricity: f64,
    pub inclination: f64,
    pub arg_of_perigee: f64,
    pub raan: f64,
    pub mean_anomaly: f64,
    pub mean_motion: f64,
    pub mean_motion_dot: f64,
    pub mean_motion_ddot: f64,
    pub ephem_type: i32,
    pub tle_class: String,
    pub tle_number: i32,
    pub rev_number: i32,
    /// B* drag term
    pub drag_coeff: f64,
}

impl ElementRecord {
    /// Check the numeric invariants, returning the record unchanged when they hold
    pub fn validate(self) -> ElementsResult<Self> {
        let numeric = [
            ("ECCENTRICITY", self.eccentricity),
            ("INCLINATION", self.inclination),
            ("ARG_OF_PERICENTER", self.arg_of_perigee),
            ("RA_OF_ASC_NODE", self.raan),
            ("MEAN_ANOMALY", self.mean_anomaly),
            ("MEAN_MOTION", self.mean_motion),
            ("MEAN_MOTION_DOT", self.mean_motion_dot),
            ("MEAN_MOTION_DDOT", self.mean_motion_ddot),
            ("BSTAR", self.drag_coeff),
        ];
        for (field, value) in numeric {
            if !value.is_finite() {
                return Err(ElementsError::field(field, value.to_string(), "not a finite number"));
            }
        }

        if !(0.0..1.0).contains(&self.eccentricity) {
            return Err(ElementsError::field(
                "ECCENTRICITY",
                self.eccentricity.to_string(),
                "must be in [0, 1)",
            ));
        }
        if self.mean_motion <= 0.0 {
            return Err(ElementsError::field(
                "MEAN_MOTION",
                self.mean_motion.to_string(),
                "must be positive",
            ));
        }
        Ok(self)
    }

    /// Orbital period in minutes
    pub fn period_minutes(&self) -> f64 {
        1440.0 / self.mean_motion
    }

    pub fn describe(&self) -> String {
        format!(
            "{:>6} {:<24} epoch {} | e {:.7} i {:.4} Ω {:.4} ω {:.4} M {:.4} n {:.8}",
            self.norad_index,
            self.common_name,
            self.epoch.format("%Y-%m-%d %H:%M:%S%.6f"),
            self.eccentricity,
            self.inclination,
            self.raan,
            self.arg_of_perigee,
            self.mean_anomaly,
            self.mean_motion,
        )
    }
}

/// A named, dated collection of element records keyed by NORAD id.
///
/// Catalogs are never edited in place: loading new data produces a new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    name: String,
    as_of: DateTime<Utc>,
    records: HashMap<u32, ElementRecord>,
}

impl Catalog {
    /// Build a catalog. Later records replace earlier ones with the same id.
    pub fn new(
        records: impl IntoIterator<Item = ElementRecord>,
        name: &str,
        as_of: DateTime<Utc>,
    ) -> Self {
        let records = records
            .into_iter()
            .map(|record| (record.norad_index, record))
            .collect();
        Self {
            name: name.to_lowercase(),
            as_of,
            records,
        }
    }

    /// The empty sentinel: no records, dated at the Unix epoch
    pub fn empty() -> Self {
        Self {
            name: EMPTY_CATALOG_NAME.to_string(),
            as_of: DateTime::<Utc>::default(),
            records: HashMap::new(),
        }
    }

    /// Parse a raw payload in `format` and build a catalog from it
    pub fn from_payload(
        payload: &[u8],
        format: Format,
        name: &str,
        as_of: DateTime<Utc>,
    ) -> ElementsResult<Self> {
        let records = formats::parse_records(payload, format)?;
        Ok(Self::new(records, name, as_of))
    }

    pub fn lookup(&self, norad_index: u32) -> Option<&ElementRecord> {
        self.records.get(&norad_index)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn as_of(&self) -> DateTime<Utc> {
        self.as_of
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &ElementRecord> {
        self.records.values()
    }

    /// All NORAD ids in ascending order
    pub fn norad_ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.records.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Human readable summary, for diagnostics only
    pub fn describe(&self) -> String {
        format!(
            "┌─[Catalog]──────────────────────────────────────────\n\
             │  named: {:?}\n\
             │  dated: {}\n\
             │  count: {}\n\
             └────────────────────────────────────────────────────",
            self.name,
            self.as_of,
            self.records.len()
        )
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;

    pub(crate) fn sample_record(norad_index: u32, name: &str) -> ElementRecord {
        ElementRecord {
            norad_index,
            common_name: name.to_string(),
            launch_name: "1998-067A".to_string(),
            epoch: Utc.with_ymd_and_hms(2024, 2, 15, 14, 32, 18).unwrap(),
            eccentricity: 0.0001841,
            inclination: 51.6397,
            arg_of_perigee: 271.4206,
            raan: 202.8387,
            mean_anomaly: 164.9077,
            mean_motion: 15.49954571,
            mean_motion_dot: 0.00020226,
            mean_motion_ddot: 0.0,
            ephem_type: 0,
            tle_class: "U".to_string(),
            tle_number: 999,
            rev_number: 43954,
            drag_coeff: 0.00036203,
        }
    }

    #[test]
    fn test_lookup_present_and_absent() {
        let catalog = Catalog::new(
            vec![sample_record(25544, "ISS (ZARYA)"), sample_record(20580, "HST")],
            "Visual",
            Utc::now(),
        );
        assert_eq!(catalog.len(), 2);
        assert!(catalog.lookup(0).is_none());
        assert!(catalog.lookup(99999).is_none());
        assert_eq!(catalog.lookup(20580).unwrap().norad_index, 20580);
        assert_eq!(catalog.norad_ids(), vec![20580, 25544]);
    }

    #[test]
    fn test_duplicates_collapse_last_wins() {
        let catalog = Catalog::new(
            vec![
                sample_record(25544, "FIRST"),
                sample_record(25544, "SECOND"),
                sample_record(20580, "HST"),
            ],
            "dups",
            Utc::now(),
        );
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.lookup(25544).unwrap().common_name, "SECOND");
    }

    #[test]
    fn test_name_is_lowercased() {
        let catalog = Catalog::new(Vec::new(), "Brightest.TLE", Utc::now());
        assert_eq!(catalog.name(), "brightest.tle");
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_empty_sentinel() {
        let empty = Catalog::empty();
        assert_eq!(empty.name(), EMPTY_CATALOG_NAME);
        assert_eq!(empty.as_of().timestamp(), 0);
        assert!(empty.is_empty());
        assert_eq!(Catalog::default(), empty);
    }

    #[test]
    fn test_describe_mentions_count() {
        let catalog = Catalog::new(vec![sample_record(25544, "ISS")], "visual", Utc::now());
        let text = catalog.describe();
        assert!(text.contains("\"visual\""));
        assert!(text.contains("count: 1"));
    }

    #[test]
    fn test_validate_rejects_bad_elements() {
        let mut hyperbolic = sample_record(1, "X");
        hyperbolic.eccentricity = 1.2;
        assert!(matches!(
            hyperbolic.validate(),
            Err(ElementsError::FieldDecode { field: "ECCENTRICITY", .. })
        ));

        let mut stalled = sample_record(1, "X");
        stalled.mean_motion = 0.0;
        assert!(stalled.validate().is_err());

        let mut nan = sample_record(1, "X");
        nan.raan = f64::NAN;
        assert!(matches!(
            nan.validate(),
            Err(ElementsError::FieldDecode { field: "RA_OF_ASC_NODE", .. })
        ));

        assert!(sample_record(1, "X").validate().is_ok());
    }

    #[test]
    fn test_period_minutes() {
        let record = sample_record(25544, "ISS");
        assert!((record.period_minutes() - 92.9).abs() < 0.1);
    }

    #[test]
    fn test_serde_roundtrip_keeps_catalog() {
        let catalog = Catalog::new(
            vec![sample_record(25544, "ISS"), sample_record(48274, "CSS")],
            "stations",
            Utc.with_ymd_and_hms(2025, 3, 18, 9, 0, 0).unwrap(),
        );
        let json = serde_json::to_string(&catalog).unwrap();
        let back: Catalog = serde_json::from_str(&json).unwrap();
        assert_eq!(back, catalog);
    }
}
