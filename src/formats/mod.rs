//! Element-set payload formats and the shared record parser
mod csv;
mod json;
mod tle;
mod xml;

pub use self::csv::CSV_HEADERS;
pub use self::tle::{preprocess_tles, TleTriplet};

use crate::domain::ElementRecord;
use crate::errors::{ElementsError, ElementsResult};
use crate::utils::{parse_finite, parse_iso8601_micros, parse_number};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Encodings an element-set payload can arrive in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Tle,
    Json,
    Xml,
    Csv,
}

impl Format {
    pub const ALL: [Format; 4] = [Format::Tle, Format::Json, Format::Xml, Format::Csv];

    /// Value of the CelesTrak `FORMAT` query parameter
    pub fn celestrak_code(self) -> &'static str {
        match self {
            Format::Tle => "TLE",
            Format::Json => "JSON",
            Format::Xml => "XML",
            Format::Csv => "CSV",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Format::Tle => "tle",
            Format::Json => "json",
            Format::Xml => "xml",
            Format::Csv => "csv",
        }
    }

    /// Map an HTTP `Content-Type` value onto a format.
    /// Plain text is treated as TLE, the way CelesTrak serves it.
    pub fn from_content_type(content_type: &str) -> Option<Format> {
        let mime = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        let (_, subtype) = mime.split_once('/')?;

        if subtype.starts_with("json") {
            Some(Format::Json)
        } else if subtype.starts_with("xml") {
            Some(Format::Xml)
        } else if subtype.starts_with("csv") {
            Some(Format::Csv)
        } else if subtype.starts_with("plain") {
            Some(Format::Tle)
        } else {
            None
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.celestrak_code())
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tle" | "3le" | "txt" => Ok(Format::Tle),
            "json" | "jsn" => Ok(Format::Json),
            "xml" => Ok(Format::Xml),
            "csv" => Ok(Format::Csv),
            other => Err(format!("unknown element format {other:?} (expected tle, json, xml or csv)")),
        }
    }
}

/// Parse a whole payload into element records.
///
/// Any structural or field failure rejects the entire payload.
pub fn parse_records(payload: &[u8], format: Format) -> ElementsResult<Vec<ElementRecord>> {
    let text = std::str::from_utf8(payload).map_err(|e| {
        ElementsError::malformed(format, format!("payload is not valid UTF-8: {e}"))
    })?;

    let records = match format {
        Format::Tle => preprocess_tles(text)?
            .iter()
            .map(tle::parse_triplet)
            .collect::<ElementsResult<Vec<_>>>()?,
        Format::Json => json::parse(text)?,
        Format::Xml => xml::preprocess(text)?
            .iter()
            .map(record_from_fields)
            .collect::<ElementsResult<Vec<_>>>()?,
        Format::Csv => csv::preprocess(text)?
            .iter()
            .map(record_from_fields)
            .collect::<ElementsResult<Vec<_>>>()?,
    };

    tracing::debug!(%format, count = records.len(), "parsed element records");
    Ok(records)
}

/// One record's OMM fields by name, as raw text
#[derive(Debug, Default, Clone)]
pub struct OmmFields {
    values: HashMap<String, String>,
}

impl OmmFields {
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, field: &'static str) -> ElementsResult<&str> {
        self.values
            .get(field)
            .map(String::as_str)
            .ok_or_else(|| ElementsError::field(field, "", "missing field"))
    }

    fn optional(&self, field: &str) -> &str {
        self.values.get(field).map(String::as_str).unwrap_or_default()
    }
}

/// Build a record from named OMM fields (CSV columns or XML tags)
pub fn record_from_fields(fields: &OmmFields) -> ElementsResult<ElementRecord> {
    let finite = |name: &'static str| -> ElementsResult<f64> { parse_finite(name, fields.get(name)?) };

    ElementRecord {
        norad_index: parse_number("NORAD_CAT_ID", fields.get("NORAD_CAT_ID")?)?,
        common_name: fields.get("OBJECT_NAME")?.trim().to_string(),
        launch_name: fields.optional("OBJECT_ID").trim().to_string(),
        epoch: parse_iso8601_micros("EPOCH", fields.get("EPOCH")?)?,
        eccentricity: finite("ECCENTRICITY")?,
        inclination: finite("INCLINATION")?,
        arg_of_perigee: finite("ARG_OF_PERICENTER")?,
        raan: finite("RA_OF_ASC_NODE")?,
        mean_anomaly: finite("MEAN_ANOMALY")?,
        mean_motion: finite("MEAN_MOTION")?,
        mean_motion_dot: finite("MEAN_MOTION_DOT")?,
        mean_motion_ddot: finite("MEAN_MOTION_DDOT")?,
        ephem_type: parse_number("EPHEMERIS_TYPE", fields.get("EPHEMERIS_TYPE")?)?,
        tle_class: fields.get("CLASSIFICATION_TYPE")?.trim().to_string(),
        tle_number: parse_number("ELEMENT_SET_NO", fields.get("ELEMENT_SET_NO")?)?,
        rev_number: parse_number("REV_AT_EPOCH", fields.get("REV_AT_EPOCH")?)?,
        drag_coeff: finite("BSTAR")?,
    }
    .validate()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const TLE_TEST_TEXT: &str = "\
AEOLUS
1 43600U 18066A   22284.46945825  .00152878  00000+0  58141-3 0  9997
2 43600  96.7345 288.3479 0007589 105.2673 254.9439 15.87150682239523
SAOCOM 1A
1 43641U 18076A   22284.79847383  .00000741  00000+0  99640-4 0  9990
2 43641  97.8890 109.8412 0001345  85.0542 275.0827 14.82165765216963
SAOCOM 1B
1 46265U 20059A   22284.82961417  .00000752  00000+0  10095-3 0  9996
2 46265  97.8884 108.9320 0001360  82.4383 277.6991 14.82166892114363
CSS (TIANHE)
1 48274U 21035A   22284.85984020  .00036888  00000+0  41780-3 0  9995
2 48274  41.4737 228.0269 0000989  91.3347   0.1704 15.61668898 83017
";

    #[test]
    fn test_format_from_str() {
        assert_eq!("TLE".parse::<Format>().unwrap(), Format::Tle);
        assert_eq!(" json ".parse::<Format>().unwrap(), Format::Json);
        assert_eq!("csv".parse::<Format>().unwrap(), Format::Csv);
        assert!("kvn".parse::<Format>().is_err());
    }

    #[test]
    fn test_format_from_content_type() {
        assert_eq!(
            Format::from_content_type("application/json; charset=utf-8"),
            Some(Format::Json)
        );
        assert_eq!(Format::from_content_type("text/xml"), Some(Format::Xml));
        assert_eq!(Format::from_content_type("application/xml"), Some(Format::Xml));
        assert_eq!(Format::from_content_type("text/csv"), Some(Format::Csv));
        assert_eq!(Format::from_content_type("text/plain;charset=UTF-8"), Some(Format::Tle));
        assert_eq!(Format::from_content_type("image/png"), None);
        assert_eq!(Format::from_content_type("garbage"), None);
    }

    #[test]
    fn test_parse_records_rejects_non_utf8() {
        let err = parse_records(&[0x41, 0xff, 0xfe], Format::Tle).unwrap_err();
        assert!(matches!(
            err,
            ElementsError::MalformedInput { format: Format::Tle, .. }
        ));
    }

    #[test]
    fn test_parse_records_tle_block() {
        let records = parse_records(TLE_TEST_TEXT.as_bytes(), Format::Tle).unwrap();
        let ids: Vec<u32> = records.iter().map(|r| r.norad_index).collect();
        assert_eq!(ids, vec![43600, 43641, 46265, 48274]);
    }

    #[test]
    fn test_record_from_fields_missing_field() {
        let mut fields = OmmFields::default();
        fields.insert("OBJECT_NAME", "ISS (ZARYA)");
        let err = record_from_fields(&fields).unwrap_err();
        assert!(matches!(
            err,
            ElementsError::FieldDecode { field: "NORAD_CAT_ID", .. }
        ));
    }
}
