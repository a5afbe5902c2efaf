//! CelesTrak OMM CSV with a fixed 17-column header
use super::{Format, OmmFields};
use crate::errors::{ElementsError, ElementsResult};

/// Header row every CSV payload must start with, in this order
pub const CSV_HEADERS: [&str; 17] = [
    "OBJECT_NAME",
    "OBJECT_ID",
    "EPOCH",
    "MEAN_MOTION",
    "ECCENTRICITY",
    "INCLINATION",
    "RA_OF_ASC_NODE",
    "ARG_OF_PERICENTER",
    "MEAN_ANOMALY",
    "EPHEMERIS_TYPE",
    "CLASSIFICATION_TYPE",
    "NORAD_CAT_ID",
    "ELEMENT_SET_NO",
    "REV_AT_EPOCH",
    "BSTAR",
    "MEAN_MOTION_DOT",
    "MEAN_MOTION_DDOT",
];

/// Check the header row and map every data row onto its column names
pub fn preprocess(text: &str) -> ElementsResult<Vec<OmmFields>> {
    let mut reader = ::csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(text.as_bytes());
    let mut rows = reader.records();

    let header = rows
        .next()
        .ok_or_else(|| ElementsError::malformed(Format::Csv, "empty input, no header row"))?
        .map_err(|e| ElementsError::malformed(Format::Csv, e.to_string()))?;

    if header.len() != CSV_HEADERS.len() {
        return Err(ElementsError::malformed(
            Format::Csv,
            format!(
                "header has {} columns, expected {}",
                header.len(),
                CSV_HEADERS.len()
            ),
        ));
    }
    if let Some((column, (found, expected))) = header
        .iter()
        .zip(CSV_HEADERS)
        .enumerate()
        .find(|(_, (found, expected))| found != expected)
    {
        return Err(ElementsError::malformed(
            Format::Csv,
            format!("header column {} is {found:?}, expected {expected:?}", column + 1),
        ));
    }

    rows.map(|row| {
        let row = row.map_err(|e| ElementsError::malformed(Format::Csv, e.to_string()))?;
        let mut fields = OmmFields::default();
        for (name, value) in CSV_HEADERS.iter().zip(row.iter()) {
            fields.insert(*name, value);
        }
        Ok(fields)
    })
    .collect()
}
