//! Three-line element sets (name line + NORAD lines 1 and 2)
use super::Format;
use crate::domain::ElementRecord;
use crate::errors::{ElementsError, ElementsResult};
use crate::utils::{
    parse_finite, parse_implied_decimal, parse_number, parse_tle_epoch, tle_checksum,
};

const TLE_LINE_LEN: usize = 69;

/// One satellite's lines, borrowed from the payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TleTriplet<'a> {
    pub name: &'a str,
    pub line1: &'a str,
    pub line2: &'a str,
    /// 1-based line number of the name line in the payload
    pub line_number: usize,
}

/// Split TLE text into `(name, line1, line2)` triplets.
///
/// Blank lines are ignored and a leading `0 ` on the name line is dropped.
/// A payload without any element lines is malformed, and the first group
/// that is not a well formed triplet rejects the payload.
pub fn preprocess_tles(text: &str) -> ElementsResult<Vec<TleTriplet<'_>>> {
    let lines: Vec<(usize, &str)> = text
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
        .collect();

    if lines.is_empty() {
        return Err(ElementsError::malformed(Format::Tle, "no element lines"));
    }
    if lines.len() % 3 != 0 {
        return Err(ElementsError::malformed(
            Format::Tle,
            format!("{} non-blank lines is not a whole number of 3-line groups", lines.len()),
        ));
    }

    lines
        .chunks_exact(3)
        .map(|group| {
            let (line_number, name) = group[0];
            let (n1, line1) = group[1];
            let (n2, line2) = group[2];

            check_line(line1, n1, '1')?;
            check_line(line2, n2, '2')?;
            if line1[2..7] != line2[2..7] {
                return Err(ElementsError::malformed(
                    Format::Tle,
                    format!("lines {n1} and {n2} carry different catalog numbers"),
                ));
            }

            Ok(TleTriplet {
                name: name.strip_prefix("0 ").unwrap_or(name).trim(),
                line1,
                line2,
                line_number,
            })
        })
        .collect()
}

fn check_line(line: &str, line_number: usize, marker: char) -> ElementsResult<()> {
    let mut chars = line.chars();
    if chars.next() != Some(marker) || chars.next() != Some(' ') {
        return Err(ElementsError::malformed(
            Format::Tle,
            format!("line {line_number} should start with \"{marker} \": {line:?}"),
        ));
    }
    if !line.is_ascii() || line.len() < TLE_LINE_LEN {
        return Err(ElementsError::malformed(
            Format::Tle,
            format!("line {line_number} is not a {TLE_LINE_LEN}-column ASCII TLE line"),
        ));
    }

    let expected = tle_checksum(line);
    let found = line.as_bytes()[TLE_LINE_LEN - 1];
    if found != b'0' + expected as u8 {
        return Err(ElementsError::malformed(
            Format::Tle,
            format!(
                "line {line_number} checksum {} does not match computed {expected}",
                found as char
            ),
        ));
    }
    Ok(())
}

/// Decode the fixed columns of one checked triplet
pub fn parse_triplet(triplet: &TleTriplet<'_>) -> ElementsResult<ElementRecord> {
    let l1 = triplet.line1;
    let l2 = triplet.line2;

    ElementRecord {
        norad_index: parse_number("NORAD_CAT_ID", &l1[2..7])?,
        common_name: triplet.name.to_string(),
        launch_name: l1[9..17].trim().to_string(),
        epoch: parse_tle_epoch("EPOCH", &l1[18..32])?,
        mean_motion_dot: parse_finite("MEAN_MOTION_DOT", &l1[33..43])?,
        mean_motion_ddot: parse_implied_decimal("MEAN_MOTION_DDOT", &l1[44..52])?,
        drag_coeff: parse_implied_decimal("BSTAR", &l1[53..61])?,
        ephem_type: ephemeris_type(&l1[62..63])?,
        tle_class: l1[7..8].trim().to_string(),
        tle_number: parse_number("ELEMENT_SET_NO", &l1[64..68])?,
        inclination: parse_finite("INCLINATION", &l2[8..16])?,
        raan: parse_finite("RA_OF_ASC_NODE", &l2[17..25])?,
        eccentricity: parse_finite("ECCENTRICITY", &format!("0.{}", l2[26..33].trim()))?,
        arg_of_perigee: parse_finite("ARG_OF_PERICENTER", &l2[34..42])?,
        mean_anomaly: parse_finite("MEAN_ANOMALY", &l2[43..51])?,
        mean_motion: parse_finite("MEAN_MOTION", &l2[52..63])?,
        rev_number: parse_number("REV_AT_EPOCH", &l2[63..68])?,
    }
    .validate()
}

/// Column 63 is often left blank, which means model 0
fn ephemeris_type(raw: &str) -> ElementsResult<i32> {
    if raw.trim().is_empty() {
        Ok(0)
    } else {
        parse_number("EPHEMERIS_TYPE", raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::tests::TLE_TEST_TEXT;
    use chrono::{Datelike, Timelike};

    const LINE0: &str = "AEOLUS";
    const LINE1: &str = "1 43600U 18066A   22284.46945825  .00152878  00000+0  58141-3 0  9997";
    const LINE2: &str = "2 43600  96.7345 288.3479 0007589 105.2673 254.9439 15.87150682239523";

    #[test]
    fn test_preprocess_four_satellites() {
        let triplets = preprocess_tles(TLE_TEST_TEXT).unwrap();
        assert_eq!(triplets.len(), 4);
        assert_eq!(triplets[0].name, "AEOLUS");
        assert_eq!(triplets[3].name, "CSS (TIANHE)");
        assert_eq!(triplets[1].line_number, 4);
    }

    #[test]
    fn test_preprocess_tolerates_crlf_indent_and_zero_prefix() {
        let text = format!("\r\n  0 {LINE0}\r\n  {LINE1}\r\n  {LINE2}\r\n\r\n");
        let triplets = preprocess_tles(&text).unwrap();
        assert_eq!(triplets.len(), 1);
        assert_eq!(triplets[0].name, "AEOLUS");
        assert_eq!(triplets[0].line1, LINE1);
    }

    #[test]
    fn test_preprocess_rejects_incomplete_group() {
        let text = format!("{LINE0}\n{LINE1}\n");
        assert!(matches!(
            preprocess_tles(&text),
            Err(ElementsError::MalformedInput { format: Format::Tle, .. })
        ));
        assert!(preprocess_tles("elements text").is_err());
    }

    #[test]
    fn test_preprocess_rejects_blank_payload() {
        for text in ["", "  \r\n\n", "\t\n \n"] {
            let err = preprocess_tles(text).unwrap_err();
            assert!(
                matches!(err, ElementsError::MalformedInput { format: Format::Tle, .. }),
                "{text:?} accepted"
            );
            assert!(err.to_string().contains("no element lines"));
        }
    }

    #[test]
    fn test_preprocess_rejects_swapped_lines() {
        let text = format!("{LINE0}\n{LINE2}\n{LINE1}\n");
        let err = preprocess_tles(&text).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_preprocess_rejects_bad_checksum() {
        let corrupted = LINE2.replace("96.7345", "96.7346");
        let text = format!("{LINE0}\n{LINE1}\n{corrupted}\n");
        let err = preprocess_tles(&text).unwrap_err();
        assert!(err.to_string().contains("checksum"));
    }

    #[test]
    fn test_preprocess_rejects_mismatched_catalog_numbers() {
        let text = TLE_TEST_TEXT.lines().collect::<Vec<_>>();
        // AEOLUS line 1 with SAOCOM 1A line 2
        let mixed = format!("{}\n{}\n{}\n", text[0], text[1], text[5]);
        let err = preprocess_tles(&mixed).unwrap_err();
        assert!(err.to_string().contains("different catalog numbers"));
    }

    #[test]
    fn test_parse_triplet_fields() {
        let triplets = preprocess_tles(TLE_TEST_TEXT).unwrap();
        let record = parse_triplet(&triplets[0]).unwrap();

        assert_eq!(record.norad_index, 43600);
        assert_eq!(record.common_name, "AEOLUS");
        assert_eq!(record.launch_name, "18066A");
        assert_eq!(record.tle_class, "U");
        assert_eq!(record.ephem_type, 0);
        assert_eq!(record.tle_number, 999);
        assert_eq!(record.rev_number, 23952);
        assert_eq!(record.inclination, 96.7345);
        assert_eq!(record.raan, 288.3479);
        assert_eq!(record.eccentricity, 0.0007589);
        assert_eq!(record.arg_of_perigee, 105.2673);
        assert_eq!(record.mean_anomaly, 254.9439);
        assert_eq!(record.mean_motion, 15.87150682);
        assert_eq!(record.mean_motion_dot, 0.00152878);
        assert_eq!(record.mean_motion_ddot, 0.0);
        assert!((record.drag_coeff - 0.58141e-3).abs() < 1e-15);

        assert_eq!(record.epoch.year(), 2022);
        assert_eq!(record.epoch.ordinal(), 284);
        assert_eq!(record.epoch.hour(), 11);
    }

    #[test]
    fn test_parse_triplet_short_revolution_field() {
        let triplets = preprocess_tles(TLE_TEST_TEXT).unwrap();
        let tianhe = parse_triplet(&triplets[3]).unwrap();
        assert_eq!(tianhe.norad_index, 48274);
        assert_eq!(tianhe.rev_number, 8301);
        assert_eq!(tianhe.mean_anomaly, 0.1704);
    }
}
