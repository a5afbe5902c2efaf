//! Utility functions
use crate::errors::{ElementsError, ElementsResult};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use std::borrow::Cow;
use std::str::FromStr;

const MICROS_PER_DAY: f64 = 86_400_000_000.0;

/// Parse a trimmed field into any `FromStr` type
pub fn parse_number<T: FromStr>(field: &'static str, raw: &str) -> ElementsResult<T> {
    let trimmed = raw.trim();
    trimmed
        .parse::<T>()
        .map_err(|_| ElementsError::field(field, raw, "not a valid number"))
}

/// Parse a floating point field, rejecting NaN and infinities
pub fn parse_finite(field: &'static str, raw: &str) -> ElementsResult<f64> {
    let value: f64 = parse_number(field, raw)?;
    if !value.is_finite() {
        return Err(ElementsError::field(field, raw, "not a finite number"));
    }
    Ok(value)
}

/// Parse the TLE "implied decimal" notation, e.g. ` 58141-3` → 0.58141e-3
pub fn parse_implied_decimal(field: &'static str, raw: &str) -> ElementsResult<f64> {
    let s = raw.trim();
    if s.is_empty() {
        return Ok(0.0);
    }

    let (sign, rest) = match s.as_bytes()[0] {
        b'-' => ("-", &s[1..]),
        b'+' => ("", &s[1..]),
        _ => ("", s),
    };

    let (mantissa, exponent) = match rest.len() {
        n if n >= 2 && matches!(rest.as_bytes()[n - 2], b'-' | b'+') => {
            (&rest[..n - 2], &rest[n - 2..])
        }
        _ => (rest, "+0"),
    };

    if mantissa.is_empty() || !mantissa.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ElementsError::field(field, raw, "invalid implied-decimal mantissa"));
    }
    if !exponent.as_bytes()[1].is_ascii_digit() {
        return Err(ElementsError::field(field, raw, "invalid implied-decimal exponent"));
    }

    parse_finite(field, &format!("{sign}0.{mantissa}e{exponent}"))
}

/// Parse an ISO-8601 timestamp without zone (CelesTrak OMM epochs) as UTC
pub fn parse_iso8601_micros(field: &'static str, raw: &str) -> ElementsResult<DateTime<Utc>> {
    let s = raw.trim();
    if let Ok(dt) = s.parse::<DateTime<Utc>>() {
        return Ok(dt);
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|ndt| Utc.from_utc_datetime(&ndt))
        .map_err(|e| ElementsError::field(field, raw, e.to_string()))
}

/// Convert a TLE epoch `YYDDD.DDDDDDDD` to a UTC timestamp.
/// Two-digit years below 57 belong to the 21st century.
pub fn parse_tle_epoch(field: &'static str, raw: &str) -> ElementsResult<DateTime<Utc>> {
    let s = raw.trim();
    if s.len() < 3 || !s.is_char_boundary(2) {
        return Err(ElementsError::field(field, raw, "epoch too short"));
    }
    let yy: i32 = parse_number(field, &s[..2])?;
    let day_of_year = parse_finite(field, &s[2..])?;

    let year = if yy < 57 { 2000 + yy } else { 1900 + yy };
    let days_in_year = if NaiveDate::from_yo_opt(year, 366).is_some() { 366.0 } else { 365.0 };
    if !(1.0..days_in_year + 1.0).contains(&day_of_year) {
        return Err(ElementsError::field(
            field,
            raw,
            format!("day of year outside 1..={days_in_year} for {year}"),
        ));
    }

    let jan1 = NaiveDate::from_yo_opt(year, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| ElementsError::field(field, raw, "invalid epoch year"))?;

    let offset = Duration::microseconds(((day_of_year - 1.0) * MICROS_PER_DAY).round() as i64);
    Ok(Utc.from_utc_datetime(&jan1) + offset)
}

/// Mod-10 checksum over the first 68 columns of a TLE line, minus signs count as 1
pub fn tle_checksum(line: &str) -> u32 {
    line.bytes()
        .take(68)
        .map(|b| match b {
            b'0'..=b'9' => u32::from(b - b'0'),
            b'-' => 1,
            _ => 0,
        })
        .sum::<u32>()
        % 10
}

/// Parse an HTTP `Date` header (RFC 7231 IMF-fixdate)
pub fn parse_http_date(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(raw.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Decode the five predefined XML entities
pub fn decode_xml_entities(s: &str) -> Cow<'_, str> {
    if !s.contains('&') {
        return Cow::Borrowed(s);
    }
    Cow::Owned(
        s.replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&apos;", "'")
            .replace("&amp;", "&"),
    )
}
