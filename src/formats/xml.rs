//! CelesTrak OMM XML (`<segment>` per object)
use super::{Format, OmmFields};
use crate::errors::{ElementsError, ElementsResult};
use crate::utils::decode_xml_entities;
use regex::Regex;

/// Isolate every `<segment>` and read its leaf tags into field maps.
///
/// Only leaf elements (text without nested tags) are collected, so the
/// `metadata`, `meanElements` and `tleParameters` groupings flatten into
/// one map keyed by tag name.
pub fn preprocess(text: &str) -> ElementsResult<Vec<OmmFields>> {
    let segment_re = Regex::new(r"(?s)<segment>(.*?)</segment>")
        .map_err(|e| ElementsError::malformed(Format::Xml, e.to_string()))?;
    let leaf_re = Regex::new(r"<([A-Za-z_][A-Za-z0-9_]*)>([^<]*)</([A-Za-z_][A-Za-z0-9_]*)>")
        .map_err(|e| ElementsError::malformed(Format::Xml, e.to_string()))?;

    let segments: Vec<&str> = segment_re
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect();

    if segments.is_empty() {
        return Err(ElementsError::malformed(Format::Xml, "no <segment> elements found"));
    }

    segments
        .iter()
        .enumerate()
        .map(|(idx, segment)| {
            let mut fields = OmmFields::default();
            for caps in leaf_re.captures_iter(segment) {
                let (open, value, close) = (&caps[1], &caps[2], &caps[3]);
                if open != close {
                    return Err(ElementsError::malformed(
                        Format::Xml,
                        format!("segment {}: <{open}> closed by </{close}>", idx + 1),
                    ));
                }
                fields.insert(open, decode_xml_entities(value.trim()));
            }
            Ok(fields)
        })
        .collect()
}
