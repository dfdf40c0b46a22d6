//! Mapper implementations for converting between DTOs and contract models
//!
//! Also decodes the url-encoded section forms into option records.

use super::dto::*;
use crate::contract::{self, OptionRecord, SettingsPageError};
use crate::domain::schema::FrozenSchema;
use serde_json::{Map, Value};

// ===== Section conversions =====

impl SectionDto {
    pub fn from_schema(section: &contract::Section, schema: &FrozenSchema) -> Self {
        Self {
            id: section.id.clone(),
            title: section.title.clone(),
            fields: schema
                .fields_of(&section.id)
                .iter()
                .map(|f| f.id.clone())
                .collect(),
        }
    }
}

impl OptionRecordDto {
    pub fn new(section: impl Into<String>, values: OptionRecord) -> Self {
        Self {
            section: section.into(),
            values,
        }
    }
}

// ===== Form decoding =====

/// A decoded section form submission
#[derive(Debug, Clone, PartialEq)]
pub struct SectionSubmission {
    /// Value of `option_page`
    pub section: String,
    /// Value of `_nonce`, if posted
    pub nonce: Option<String>,
    /// Value of `_http_referer`, if posted
    pub referer: Option<String>,
    /// Values posted under `section[...]`
    pub record: OptionRecord,
}

/// Decode form pairs into a submission for the section named by `option_page`.
///
/// `section[field]` becomes a string value and `section[field][key]` an
/// entry of a nested mapping; later pairs override earlier ones. Pairs for
/// other sections are ignored.
pub fn parse_section_form(pairs: &[(String, String)]) -> Result<SectionSubmission, SettingsPageError> {
    let section = pairs
        .iter()
        .find(|(k, _)| k == "option_page")
        .map(|(_, v)| v.clone())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| SettingsPageError::malformed("option_page", "form does not name a section"))?;

    let lookup = |name: &str| {
        pairs
            .iter()
            .rev()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
    };

    let mut record = Map::new();
    for (key, value) in pairs {
        let Some(path) = bracket_path(key) else {
            continue;
        };
        match path.as_slice() {
            [owner, field] if *owner == section => {
                record.insert(field.to_string(), Value::String(value.clone()));
            }
            [owner, field, entry] if *owner == section => {
                let slot = record
                    .entry(field.to_string())
                    .or_insert_with(|| Value::Object(Map::new()));
                if !slot.is_object() {
                    *slot = Value::Object(Map::new());
                }
                if let Value::Object(map) = slot {
                    map.insert(entry.to_string(), Value::String(value.clone()));
                }
            }
            _ => {}
        }
    }

    Ok(SectionSubmission {
        nonce: lookup("_nonce"),
        referer: lookup("_http_referer"),
        section,
        record,
    })
}

/// Split `a[b][c]` into `["a", "b", "c"]`; None for names without brackets
fn bracket_path(name: &str) -> Option<Vec<&str>> {
    let (head, mut rest) = name.split_once('[')?;
    let mut parts = vec![head];
    loop {
        let (segment, tail) = rest.split_once(']')?;
        parts.push(segment);
        if tail.is_empty() {
            return Some(parts);
        }
        rest = tail.strip_prefix('[')?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_scalar_and_nested_values() {
        let form = pairs(&[
            ("option_page", "general"),
            ("action", "update"),
            ("_nonce", "abc"),
            ("_http_referer", "/settings"),
            ("general[site]", "Acme"),
            ("general[debug]", "off"),
            ("general[debug]", "on"),
            ("general[days]", ""),
            ("general[days][mon]", "mon"),
            ("advanced[level]", "3"),
        ]);

        let submission = parse_section_form(&form).unwrap();
        assert_eq!(submission.section, "general");
        assert_eq!(submission.nonce.as_deref(), Some("abc"));
        assert_eq!(submission.referer.as_deref(), Some("/settings"));
        assert_eq!(
            Value::Object(submission.record),
            json!({"site": "Acme", "debug": "on", "days": {"mon": "mon"}})
        );
    }

    #[test]
    fn test_missing_option_page_is_malformed() {
        let err = parse_section_form(&pairs(&[("general[site]", "x")])).unwrap_err();
        assert!(matches!(err, SettingsPageError::MalformedInput { .. }));
    }

    #[test]
    fn test_bracket_path() {
        assert_eq!(bracket_path("a[b]"), Some(vec!["a", "b"]));
        assert_eq!(bracket_path("a[b][c]"), Some(vec!["a", "b", "c"]));
        assert_eq!(bracket_path("plain"), None);
        assert_eq!(bracket_path("a[b"), None);
        assert_eq!(bracket_path("a[b]x"), None);
    }
}
