//! Descriptor dialects and structural detection.

use std::fmt;
use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::error::{IdlError, Result};

pub mod codama;
pub mod legacy;
pub mod modern;

pub const CODAMA_STANDARD: &str = "codama";
pub const SHANK_ORIGIN: &str = "shank";
pub const MODERN_SPEC: &str = "0.1.0";
pub const MODERN_IDL_VERSION: &str = "0.30.1";
pub const LEGACY_IDL_VERSION: &str = "Legacy";

/// The schema family a raw descriptor belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DialectTag {
    Codama,
    /// A `metadata.spec` string, kept verbatim even if unknown.
    Spec(String),
    Legacy,
    LegacyShank,
}

impl DialectTag {
    pub fn as_str(&self) -> &str {
        match self {
            DialectTag::Codama => CODAMA_STANDARD,
            DialectTag::Spec(spec) => spec,
            DialectTag::Legacy => "legacy",
            DialectTag::LegacyShank => "legacy-shank",
        }
    }

    pub fn is_legacy(&self) -> bool {
        matches!(self, DialectTag::Legacy | DialectTag::LegacyShank)
    }
}

impl fmt::Display for DialectTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Baseline detection: codama standard, then `metadata.spec`, else legacy.
/// Total over any JSON value.
pub fn detect_spec(descriptor: &Value) -> DialectTag {
    if descriptor.get("standard").and_then(Value::as_str) == Some(CODAMA_STANDARD) {
        return DialectTag::Codama;
    }
    match descriptor
        .get("metadata")
        .and_then(|m| m.get("spec"))
        .and_then(Value::as_str)
    {
        Some(CODAMA_STANDARD) => DialectTag::Codama,
        Some("legacy") | None => DialectTag::Legacy,
        Some(spec) => DialectTag::Spec(spec.to_string()),
    }
}

/// Like [detect_spec], but separates legacy descriptors generated by shank.
pub fn detect_dialect(descriptor: &Value) -> DialectTag {
    match detect_spec(descriptor) {
        DialectTag::Legacy => {
            let origin = descriptor
                .get("metadata")
                .and_then(|m| m.get("origin"))
                .and_then(Value::as_str);
            if origin == Some(SHANK_ORIGIN) {
                DialectTag::LegacyShank
            } else {
                log::trace!("no dialect marker found, assuming legacy");
                DialectTag::Legacy
            }
        }
        tag => tag,
    }
}

/// Reads a raw descriptor from a JSON file.
pub fn read_descriptor(path: impl AsRef<Path>) -> Result<Value> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)
        .map_err(|e| IdlError::FileRead(path.display().to_string(), e))?;
    Ok(serde_json::from_str(&raw)?)
}

/// Human-readable IDL version label.
pub fn idl_version(descriptor: &Value) -> String {
    match detect_spec(descriptor) {
        DialectTag::Legacy | DialectTag::LegacyShank => LEGACY_IDL_VERSION.to_string(),
        DialectTag::Codama => descriptor
            .get("version")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        DialectTag::Spec(_) => MODERN_IDL_VERSION.to_string(),
    }
}

/// Only modern descriptors at spec `0.1.0` or later can drive instruction building.
pub fn is_interactive_supported(descriptor: &Value) -> bool {
    let DialectTag::Spec(spec) = detect_spec(descriptor) else {
        return false;
    };
    let (Ok(spec), Ok(min)) = (
        semver::Version::parse(&spec),
        semver::Version::parse(MODERN_SPEC),
    ) else {
        return false;
    };
    spec >= min
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;
    use test_case::test_case;

    #[test_case(json!({"standard": "codama", "version": "1.0.0"}), DialectTag::Codama ; "codama standard")]
    #[test_case(json!({"standard": "Codama"}), DialectTag::Legacy ; "standard is case sensitive")]
    #[test_case(json!({"address": "x", "metadata": {"spec": "0.1.0"}}), DialectTag::Spec("0.1.0".into()) ; "modern spec")]
    #[test_case(json!({"metadata": {"spec": "9.9.9"}}), DialectTag::Spec("9.9.9".into()) ; "unknown spec kept verbatim")]
    #[test_case(json!({"metadata": {"spec": "legacy"}}), DialectTag::Legacy ; "explicit legacy spec")]
    #[test_case(json!({"metadata": {"spec": "codama"}}), DialectTag::Codama ; "explicit codama spec")]
    #[test_case(json!({"version": "0.1.0", "name": "p", "metadata": {"origin": "shank"}}), DialectTag::LegacyShank ; "shank origin")]
    #[test_case(json!({"version": "0.1.0", "name": "p", "instructions": []}), DialectTag::Legacy ; "plain legacy")]
    #[test_case(json!(null), DialectTag::Legacy ; "null")]
    #[test_case(json!([1, 2, 3]), DialectTag::Legacy ; "array")]
    #[test_case(json!({"metadata": "oops"}), DialectTag::Legacy ; "malformed metadata")]
    fn detects_dialect(descriptor: Value, expected: DialectTag) {
        assert_eq!(detect_dialect(&descriptor), expected);
    }

    #[test]
    fn baseline_detection_ignores_origin() {
        let descriptor = json!({"metadata": {"origin": "shank"}});
        assert_eq!(detect_spec(&descriptor), DialectTag::Legacy);
    }

    #[test_case(json!({"version": "0.0.1", "name": "p"}), "Legacy" ; "legacy")]
    #[test_case(json!({"standard": "codama", "version": "1.2.3"}), "1.2.3" ; "codama")]
    #[test_case(json!({"address": "x", "metadata": {"spec": "0.1.0"}}), "0.30.1" ; "modern")]
    fn reports_idl_version(descriptor: Value, expected: &str) {
        assert_eq!(idl_version(&descriptor), expected);
    }

    #[test_case(json!({"metadata": {"spec": "0.1.0"}}), true ; "minimum spec")]
    #[test_case(json!({"metadata": {"spec": "0.2.0"}}), true ; "newer spec")]
    #[test_case(json!({"metadata": {"spec": "0.0.9"}}), false ; "older spec")]
    #[test_case(json!({"metadata": {"spec": "latest"}}), false ; "not semver")]
    #[test_case(json!({"standard": "codama"}), false ; "codama")]
    #[test_case(json!({"version": "0.29.0"}), false ; "legacy")]
    fn interactive_support(descriptor: Value, expected: bool) {
        assert_eq!(is_interactive_supported(&descriptor), expected);
    }

    fn arb_json() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::from),
            any::<i64>().prop_map(Value::from),
            "[a-z]{0,8}".prop_map(Value::from),
        ];
        leaf.prop_recursive(4, 32, 6, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::from),
                prop::collection::btree_map(
                    prop_oneof![
                        Just("standard".to_string()),
                        Just("metadata".to_string()),
                        Just("spec".to_string()),
                        Just("origin".to_string()),
                        "[a-z]{1,6}",
                    ],
                    inner,
                    0..4
                )
                .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn detection_is_total(descriptor in arb_json()) {
            let _ = detect_dialect(&descriptor);
            let _ = idl_version(&descriptor);
            let _ = is_interactive_supported(&descriptor);
        }
    }
}
