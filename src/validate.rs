// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! The spec validator (C6): a structural check of a spec against a declared
//! target shape (a mapping from field name to expected kind).
//!

use crate::{error::RefillError, spec::strip_sigils};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// The scalar kinds a selector leaf may be declared to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    /// A string value.
    String,
    /// A whole-number value.
    Integer,
    /// Any numeric value, integer or floating point.
    Number,
}

/// The expected shape of one spec field, as declared by a caller ahead of
/// validating a spec against it.
#[derive(Debug, Clone, PartialEq)]
pub enum TargetShape {
    /// The field must be a selector leaf producing this scalar kind.
    Scalar(ScalarKind),
    /// The field must be a nested spec whose keys exactly match these named
    /// sub-fields (recursively validated against their own shapes).
    Fields(BTreeMap<String, TargetShape>),
    /// The field must be a nested spec acting as a homogeneous
    /// `Map<String, V>`: every entry (any key) must conform to `V`.
    MapOf(Box<TargetShape>),
}

impl TargetShape {
    /// Convenience constructor for [`TargetShape::Fields`] from an iterator
    /// of `(name, shape)` pairs.
    pub fn fields(entries: impl IntoIterator<Item = (&'static str, TargetShape)>) -> Self {
        TargetShape::Fields(entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
    }

    /// Convenience constructor for [`TargetShape::MapOf`].
    pub fn map_of(value: TargetShape) -> Self {
        TargetShape::MapOf(Box::new(value))
    }
}

fn symmetric_difference_error(spec_keys: &[String], declared: &BTreeMap<String, TargetShape>) -> RefillError {
    let declared_keys: std::collections::BTreeSet<&String> = declared.keys().collect();
    let spec_keys_set: std::collections::BTreeSet<&String> = spec_keys.iter().collect();
    let missing: Vec<&str> = declared_keys.difference(&spec_keys_set).map(|s| s.as_str()).collect();
    let superfluous: Vec<&str> = spec_keys_set.difference(&declared_keys).map(|s| s.as_str()).collect();
    RefillError::TargetShape(format!(
        "spec keys do not match target shape: missing [{}], superfluous [{}]",
        missing.join(", "),
        superfluous.join(", ")
    ))
}

fn validate_fields(map: &Map<String, Value>, declared: &BTreeMap<String, TargetShape>) -> Result<(), RefillError> {
    let stripped_keys: Vec<String> = map.keys().map(|k| strip_sigils(k).2.to_string()).collect();
    let declared_keys: std::collections::BTreeSet<&String> = declared.keys().collect();
    let spec_keys_set: std::collections::BTreeSet<&String> = stripped_keys.iter().collect();
    if declared_keys != spec_keys_set {
        return Err(symmetric_difference_error(&stripped_keys, declared));
    }
    for (raw_key, node) in map {
        let stripped = strip_sigils(raw_key).2;
        let shape = declared.get(stripped).expect("key presence checked above");
        validate_node(stripped, node, shape)?;
    }
    Ok(())
}

fn validate_node(field: &str, node: &Value, shape: &TargetShape) -> Result<(), RefillError> {
    match (node, shape) {
        (Value::String(_), TargetShape::Scalar(_)) => Ok(()),
        (Value::Object(map), TargetShape::Fields(fields)) => validate_fields(map, fields),
        (Value::Object(map), TargetShape::MapOf(value_shape)) => {
            for (k, entry) in map {
                match entry {
                    Value::String(_) => match value_shape.as_ref() {
                        TargetShape::Scalar(_) => {}
                        _ => {
                            return Err(RefillError::TargetShape(format!(
                                "field '{field}.{k}' expected a nested map, found a selector leaf"
                            )));
                        }
                    },
                    Value::Object(_) => validate_node(k, entry, value_shape)?,
                    _ => {
                        return Err(RefillError::SpecShape(format!(
                            "spec key '{field}.{k}' must be a selector string or nested object"
                        )));
                    }
                }
            }
            Ok(())
        }
        (Value::String(_), _) => {
            Err(RefillError::TargetShape(format!("field '{field}' expected a nested map, found a selector leaf")))
        }
        (Value::Object(_), TargetShape::Scalar(_)) => {
            Err(RefillError::TargetShape(format!("field '{field}' expected a selector leaf, found a nested map")))
        }
        _ => Err(RefillError::SpecShape(format!("spec key '{field}' must be a selector string or nested object"))),
    }
}

/// Check that `spec`'s keys (after sigil stripping) exactly match the
/// fields declared by `target`, recursively.
#[tracing::instrument(level = "debug", skip(spec, target))]
pub fn validate_spec(spec: &Map<String, Value>, target: &BTreeMap<String, TargetShape>) -> Result<(), RefillError> {
    validate_fields(spec, target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn target() -> BTreeMap<String, TargetShape> {
        BTreeMap::from([
            ("title".to_string(), TargetShape::Scalar(ScalarKind::String)),
            ("counts".to_string(), TargetShape::map_of(TargetShape::Scalar(ScalarKind::Number))),
        ])
    }

    #[test]
    fn test_matching_spec_passes() {
        let spec = json!({"title": "item.name", "counts": {"a": "stats.a", "b": "stats.b"}});
        let Value::Object(map) = spec else { unreachable!() };
        validate_spec(&map, &target()).unwrap();
    }

    #[test]
    fn test_missing_field_reports_target_shape_error() {
        let spec = json!({"title": "item.name"});
        let Value::Object(map) = spec else { unreachable!() };
        let err = validate_spec(&map, &target()).unwrap_err();
        assert!(matches!(err, RefillError::TargetShape(_)));
    }

    #[test]
    fn test_superfluous_field_reports_target_shape_error() {
        let spec = json!({"title": "item.name", "counts": {}, "subtitle": "item.sub"});
        let Value::Object(map) = spec else { unreachable!() };
        let err = validate_spec(&map, &target()).unwrap_err();
        match err {
            RefillError::TargetShape(msg) => {
                assert!(msg.contains("subtitle"));
            }
            other => panic!("expected TargetShape error, got {other:?}"),
        }
    }

    #[test]
    fn test_sigils_are_stripped_before_matching() {
        let spec = json!({"~title": "item.name", "counts?": {}});
        let Value::Object(map) = spec else { unreachable!() };
        validate_spec(&map, &target()).unwrap();
    }

    #[test]
    fn test_scalar_field_given_nested_map_is_rejected() {
        let spec = json!({"title": {"x": "a"}, "counts": {}});
        let Value::Object(map) = spec else { unreachable!() };
        let err = validate_spec(&map, &target()).unwrap_err();
        assert!(matches!(err, RefillError::TargetShape(_)));
    }
}
