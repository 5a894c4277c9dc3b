// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! The spec walker (C5) and spec/JSON interchange wrapper (C8).
//!
//! A spec is plain JSON: leaves are selector strings, non-leaves are nested
//! JSON objects. [`Spec`] wraps a `serde_json::Value` known to be an object
//! at every level that is not itself a selector leaf, so round-tripping
//! through [`Spec::from_json`]/[`Spec::to_json`] is a thin, value-preserving
//! pass through `serde_json`.
//!

use crate::{error::RefillError, evaluator::EvalContext, grammar::parse_selector, validate::TargetShape};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};

/// Split a raw spec key into `(hidden, optional, stripped)`. `~` (hidden)
/// leads, `?` (optional) trails; both may co-occur.
pub(crate) fn strip_sigils(raw: &str) -> (bool, bool, &str) {
    let hidden = raw.starts_with('~');
    let mut rest = if hidden { &raw[1..] } else { raw };
    let optional = rest.ends_with('?');
    if optional {
        rest = &rest[..rest.len() - 1];
    }
    (hidden, optional, rest)
}

/// Recursively evaluate a spec-shaped JSON object against `data`, honouring
/// hidden (`~`) and optional (`?`) key sigils, and maintaining a per-object
/// lookup table so later sibling leaves may reference earlier ones via
/// `=name`. Nested specs get a fresh lookup table; they never see their
/// parent's.
#[tracing::instrument(level = "debug", skip(spec, data, ctx))]
pub fn apply_spec_map(spec: &Map<String, Value>, data: &Value, ctx: &EvalContext) -> Result<Map<String, Value>, RefillError> {
    let mut lookup = crate::evaluator::LookupTable::new();
    let mut output = Map::new();
    let mut seen = HashSet::new();

    for (raw_key, node) in spec {
        let (hidden, optional, stripped) = strip_sigils(raw_key);
        if !seen.insert(stripped.to_string()) {
            return Err(RefillError::SpecShape(format!("duplicate key '{stripped}' after stripping sigils")));
        }

        match node {
            Value::String(selector_str) => {
                let selector = parse_selector(selector_str)?;
                match crate::evaluator::evaluate(&selector, data, Some(&lookup), ctx) {
                    Ok(value) => {
                        if !hidden {
                            output.insert(stripped.to_string(), value.clone());
                        }
                        lookup.insert(stripped.to_string(), value);
                    }
                    Err(RefillError::MissingKey(_)) if optional => {
                        // optional absorbs a missing key: no output, no lookup entry.
                    }
                    Err(e) => return Err(e),
                }
            }
            Value::Object(nested) => {
                let sub = apply_spec_map(nested, data, ctx)?;
                output.insert(stripped.to_string(), Value::Object(sub));
            }
            other => {
                return Err(RefillError::SpecShape(format!(
                    "spec key '{stripped}' must be a selector string or nested object, got {other}"
                )));
            }
        }
    }

    Ok(output)
}

/// A JSON-shaped declarative description of a desired output: leaves are
/// selector strings, non-leaves are nested specs. Always wraps a
/// `Value::Object` at the root.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Spec(Value);

impl Spec {
    /// Wrap an already-built spec map.
    pub fn from_dict(map: Map<String, Value>) -> Self {
        Spec(Value::Object(map))
    }

    /// Borrow the spec's top-level key/value pairs.
    pub fn to_dict(&self) -> &Map<String, Value> {
        match &self.0 {
            Value::Object(map) => map,
            _ => unreachable!("Spec invariant: root is always a JSON object"),
        }
    }

    /// Parse a spec from its JSON text form.
    pub fn from_json(s: &str) -> Result<Self, RefillError> {
        let value: Value = serde_json::from_str(s)?;
        match value {
            Value::Object(_) => Ok(Spec(value)),
            _ => Err(RefillError::SpecShape("spec root must be a JSON object".to_string())),
        }
    }

    /// Render this spec back to its JSON text form. Round-tripping through
    /// [`Spec::from_json`] is value-preserving.
    pub fn to_json(&self) -> Result<String, RefillError> {
        Ok(serde_json::to_string(&self.0)?)
    }

    /// Recursively evaluate this spec against `data`, producing the rendered
    /// JSON output tree.
    pub fn apply(&self, data: &Value, ctx: &EvalContext) -> Result<Value, RefillError> {
        Ok(Value::Object(apply_spec_map(self.to_dict(), data, ctx)?))
    }

    /// Structurally validate this spec's keys against a declared target
    /// shape.
    pub fn validate(&self, target: &BTreeMap<String, TargetShape>) -> Result<(), RefillError> {
        crate::validate::validate_spec(self.to_dict(), target)
    }
}
