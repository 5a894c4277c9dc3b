// SPDX-License-Identifier: Apache-2.0

//! Spec validation against a declared target shape.
//!

use refill::prelude::*;
use std::collections::BTreeMap;

fn target() -> BTreeMap<String, TargetShape> {
    BTreeMap::from([
        ("title".to_string(), TargetShape::Scalar(ScalarKind::String)),
        ("counts".to_string(), TargetShape::map_of(TargetShape::Scalar(ScalarKind::Number))),
    ])
}

#[test]
fn test_well_formed_spec_validates() {
    let spec = Spec::from_json(r#"{"title": "report.title", "counts": {"a": "stats.a", "b": "stats.b"}}"#).unwrap();
    spec.validate(&target()).unwrap();
}

#[test]
fn test_missing_field_is_rejected() {
    let spec = Spec::from_json(r#"{"title": "report.title"}"#).unwrap();
    let err = spec.validate(&target()).unwrap_err();
    assert!(matches!(err, RefillError::TargetShape(_)));
}

#[test]
fn test_superfluous_field_names_both_sides() {
    let spec = Spec::from_json(r#"{"title": "report.title", "counts": {}, "subtitle": "report.subtitle"}"#).unwrap();
    let err = spec.validate(&target()).unwrap_err();
    match err {
        RefillError::TargetShape(msg) => {
            assert!(msg.contains("subtitle"));
            assert!(msg.contains("missing") || msg.contains("superfluous"));
        }
        other => panic!("expected TargetShape error, got {other:?}"),
    }
}

#[test]
fn test_nested_named_fields_validate_recursively() {
    let nested_target = BTreeMap::from([(
        "charts".to_string(),
        TargetShape::fields([(
            "views_chart",
            TargetShape::fields([
                ("categories", TargetShape::Scalar(ScalarKind::String)),
                ("series", TargetShape::map_of(TargetShape::Scalar(ScalarKind::Number))),
            ]),
        )]),
    )]);
    let spec = Spec::from_json(
        r#"{"charts": {"views_chart": {"categories": "stats.views|keys", "series": {"views": "stats.views"}}}}"#,
    )
    .unwrap();
    spec.validate(&nested_target).unwrap();
}

#[test]
fn test_sigils_stripped_before_key_matching() {
    let spec = Spec::from_json(r#"{"~title": "report.title", "counts?": {}}"#).unwrap();
    spec.validate(&target()).unwrap();
}
