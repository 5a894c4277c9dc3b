// SPDX-License-Identifier: Apache-2.0

#![allow(dead_code)]

//! Common artifacts for benchmarking selector parsing and spec evaluation.
//!

use refill::prelude::*;
use serde_json::{Value, json};

pub(crate) const SELECTOR_SAMPLES: [&str; 12] = [
    "item.id",
    "items.name",
    "stats.views|keys|sort",
    "=weight / =height",
    "price|format_currency('EUR')",
    "(stats.views,stats.conversions)|sum",
    "numbers|head(2)|selfie",
    "numbers|cumul",
    "stats.views|keys|reverse",
    "items.scores|sum",
    "a|int + b|int * c|int",
    "title|upper|lower",
];

pub(crate) fn sample_data() -> Value {
    json!({
        "item": {"id": 42, "weight": 80, "height": 16},
        "items": [
            {"name": "a", "scores": [1, 2, 3]},
            {"name": "b", "scores": [4, 5, 6]},
        ],
        "stats": {
            "views": {"2021-11-01": 1, "2021-11-02": 2, "2021-11-03": 3},
            "conversions": {"2021-11-01": 1, "2021-11-02": 1},
        },
        "price": 42.5,
        "numbers": [1, 2, 4, 8, 16],
        "a": "1",
        "b": "2",
        "c": "3",
        "title": "Hello World",
    })
}

pub(crate) fn sample_spec() -> Spec {
    Spec::from_json(
        r#"{
            "id": "item.id",
            "weight": "item.weight",
            "height": "item.height",
            "ratio": "=weight / =height",
            "charts": {
                "views_chart": {
                    "categories": "stats.views|keys",
                    "series": {"views": "stats.views", "conversions": "stats.conversions"}
                }
            },
            "names": "items.name",
            "~raw_scores": "items.scores",
            "first_score_set?": "=raw_scores|first"
        }"#,
    )
    .unwrap()
}

pub(crate) fn eval_ctx<'a>(fetch: &'a BlockingHttpFetch, formatter: &'a PlainFormatter) -> EvalContext<'a> {
    EvalContext { filters: default_filters(), locale: "en_US", fetch, formatter }
}
