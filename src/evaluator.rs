// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! The selector evaluator (C4): walks a parsed [`Selector`] against a data
//! tree, applying filters and arithmetic in order.
//!

use crate::{
    ast::{ArithOp, Body, Expr, FilterCall, Operand, Selector},
    capabilities::{Fetch, Formatter},
    error::RefillError,
    filters::{
        FilterContext, FilterRegistry,
        builtins::{is_integral, number_to_f64, number_value},
    },
    grammar::parse_selector,
};
use serde_json::{Map, Number, Value};
use std::collections::HashMap;

/// Per-object scratch state: a selector's `=name` lookups resolve against
/// this, while the data tree itself is threaded separately. `None` models
/// "no lookup table in scope" -- e.g. top-level, non-spec-driven use.
pub type LookupTable = HashMap<String, Value>;

/// The capabilities an evaluation needs beyond the data and lookup table:
/// the active filter registry, locale, and the `fetch`/`Formatter`
/// side-capabilities threaded to filters that declare a need for them.
pub struct EvalContext<'a> {
    /// The active filter registry (normally [`crate::filters::default_filters`]
    /// or a [`FilterRegistry::copy`] derived from it).
    pub filters: &'a FilterRegistry,
    /// Active locale, e.g. `"en_US"`. Normalized (`-` -> `_`) before use.
    pub locale: &'a str,
    /// The `fetch` capability.
    pub fetch: &'a dyn Fetch,
    /// The locale-aware number/currency/percent/date formatter.
    pub formatter: &'a dyn Formatter,
}

impl<'a> EvalContext<'a> {
    fn filter_ctx(&self) -> FilterContext<'a> {
        FilterContext { locale: self.locale, fetch: self.fetch, formatter: self.formatter }
    }
}

fn step_field(current: &Value, field: &str) -> Result<Value, RefillError> {
    match current {
        Value::Array(items) => {
            let plucked = items.iter().map(|item| step_field(item, field)).collect::<Result<Vec<_>, _>>()?;
            Ok(Value::Array(plucked))
        }
        Value::Object(map) => map.get(field).cloned().ok_or_else(|| RefillError::MissingKey(field.to_string())),
        _ => Err(RefillError::Type(format!("unexpected type in given data while selecting '{field}'"))),
    }
}

fn select_path(data: &Value, path: &[String]) -> Result<Value, RefillError> {
    let mut current = data.clone();
    for field in path {
        current = step_field(&current, field)?;
    }
    Ok(current)
}

/// Combine several selections: a single selection yields its own value; if
/// every result is a map, keys are unioned into a map of value-lists (a
/// "sparse union" -- keys absent from some inputs simply produce shorter
/// lists, matching the source's `defaultdict(list)` semantics); otherwise
/// the results are returned as a plain list, in order.
fn evaluate_combine(selections: &[Vec<String>], data: &Value) -> Result<Value, RefillError> {
    let values = selections.iter().map(|s| select_path(data, s)).collect::<Result<Vec<_>, _>>()?;
    if values.len() == 1 {
        return Ok(values.into_iter().next().unwrap());
    }
    if values.iter().all(Value::is_object) {
        let mut order: Vec<String> = Vec::new();
        for v in &values {
            if let Value::Object(map) = v {
                for k in map.keys() {
                    if !order.contains(k) {
                        order.push(k.clone());
                    }
                }
            }
        }
        let mut out = Map::new();
        for k in order {
            let mut bucket = Vec::new();
            for v in &values {
                if let Value::Object(map) = v {
                    if let Some(entry) = map.get(&k) {
                        bucket.push(entry.clone());
                    }
                }
            }
            out.insert(k, Value::Array(bucket));
        }
        Ok(Value::Object(out))
    } else {
        Ok(Value::Array(values))
    }
}

fn evaluate_body(body: &Body, data: &Value, lookup: Option<&LookupTable>) -> Result<Value, RefillError> {
    match body {
        Body::Lookup(name) => {
            let table = lookup.ok_or_else(|| RefillError::LookupUnavailable(name.clone()))?;
            table.get(name).cloned().ok_or_else(|| RefillError::MissingKey(name.clone()))
        }
        Body::Selection(path) => select_path(data, path),
        Body::Combine(selections) => evaluate_combine(selections, data),
    }
}

fn apply_filter(value: &Value, call: &FilterCall, ctx: &EvalContext) -> Result<Value, RefillError> {
    ctx.filters.apply(value, call, &ctx.filter_ctx())
}

fn apply_filter_chain(mut value: Value, filters: &[FilterCall], ctx: &EvalContext) -> Result<Value, RefillError> {
    for call in filters {
        value = apply_filter(&value, call, ctx)?;
    }
    Ok(value)
}

fn evaluate_operand(operand: &Operand, data: &Value, lookup: Option<&LookupTable>, ctx: &EvalContext) -> Result<Value, RefillError> {
    let value = evaluate_body(&operand.body, data, lookup)?;
    apply_filter_chain(value, &operand.filters, ctx)
}

fn as_number<'v>(value: &'v Value, op: &str) -> Result<&'v Number, RefillError> {
    match value {
        Value::Number(n) => Ok(n),
        other => Err(RefillError::Type(format!("arithmetic '{op}' requires a number, got {other}"))),
    }
}

fn arith(op: ArithOp, left: &Value, right: &Value) -> Result<Value, RefillError> {
    let symbol = match op {
        ArithOp::Add => "+",
        ArithOp::Sub => "-",
        ArithOp::Mul => "*",
        ArithOp::Div => "/",
    };
    let l = as_number(left, symbol)?;
    let r = as_number(right, symbol)?;
    let (lf, rf) = (number_to_f64(l), number_to_f64(r));
    match op {
        ArithOp::Add => Ok(number_value(lf + rf, is_integral(l) && is_integral(r))),
        ArithOp::Sub => Ok(number_value(lf - rf, is_integral(l) && is_integral(r))),
        ArithOp::Mul => Ok(number_value(lf * rf, is_integral(l) && is_integral(r))),
        // division always yields a floating-point quotient, per spec.
        ArithOp::Div => Ok(Number::from_f64(lf / rf).map(Value::Number).unwrap_or(Value::Null)),
    }
}

fn evaluate_expr(expr: &Expr, data: &Value, lookup: Option<&LookupTable>, ctx: &EvalContext) -> Result<Value, RefillError> {
    match expr {
        Expr::Operand(operand) => evaluate_operand(operand, data, lookup, ctx),
        Expr::BinOp(op, lhs, rhs) => {
            let l = evaluate_expr(lhs, data, lookup, ctx)?;
            let r = evaluate_expr(rhs, data, lookup, ctx)?;
            arith(*op, &l, &r)
        }
    }
}

/// Evaluate a parsed [`Selector`] against `data`, consulting `lookup` for any
/// `=name` references and `ctx` for filter dispatch and locale/fetch
/// capabilities.
#[tracing::instrument(level = "debug", skip(selector, data, lookup, ctx))]
pub fn evaluate(selector: &Selector, data: &Value, lookup: Option<&LookupTable>, ctx: &EvalContext) -> Result<Value, RefillError> {
    let root = evaluate_expr(&selector.root, data, lookup, ctx)?;
    apply_filter_chain(root, &selector.tail_filters, ctx)
}

/// Parse and evaluate `selector_str` against `data` with no lookup table and
/// the given capabilities in one step. Convenient for standalone use outside
/// a spec (e.g. `select(&data, "numbers|sum")`).
pub fn select(data: &Value, selector_str: &str, ctx: &EvalContext) -> Result<Value, RefillError> {
    let selector = parse_selector(selector_str)?;
    evaluate(&selector, data, None, ctx)
}
