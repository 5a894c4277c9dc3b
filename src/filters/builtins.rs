// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! The fixed built-in filter library (C3): `keys`, `values`, `sort`,
//! `reverse`, `lower`, `upper`, `str`, `int`, `selfie`, `first`, `last`,
//! `head`, `tail`, `sum`, `cumul`, `format_number`, `format_currency`,
//! `format_percent`, `format_date`, and `fetch`.
//!
//! All filters are total on their declared domains; a value outside the
//! domain raises [`RefillError::FilterDomain`].
//!

use super::{ArgKind, ArgValue, FilterContext, FilterDescriptor, FilterRegistry, ParamSpec};
use crate::error::RefillError;
use serde_json::{Map, Number, Value};
use std::sync::Arc;

fn domain(name: &str) -> RefillError {
    RefillError::FilterDomain(name.to_string())
}

pub(crate) fn number_to_f64(n: &Number) -> f64 {
    n.as_f64().unwrap_or(f64::NAN)
}

pub(crate) fn is_integral(n: &Number) -> bool {
    n.is_i64() || n.is_u64()
}

pub(crate) fn number_value(x: f64, integral: bool) -> Value {
    if integral && x.fract() == 0.0 {
        Value::Number(Number::from(x as i64))
    } else {
        Number::from_f64(x).map(Value::Number).unwrap_or(Value::Null)
    }
}

fn keys(value: &Value, _args: &[ArgValue], _ctx: &FilterContext) -> Result<Value, RefillError> {
    match value {
        Value::Object(map) => Ok(Value::Array(map.keys().map(|k| Value::String(k.clone())).collect())),
        Value::Array(items) => Ok(Value::Array((0..items.len()).map(|i| Value::Number(i.into())).collect())),
        _ => Err(domain("keys")),
    }
}

fn values(value: &Value, _args: &[ArgValue], _ctx: &FilterContext) -> Result<Value, RefillError> {
    match value {
        Value::Object(map) => Ok(Value::Array(map.values().cloned().collect())),
        Value::Array(items) => Ok(Value::Array(items.clone())),
        _ => Err(domain("values")),
    }
}

fn cmp_scalars(a: &Value, b: &Value) -> Result<std::cmp::Ordering, RefillError> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => number_to_f64(x)
            .partial_cmp(&number_to_f64(y))
            .ok_or_else(|| domain("sort")),
        (Value::String(x), Value::String(y)) => Ok(x.cmp(y)),
        _ => Err(domain("sort")),
    }
}

fn sort(value: &Value, _args: &[ArgValue], _ctx: &FilterContext) -> Result<Value, RefillError> {
    match value {
        Value::Array(items) => {
            let mut out = items.clone();
            let mut err = None;
            out.sort_by(|a, b| match cmp_scalars(a, b) {
                Ok(o) => o,
                Err(e) => {
                    err = Some(e);
                    std::cmp::Ordering::Equal
                }
            });
            if let Some(e) = err {
                return Err(e);
            }
            Ok(Value::Array(out))
        }
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Ok(Value::Object(Map::from_iter(entries)))
        }
        _ => Err(domain("sort")),
    }
}

fn reverse(value: &Value, _args: &[ArgValue], _ctx: &FilterContext) -> Result<Value, RefillError> {
    match value {
        Value::Array(items) => Ok(Value::Array(items.iter().rev().cloned().collect())),
        Value::Object(map) => {
            let entries: Vec<(String, Value)> = map.iter().rev().map(|(k, v)| (k.clone(), v.clone())).collect();
            Ok(Value::Object(Map::from_iter(entries)))
        }
        Value::String(s) => Ok(Value::String(s.chars().rev().collect())),
        _ => Err(domain("reverse")),
    }
}

fn case_map(value: &Value, upper: bool, name: &str) -> Result<Value, RefillError> {
    match value {
        Value::String(s) => Ok(Value::String(if upper { s.to_uppercase() } else { s.to_lowercase() })),
        Value::Array(items) => Ok(Value::Array(
            items.iter().map(|v| case_map(v, upper, name)).collect::<Result<_, _>>()?,
        )),
        Value::Object(map) => {
            let mut out = Map::new();
            for (k, v) in map {
                out.insert(k.clone(), case_map(v, upper, name)?);
            }
            Ok(Value::Object(out))
        }
        _ => Err(domain(name)),
    }
}

fn lower(value: &Value, _args: &[ArgValue], _ctx: &FilterContext) -> Result<Value, RefillError> {
    case_map(value, false, "lower")
}

fn upper(value: &Value, _args: &[ArgValue], _ctx: &FilterContext) -> Result<Value, RefillError> {
    case_map(value, true, "upper")
}

fn stringify_scalar(value: &Value) -> Result<String, RefillError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Ok("null".to_string()),
        _ => Err(domain("str")),
    }
}

fn str_filter(value: &Value, args: &[ArgValue], _ctx: &FilterContext) -> Result<Value, RefillError> {
    match args.first() {
        None => Ok(Value::String(stringify_scalar(value)?)),
        Some(ArgValue::Str(encoding)) => {
            let encoded = match value {
                Value::String(s) => s,
                _ => return Err(domain("str")),
            };
            use base64::Engine;
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(encoded)
                .map_err(|_| domain("str"))?;
            match encoding.to_lowercase().as_str() {
                "utf-8" | "utf8" => {
                    String::from_utf8(bytes).map(Value::String).map_err(|_| domain("str"))
                }
                "ascii" => {
                    if bytes.iter().all(|b| b.is_ascii()) {
                        Ok(Value::String(bytes.iter().map(|&b| b as char).collect()))
                    } else {
                        Err(domain("str"))
                    }
                }
                "latin-1" | "latin1" | "iso-8859-1" => {
                    Ok(Value::String(bytes.iter().map(|&b| b as char).collect()))
                }
                _ => Err(RefillError::FilterArgument("str".to_string(), format!("unsupported encoding '{encoding}'"))),
            }
        }
        Some(_) => Err(domain("str")),
    }
}

fn int_filter(value: &Value, _args: &[ArgValue], _ctx: &FilterContext) -> Result<Value, RefillError> {
    match value {
        Value::Number(n) => Ok(Value::Number(Number::from(number_to_f64(n) as i64))),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map(|i| Value::Number(Number::from(i)))
            .map_err(|_| domain("int")),
        Value::Bool(b) => Ok(Value::Number(Number::from(*b as i64))),
        _ => Err(domain("int")),
    }
}

fn selfie(value: &Value, _args: &[ArgValue], _ctx: &FilterContext) -> Result<Value, RefillError> {
    match value {
        Value::Array(items) => {
            let mut out = Map::new();
            for item in items {
                let key = stringify_scalar(item)?;
                out.insert(key, item.clone());
            }
            Ok(Value::Object(out))
        }
        scalar => {
            let key = stringify_scalar(scalar)?;
            let mut out = Map::new();
            out.insert(key, scalar.clone());
            Ok(Value::Object(out))
        }
    }
}

fn first(value: &Value, _args: &[ArgValue], _ctx: &FilterContext) -> Result<Value, RefillError> {
    match value {
        Value::Array(items) => items.first().cloned().ok_or_else(|| domain("first")),
        _ => Err(domain("first")),
    }
}

fn last(value: &Value, _args: &[ArgValue], _ctx: &FilterContext) -> Result<Value, RefillError> {
    match value {
        Value::Array(items) => items.last().cloned().ok_or_else(|| domain("last")),
        _ => Err(domain("last")),
    }
}

fn arg_n(args: &[ArgValue], name: &str) -> Result<usize, RefillError> {
    match args.first() {
        Some(ArgValue::Int(n)) if *n >= 0 => Ok(*n as usize),
        _ => Err(RefillError::FilterArgument(name.to_string(), "expected a non-negative integer".to_string())),
    }
}

fn head(value: &Value, args: &[ArgValue], _ctx: &FilterContext) -> Result<Value, RefillError> {
    let n = arg_n(args, "head")?;
    match value {
        Value::Array(items) => Ok(Value::Array(items.iter().take(n).cloned().collect())),
        Value::Object(map) => Ok(Value::Object(Map::from_iter(map.iter().take(n).map(|(k, v)| (k.clone(), v.clone()))))),
        _ => Err(domain("head")),
    }
}

fn tail(value: &Value, args: &[ArgValue], _ctx: &FilterContext) -> Result<Value, RefillError> {
    let n = arg_n(args, "tail")?;
    match value {
        Value::Array(items) => {
            let start = items.len().saturating_sub(n);
            Ok(Value::Array(items[start..].to_vec()))
        }
        Value::Object(map) => {
            let len = map.len();
            let start = len.saturating_sub(n);
            Ok(Value::Object(Map::from_iter(map.iter().skip(start).map(|(k, v)| (k.clone(), v.clone())))))
        }
        _ => Err(domain("tail")),
    }
}

fn sum_numbers(name: &str, items: &[Value]) -> Result<Value, RefillError> {
    let mut total = 0.0f64;
    let mut integral = true;
    for item in items {
        match item {
            Value::Number(n) => {
                total += number_to_f64(n);
                integral &= is_integral(n);
            }
            _ => return Err(domain(name)),
        }
    }
    Ok(number_value(total, integral))
}

fn sum(value: &Value, _args: &[ArgValue], _ctx: &FilterContext) -> Result<Value, RefillError> {
    match value {
        Value::Array(items) => sum_numbers("sum", items),
        Value::Object(map) => {
            let mut out = Map::new();
            for (k, v) in map {
                let inner = match v {
                    Value::Array(items) => sum_numbers("sum", items)?,
                    Value::Object(_) => sum(v, &[], _ctx)?,
                    _ => return Err(domain("sum")),
                };
                out.insert(k.clone(), inner);
            }
            Ok(Value::Object(out))
        }
        _ => Err(domain("sum")),
    }
}

fn cumul_numbers(name: &str, items: &[Value]) -> Result<Vec<Value>, RefillError> {
    let mut running = 0.0f64;
    let mut integral = true;
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Value::Number(n) => {
                running += number_to_f64(n);
                integral &= is_integral(n);
                out.push(number_value(running, integral));
            }
            _ => return Err(domain(name)),
        }
    }
    Ok(out)
}

fn cumul(value: &Value, _args: &[ArgValue], _ctx: &FilterContext) -> Result<Value, RefillError> {
    match value {
        Value::Array(items) => Ok(Value::Array(cumul_numbers("cumul", items)?)),
        Value::Object(map) => {
            let keys: Vec<&String> = map.keys().collect();
            let values: Vec<Value> = map.values().cloned().collect();
            let summed = cumul_numbers("cumul", &values)?;
            let mut out = Map::new();
            for (k, v) in keys.into_iter().zip(summed) {
                out.insert(k.clone(), v);
            }
            Ok(Value::Object(out))
        }
        _ => Err(domain("cumul")),
    }
}

fn as_f64(value: &Value, name: &str) -> Result<f64, RefillError> {
    value.as_f64().ok_or_else(|| domain(name))
}

fn format_number(value: &Value, _args: &[ArgValue], ctx: &FilterContext) -> Result<Value, RefillError> {
    recurse_format(value, "format_number", &|x| Ok(ctx.formatter.format_number(x, ctx.locale)))
}

fn format_currency(value: &Value, args: &[ArgValue], ctx: &FilterContext) -> Result<Value, RefillError> {
    let currency = match args.first() {
        Some(ArgValue::Str(s)) => s.clone(),
        _ => "USD".to_string(),
    };
    recurse_format(value, "format_currency", &|x| Ok(ctx.formatter.format_currency(x, &currency, ctx.locale)))
}

fn format_percent(value: &Value, args: &[ArgValue], ctx: &FilterContext) -> Result<Value, RefillError> {
    let pattern = match args.first() {
        Some(ArgValue::Str(s)) => Some(s.clone()),
        _ => None,
    };
    recurse_format(value, "format_percent", &|x| Ok(ctx.formatter.format_percent(x, pattern.as_deref(), ctx.locale)))
}

fn recurse_format(
    value: &Value,
    name: &str,
    f: &dyn Fn(f64) -> Result<String, RefillError>,
) -> Result<Value, RefillError> {
    match value {
        Value::Number(_) => Ok(Value::String(f(as_f64(value, name)?)?)),
        Value::Array(items) => Ok(Value::Array(
            items.iter().map(|v| recurse_format(v, name, f)).collect::<Result<_, _>>()?,
        )),
        Value::Object(map) => {
            let mut out = Map::new();
            for (k, v) in map {
                out.insert(k.clone(), recurse_format(v, name, f)?);
            }
            Ok(Value::Object(out))
        }
        _ => Err(domain(name)),
    }
}

fn format_date(value: &Value, args: &[ArgValue], ctx: &FilterContext) -> Result<Value, RefillError> {
    let format = match args.first() {
        Some(ArgValue::Str(s)) => s.clone(),
        _ => "medium".to_string(),
    };
    let s = match value {
        Value::String(s) => s.as_str(),
        _ => return Err(domain("format_date")),
    };
    ctx.formatter.format_date(s, &format, ctx.locale).map(Value::String)
}

fn fetch_filter(value: &Value, _args: &[ArgValue], ctx: &FilterContext) -> Result<Value, RefillError> {
    use base64::Engine;
    let fetch_one = |url: &str| -> Result<Value, RefillError> {
        let bytes = ctx.fetch.fetch(url)?;
        Ok(Value::String(base64::engine::general_purpose::STANDARD.encode(bytes)))
    };
    match value {
        Value::String(url) => fetch_one(url),
        Value::Array(urls) => {
            let mut out = Vec::with_capacity(urls.len());
            for u in urls {
                let url = u.as_str().ok_or_else(|| domain("fetch"))?;
                out.push(fetch_one(url)?);
            }
            Ok(Value::Array(out))
        }
        _ => Err(domain("fetch")),
    }
}

macro_rules! descriptor {
    ($func:ident, params: [$($param:expr),*], locale: $loc:expr, fetch: $ft:expr) => {
        FilterDescriptor {
            params: vec![$($param),*],
            needs_locale: $loc,
            needs_fetch: $ft,
            func: Arc::new($func),
        }
    };
}

/// Build the default registry containing every built-in filter named in C3.
pub(crate) fn build_default_registry() -> FilterRegistry {
    let mut reg = FilterRegistry::new();
    reg.register("keys", descriptor!(keys, params: [], locale: false, fetch: false));
    reg.register("values", descriptor!(values, params: [], locale: false, fetch: false));
    reg.register("sort", descriptor!(sort, params: [], locale: false, fetch: false));
    reg.register("reverse", descriptor!(reverse, params: [], locale: false, fetch: false));
    reg.register("lower", descriptor!(lower, params: [], locale: false, fetch: false));
    reg.register("upper", descriptor!(upper, params: [], locale: false, fetch: false));
    reg.register(
        "str",
        descriptor!(str_filter, params: [ParamSpec::optional(ArgKind::String)], locale: false, fetch: false),
    );
    reg.register("int", descriptor!(int_filter, params: [], locale: false, fetch: false));
    reg.register("selfie", descriptor!(selfie, params: [], locale: false, fetch: false));
    reg.register("first", descriptor!(first, params: [], locale: false, fetch: false));
    reg.register("last", descriptor!(last, params: [], locale: false, fetch: false));
    reg.register(
        "head",
        descriptor!(head, params: [ParamSpec::defaulted(ArgKind::Int, "1")], locale: false, fetch: false),
    );
    reg.register(
        "tail",
        descriptor!(tail, params: [ParamSpec::defaulted(ArgKind::Int, "1")], locale: false, fetch: false),
    );
    reg.register("sum", descriptor!(sum, params: [], locale: false, fetch: false));
    reg.register("cumul", descriptor!(cumul, params: [], locale: false, fetch: false));
    reg.register(
        "format_number",
        descriptor!(format_number, params: [], locale: true, fetch: false),
    );
    reg.register(
        "format_currency",
        descriptor!(
            format_currency,
            params: [ParamSpec::defaulted(ArgKind::String, "USD")],
            locale: true,
            fetch: false
        ),
    );
    reg.register(
        "format_percent",
        descriptor!(format_percent, params: [ParamSpec::optional(ArgKind::String)], locale: true, fetch: false),
    );
    reg.register(
        "format_date",
        descriptor!(
            format_date,
            params: [ParamSpec::defaulted(ArgKind::String, "medium")],
            locale: true,
            fetch: false
        ),
    );
    reg.register("fetch", descriptor!(fetch_filter, params: [], locale: false, fetch: true));
    reg
}
