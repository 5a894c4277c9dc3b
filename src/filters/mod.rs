// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! The filter registry (C2): a named, extensible mapping of filter name to
//! callable, with an introspectable parameter list standing in for the
//! runtime signature reflection the distilled implementation relies on.
//!

pub(crate) mod builtins;

use crate::{ast::FilterCall, capabilities::Fetch, capabilities::Formatter, error::RefillError};
use std::{collections::HashMap, sync::Arc, sync::OnceLock};

/// The coercion class a positional filter argument is converted to before
/// the filter's closure ever sees it. Replaces the source's runtime
/// evaluation of a parameter's textual type annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    /// Parsed as a signed 64-bit integer.
    Int,
    /// Parsed as a 64-bit float.
    Float,
    /// Taken verbatim (already quote-unescaped by the parser).
    String,
    /// Base64-decoded into raw bytes.
    Bytes,
}

/// A coerced positional filter argument, ready for a filter's closure.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    /// An [`ArgKind::Int`] argument.
    Int(i64),
    /// An [`ArgKind::Float`] argument.
    Float(f64),
    /// An [`ArgKind::String`] argument.
    Str(String),
    /// An [`ArgKind::Bytes`] argument.
    Bytes(Vec<u8>),
}

/// One positional parameter in a [`FilterDescriptor`]'s signature.
#[derive(Debug, Clone)]
pub struct ParamSpec {
    /// Coercion class applied to the raw selector-supplied text.
    pub kind: ArgKind,
    /// Whether a caller must supply this argument.
    pub required: bool,
    /// Raw text substituted when the argument is omitted and `required` is
    /// `false`. `None` means the argument may be entirely absent, changing
    /// the filter's behavior (e.g. `str`'s optional encoding).
    pub default: Option<String>,
}

impl ParamSpec {
    /// A required positional parameter.
    pub fn required(kind: ArgKind) -> Self {
        Self { kind, required: true, default: None }
    }

    /// An optional parameter that falls back to `default` when omitted.
    pub fn defaulted(kind: ArgKind, default: impl Into<String>) -> Self {
        Self { kind, required: false, default: Some(default.into()) }
    }

    /// An optional parameter with no fallback value; omitting it changes the
    /// filter's own behavior rather than substituting a default.
    pub fn optional(kind: ArgKind) -> Self {
        Self { kind, required: false, default: None }
    }
}

/// The capabilities threaded to a filter invocation: the locale string
/// (already normalized, `-` replaced by `_`) and the `fetch`/formatting
/// side-capabilities, supplied only to filters whose descriptor asks for them.
pub struct FilterContext<'a> {
    /// Active locale, e.g. `"en_US"`.
    pub locale: &'a str,
    /// The `fetch` capability.
    pub fetch: &'a dyn Fetch,
    /// The locale-aware number/currency/percent/date formatter.
    pub formatter: &'a dyn Formatter,
}

type FilterFn =
    Arc<dyn Fn(&serde_json::Value, &[ArgValue], &FilterContext) -> Result<serde_json::Value, RefillError> + Send + Sync>;

/// Metadata + implementation of one named filter. Declares its positional
/// parameters and whether it needs the locale / fetch capabilities, so the
/// evaluator never has to inspect a closure's signature at runtime.
#[derive(Clone)]
pub struct FilterDescriptor {
    /// Positional parameters, in declaration order.
    pub params: Vec<ParamSpec>,
    /// Whether this filter's closure expects `ctx.locale` to be meaningful.
    pub needs_locale: bool,
    /// Whether this filter's closure expects `ctx.fetch` to be meaningful.
    pub needs_fetch: bool,
    pub(crate) func: FilterFn,
}

impl std::fmt::Debug for FilterDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterDescriptor")
            .field("params", &self.params)
            .field("needs_locale", &self.needs_locale)
            .field("needs_fetch", &self.needs_fetch)
            .finish()
    }
}

fn coerce_arg(filter: &str, kind: ArgKind, raw: &str) -> Result<ArgValue, RefillError> {
    match kind {
        ArgKind::Int => raw
            .parse::<i64>()
            .map(ArgValue::Int)
            .map_err(|e| RefillError::FilterArgument(filter.to_string(), format!("'{raw}' is not an integer: {e}"))),
        ArgKind::Float => raw
            .parse::<f64>()
            .map(ArgValue::Float)
            .map_err(|e| RefillError::FilterArgument(filter.to_string(), format!("'{raw}' is not a number: {e}"))),
        ArgKind::String => Ok(ArgValue::Str(raw.to_string())),
        ArgKind::Bytes => {
            use base64::Engine;
            base64::engine::general_purpose::STANDARD
                .decode(raw)
                .map(ArgValue::Bytes)
                .map_err(|e| RefillError::FilterArgument(filter.to_string(), format!("'{raw}' is not valid base64: {e}")))
        }
    }
}

/// Mapping of filter name to its [`FilterDescriptor`]. Supports cheap
/// deep-copy derivation via [`FilterRegistry::copy`] so callers can register
/// overrides without mutating a shared default set.
#[derive(Debug, Clone, Default)]
pub struct FilterRegistry {
    entries: HashMap<String, FilterDescriptor>,
}

impl FilterRegistry {
    /// An empty registry with no filters installed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotently install a filter under `name`, overwriting any previous
    /// descriptor registered under the same name.
    pub fn register(&mut self, name: impl Into<String>, descriptor: FilterDescriptor) {
        self.entries.insert(name.into(), descriptor);
    }

    /// Deep-copy this registry so the caller can register local overrides
    /// without racing against other callers sharing the original.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// Look up a filter's descriptor by name.
    pub fn get(&self, name: &str) -> Option<&FilterDescriptor> {
        self.entries.get(name)
    }

    /// Apply the named filter to `value` with the call's raw positional
    /// arguments, coercing them per the registered descriptor and invoking
    /// its closure with the capabilities in `ctx`.
    #[tracing::instrument(level = "trace", skip(self, value, ctx), fields(filter = %call.name, argc = call.args.len()))]
    pub fn apply(
        &self,
        value: &serde_json::Value,
        call: &FilterCall,
        ctx: &FilterContext,
    ) -> Result<serde_json::Value, RefillError> {
        let descriptor = self
            .entries
            .get(&call.name)
            .ok_or_else(|| RefillError::FilterUnknown(call.name.clone()))?;

        if call.args.len() > descriptor.params.len() {
            return Err(RefillError::FilterArgument(
                call.name.clone(),
                format!("expected at most {} argument(s), got {}", descriptor.params.len(), call.args.len()),
            ));
        }
        let required = descriptor.params.iter().filter(|p| p.required).count();
        if call.args.len() < required {
            return Err(RefillError::FilterArgument(
                call.name.clone(),
                format!("expected at least {required} argument(s), got {}", call.args.len()),
            ));
        }

        let mut coerced = Vec::with_capacity(descriptor.params.len());
        for (i, param) in descriptor.params.iter().enumerate() {
            let raw = if let Some(r) = call.args.get(i) {
                Some(r.clone())
            } else {
                param.default.clone()
            };
            match raw {
                Some(r) => coerced.push(coerce_arg(&call.name, param.kind, &r)?),
                None => break,
            }
        }

        (descriptor.func)(value, &coerced, ctx).map_err(|e| {
            tracing::error!("filter '{}' failed: {e}", call.name);
            e
        })
    }
}

/// The process-wide default registry, populated with the built-in filter set
/// at first use. Callers who wish to register their own filters derive a
/// mutable copy via `default_filters().copy()` rather than mutate this.
pub fn default_filters() -> &'static FilterRegistry {
    static DEFAULT: OnceLock<FilterRegistry> = OnceLock::new();
    DEFAULT.get_or_init(builtins::build_default_registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::{BlockingHttpFetch, PlainFormatter};
    use serde_json::json;

    fn ctx<'a>(fetch: &'a BlockingHttpFetch, fmt: &'a PlainFormatter) -> FilterContext<'a> {
        FilterContext { locale: "en_US", fetch, formatter: fmt }
    }

    #[test]
    fn test_unknown_filter_is_reported() {
        let reg = default_filters();
        let fetch = BlockingHttpFetch::default();
        let fmt = PlainFormatter;
        let call = FilterCall { name: "nope".into(), args: vec![] };
        let err = reg.apply(&json!([1, 2]), &call, &ctx(&fetch, &fmt)).unwrap_err();
        assert!(matches!(err, RefillError::FilterUnknown(_)));
    }

    #[test]
    fn test_wrong_arity_is_reported() {
        let reg = default_filters();
        let fetch = BlockingHttpFetch::default();
        let fmt = PlainFormatter;
        let call = FilterCall { name: "keys".into(), args: vec!["oops".into()] };
        let err = reg.apply(&json!({"a": 1}), &call, &ctx(&fetch, &fmt)).unwrap_err();
        assert!(matches!(err, RefillError::FilterArgument(..)));
    }

    #[test]
    fn test_copy_does_not_affect_default() {
        let mut custom = default_filters().copy();
        custom.register(
            "shout",
            FilterDescriptor {
                params: vec![],
                needs_locale: false,
                needs_fetch: false,
                func: Arc::new(|v, _args, _ctx| match v {
                    serde_json::Value::String(s) => Ok(serde_json::Value::String(s.to_uppercase())),
                    _ => Err(RefillError::FilterDomain("shout".into())),
                }),
            },
        );
        assert!(custom.get("shout").is_some());
        assert!(default_filters().get("shout").is_none());
    }
}
