// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! A declarative selector-DSL driven JSON spec evaluator.
//!
//! `refill` turns a free-form JSON *data* document into a constrained JSON
//! *rendered spec result* whose shape is dictated by a declarative *spec*.
//! Leaves of the spec are *selector* strings written in a small DSL that
//! navigates into the data, combines fragments, pipes the result through
//! named filters, and composes results with simple arithmetic. The rendered
//! result is meant to be consumed downstream by a template filler (tables,
//! charts, document placeholders) that this crate does not itself implement.
//!
//! ```rust
//! use refill::prelude::*;
//! use serde_json::json;
//!
//! # fn test() -> Result<(), RefillError> {
//! let spec = Spec::from_json(r#"{
//!     "weight": "item.weight",
//!     "height": "item.height",
//!     "ratio": "=weight / =height"
//! }"#)?;
//! let data = json!({"item": {"weight": 80, "height": 16}});
//!
//! let fetch = BlockingHttpFetch::default();
//! let formatter = PlainFormatter;
//! let ctx = EvalContext {
//!     filters: default_filters(),
//!     locale: config().default_locale(),
//!     fetch: &fetch,
//!     formatter: &formatter,
//! };
//! let out = spec.apply(&data, &ctx)?;
//! assert_eq!(out, json!({"weight": 80, "height": 16, "ratio": 5.0}));
//! #   Ok(())
//! # }
//! ```
//!
//! # Components
//!
//! - [`grammar`] (C1) -- the selector grammar and `peg`-generated parser,
//!   producing the AST in [`ast`].
//! - [`filters`] (C2/C3) -- the named, extensible filter registry and its
//!   built-in filter set.
//! - [`evaluator`] (C4) -- walks a parsed selector against a data tree.
//! - [`spec`] (C5/C8) -- recursively evaluates a spec-shaped JSON tree
//!   against a shared per-object lookup table, and the JSON interchange
//!   wrapper around that process.
//! - [`validate`] (C6) -- structural validation of a spec against a
//!   declared target shape.
//! - [`capabilities`] (C7) -- the `Fetch`/`Formatter` side-capability traits
//!   threaded through evaluation, plus dependency-light default impls.
//! - [`config`] (C10) -- process-wide configuration (default locale).
//!
//! # Third-party crates
//!
//! - [`peg`](https://crates.io/crates/peg) for the selector grammar.
//! - [`serde`]/[`serde_json`] (with `preserve_order`) for the JSON data
//!   model and spec interchange -- insertion order of JSON object keys is
//!   significant throughout this crate.
//! - [`thiserror`](https://crates.io/crates/thiserror) for the error
//!   taxonomy in [`error`].
//! - [`ureq`](https://crates.io/crates/ureq) for the default blocking
//!   `fetch` capability.
//! - [`base64`](https://crates.io/crates/base64) for the `fetch`/`str`
//!   filters' byte encoding.
//! - [`tracing`](https://crates.io/crates/tracing) for parse/eval/walk
//!   instrumentation.
//! - [`dotenvy`](https://crates.io/crates/dotenvy) for `.env`-backed
//!   configuration.
//!

pub mod ast;
pub mod capabilities;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod filters;
pub mod grammar;
pub mod spec;
pub mod validate;

pub mod prelude;

pub use error::RefillError;
pub use evaluator::{EvalContext, evaluate, select};
pub use grammar::parse_selector;
pub use spec::{Spec, apply_spec_map};
pub use validate::{ScalarKind, TargetShape, validate_spec};
