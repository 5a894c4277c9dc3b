// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! Errors raised from this library.
//!

use peg::{error::ParseError, str::LineCol};
use thiserror::Error;

/// Variants of error raised from this library.
#[derive(Debug, Error)]
pub enum RefillError {
    /// A selector string failed to parse.
    #[error("parse error in selector: {0}")]
    Parse(#[from] ParseError<LineCol>),

    /// A selection or lookup referenced a key that does not exist.
    #[error("missing key: {0}")]
    MissingKey(String),

    /// A `=name` lookup was used where no lookup table is available.
    #[error("lookup '{0}' unavailable: no lookup table in scope")]
    LookupUnavailable(String),

    /// An operand's runtime kind does not fit the grammar site it occupies.
    #[error("type error: {0}")]
    Type(String),

    /// A filter name is not present in the active registry.
    #[error("filter '{0}' does not exist")]
    FilterUnknown(String),

    /// A filter was invoked with the wrong arity, or an argument failed to coerce.
    #[error("invalid arguments for filter '{0}': {1}")]
    FilterArgument(String, String),

    /// A filter was applied to a value outside its declared domain.
    #[error("filter '{0}' cannot be applied to given value")]
    FilterDomain(String),

    /// A spec node is neither a selector string nor a nested spec object, or
    /// contains a duplicate stripped key.
    #[error("spec shape error: {0}")]
    SpecShape(String),

    /// A spec's keys do not match the keys required by the declared target shape.
    #[error("target shape error: {0}")]
    TargetShape(String),

    /// The `fetch` capability failed to retrieve the given URL.
    #[error("fetch error for '{0}': {1}")]
    Fetch(String, String),

    /// Spec JSON (de)serialization failure.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
