// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! Group imports of commonly used types for a single glob import by clients.
//!

pub use crate::ast::{ArithOp, Body, Expr, FilterCall, Operand, Selector};
pub use crate::capabilities::{BlockingHttpFetch, Fetch, Formatter, PlainFormatter};
pub use crate::config::config;
pub use crate::error::RefillError;
pub use crate::evaluator::{EvalContext, LookupTable, evaluate, select};
pub use crate::filters::{ArgKind, ArgValue, FilterContext, FilterDescriptor, FilterRegistry, ParamSpec, default_filters};
pub use crate::grammar::parse_selector;
pub use crate::spec::Spec;
pub use crate::validate::{ScalarKind, TargetShape};
