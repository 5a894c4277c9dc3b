// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! Selector abstract syntax tree produced by [`crate::grammar::selector_grammar`].
//!

/// A dotted path of field names walked from the data root, or from each
/// element of a list when an intermediate field resolves to one.
pub type Selection = Vec<String>;

/// The body of an [`Operand`]: what it selects before any filters run.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// `=name` — a reference to a sibling already evaluated into the lookup table.
    Lookup(String),
    /// A single dotted selection path.
    Selection(Selection),
    /// Two or more comma-separated selections, combined structurally.
    Combine(Vec<Selection>),
}

/// One `|name` or `|name(arg, arg, ...)` pipeline stage. Arguments are kept
/// as their raw (already quote-unescaped) textual form; coercion to the
/// filter's declared parameter types happens at apply time, in
/// [`crate::filters::FilterRegistry::apply`].
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCall {
    /// Filter name.
    pub name: String,
    /// Raw positional arguments, left to right.
    pub args: Vec<String>,
}

/// A selection/lookup/combine optionally followed by a filter pipeline.
/// Usable as a leaf operand of arithmetic.
#[derive(Debug, Clone, PartialEq)]
pub struct Operand {
    /// What to select.
    pub body: Body,
    /// Filters applied left to right, after the body is selected.
    pub filters: Vec<FilterCall>,
}

/// Arithmetic operators, in increasing binding order `Add`/`Sub` < `Mul`/`Div`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
}

/// The arithmetic tree rooted at a selector, bottoming out at [`Operand`]s.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A leaf operand.
    Operand(Operand),
    /// A binary arithmetic operation over two sub-expressions.
    BinOp(ArithOp, Box<Expr>, Box<Expr>),
}

/// The top-level parse result of one selector string.
#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    /// The arithmetic/operand tree.
    pub root: Expr,
    /// Filters applied, left to right, to the root's final result.
    pub tail_filters: Vec<FilterCall>,
}
