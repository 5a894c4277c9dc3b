// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! PEG parser rules and actions for the selector DSL.
//!
//! Being a PEG parser means the following limits/constraints/directives
//! should be observed when writing and ordering rules...
//!
//! * From the [pest book](https://pest.rs/book/grammars/peg.html) (even though
//!   this doesn't use the `pest` crate): **_In general, when writing a
//!   parser with choices, put the longest or most specific choice first, and
//!   the shortest or most general choice last._**
//! * Filters bind tighter than arithmetic: `a|f + b|g` parses as `(a|f) + (b|g)`.
//!   A bare (unfiltered) lookup or comma-separated combine may still occupy
//!   any operand position -- only an *unparenthesised* combine followed by
//!   a filter pipeline is rejected by the grammar (parenthesise it first).
//!

use crate::ast::{ArithOp, Body, Expr, FilterCall, Operand, Selector};

peg::parser! {
    pub(crate) grammar selector_grammar() for str {
        rule _() = quiet! { [' ' | '\t' | '\n' | '\r']* }

        rule ident() -> String
            = s:$(['A'..='Z' | 'a'..='z' | '_'] ['A'..='Z' | 'a'..='z' | '0'..='9' | '_']*) {
                s.to_string()
            }

        // a literal quote inside a quoted argument is written as two
        // consecutive apostrophes.
        rule quoted_char() -> char
            = "''" { '\'' }
            / c:$(!"'" [_]) { c.chars().next().unwrap() }

        rule quoted_arg() -> String
            = "'" cs:quoted_char()* "'" { cs.into_iter().collect() }

        rule bare_arg() -> String
            = s:$(['A'..='Z' | 'a'..='z' | '0'..='9']+) { s.to_string() }

        rule arg() -> String = quoted_arg() / bare_arg()

        rule selection() -> Vec<String>
            = head:ident() tail:("." i:ident() { i })* {
                let mut v = vec![head];
                v.extend(tail);
                v
            }

        rule lookup() -> String = "=" i:ident() { i }

        rule combine() -> Vec<Vec<String>>
            = head:selection() tail:(_ "," _ s:selection() { s })* {
                let mut v = vec![head];
                v.extend(tail);
                v
            }

        rule filter_args() -> Vec<String>
            = "(" _ a:(arg() ** (_ "," _)) _ ")" { a }

        rule filter_call() -> FilterCall
            = "|" _ name:ident() args:filter_args()? {
                FilterCall { name, args: args.unwrap_or_default() }
            }

        rule parenthesised_body() -> Body
            = "(" _ c:combine() _ ")" {
                one_or_combine(c)
            }

        rule operand_filtered() -> Operand
            = body:(b:lookup() { Body::Lookup(b) } / parenthesised_body() / s:selection() { Body::Selection(s) })
              filters:(_ f:filter_call() { f })+ {
                Operand { body, filters }
            }

        rule operand_unfiltered() -> Operand
            = body:(b:lookup() { Body::Lookup(b) } / c:combine() { one_or_combine(c) }) {
                Operand { body, filters: vec![] }
            }

        rule factor() -> Expr
            = o:operand_filtered() { Expr::Operand(o) }
            / o:operand_unfiltered() { Expr::Operand(o) }

        rule term() -> Expr
            = head:factor() tail:(_ op:$(['*' | '/']) _ f:factor() { (op, f) })* {
                tail.into_iter().fold(head, |acc, (op, rhs)| {
                    let op = if op == "*" { ArithOp::Mul } else { ArithOp::Div };
                    Expr::BinOp(op, Box::new(acc), Box::new(rhs))
                })
            }

        rule expression() -> Expr
            = head:term() tail:(_ op:$(['+' | '-']) _ t:term() { (op, t) })* {
                tail.into_iter().fold(head, |acc, (op, rhs)| {
                    let op = if op == "+" { ArithOp::Add } else { ArithOp::Sub };
                    Expr::BinOp(op, Box::new(acc), Box::new(rhs))
                })
            }

        // the whole input must be consumed; trailing garbage is a parse error.
        pub rule selector() -> Selector
            = _ root:expression() tail_filters:(_ f:filter_call() { f })* _ ![_] {
                Selector { root, tail_filters }
            }
    }
}

fn one_or_combine(mut selections: Vec<Vec<String>>) -> Body {
    if selections.len() == 1 {
        Body::Selection(selections.pop().unwrap())
    } else {
        Body::Combine(selections)
    }
}

/// Parse one selector string into a [`Selector`] AST, or a [`crate::error::RefillError::Parse`].
#[tracing::instrument(level = "debug")]
pub fn parse_selector(input: &str) -> Result<Selector, crate::error::RefillError> {
    selector_grammar::selector(input).map_err(crate::error::RefillError::Parse)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_selection() {
        let s = parse_selector("item.id").unwrap();
        assert_eq!(
            s,
            Selector {
                root: Expr::Operand(Operand {
                    body: Body::Selection(vec!["item".into(), "id".into()]),
                    filters: vec![],
                }),
                tail_filters: vec![],
            }
        );
    }

    #[test]
    fn test_filter_chain() {
        let s = parse_selector("stats.views|keys|sort").unwrap();
        match s.root {
            Expr::Operand(Operand { filters, .. }) => {
                assert_eq!(filters.len(), 2);
                assert_eq!(filters[0].name, "keys");
                assert_eq!(filters[1].name, "sort");
            }
            other => panic!("expected an Operand, got {other:?}"),
        }
    }

    #[test]
    fn test_quoted_filter_arg() {
        let s = parse_selector("price|format_currency('EUR')").unwrap();
        match s.root {
            Expr::Operand(Operand { filters, .. }) => {
                assert_eq!(filters[0].args, vec!["EUR".to_string()]);
            }
            other => panic!("expected an Operand, got {other:?}"),
        }
    }

    #[test]
    fn test_doubled_quote_escape() {
        let s = parse_selector("price|format_currency('can''t')").unwrap();
        match s.root {
            Expr::Operand(Operand { filters, .. }) => {
                assert_eq!(filters[0].args, vec!["can't".to_string()]);
            }
            other => panic!("expected an Operand, got {other:?}"),
        }
    }

    #[test]
    fn test_numeric_filter_arg() {
        let s = parse_selector("numbers|head(2)|selfie").unwrap();
        match s.root {
            Expr::Operand(Operand { filters, .. }) => {
                assert_eq!(filters[0].args, vec!["2".to_string()]);
            }
            other => panic!("expected an Operand, got {other:?}"),
        }
    }

    #[test]
    fn test_lookup_arithmetic() {
        let s = parse_selector("=weight / =height").unwrap();
        match s.root {
            Expr::BinOp(ArithOp::Div, lhs, rhs) => {
                assert_eq!(
                    *lhs,
                    Expr::Operand(Operand { body: Body::Lookup("weight".into()), filters: vec![] })
                );
                assert_eq!(
                    *rhs,
                    Expr::Operand(Operand { body: Body::Lookup("height".into()), filters: vec![] })
                );
            }
            other => panic!("expected a Div BinOp, got {other:?}"),
        }
    }

    #[test]
    fn test_parenthesised_combine_then_filter() {
        let s = parse_selector("(stats.views,stats.conversions)|sum").unwrap();
        match &s.root {
            Expr::Operand(Operand { body: Body::Combine(sels), filters }) => {
                assert_eq!(sels.len(), 2);
                assert_eq!(filters.len(), 1);
                assert_eq!(filters[0].name, "sum");
            }
            other => panic!("expected a Combine operand, got {other:?}"),
        }
    }

    #[test]
    fn test_bare_combine_only_at_top_level() {
        let s = parse_selector("a,b").unwrap();
        assert!(matches!(s.root, Expr::Operand(Operand { body: Body::Combine(_), .. })));
    }

    #[test]
    fn test_trailing_garbage_is_parse_error() {
        assert!(parse_selector("item.id)").is_err());
    }

    #[test]
    fn test_precedence_mul_before_add() {
        let s = parse_selector("a|int + b|int * c|int").unwrap();
        match s.root {
            Expr::BinOp(ArithOp::Add, _, rhs) => {
                assert!(matches!(*rhs, Expr::BinOp(ArithOp::Mul, _, _)));
            }
            other => panic!("expected an Add at the root, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_roundtrip_equal_asts() {
        let a = parse_selector("items.name|upper").unwrap();
        let b = parse_selector("items.name|upper").unwrap();
        assert_eq!(a, b);
    }
}
