//! Implicit positional parameter detection.
//!
//! A block written without parameter pipes may still take arguments through
//! the numbered implicit parameters (`_1` .. `_9`). Schemas that encode such
//! blocks with a bare arity number need the highest index referenced
//! anywhere in the body. The scan is a breadth-first walk over every
//! descendant node; it is deliberately not scope-gated, so a nested block
//! that re-declares `_1` explicitly does not suppress counting in the outer
//! body (the reference parsers behave the same way).

use std::collections::VecDeque;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::source::{Node, Syntax};

static IMPLICIT_PARAM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^_(\d+)$").expect("implicit parameter pattern compiles"));

/// Returns the maximum implicit parameter index referenced in `body`, or
/// `None` when the body references none.
pub fn implicit_arity(body: &Node) -> Option<i64> {
    let mut maximum = None;
    let mut queue: VecDeque<&Node> = VecDeque::new();
    queue.push_back(body);

    while let Some(node) = queue.pop_front() {
        if let Syntax::VarRef { value } = &node.syntax {
            if let Syntax::Ident { value: name } = &value.syntax {
                if let Some(index) = implicit_index(name) {
                    maximum = Some(maximum.map_or(index, |max: i64| max.max(index)));
                }
            }
        }
        queue.extend(node.child_nodes());
    }
    maximum
}

fn implicit_index(name: &str) -> Option<i64> {
    IMPLICIT_PARAM
        .captures(name)
        .and_then(|captures| captures[1].parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Span;

    fn node(syntax: Syntax) -> Node {
        Node::new(syntax, Span::default())
    }

    fn implicit_ref(name: &str) -> Node {
        node(Syntax::VarRef {
            value: Box::new(node(Syntax::Ident { value: name.into() })),
        })
    }

    fn statements(body: Vec<Node>) -> Node {
        node(Syntax::Statements { body })
    }

    #[test]
    fn returns_highest_referenced_index() {
        let body = statements(vec![
            implicit_ref("_1"),
            implicit_ref("_3"),
            implicit_ref("_2"),
        ]);
        assert_eq!(implicit_arity(&body), Some(3));
    }

    #[test]
    fn absent_when_no_references() {
        let body = statements(vec![implicit_ref("x"), implicit_ref("_name")]);
        assert_eq!(implicit_arity(&body), None);
    }

    #[test]
    fn scans_nested_structure() {
        let body = statements(vec![node(Syntax::Binary {
            left: Box::new(implicit_ref("_1")),
            operator: "+".into(),
            right: Box::new(node(Syntax::Paren {
                contents: Some(Box::new(implicit_ref("_2"))),
            })),
        })]);
        assert_eq!(implicit_arity(&body), Some(2));
    }

    #[test]
    fn ignores_bare_identifiers_outside_references() {
        // `_1` as a plain identifier (e.g. a parameter name) is not a
        // variable reference and does not count.
        let body = statements(vec![node(Syntax::Ident { value: "_1".into() })]);
        assert_eq!(implicit_arity(&body), None);
    }
}
