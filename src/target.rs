//! Target tree model.
//!
//! A translation produces [`TargetNode`]s tagged with the *target schema's*
//! vocabulary, which need not match source construct names. Children are
//! [`Element`]s: nested nodes, canonical scalar values, or `Absent` for child
//! slots the schema leaves empty. Ownership of the produced tree transfers to
//! the caller; nothing in here refers back into the source tree.

use serde::Serialize;

use crate::source::Span;

/// One child slot of a target node, or the result of translating a node.
///
/// `Absent` plays two roles: as a child it is the schema's empty slot (the
/// missing else-branch of a conditional), and as a translation result it
/// means the construct elides entirely (an empty statement list).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Element {
    Node(TargetNode),
    /// Interned-name scalar (method names, variable names, option flags).
    Sym(String),
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    /// Exact fraction, always reduced, denominator positive.
    Rational { numer: i64, denom: i64 },
    /// Pure imaginary number; the payload is the imaginary part and is one
    /// of `Int`, `Float`, or `Rational`.
    Complex(Box<Element>),
    Absent,
}

impl Element {
    pub fn node(kind: &'static str, children: Vec<Element>, meta: Meta) -> Self {
        Element::Node(TargetNode { kind, children, meta })
    }

    pub fn sym(value: impl AsRef<str>) -> Self {
        Element::Sym(value.as_ref().to_string())
    }

    pub fn str(value: impl AsRef<str>) -> Self {
        Element::Str(value.as_ref().to_string())
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Element::Absent)
    }

    /// The node payload, when this element is a node.
    pub fn as_node(&self) -> Option<&TargetNode> {
        match self {
            Element::Node(node) => Some(node),
            _ => None,
        }
    }

    pub fn into_node(self) -> Option<TargetNode> {
        match self {
            Element::Node(node) => Some(node),
            _ => None,
        }
    }

    /// Compact s-expression rendering, used by diagnostics and test output.
    pub fn pretty(&self) -> String {
        let mut out = String::new();
        self.write_pretty(&mut out);
        out
    }

    fn write_pretty(&self, out: &mut String) {
        match self {
            Element::Node(node) => node.write_pretty(out),
            Element::Sym(value) => {
                out.push(':');
                out.push_str(value);
            }
            Element::Str(value) => {
                out.push('"');
                out.push_str(&value.escape_debug().to_string());
                out.push('"');
            }
            Element::Int(value) => out.push_str(&value.to_string()),
            Element::Float(value) => out.push_str(&value.to_string()),
            Element::Bool(value) => out.push_str(if *value { "true" } else { "false" }),
            Element::Rational { numer, denom } => out.push_str(&format!("{numer}/{denom}r")),
            Element::Complex(imag) => {
                out.push_str("(0+");
                imag.write_pretty(out);
                out.push_str("i)");
            }
            Element::Absent => out.push_str("nil"),
        }
    }
}

/// Optional provenance and schema annotations attached by a builder.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct Meta {
    /// Source region this node was derived from, when a rule records one.
    pub span: Option<Span>,
    /// Set on nodes with no textual counterpart in the source.
    pub synthesized: bool,
    /// Downstream node-class name, attached by the annotated schema builder.
    pub class_hint: Option<&'static str>,
}

impl Meta {
    pub fn at(span: Span) -> Self {
        Meta { span: Some(span), ..Meta::default() }
    }

    pub fn synthesized() -> Self {
        Meta { synthesized: true, ..Meta::default() }
    }
}

/// One node of the produced tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetNode {
    pub kind: &'static str,
    pub children: Vec<Element>,
    pub meta: Meta,
}

impl TargetNode {
    /// Compact s-expression rendering, used by diagnostics and test output.
    pub fn pretty(&self) -> String {
        let mut out = String::new();
        self.write_pretty(&mut out);
        out
    }

    fn write_pretty(&self, out: &mut String) {
        out.push('(');
        out.push_str(self.kind);
        for child in &self.children {
            out.push(' ');
            child.write_pretty(out);
        }
        out.push(')');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pretty_prints_nested_nodes() {
        let node = TargetNode {
            kind: "send",
            children: vec![
                Element::Absent,
                Element::sym("puts"),
                Element::node("str", vec![Element::str("hi")], Meta::default()),
            ],
            meta: Meta::default(),
        };
        assert_eq!(node.pretty(), r#"(send nil :puts (str "hi"))"#);
    }
}
