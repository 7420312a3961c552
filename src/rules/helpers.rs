//! Small accessors shared by both rule tables.

use crate::diagnostics::TranslateError;
use crate::source::{Node, Syntax};

/// The lexical name carried by a name-like token node.
pub(super) fn name_text(node: &Node) -> Option<&str> {
    match &node.syntax {
        Syntax::Ident { value }
        | Syntax::Const { value }
        | Syntax::Op { value }
        | Syntax::Kw { value }
        | Syntax::IVar { value }
        | Syntax::CVar { value }
        | Syntax::GVar { value }
        | Syntax::Backref { value } => Some(value),
        Syntax::Label { value } => Some(value),
        _ => None,
    }
}

/// Like [`name_text`] but failing loudly: a rule that needs a name found
/// something that cannot carry one.
pub(super) fn expect_name<'t>(
    node: &'t Node,
    context: &'static str,
) -> Result<&'t str, TranslateError> {
    name_text(node).ok_or_else(|| {
        TranslateError::malformed(
            context,
            node.span,
            format!("expected a name token, found `{}`", node.kind_name()),
        )
    })
}

/// A label's name without its trailing colon.
pub(super) fn label_text(value: &str) -> &str {
    value.strip_suffix(':').unwrap_or(value)
}

/// The parts of an argument-list node.
pub(super) fn args_parts<'t>(
    node: &'t Node,
    context: &'static str,
) -> Result<&'t [Node], TranslateError> {
    match &node.syntax {
        Syntax::Args { parts } => Ok(parts),
        _ => Err(TranslateError::malformed(
            context,
            node.span,
            format!("expected an argument list, found `{}`", node.kind_name()),
        )),
    }
}

/// True when the node is a statement list with no real statements.
pub(super) fn is_empty_statements(node: &Node) -> bool {
    node.syntax.is_empty_statements()
}
