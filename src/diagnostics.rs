//! Unified diagnostics for the translation engine.
//!
//! Every failure mode surfaces as a [`TranslateError`]. There are exactly two:
//! a source construct with no rule under the active backend, and a source
//! node whose children arrived in a shape no conformant parser produces. The
//! first one aborts the translation immediately; silently skipping a
//! construct would break structural fidelity with the target schema's own
//! parser. The second is a contract violation, reported with full node
//! context so the offending input can be found.
//!
//! Errors render through `miette` with an optional named source, a primary
//! span label, and a help line.

use std::sync::Arc;

use miette::{Diagnostic, LabeledSpan, NamedSource, SourceCode};
use thiserror::Error;

use crate::source::Span;

/// Shared handle to a named source buffer for error rendering.
pub type SourceArc = Arc<NamedSource<String>>;

/// Minimal, composable error context for diagnostics.
#[derive(Debug, Default)]
pub struct ErrorContext {
    /// The source buffer this error points into (if available).
    pub source: Option<SourceArc>,
    /// The primary span for this error (if any).
    pub span: Option<Span>,
    /// An optional help message.
    pub help: Option<String>,
}

impl ErrorContext {
    /// Returns an empty error context (no source, span, or help).
    pub fn none() -> Self {
        ErrorContext::default()
    }

    /// Creates a context with only a span.
    pub fn with_span(span: Span) -> Self {
        ErrorContext { span: Some(span), ..ErrorContext::default() }
    }

    /// Creates a context with source, span, and help message.
    pub fn with_all(source: SourceArc, span: Span, help: String) -> Self {
        ErrorContext {
            source: Some(source),
            span: Some(span),
            help: Some(help),
        }
    }
}

/// Unified error type for all translation failure modes.
#[derive(Debug, Error)]
pub enum TranslateError {
    /// The active backend's schema has no analogue for this construct.
    #[error("unsupported construct: `{construct}` has no rule under the `{backend}` backend")]
    UnsupportedConstruct {
        construct: &'static str,
        backend: &'static str,
        ctx: ErrorContext,
    },
    /// A rule found a node's children in a shape it did not anticipate.
    /// Unreachable given a conformant parser; aborts with node context.
    #[error("malformed input: {message} (in `{construct}`)")]
    MalformedNode {
        construct: &'static str,
        message: String,
        ctx: ErrorContext,
    },
}

impl TranslateError {
    pub fn unsupported(construct: &'static str, backend: &'static str, span: Span) -> Self {
        TranslateError::UnsupportedConstruct {
            construct,
            backend,
            ctx: ErrorContext::with_span(span),
        }
    }

    pub fn malformed(construct: &'static str, span: Span, message: impl Into<String>) -> Self {
        TranslateError::MalformedNode {
            construct,
            message: message.into(),
            ctx: ErrorContext::with_span(span),
        }
    }

    fn get_ctx(&self) -> &ErrorContext {
        match self {
            TranslateError::UnsupportedConstruct { ctx, .. } => ctx,
            TranslateError::MalformedNode { ctx, .. } => ctx,
        }
    }

    /// Attaches a source buffer so reports can show the offending text.
    pub fn with_source(mut self, source: SourceArc) -> Self {
        match &mut self {
            TranslateError::UnsupportedConstruct { ctx, .. }
            | TranslateError::MalformedNode { ctx, .. } => ctx.source = Some(source),
        }
        self
    }

    /// The construct name this error is about.
    pub fn construct(&self) -> &'static str {
        match self {
            TranslateError::UnsupportedConstruct { construct, .. } => construct,
            TranslateError::MalformedNode { construct, .. } => construct,
        }
    }
}

impl Diagnostic for TranslateError {
    fn code<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        match self {
            TranslateError::UnsupportedConstruct { .. } => {
                Some(Box::new("retree::unsupported_construct"))
            }
            TranslateError::MalformedNode { .. } => Some(Box::new("retree::malformed_node")),
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        self.get_ctx()
            .help
            .as_ref()
            .map(|h| Box::new(h) as Box<dyn std::fmt::Display + 'a>)
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        self.get_ctx()
            .source
            .as_ref()
            .map(|s| s.as_ref() as &dyn SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let ctx = self.get_ctx();
        let span = ctx.span?;
        let text = match self {
            TranslateError::UnsupportedConstruct { construct, backend, .. } => {
                format!("`{construct}` is not expressible under `{backend}`")
            }
            TranslateError::MalformedNode { message, .. } => message.clone(),
        };
        let len = if span.end > span.start { span.end - span.start } else { 1 };
        Some(Box::new(std::iter::once(LabeledSpan::new(
            Some(text),
            span.start,
            len,
        ))))
    }
}

/// Converts a source string into a shared named source for error contexts.
pub fn to_error_source(name: impl AsRef<str>, source: impl AsRef<str>) -> SourceArc {
    Arc::new(NamedSource::new(
        name.as_ref(),
        source.as_ref().to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use miette::Report;

    use super::*;

    #[test]
    fn unsupported_construct_names_kind_and_backend() {
        let err = TranslateError::unsupported("find_pattern", "compact", Span::new(0, 4, 1));
        let text = err.to_string();
        assert!(text.contains("find_pattern"));
        assert!(text.contains("compact"));
    }

    #[test]
    fn report_carries_span_label_and_source() {
        let source = to_error_source("snippet", "case x; in [*, 1, *]; end");
        let err = TranslateError::unsupported("find_pattern", "compact", Span::new(11, 20, 1))
            .with_source(source);
        let output = format!("{:?}", Report::new(err));
        assert!(output.contains("find_pattern"));
        assert!(output.contains("snippet"));
    }

    #[test]
    fn malformed_node_mentions_construct() {
        let err = TranslateError::malformed(
            "when_clause",
            Span::default(),
            "case chain ended without a clause",
        );
        assert!(err.to_string().contains("when_clause"));
        assert_eq!(err.construct(), "when_clause");
    }
}
