//! retree: a syntax-tree re-expression engine.
//!
//! One canonical parser produces a concrete syntax tree; several downstream
//! consumers each expect that tree under their own AST schema, with their own
//! node taxonomy, literal conventions, and context-sensitive encodings. This
//! crate translates the canonical tree into any of those schemas with
//! structural fidelity: the output is interchangeable with what the target
//! schema's own parser would have produced for the same source.
//!
//! The pipeline is a single recursive pass: the [`engine::Translator`] walks
//! the source tree, resolves one mapping rule per node kind under the active
//! [`backends::Backend`], consults the ancestor-context stack for
//! context-sensitive constructs, and materializes target nodes through the
//! backend's builder. Two sub-engines handle the genuinely hard corners:
//! [`segments`] normalizes multi-part string literals (merging, per-line
//! splitting, indentation stripping), and [`arity`] infers the arity of
//! blocks that use implicit numbered parameters.

pub use crate::backends::{AnnotatedSchema, Backend, CompactSchema, ExpandedSchema};
pub use crate::config::{Config, FileInfo};
pub use crate::diagnostics::{to_error_source, ErrorContext, TranslateError};
pub use crate::engine::{translate, translate_to_node, translate_with_config, Translator};
pub use crate::source::{Node, Span, Syntax};
pub use crate::target::{Element, Meta, TargetNode};

pub mod arity;
pub mod backends;
pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod literals;
pub mod rules;
pub mod segments;
pub mod source;
pub mod target;
