//! Backend strategies.
//!
//! A backend is one target schema: a rule table, a node-construction
//! strategy, and the ambient [`Config`] defaults its downstream consumer
//! expects. The engine is parameterized over the [`Backend`] capability so
//! the two structurally similar schemas can share one rule table while
//! differing only in how nodes are materialized.
//!
//! Three backends ship:
//!
//! - [`ExpandedSchema`]: the rich-vocabulary schema, where every construct has a
//!   distinct node kind and scalar payloads are typed values.
//! - [`AnnotatedSchema`]: identical shapes to the expanded schema; its
//!   builder additionally annotates every node with the downstream
//!   consumer's node-class name so callers can hydrate wrapper types without
//!   a second pass.
//! - [`CompactSchema`]: the legacy s-expression schema, with generic `lit` and
//!   `call` encodings, raw string payloads, scalar-symbol parameter forms.
//!   It predates find patterns and pinned expressions and reports those as
//!   unsupported.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::config::Config;
use crate::diagnostics::TranslateError;
use crate::engine::Translator;
use crate::rules;
use crate::source::Node;
use crate::target::{Element, Meta, TargetNode};

/// One target schema: node construction plus rule-table selection.
///
/// `build` is the only way rules materialize nodes, which keeps the rule
/// tables schema-agnostic about representation details like class
/// annotations.
pub trait Backend: Sync {
    /// Schema name used in diagnostics and backend selection.
    fn name(&self) -> &'static str;

    /// Ambient configuration defaults of this schema's consumer. The engine
    /// never invents defaults of its own.
    fn defaults(&self) -> Config;

    /// Constructs a node of `kind` with ordered `children`.
    fn build(&self, kind: &'static str, children: Vec<Element>, meta: Meta) -> TargetNode;

    /// Resolves and runs the mapping rule for `node`'s kind.
    fn dispatch<'t>(
        &self,
        tx: &mut Translator<'t>,
        node: &'t Node,
    ) -> Result<Element, TranslateError>;
}

// ============================================================================
// EXPANDED SCHEMA
// ============================================================================

/// The rich node vocabulary: one dedicated kind per construct.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpandedSchema;

impl Backend for ExpandedSchema {
    fn name(&self) -> &'static str {
        "expanded"
    }

    fn defaults(&self) -> Config {
        Config::full()
    }

    fn build(&self, kind: &'static str, children: Vec<Element>, meta: Meta) -> TargetNode {
        TargetNode { kind, children, meta }
    }

    fn dispatch<'t>(
        &self,
        tx: &mut Translator<'t>,
        node: &'t Node,
    ) -> Result<Element, TranslateError> {
        rules::expanded::dispatch(tx, node)
    }
}

// ============================================================================
// ANNOTATED SCHEMA
// ============================================================================

/// The expanded schema with node-class annotations for the consumer that
/// wraps every node in a typed class.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnnotatedSchema;

impl Backend for AnnotatedSchema {
    fn name(&self) -> &'static str {
        "annotated"
    }

    fn defaults(&self) -> Config {
        Config {
            // This consumer keeps the explicit argument node inside the
            // collapsed single-parameter form.
            arg_inside_collapsed_param: true,
            ..Config::full()
        }
    }

    fn build(&self, kind: &'static str, children: Vec<Element>, meta: Meta) -> TargetNode {
        let meta = Meta {
            class_hint: Some(node_class(kind)),
            ..meta
        };
        TargetNode { kind, children, meta }
    }

    fn dispatch<'t>(
        &self,
        tx: &mut Translator<'t>,
        node: &'t Node,
    ) -> Result<Element, TranslateError> {
        rules::expanded::dispatch(tx, node)
    }
}

// ============================================================================
// COMPACT SCHEMA
// ============================================================================

/// Legacy s-expression schema.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompactSchema;

impl Backend for CompactSchema {
    fn name(&self) -> &'static str {
        "compact"
    }

    fn defaults(&self) -> Config {
        Config::legacy()
    }

    fn build(&self, kind: &'static str, children: Vec<Element>, meta: Meta) -> TargetNode {
        TargetNode { kind, children, meta }
    }

    fn dispatch<'t>(
        &self,
        tx: &mut Translator<'t>,
        node: &'t Node,
    ) -> Result<Element, TranslateError> {
        rules::compact::dispatch(tx, node)
    }
}

// ============================================================================
// NODE-CLASS TABLE
// ============================================================================

/// Kind → wrapper-class table for the annotated schema. Kinds without a
/// dedicated wrapper fall back to the consumer's generic node class.
static NODE_CLASSES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("and", "AndNode"),
        ("and_asgn", "AndAsgnNode"),
        ("arg", "ArgNode"),
        ("args", "ArgsNode"),
        ("array", "ArrayNode"),
        ("array_pattern", "ArrayPatternNode"),
        ("begin", "BeginNode"),
        ("block", "BlockNode"),
        ("block_pass", "BlockPassNode"),
        ("break", "BreakNode"),
        ("case", "CaseNode"),
        ("case_match", "CaseMatchNode"),
        ("casgn", "CasgnNode"),
        ("class", "ClassNode"),
        ("const", "ConstNode"),
        ("const_pattern", "ConstPatternNode"),
        ("csend", "CsendNode"),
        ("cvar", "CvarNode"),
        ("def", "DefNode"),
        ("defined?", "DefinedNode"),
        ("defs", "DefsNode"),
        ("dstr", "DstrNode"),
        ("dsym", "DsymNode"),
        ("erange", "ErangeNode"),
        ("find_pattern", "FindPatternNode"),
        ("float", "FloatNode"),
        ("for", "ForNode"),
        ("forward_args", "ForwardArgsNode"),
        ("gvar", "GvarNode"),
        ("hash", "HashNode"),
        ("hash_pattern", "HashPatternNode"),
        ("if", "IfNode"),
        ("in_pattern", "InPatternNode"),
        ("index", "IndexNode"),
        ("indexasgn", "IndexasgnNode"),
        ("int", "IntNode"),
        ("irange", "IrangeNode"),
        ("ivar", "IvarNode"),
        ("kwargs", "KwargsNode"),
        ("kwbegin", "KwbeginNode"),
        ("kwsplat", "KwsplatNode"),
        ("lambda", "LambdaNode"),
        ("lvar", "LvarNode"),
        ("lvasgn", "LvasgnNode"),
        ("masgn", "MasgnNode"),
        ("match_alt", "MatchAltNode"),
        ("match_as", "MatchAsNode"),
        ("match_pattern", "MatchPatternNode"),
        ("match_pattern_p", "MatchPatternPNode"),
        ("match_rest", "MatchRestNode"),
        ("match_var", "MatchVarNode"),
        ("mlhs", "MlhsNode"),
        ("module", "ModuleNode"),
        ("next", "NextNode"),
        ("numblock", "NumblockNode"),
        ("op_asgn", "OpAsgnNode"),
        ("or", "OrNode"),
        ("or_asgn", "OrAsgnNode"),
        ("pair", "PairNode"),
        ("pin", "PinNode"),
        ("procarg0", "Procarg0Node"),
        ("regexp", "RegexpNode"),
        ("resbody", "ResbodyNode"),
        ("rescue", "RescueNode"),
        ("return", "ReturnNode"),
        ("sclass", "SclassNode"),
        ("send", "SendNode"),
        ("str", "StrNode"),
        ("super", "SuperNode"),
        ("sym", "SymNode"),
        ("until", "UntilNode"),
        ("when", "WhenNode"),
        ("while", "WhileNode"),
        ("xstr", "XstrNode"),
        ("yield", "YieldNode"),
    ])
});

/// The wrapper class the annotated consumer hydrates for `kind`.
pub fn node_class(kind: &'static str) -> &'static str {
    NODE_CLASSES.get(kind).copied().unwrap_or("Node")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_kinds_resolve_to_wrapper_classes() {
        assert_eq!(node_class("send"), "SendNode");
        assert_eq!(node_class("lvasgn"), "LvasgnNode");
    }

    #[test]
    fn unknown_kinds_fall_back_to_generic_node() {
        assert_eq!(node_class("empty_else"), "Node");
        assert_eq!(node_class("regopt"), "Node");
    }

    #[test]
    fn annotated_builder_attaches_class_hints() {
        let node = AnnotatedSchema.build("send", vec![], Meta::default());
        assert_eq!(node.meta.class_hint, Some("SendNode"));

        let node = ExpandedSchema.build("send", vec![], Meta::default());
        assert_eq!(node.meta.class_hint, None);
    }
}
