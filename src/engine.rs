//! Dispatch and traversal driver.
//!
//! One [`Translator`] performs one translation: it walks the source tree
//! recursively, keeps the ancestor-context stack in strict LIFO discipline,
//! and hands each node to the active backend's rule table. Rules call back
//! into [`Translator::translate`] for their children, so the stack always
//! mirrors the chain of enclosing nodes: `ancestor(1)` is the current
//! node's parent, `ancestor(2)` its grandparent.
//!
//! Translation is a pure function of the subtree, the configuration, and the
//! ancestor context at entry. Nothing is shared between translators, so
//! independent translations (same tree under several backends, or many trees
//! at once) can run in parallel without synchronization.

use crate::backends::Backend;
use crate::config::{Config, FileInfo};
use crate::diagnostics::TranslateError;
use crate::source::Node;
use crate::target::{Element, Meta, TargetNode};

/// Nesting deeper than this fails fast instead of exhausting the native
/// call stack.
pub const MAX_DEPTH: usize = 4096;

/// The per-translation driver. Owns the ancestor stack and the resolved
/// configuration; borrows the backend and the source tree for the duration
/// of one `translate` call chain.
pub struct Translator<'t> {
    backend: &'t dyn Backend,
    config: Config,
    file: FileInfo,
    stack: Vec<&'t Node>,
}

impl<'t> Translator<'t> {
    /// A translator with the backend's ambient configuration defaults.
    pub fn new(backend: &'t dyn Backend) -> Self {
        Translator {
            backend,
            config: backend.defaults(),
            file: FileInfo::default(),
            stack: Vec::new(),
        }
    }

    /// Overrides the resolved configuration for this run.
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Sets the buffer identity consulted by the file/line magic keywords.
    pub fn with_file(mut self, file: FileInfo) -> Self {
        self.file = file;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn file(&self) -> &FileInfo {
        &self.file
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    // ------------------------------------------------------------------
    // Traversal
    // ------------------------------------------------------------------

    /// Translates one node under the active backend.
    ///
    /// Returns [`Element::Absent`] for constructs that elide entirely (an
    /// empty statement list). The node is pushed onto the ancestor stack for
    /// the duration of its rule, so rules observing the stack see the chain
    /// of enclosing nodes with the current node innermost.
    pub fn translate(&mut self, node: &'t Node) -> Result<Element, TranslateError> {
        if self.stack.len() >= MAX_DEPTH {
            return Err(TranslateError::malformed(
                node.kind_name(),
                node.span,
                format!("nesting exceeds the maximum supported depth of {MAX_DEPTH}"),
            ));
        }
        self.stack.push(node);
        let result = self.backend.dispatch(self, node);
        self.stack.pop();
        result
    }

    /// Translates a sequence in order, skipping elided results.
    pub fn translate_all(&mut self, nodes: &'t [Node]) -> Result<Vec<Element>, TranslateError> {
        let mut out = Vec::with_capacity(nodes.len());
        for node in nodes {
            let element = self.translate(node)?;
            if !element.is_absent() {
                out.push(element);
            }
        }
        Ok(out)
    }

    /// Translates an optional child; absent children become `Absent` slots.
    pub fn translate_opt(
        &mut self,
        node: &'t Option<Box<Node>>,
    ) -> Result<Element, TranslateError> {
        match node {
            Some(node) => self.translate(node),
            None => Ok(Element::Absent),
        }
    }

    // ------------------------------------------------------------------
    // Ancestor context
    // ------------------------------------------------------------------

    /// The immediate parent of the node currently being translated.
    pub fn parent(&self) -> Option<&'t Node> {
        self.ancestor(1)
    }

    /// The `back`-th enclosing node, counted from the innermost end:
    /// `ancestor(1)` is the parent, `ancestor(2)` the grandparent. The
    /// current node itself is `ancestor(0)`.
    pub fn ancestor(&self, back: usize) -> Option<&'t Node> {
        self.stack
            .len()
            .checked_sub(back + 1)
            .and_then(|index| self.stack.get(index))
            .copied()
    }

    /// Current depth, equal to the length of the ancestor chain including
    /// the node being translated.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    // ------------------------------------------------------------------
    // Node construction
    // ------------------------------------------------------------------

    /// Builds a target node through the active backend.
    pub fn node(&self, kind: &'static str, children: Vec<Element>) -> Element {
        Element::Node(self.backend.build(kind, children, Meta::default()))
    }

    /// Builds a target node with explicit provenance metadata.
    pub fn node_with(
        &self,
        kind: &'static str,
        children: Vec<Element>,
        meta: Meta,
    ) -> Element {
        Element::Node(self.backend.build(kind, children, meta))
    }
}

/// Translates `root` under `backend` with the backend's ambient
/// configuration defaults.
///
/// The produced element is a fully formed target tree (or `Absent` when the
/// whole program elides). Ownership transfers to the caller.
pub fn translate(backend: &dyn Backend, root: &Node) -> Result<Element, TranslateError> {
    Translator::new(backend).translate(root)
}

/// Translates `root` with an explicit configuration and buffer identity.
pub fn translate_with_config(
    backend: &dyn Backend,
    config: Config,
    file: FileInfo,
    root: &Node,
) -> Result<Element, TranslateError> {
    Translator::new(backend)
        .with_config(config)
        .with_file(file)
        .translate(root)
}

/// Convenience wrapper returning the root as a [`TargetNode`], treating a
/// fully elided program as malformed-free `None`.
pub fn translate_to_node(
    backend: &dyn Backend,
    root: &Node,
) -> Result<Option<TargetNode>, TranslateError> {
    Ok(translate(backend, root)?.into_node())
}
