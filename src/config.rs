//! Translation policy flags.
//!
//! Several source constructs admit more than one legal encoding under a
//! target schema; downstream consumers differ in which one their own parser
//! emits. A [`Config`] pins those choices for one translation run. Options
//! are independent booleans, resolved once from the chosen backend's ambient
//! defaults (the engine invents none) and never mutated mid-translation.

use serde::{Deserialize, Serialize};

/// Policy flags consulted read-only by the mapping rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Emit dedicated index / index-assignment node kinds for bracket
    /// operations instead of desugaring to generic calls on the
    /// conventional index methods.
    pub distinct_index_nodes: bool,
    /// Emit a dedicated keyword-arguments node for bare keyword hashes in
    /// call-tail position (never inside array literals).
    pub distinct_keyword_args_nodes: bool,
    /// Collapse a single required, undestructured block parameter into the
    /// schema's implicit first-parameter node.
    pub collapse_single_block_param: bool,
    /// Sub-variant of the collapse: the implicit node wraps an explicit
    /// argument node rather than holding the name directly.
    pub arg_inside_collapsed_param: bool,
    /// Emit a dedicated lambda-literal node as the callee of stabby
    /// lambdas instead of a generic send.
    pub lambda_literal_node: bool,
    /// Emit a dedicated node for the encoding magic keyword instead of a
    /// constant path naming the UTF-8 encoding.
    pub emit_encoding_constant: bool,
    /// Represent forwarded arguments in a parameter list with a dedicated
    /// in-place node instead of the legacy whole-list encoding.
    pub distinct_forward_arg: bool,
}

impl Config {
    /// Everything on, the modern expanded-schema surface.
    pub fn full() -> Self {
        Config {
            distinct_index_nodes: true,
            distinct_keyword_args_nodes: true,
            collapse_single_block_param: true,
            arg_inside_collapsed_param: false,
            lambda_literal_node: true,
            emit_encoding_constant: true,
            distinct_forward_arg: true,
        }
    }

    /// Everything off, for schemas that predate the distinctions.
    pub fn legacy() -> Self {
        Config {
            distinct_index_nodes: false,
            distinct_keyword_args_nodes: false,
            collapse_single_block_param: false,
            arg_inside_collapsed_param: false,
            lambda_literal_node: false,
            emit_encoding_constant: false,
            distinct_forward_arg: false,
        }
    }
}

/// Identity of the buffer the source tree was parsed from. Only the magic
/// keywords for current file and line consult this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    pub name: String,
    /// Line number of the buffer's first line, usually 1.
    pub first_line: usize,
}

impl Default for FileInfo {
    fn default() -> Self {
        FileInfo { name: "(string)".to_string(), first_line: 1 }
    }
}

impl FileInfo {
    pub fn named(name: impl Into<String>) -> Self {
        FileInfo { name: name.into(), first_line: 1 }
    }
}
