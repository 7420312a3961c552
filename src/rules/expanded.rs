//! Mapping rules for the expanded (and annotated) schemas.
//!
//! One rule per source construct, dispatched from a single exhaustive match.
//! Shapes follow the rich-vocabulary schema: dedicated node kinds per
//! construct, typed scalar payloads, and policy-selected encodings for the
//! constructs the schema's consumers disagree on (index nodes, keyword
//! argument nodes, collapsed block parameters, lambda literals).
//!
//! Context-sensitive rules consult the translator's ancestor stack; every
//! decision here is a pure function of the node, the configuration, and that
//! chain.

use crate::arity::implicit_arity;
use crate::diagnostics::TranslateError;
use crate::engine::Translator;
use crate::literals;
use crate::segments::{Collapsed, Segment, SegmentAccumulator};
use crate::source::{
    CallOperator, HeredocMarker, HeredocQuote, KeywordRest, MatchOp, Node, RangeOp, RescueEx,
    Syntax,
};
use crate::target::{Element, Meta};

use super::helpers::{args_parts, expect_name, is_empty_statements, label_text};

type R = Result<Element, TranslateError>;

/// Resolves and runs the rule for `node`'s construct.
pub fn dispatch<'t>(tx: &mut Translator<'t>, node: &'t Node) -> R {
    match &node.syntax {
        // Scalars -------------------------------------------------------
        Syntax::IntLit { value } => {
            let parsed = parse_int(node, value)?;
            Ok(tx.node("int", vec![Element::Int(parsed)]))
        }
        Syntax::FloatLit { value } => {
            let parsed = parse_float(node, value)?;
            Ok(tx.node("float", vec![Element::Float(parsed)]))
        }
        Syntax::RationalLit { value } => {
            let (numer, denom) = literals::parse_rational(value).ok_or_else(|| {
                malformed(node, format!("unreadable rational literal `{value}`"))
            })?;
            Ok(tx.node("rational", vec![Element::Rational { numer, denom }]))
        }
        Syntax::ImaginaryLit { value } => {
            let parsed = literals::parse_imaginary(value).ok_or_else(|| {
                malformed(node, format!("unreadable imaginary literal `{value}`"))
            })?;
            Ok(tx.node("complex", vec![parsed]))
        }
        Syntax::CharLit { value } => Ok(tx.node(
            "str",
            vec![Element::Str(literals::unescape_char(value))],
        )),

        // String-like literals ------------------------------------------
        Syntax::StringLit { parts } => string_literal(tx, parts),
        Syntax::TextSegment { value } => {
            // Regexp sources stay raw; cooking would corrupt their own
            // escape language.
            let raw_context = matches!(
                tx.parent().map(|parent| &parent.syntax),
                Some(Syntax::RegexpLit { .. })
            );
            let text = if raw_context {
                value.clone()
            } else {
                literals::unescape_string(value)
            };
            Ok(tx.node("str", vec![Element::Str(text)]))
        }
        Syntax::EmbExpr { statements } => {
            let child = tx.translate(statements)?;
            let children = if child.is_absent() { vec![] } else { vec![child] };
            Ok(tx.node("begin", children))
        }
        Syntax::EmbVar { variable } => tx.translate(variable),
        Syntax::StringContent { parts } => match parts.as_slice() {
            [part] => match &part.syntax {
                Syntax::TextSegment { value } => {
                    Ok(tx.node("sym", vec![Element::sym(value)]))
                }
                _ => Err(malformed(node, "string content without a text part")),
            },
            _ => Err(malformed(node, "string content with multiple parts")),
        },
        Syntax::StringConcat { left, right } => {
            let left = tx.translate(left)?;
            let right = tx.translate(right)?;
            Ok(tx.node("dstr", vec![left, right]))
        }
        Syntax::XString { parts } => {
            let children = tx.translate_all(parts)?;
            Ok(tx.node("xstr", children))
        }
        Syntax::Heredoc { marker, dedent, parts } => heredoc(tx, marker, dedent, parts),
        Syntax::SymbolLit { value } => Ok(tx.node("sym", vec![Element::sym(value)])),
        Syntax::DynaSymbol { parts } => match parts.as_slice() {
            [part] => match &part.syntax {
                Syntax::TextSegment { value } => Ok(tx.node(
                    "sym",
                    vec![Element::sym(literals::unescape_string(value))],
                )),
                _ => {
                    let children = tx.translate_all(parts)?;
                    Ok(tx.node("dsym", children))
                }
            },
            _ => {
                let children = tx.translate_all(parts)?;
                Ok(tx.node("dsym", children))
            }
        },
        Syntax::Label { value } => Ok(tx.node("sym", vec![Element::sym(label_text(value))])),
        Syntax::RegexpLit { parts, flags } => regexp(tx, node, parts, flags),
        Syntax::RangeNode { left, op, right } => {
            let kind = match op {
                RangeOp::Inclusive => "irange",
                RangeOp::Exclusive => "erange",
            };
            let left = tx.translate_opt(left)?;
            let right = tx.translate_opt(right)?;
            Ok(tx.node(kind, vec![left, right]))
        }

        // Collections ---------------------------------------------------
        Syntax::ArrayLiteral { contents } => match contents {
            None => Ok(tx.node("array", vec![])),
            Some(contents) => {
                let parts = args_parts(contents, "array_literal")?;
                let children = tx.translate_all(parts)?;
                Ok(tx.node("array", children))
            }
        },
        Syntax::HashLiteral { assocs } => {
            let children = tx.translate_all(assocs)?;
            Ok(tx.node("hash", children))
        }
        Syntax::QSymbols { elements } => {
            let children = elements
                .iter()
                .map(|element| match &element.syntax {
                    Syntax::TextSegment { value } => Ok(tx.node("sym", vec![Element::sym(value)])),
                    _ => Err(malformed(element, "symbol array holds non-text element")),
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(tx.node("array", children))
        }
        Syntax::QWords { elements } | Syntax::Words { elements } => {
            let children = tx.translate_all(elements)?;
            Ok(tx.node("array", children))
        }
        Syntax::Symbols { elements } => symbols(tx, elements),
        Syntax::Word { parts } => match parts.as_slice() {
            [part] if matches!(part.syntax, Syntax::TextSegment { .. }) => tx.translate(part),
            _ => {
                let children = tx.translate_all(parts)?;
                Ok(tx.node("dstr", children))
            }
        },

        // Names and variables -------------------------------------------
        Syntax::Ident { value } => Ok(tx.node("lvar", vec![Element::sym(value)])),
        Syntax::IVar { value } => Ok(tx.node("ivar", vec![Element::sym(value)])),
        Syntax::CVar { value } => Ok(tx.node("cvar", vec![Element::sym(value)])),
        Syntax::GVar { value } => Ok(tx.node("gvar", vec![Element::sym(value)])),
        Syntax::Backref { value } => backref(tx, value),
        Syntax::Const { value } => {
            Ok(tx.node("const", vec![Element::Absent, Element::sym(value)]))
        }
        Syntax::Kw { value } => keyword(tx, node, value),
        Syntax::Op { value: _ } => Err(malformed(
            node,
            "operator token outside a name position",
        )),
        Syntax::VarRef { value } => tx.translate(value),
        Syntax::VarField { value } => var_field(tx, node, value),
        Syntax::VCall { value } => {
            let name = expect_name(value, "vcall")?;
            Ok(tx.node_with(
                "send",
                vec![Element::Absent, Element::sym(name)],
                Meta::at(node.span),
            ))
        }
        Syntax::ConstRef { constant } => {
            let name = expect_name(constant, "constant_reference")?;
            Ok(tx.node("const", vec![Element::Absent, Element::sym(name)]))
        }
        Syntax::ConstPathRef { parent, constant } => {
            let name = expect_name(constant, "constant_path")?.to_string();
            let parent = tx.translate(parent)?;
            Ok(tx.node("const", vec![parent, Element::Sym(name)]))
        }
        Syntax::ConstPathField { parent, constant } => const_path_field(tx, parent, constant),
        Syntax::TopConstRef { constant } => {
            let name = expect_name(constant, "top_constant_path")?;
            let cbase = tx.node("cbase", vec![]);
            Ok(tx.node("const", vec![cbase, Element::sym(name)]))
        }
        Syntax::TopConstField { constant } => {
            let name = expect_name(constant, "top_constant_field")?;
            let cbase = tx.node("cbase", vec![]);
            Ok(tx.node("casgn", vec![cbase, Element::sym(name)]))
        }

        // Calls ----------------------------------------------------------
        Syntax::CallNode { receiver, operator, message, arguments } => {
            call(tx, node, receiver, operator, message, arguments)
        }
        Syntax::Command { message, arguments, block } => command(tx, message, arguments, block),
        Syntax::CommandCall { receiver, operator, message, arguments, block } => {
            command_call(tx, receiver, operator, message, arguments, block)
        }
        Syntax::MethodAddBlock { call, block } => method_add_block(tx, node, call, block),
        Syntax::BlockNode { .. } => Err(malformed(
            node,
            "block body outside a call position",
        )),
        Syntax::ArgParen { .. } | Syntax::Args { .. } => Err(malformed(
            node,
            "argument list outside a call position",
        )),
        Syntax::ArgStar { value } => arg_star(tx, value),
        Syntax::ArgBlock { value } => {
            let value = tx.translate_opt(value)?;
            Ok(tx.node("block_pass", vec![value]))
        }
        Syntax::ArgsForward => Ok(tx.node("forwarded_args", vec![])),
        Syntax::BareAssocHash { assocs } => {
            let distinct = tx.config().distinct_keyword_args_nodes
                && !matches!(
                    tx.parent().map(|parent| &parent.syntax),
                    Some(Syntax::ArrayLiteral { .. })
                );
            let kind = if distinct { "kwargs" } else { "hash" };
            let children = tx.translate_all(assocs)?;
            Ok(tx.node(kind, children))
        }
        Syntax::Assoc { key, value } => assoc(tx, key, value),
        Syntax::AssocSplat { value } => {
            let value = tx.translate(value)?;
            Ok(tx.node("kwsplat", vec![value]))
        }
        Syntax::Super { arguments } => superclass_call(tx, arguments),
        Syntax::ZSuper => Ok(tx.node("zsuper", vec![])),
        Syntax::YieldNode { arguments } => yield_call(tx, arguments),
        Syntax::ReturnNode { arguments } => match arguments.as_deref() {
            None => Ok(tx.node("return", vec![])),
            Some(arguments) => {
                let parts = args_parts(arguments, "return")?;
                let children = tx.translate_all(parts)?;
                Ok(tx.node("return", children))
            }
        },
        Syntax::Break { arguments } => {
            let parts = args_parts(arguments, "break")?;
            let children = tx.translate_all(parts)?;
            Ok(tx.node("break", children))
        }
        Syntax::Next { arguments } => {
            let parts = args_parts(arguments, "next")?;
            let children = tx.translate_all(parts)?;
            Ok(tx.node("next", children))
        }
        Syntax::Redo => Ok(tx.node("redo", vec![])),
        Syntax::Retry => Ok(tx.node("retry", vec![])),
        Syntax::Defined { value } => {
            let value = tx.translate(value)?;
            Ok(tx.node("defined?", vec![value]))
        }

        // Operators and assignment --------------------------------------
        Syntax::Unary { operator, statement } => unary(tx, operator, statement),
        Syntax::Binary { left, operator, right } => binary(tx, node, left, operator, right),
        Syntax::Not { statement } => {
            let receiver = match statement {
                None => tx.node("begin", vec![]),
                Some(statement) => tx.translate(statement)?,
            };
            Ok(tx.node("send", vec![receiver, Element::sym("!")]))
        }
        Syntax::Assign { target, value } => {
            let target = expect_node(tx.translate(target)?, node, "assignment target")?;
            let value = tx.translate(value)?;
            let mut children = target.children;
            children.push(value);
            Ok(tx.node(target.kind, children))
        }
        Syntax::OpAssign { target, operator, value } => op_assign(tx, target, operator, value),
        Syntax::MAssign { target, value } => {
            let target = tx.translate(target)?;
            let value = tx.translate(value)?;
            Ok(tx.node("masgn", vec![target, value]))
        }
        Syntax::MLHS { parts } => {
            let children = parts
                .iter()
                .map(|part| match &part.syntax {
                    Syntax::Ident { value } => Ok(tx.node("arg", vec![Element::sym(value)])),
                    _ => tx.translate(part),
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(tx.node("mlhs", children))
        }
        Syntax::MLHSParen { contents } => tx.translate(contents),
        Syntax::MRHS { parts } => {
            let children = tx.translate_all(parts)?;
            Ok(tx.node("array", children))
        }
        Syntax::Field { parent, operator, name } => field(tx, parent, operator, name),
        Syntax::ARef { collection, index } => index_read(tx, collection, index),
        Syntax::ARefField { collection, index } => index_write(tx, collection, index),

        // Control flow ---------------------------------------------------
        Syntax::IfNode { predicate, statements, consequent } => {
            let predicate = condition(tx, predicate)?;
            let statements = tx.translate(statements)?;
            let consequent = tx.translate_opt(consequent)?;
            Ok(tx.node("if", vec![predicate, statements, consequent]))
        }
        Syntax::UnlessNode { predicate, statements, consequent } => {
            let predicate = tx.translate(predicate)?;
            let consequent = tx.translate_opt(consequent)?;
            let statements = tx.translate(statements)?;
            Ok(tx.node("if", vec![predicate, consequent, statements]))
        }
        Syntax::Elsif { predicate, statements, consequent } => {
            let predicate = tx.translate(predicate)?;
            let statements = tx.translate(statements)?;
            let consequent = tx.translate_opt(consequent)?;
            Ok(tx.node("if", vec![predicate, statements, consequent]))
        }
        Syntax::Else { statements } => {
            if is_empty_statements(statements)
                && matches!(tx.parent().map(|p| &p.syntax), Some(Syntax::Case { .. }))
            {
                Ok(tx.node_with("empty_else", vec![], Meta::synthesized()))
            } else {
                tx.translate(statements)
            }
        }
        Syntax::IfOp { predicate, truthy, falsy } => {
            let predicate = tx.translate(predicate)?;
            let truthy = tx.translate(truthy)?;
            let falsy = tx.translate(falsy)?;
            Ok(tx.node("if", vec![predicate, truthy, falsy]))
        }
        Syntax::WhileNode { predicate, statements, modifier } => {
            loop_node(tx, "while", "while_post", predicate, statements, *modifier)
        }
        Syntax::UntilNode { predicate, statements, modifier } => {
            loop_node(tx, "until", "until_post", predicate, statements, *modifier)
        }
        Syntax::For { index, collection, statements } => {
            let index = tx.translate(index)?;
            let collection = tx.translate(collection)?;
            let statements = tx.translate(statements)?;
            Ok(tx.node("for", vec![index, collection, statements]))
        }
        Syntax::Case { value, consequent } => case(tx, value, consequent),
        Syntax::When { arguments, statements, .. } => {
            let parts = args_parts(arguments, "when_clause")?;
            let mut children = tx.translate_all(parts)?;
            children.push(tx.translate(statements)?);
            Ok(tx.node("when", children))
        }
        Syntax::In { pattern, statements, .. } => in_clause(tx, pattern, statements),
        Syntax::Begin { bodystmt } => begin(tx, bodystmt),
        Syntax::BodyStmt { statements, rescue_clause, else_clause, ensure_clause } => {
            body_statement(tx, statements, rescue_clause, else_clause, ensure_clause)
        }
        Syntax::Rescue { exception, statements, consequent } => {
            rescue(tx, node, exception, statements, consequent)
        }
        Syntax::Ensure { statements } => {
            let statements = tx.translate(statements)?;
            Ok(tx.node("ensure", vec![statements]))
        }
        Syntax::RescueMod { statement, value } => {
            let statement = tx.translate(statement)?;
            let value = tx.translate(value)?;
            let resbody = tx.node("resbody", vec![Element::Absent, Element::Absent, value]);
            Ok(tx.node("rescue", vec![statement, resbody, Element::Absent]))
        }

        // Definitions ----------------------------------------------------
        Syntax::Def { target, name, params, bodystmt } => {
            def(tx, target, name, params, bodystmt)
        }
        Syntax::ClassDeclaration { constant, superclass, bodystmt } => {
            let constant = tx.translate(constant)?;
            let superclass = tx.translate_opt(superclass)?;
            let bodystmt = tx.translate(bodystmt)?;
            Ok(tx.node("class", vec![constant, superclass, bodystmt]))
        }
        Syntax::ModuleDeclaration { constant, bodystmt } => {
            let constant = tx.translate(constant)?;
            let bodystmt = tx.translate(bodystmt)?;
            Ok(tx.node("module", vec![constant, bodystmt]))
        }
        Syntax::SClass { target, bodystmt } => {
            let target = tx.translate(target)?;
            let bodystmt = tx.translate(bodystmt)?;
            Ok(tx.node("sclass", vec![target, bodystmt]))
        }
        Syntax::Alias { left, right } => {
            let left = tx.translate(left)?;
            let right = tx.translate(right)?;
            Ok(tx.node("alias", vec![left, right]))
        }
        Syntax::Undef { symbols } => {
            let children = tx.translate_all(symbols)?;
            Ok(tx.node("undef", children))
        }
        Syntax::BEGINBlock { statements } => {
            let statements = tx.translate(statements)?;
            Ok(tx.node("preexe", vec![statements]))
        }
        Syntax::ENDBlock { statements } => {
            let statements = tx.translate(statements)?;
            Ok(tx.node("postexe", vec![statements]))
        }
        Syntax::Program { statements } => tx.translate(statements),
        Syntax::Statements { body } => statements(tx, body),
        Syntax::VoidStmt | Syntax::Comment { .. } => Ok(Element::Absent),
        Syntax::Paren { contents } => paren(tx, contents),

        // Parameters and blocks -----------------------------------------
        Syntax::Params { .. } => params(tx, node),
        Syntax::RestParam { name } => {
            let children = match name {
                Some(name) => vec![Element::sym(expect_name(name, "rest_parameter")?)],
                None => vec![],
            };
            Ok(tx.node("restarg", children))
        }
        Syntax::KwRestParam { name } => {
            let children = match name {
                Some(name) => vec![Element::sym(expect_name(name, "keyword_rest_parameter")?)],
                None => vec![],
            };
            Ok(tx.node("kwrestarg", children))
        }
        Syntax::BlockArg { name } => {
            let children = match name {
                Some(name) => vec![Element::sym(expect_name(name, "block_parameter")?)],
                None => vec![Element::Absent],
            };
            Ok(tx.node("blockarg", children))
        }
        Syntax::ExcessedComma => Err(malformed(
            node,
            "dangling comma outside a parameter list",
        )),
        Syntax::BlockVar { params, locals } => block_var(tx, params, locals),
        Syntax::Lambda { params, statements } => lambda(tx, node, params, statements),
        Syntax::LambdaVar { params, locals } => lambda_var(tx, params, locals),

        // Patterns -------------------------------------------------------
        Syntax::AryPtn { constant, requireds, rest, posts } => {
            array_pattern(tx, constant, requireds, rest, posts)
        }
        Syntax::HshPtn { constant, keywords, keyword_rest } => {
            hash_pattern(tx, node, constant, keywords, keyword_rest)
        }
        Syntax::FndPtn { constant, left, values, right } => {
            find_pattern(tx, constant, left, values, right)
        }
        Syntax::RAssign { value, op, pattern } => {
            let kind = match op {
                MatchOp::Rocket => "match_pattern",
                MatchOp::In => "match_pattern_p",
            };
            let value = tx.translate(value)?;
            let pattern = tx.translate(pattern)?;
            Ok(tx.node(kind, vec![value, pattern]))
        }
        Syntax::PinnedBegin { statement } => {
            let statement = tx.translate(statement)?;
            let begin = tx.node("begin", vec![statement]);
            Ok(tx.node("pin", vec![begin]))
        }
        Syntax::PinnedVarRef { value } => {
            let value = tx.translate(value)?;
            Ok(tx.node("pin", vec![value]))
        }
    }
}

// ============================================================================
// LITERAL RULES
// ============================================================================

fn parse_int(node: &Node, value: &str) -> Result<i64, TranslateError> {
    literals::parse_integer(value)
        .ok_or_else(|| malformed(node, format!("unreadable integer literal `{value}`")))
}

fn parse_float(node: &Node, value: &str) -> Result<f64, TranslateError> {
    literals::parse_float(value)
        .ok_or_else(|| malformed(node, format!("unreadable float literal `{value}`")))
}

fn string_literal<'t>(tx: &mut Translator<'t>, parts: &'t [Node]) -> R {
    match parts {
        [] => Ok(tx.node("str", vec![Element::str("")])),
        [part] if matches!(part.syntax, Syntax::TextSegment { .. }) => tx.translate(part),
        _ => {
            let children = tx.translate_all(parts)?;
            Ok(tx.node("dstr", children))
        }
    }
}

fn symbols<'t>(tx: &mut Translator<'t>, elements: &'t [Node]) -> R {
    let mut children = Vec::with_capacity(elements.len());
    for element in elements {
        let Syntax::Word { parts } = &element.syntax else {
            return Err(malformed(element, "symbol array holds a non-word element"));
        };
        match parts.as_slice() {
            [part] => match &part.syntax {
                Syntax::TextSegment { value } => {
                    children.push(tx.node("sym", vec![Element::sym(value)]));
                }
                _ => {
                    let translated = tx.translate_all(parts)?;
                    children.push(tx.node("dsym", translated));
                }
            },
            _ => {
                let translated = tx.translate_all(parts)?;
                children.push(tx.node("dsym", translated));
            }
        }
    }
    Ok(tx.node("array", children))
}

fn backref<'t>(tx: &mut Translator<'t>, value: &'t str) -> R {
    let digits = value.strip_prefix('$').unwrap_or(value);
    if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
        let index: i64 = digits.parse().unwrap_or(0);
        Ok(tx.node("nth_ref", vec![Element::Int(index)]))
    } else {
        Ok(tx.node("back_ref", vec![Element::sym(value)]))
    }
}

fn keyword<'t>(tx: &mut Translator<'t>, node: &'t Node, value: &'t str) -> R {
    match value {
        "__FILE__" => {
            let name = tx.file().name.clone();
            Ok(tx.node("str", vec![Element::Str(name)]))
        }
        "__LINE__" => {
            let line = (node.span.line + tx.file().first_line).saturating_sub(1);
            Ok(tx.node("int", vec![Element::Int(line as i64)]))
        }
        "__ENCODING__" if !tx.config().emit_encoding_constant => {
            let scope = tx.node("const", vec![Element::Absent, Element::sym("Encoding")]);
            Ok(tx.node("const", vec![scope, Element::sym("UTF_8")]))
        }
        "__ENCODING__" => Ok(tx.node("__ENCODING__", vec![])),
        "nil" => Ok(tx.node("nil", vec![])),
        "true" => Ok(tx.node("true", vec![])),
        "false" => Ok(tx.node("false", vec![])),
        "self" => Ok(tx.node("self", vec![])),
        other => Err(malformed(node, format!("unexpected keyword `{other}`"))),
    }
}

fn regexp<'t>(tx: &mut Translator<'t>, node: &'t Node, parts: &'t [Node], flags: &str) -> R {
    let mut children = tx.translate_all(parts)?;
    let mut options: Vec<char> = flags.chars().filter(char::is_ascii_lowercase).collect();
    options.sort_unstable();
    let options = options
        .into_iter()
        .map(|flag| Element::Sym(flag.to_string()))
        .collect();
    children.push(tx.node("regopt", options));
    let regexp = tx.node("regexp", children);

    // A regexp alone in condition position means "match the current line".
    let negated = |candidate: &Node| {
        matches!(
            &candidate.syntax,
            Syntax::Unary { operator, statement } if operator == "!" && std::ptr::eq(statement.as_ref(), node)
        )
    };
    let conditional = match tx.parent().map(|parent| &parent.syntax) {
        Some(Syntax::IfNode { predicate, .. }) | Some(Syntax::UnlessNode { predicate, .. }) => {
            std::ptr::eq(predicate.as_ref(), node)
        }
        _ => false,
    };
    let negated_conditional = match tx.ancestor(2).map(|ancestor| &ancestor.syntax) {
        Some(Syntax::IfNode { predicate, .. }) | Some(Syntax::UnlessNode { predicate, .. }) => {
            negated(predicate)
        }
        _ => false,
    };
    let negated_toplevel = match tx.ancestor(3).map(|ancestor| &ancestor.syntax) {
        Some(Syntax::Program { statements }) => match &statements.syntax {
            Syntax::Statements { body } => body.last().is_some_and(negated),
            _ => false,
        },
        _ => false,
    };

    if conditional || negated_conditional || negated_toplevel {
        Ok(tx.node("match_current_line", vec![regexp]))
    } else {
        Ok(regexp)
    }
}

fn heredoc<'t>(
    tx: &mut Translator<'t>,
    marker: &HeredocMarker,
    dedent: &Option<usize>,
    parts: &'t [Node],
) -> R {
    let mut acc = SegmentAccumulator::new();
    for part in parts {
        match &part.syntax {
            Syntax::TextSegment { value } => {
                let text = match marker.quote {
                    HeredocQuote::Single => value.clone(),
                    _ => literals::unescape_heredoc(value),
                };
                acc.push_block_text(&text);
            }
            _ => acc.push_embedded(tx.translate(part)?),
        }
    }

    if marker.squiggly {
        acc.strip_indentation(*dedent, marker.quote != HeredocQuote::Single);
    }

    if marker.quote == HeredocQuote::Backtick {
        let children = acc
            .into_segments()
            .into_iter()
            .map(|segment| segment_element(tx, segment))
            .collect();
        return Ok(tx.node("xstr", children));
    }

    match acc.collapse() {
        Collapsed::Empty => Ok(tx.node("str", vec![Element::str("")])),
        Collapsed::Single(text) => Ok(tx.node("str", vec![Element::Str(text)])),
        Collapsed::Multi(segments) => {
            let children = segments
                .into_iter()
                .map(|segment| segment_element(tx, segment))
                .collect();
            Ok(tx.node("dstr", children))
        }
    }
}

fn segment_element(tx: &Translator<'_>, segment: Segment) -> Element {
    match segment {
        Segment::Text(text) => tx.node("str", vec![Element::Str(text)]),
        Segment::Embedded(element) => element,
    }
}

// ============================================================================
// CALL RULES
// ============================================================================

fn send_kind(operator: &Option<CallOperator>) -> &'static str {
    match operator {
        Some(CallOperator::SafeNav) => "csend",
        _ => "send",
    }
}

#[allow(clippy::too_many_arguments)]
fn call<'t>(
    tx: &mut Translator<'t>,
    node: &'t Node,
    receiver: &'t Option<Box<Node>>,
    operator: &'t Option<CallOperator>,
    message: &'t Option<Box<Node>>,
    arguments: &'t Option<Box<Node>>,
) -> R {
    let kind = send_kind(operator);

    // The argument tail shared by every shape below.
    let tail = |tx: &mut Translator<'t>| -> Result<Vec<Element>, TranslateError> {
        match arguments.as_deref().map(|a| &a.syntax) {
            None | Some(Syntax::ArgParen { arguments: None }) => Ok(vec![]),
            Some(Syntax::Args { parts }) => tx.translate_all(parts),
            Some(Syntax::ArgParen { arguments: Some(inner) }) => match &inner.syntax {
                Syntax::Args { parts } => tx.translate_all(parts),
                Syntax::ArgsForward => Ok(vec![tx.node("forwarded_args", vec![])]),
                _ => Err(malformed(inner, "unexpected parenthesized argument shape")),
            },
            Some(_) => Err(malformed(node, "unexpected call argument shape")),
        }
    };

    match (receiver.as_deref(), message.as_deref()) {
        (None, Some(message)) => {
            let name = Element::sym(expect_name(message, "call")?);
            let mut children = vec![Element::Absent, name];
            children.extend(tail(tx)?);
            Ok(tx.node("send", children))
        }
        (Some(receiver), None) => {
            // Anonymous `receiver.()` call.
            let receiver = tx.translate(receiver)?;
            let mut children = vec![receiver, Element::sym("call")];
            children.extend(tail(tx)?);
            Ok(tx.node(kind, children))
        }
        (Some(receiver), Some(message)) => {
            let name = Element::sym(expect_name(message, "call")?);
            let receiver = tx.translate(receiver)?;
            let mut children = vec![receiver, name];
            children.extend(tail(tx)?);
            Ok(tx.node(kind, children))
        }
        (None, None) => Err(malformed(node, "call with neither receiver nor message")),
    }
}

fn command<'t>(
    tx: &mut Translator<'t>,
    message: &'t Node,
    arguments: &'t Node,
    block: &'t Option<Box<Node>>,
) -> R {
    let name = Element::sym(expect_name(message, "command")?);
    let parts = args_parts(arguments, "command")?;
    let mut children = vec![Element::Absent, name];
    children.extend(tx.translate_all(parts)?);
    let call = tx.node("send", children);

    match block {
        Some(block) => attach_block(tx, call, block),
        None => Ok(call),
    }
}

fn command_call<'t>(
    tx: &mut Translator<'t>,
    receiver: &'t Node,
    operator: &'t CallOperator,
    message: &'t Node,
    arguments: &'t Option<Box<Node>>,
    block: &'t Option<Box<Node>>,
) -> R {
    let name = Element::sym(expect_name(message, "command_call")?);
    let receiver_el = tx.translate(receiver)?;
    let mut children = vec![receiver_el, name];
    match arguments.as_deref().map(|a| &a.syntax) {
        None => {}
        Some(Syntax::Args { parts }) => children.extend(tx.translate_all(parts)?),
        Some(Syntax::ArgParen { arguments: Some(inner) }) => {
            let parts = args_parts(inner, "command_call")?;
            children.extend(tx.translate_all(parts)?);
        }
        Some(Syntax::ArgParen { arguments: None }) => {}
        Some(_) => return Err(malformed(message, "unexpected command argument shape")),
    }

    let kind = send_kind(&Some(*operator));
    let call = tx.node(kind, children);
    match block {
        Some(block) => attach_block(tx, call, block),
        None => Ok(call),
    }
}

fn method_add_block<'t>(
    tx: &mut Translator<'t>,
    node: &'t Node,
    call: &'t Node,
    block: &'t Node,
) -> R {
    let (kind, arguments, bodystmt) = block_children(tx, block)?;

    if matches!(
        call.syntax,
        Syntax::Break { .. } | Syntax::Next { .. } | Syntax::ReturnNode { .. }
    ) {
        // `break foo.each do ... end` keeps the jump on the outside.
        let call = expect_node(tx.translate(call)?, node, "jump with block")?;
        let mut children = call.children;
        children.push(arguments);
        children.push(tx.translate(bodystmt)?);
        let iter = tx.node(kind, children);
        Ok(tx.node(call.kind, vec![iter]))
    } else {
        let call = tx.translate(call)?;
        let body = tx.translate(bodystmt)?;
        Ok(tx.node(kind, vec![call, arguments, body]))
    }
}

/// Attaches a block to an already-built call, deciding between the explicit
/// block node and the implicit-arity encoding.
fn attach_block<'t>(tx: &mut Translator<'t>, call: Element, block: &'t Node) -> R {
    let (kind, arguments, bodystmt) = block_children(tx, block)?;
    let body = tx.translate(bodystmt)?;
    Ok(tx.node(kind, vec![call, arguments, body]))
}

/// The shared block encoding: explicit parameter pipes become an argument
/// list; a pipeless body referencing implicit parameters becomes the
/// numbered-block form carrying the inferred arity.
fn block_children<'t>(
    tx: &mut Translator<'t>,
    block: &'t Node,
) -> Result<(&'static str, Element, &'t Node), TranslateError> {
    let Syntax::BlockNode { block_var, bodystmt } = &block.syntax else {
        return Err(malformed(block, "expected a block body"));
    };

    if block_var.is_none() {
        if let Some(maximum) = implicit_arity(bodystmt) {
            return Ok(("numblock", Element::Int(maximum), bodystmt));
        }
    }

    let arguments = match block_var {
        Some(block_var) => tx.translate(block_var)?,
        None => tx.node("args", vec![]),
    };
    Ok(("block", arguments, bodystmt))
}

fn arg_star<'t>(tx: &mut Translator<'t>, value: &'t Option<Box<Node>>) -> R {
    // Inside parenthesized destructuring targets a bare splat is a rest
    // argument, not a value splat.
    let destructuring = matches!(
        tx.ancestor(2).map(|a| &a.syntax),
        Some(Syntax::MLHSParen { contents }) if matches!(contents.syntax, Syntax::MLHS { .. })
    );

    if destructuring {
        match value.as_deref() {
            None => Ok(tx.node("restarg", vec![])),
            Some(inner) => match &inner.syntax {
                Syntax::VarField { value: Some(token) } => {
                    let name = expect_name(token, "splat_argument")?;
                    Ok(tx.node("restarg", vec![Element::sym(name)]))
                }
                Syntax::Ident { value: name } => {
                    Ok(tx.node("restarg", vec![Element::sym(name)]))
                }
                _ => Err(malformed(inner, "unexpected rest target shape")),
            },
        }
    } else {
        match value.as_deref() {
            None => Ok(tx.node("splat", vec![])),
            Some(inner) => {
                let inner = tx.translate(inner)?;
                Ok(tx.node("splat", vec![inner]))
            }
        }
    }
}

fn assoc<'t>(tx: &mut Translator<'t>, key: &'t Node, value: &'t Option<Box<Node>>) -> R {
    match value {
        Some(value) => {
            let key = tx.translate(key)?;
            let value = tx.translate(value)?;
            Ok(tx.node("pair", vec![key, value]))
        }
        None => {
            // Shorthand `{x:}` pairs resolve the value from the key's name:
            // constants read as constants, anything else as a local call.
            let Syntax::Label { value: label } = &key.syntax else {
                return Err(malformed(key, "shorthand pair without a label key"));
            };
            let name = label_text(label);
            let uppercase = name.chars().next().is_some_and(|c| c.is_uppercase());
            let key = tx.translate(key)?;
            let value = if uppercase {
                tx.node("const", vec![Element::Absent, Element::sym(name)])
            } else {
                tx.node("send", vec![Element::Absent, Element::sym(name)])
            };
            Ok(tx.node("pair", vec![key, value]))
        }
    }
}

fn superclass_call<'t>(tx: &mut Translator<'t>, arguments: &'t Node) -> R {
    match &arguments.syntax {
        Syntax::ArgParen { arguments: None } => Ok(tx.node("super", vec![])),
        Syntax::ArgParen { arguments: Some(inner) } => match &inner.syntax {
            Syntax::ArgsForward => {
                let forwarded = tx.translate(inner)?;
                Ok(tx.node("super", vec![forwarded]))
            }
            Syntax::Args { parts } => {
                let children = tx.translate_all(parts)?;
                Ok(tx.node("super", children))
            }
            _ => Err(malformed(inner, "unexpected super argument shape")),
        },
        Syntax::Args { parts } => {
            let children = tx.translate_all(parts)?;
            Ok(tx.node("super", children))
        }
        _ => Err(malformed(arguments, "unexpected super argument shape")),
    }
}

fn yield_call<'t>(tx: &mut Translator<'t>, arguments: &'t Option<Box<Node>>) -> R {
    let Some(arguments) = arguments.as_deref() else {
        return Ok(tx.node("yield", vec![]));
    };
    match &arguments.syntax {
        Syntax::Args { parts } => {
            let children = tx.translate_all(parts)?;
            Ok(tx.node("yield", children))
        }
        Syntax::Paren { contents: Some(inner) } => {
            let parts = args_parts(inner, "yield")?;
            let children = tx.translate_all(parts)?;
            Ok(tx.node("yield", children))
        }
        _ => Err(malformed(arguments, "unexpected yield argument shape")),
    }
}

// ============================================================================
// OPERATOR AND ASSIGNMENT RULES
// ============================================================================

fn unary<'t>(tx: &mut Translator<'t>, operator: &'t str, statement: &'t Node) -> R {
    // `!(a..b)` in condition position is a negated flip-flop.
    if operator == "!" {
        if let Syntax::Paren { contents: Some(contents) } = &statement.syntax {
            if let Syntax::Statements { body } = &contents.syntax {
                if let [range] = body.as_slice() {
                    if let Syntax::RangeNode { op, .. } = &range.syntax {
                        let kind = match op {
                            RangeOp::Inclusive => "iflipflop",
                            RangeOp::Exclusive => "eflipflop",
                        };
                        let range = expect_node(tx.translate(range)?, statement, "flip-flop")?;
                        let flipflop = tx.node(kind, range.children);
                        let begin = tx.node("begin", vec![flipflop]);
                        return Ok(tx.node("send", vec![begin, Element::sym("!")]));
                    }
                }
            }
        }
    }

    // Sign folding: integer and float literals absorb the sign; rational
    // and imaginary operands always stay a send.
    match (&statement.syntax, operator) {
        (Syntax::IntLit { value }, "+") => {
            let parsed = parse_int(statement, value)?;
            Ok(tx.node("int", vec![Element::Int(parsed)]))
        }
        (Syntax::IntLit { value }, "-") => {
            let parsed = parse_int(statement, value)?;
            Ok(tx.node("int", vec![Element::Int(-parsed)]))
        }
        (Syntax::FloatLit { value }, "+") => {
            let parsed = parse_float(statement, value)?;
            Ok(tx.node("float", vec![Element::Float(parsed)]))
        }
        (Syntax::FloatLit { value }, "-") => {
            let parsed = parse_float(statement, value)?;
            Ok(tx.node("float", vec![Element::Float(-parsed)]))
        }
        (_, "+") => {
            let receiver = tx.translate(statement)?;
            Ok(tx.node("send", vec![receiver, Element::sym("+@")]))
        }
        (_, "-") => {
            let receiver = tx.translate(statement)?;
            Ok(tx.node("send", vec![receiver, Element::sym("-@")]))
        }
        (_, other) => {
            let receiver = tx.translate(statement)?;
            Ok(tx.node("send", vec![receiver, Element::sym(other)]))
        }
    }
}

fn binary<'t>(
    tx: &mut Translator<'t>,
    node: &'t Node,
    left: &'t Node,
    operator: &'t str,
    right: &'t Node,
) -> R {
    match operator {
        "|" => {
            // Walk upward through the run of `|` ancestors; the chain is a
            // pattern alternative exactly when the run hangs off a pattern
            // clause.
            let mut back = 1;
            while matches!(
                tx.ancestor(back).map(|a| &a.syntax),
                Some(Syntax::Binary { operator, .. }) if operator == "|"
            ) {
                back += 1;
            }
            if matches!(tx.ancestor(back).map(|a| &a.syntax), Some(Syntax::In { .. })) {
                // One flattened alternative node over all operands of the
                // maximal chain.
                let mut operands = Vec::new();
                collect_alternation(node, &mut operands);
                let children = operands
                    .into_iter()
                    .map(|operand| tx.translate(operand))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(tx.node("match_alt", children))
            } else {
                let left = tx.translate(left)?;
                let right = tx.translate(right)?;
                Ok(tx.node("send", vec![left, Element::sym("|"), right]))
            }
        }
        "=>" => {
            let left = tx.translate(left)?;
            let right = tx.translate(right)?;
            Ok(tx.node("match_as", vec![left, right]))
        }
        "&&" | "and" => {
            let left = tx.translate(left)?;
            let right = tx.translate(right)?;
            Ok(tx.node("and", vec![left, right]))
        }
        "||" | "or" => {
            let left = tx.translate(left)?;
            let right = tx.translate(right)?;
            Ok(tx.node("or", vec![left, right]))
        }
        "=~" if matches!(
            &left.syntax,
            Syntax::RegexpLit { parts, .. }
                if matches!(parts.as_slice(), [part] if matches!(part.syntax, Syntax::TextSegment { .. }))
        ) =>
        {
            // A static regexp on the left binds its named captures as
            // locals.
            let left = tx.translate(left)?;
            let right = tx.translate(right)?;
            Ok(tx.node("match_with_lvasgn", vec![left, right]))
        }
        other => {
            let left = tx.translate(left)?;
            let right = tx.translate(right)?;
            Ok(tx.node("send", vec![left, Element::sym(other), right]))
        }
    }
}

/// Left-spine flattening of a `|` chain into its ordered operands.
fn collect_alternation<'t>(node: &'t Node, out: &mut Vec<&'t Node>) {
    match &node.syntax {
        Syntax::Binary { left, operator, right } if operator == "|" => {
            collect_alternation(left, out);
            out.push(right);
        }
        _ => out.push(node),
    }
}

fn op_assign<'t>(
    tx: &mut Translator<'t>,
    target: &'t Node,
    operator: &'t str,
    value: &'t Node,
) -> R {
    let target = tx.translate(target)?;
    let value = tx.translate(value)?;
    match operator {
        "||=" => Ok(tx.node("or_asgn", vec![target, value])),
        "&&=" => Ok(tx.node("and_asgn", vec![target, value])),
        other => {
            let op = other.strip_suffix('=').unwrap_or(other);
            Ok(tx.node("op_asgn", vec![target, Element::sym(op), value]))
        }
    }
}

fn field<'t>(
    tx: &mut Translator<'t>,
    parent: &'t Node,
    operator: &'t CallOperator,
    name: &'t Node,
) -> R {
    let writing = matches!(
        tx.parent().map(|p| &p.syntax),
        Some(Syntax::Assign { .. }) | Some(Syntax::MLHS { .. })
    );
    let name = expect_name(name, "field")?;
    let kind = send_kind(&Some(*operator));
    let parent = tx.translate(parent)?;
    let message = if writing {
        Element::Sym(format!("{name}="))
    } else {
        Element::sym(name)
    };
    Ok(tx.node(kind, vec![parent, message]))
}

fn index_read<'t>(
    tx: &mut Translator<'t>,
    collection: &'t Node,
    index: &'t Option<Box<Node>>,
) -> R {
    let collection = tx.translate(collection)?;
    if tx.config().distinct_index_nodes {
        let mut children = vec![collection];
        if let Some(index) = index {
            let parts = args_parts(index, "index_read")?;
            children.extend(tx.translate_all(parts)?);
        }
        Ok(tx.node("index", children))
    } else {
        let mut children = vec![collection, Element::sym("[]")];
        match index {
            Some(index) => {
                let parts = args_parts(index, "index_read")?;
                children.extend(tx.translate_all(parts)?);
            }
            None => children.push(Element::Absent),
        }
        Ok(tx.node("send", children))
    }
}

fn index_write<'t>(
    tx: &mut Translator<'t>,
    collection: &'t Node,
    index: &'t Option<Box<Node>>,
) -> R {
    let collection = tx.translate(collection)?;
    if tx.config().distinct_index_nodes {
        let mut children = vec![collection];
        match index {
            Some(index) => {
                let parts = args_parts(index, "index_field")?;
                children.extend(tx.translate_all(parts)?);
            }
            None => children.push(Element::Absent),
        }
        Ok(tx.node("indexasgn", children))
    } else {
        let mut children = vec![collection, Element::sym("[]=")];
        match index {
            Some(index) => {
                let parts = args_parts(index, "index_field")?;
                children.extend(tx.translate_all(parts)?);
            }
            None => children.push(Element::Absent),
        }
        Ok(tx.node("send", children))
    }
}

fn const_path_field<'t>(tx: &mut Translator<'t>, parent: &'t Node, constant: &'t Node) -> R {
    // `self.Name = value` is a setter call, not a constant assignment.
    let self_receiver = matches!(
        &parent.syntax,
        Syntax::VarRef { value } if matches!(&value.syntax, Syntax::Kw { value } if value == "self")
    );
    if self_receiver && matches!(constant.syntax, Syntax::Ident { .. }) {
        let name = expect_name(constant, "constant_path_field")?;
        let message = Element::Sym(format!("{name}="));
        let parent = tx.translate(parent)?;
        Ok(tx.node("send", vec![parent, message]))
    } else {
        let name = expect_name(constant, "constant_path_field")?.to_string();
        let parent = tx.translate(parent)?;
        Ok(tx.node("casgn", vec![parent, Element::Sym(name)]))
    }
}

fn var_field<'t>(tx: &mut Translator<'t>, node: &'t Node, value: &'t Option<Box<Node>>) -> R {
    // Inside a pattern construct (within two levels) a variable target is a
    // capture, not an assignment.
    let pattern_context = [tx.ancestor(2), tx.ancestor(1)].iter().any(|ancestor| {
        matches!(
            ancestor.map(|a| &a.syntax),
            Some(Syntax::AryPtn { .. })
                | Some(Syntax::FndPtn { .. })
                | Some(Syntax::HshPtn { .. })
                | Some(Syntax::In { .. })
                | Some(Syntax::RAssign { .. })
        ) || matches!(
            ancestor.map(|a| &a.syntax),
            Some(Syntax::Binary { operator, .. }) if operator == "=>"
        )
    });

    if pattern_context {
        if let Some(token) = value {
            let name = expect_name(token, "variable_field")?;
            return Ok(tx.node("match_var", vec![Element::sym(name)]));
        }
    }

    match value.as_deref().map(|v| &v.syntax) {
        Some(Syntax::Const { value }) => Ok(tx.node(
            "casgn",
            vec![Element::Absent, Element::sym(value)],
        )),
        Some(Syntax::CVar { value }) => Ok(tx.node("cvasgn", vec![Element::sym(value)])),
        Some(Syntax::GVar { value }) => Ok(tx.node("gvasgn", vec![Element::sym(value)])),
        Some(Syntax::Ident { value }) => Ok(tx.node("lvasgn", vec![Element::sym(value)])),
        Some(Syntax::IVar { value }) => Ok(tx.node("ivasgn", vec![Element::sym(value)])),
        Some(Syntax::VarRef { value }) => {
            let name = expect_name(value, "variable_field")?;
            Ok(tx.node("lvasgn", vec![Element::sym(name)]))
        }
        None => Ok(tx.node("match_rest", vec![])),
        Some(_) => Err(malformed(node, "unexpected variable-field target")),
    }
}

// ============================================================================
// CONTROL-FLOW RULES
// ============================================================================

/// Condition translation: a bare range in predicate position is a flip-flop.
fn condition<'t>(tx: &mut Translator<'t>, predicate: &'t Node) -> R {
    if let Syntax::RangeNode { op, .. } = &predicate.syntax {
        let kind = match op {
            RangeOp::Inclusive => "iflipflop",
            RangeOp::Exclusive => "eflipflop",
        };
        let range = expect_node(tx.translate(predicate)?, predicate, "flip-flop")?;
        Ok(tx.node(kind, range.children))
    } else {
        tx.translate(predicate)
    }
}

fn loop_node<'t>(
    tx: &mut Translator<'t>,
    kind: &'static str,
    post_kind: &'static str,
    predicate: &'t Node,
    statements: &'t Node,
    modifier: bool,
) -> R {
    // A modifier loop around an explicit begin-body runs the body first.
    let post = modifier
        && matches!(
            &statements.syntax,
            Syntax::Statements { body } if matches!(body.as_slice(), [single] if matches!(single.syntax, Syntax::Begin { .. }))
        );
    let kind = if post { post_kind } else { kind };
    let predicate = tx.translate(predicate)?;
    let statements = tx.translate(statements)?;
    Ok(tx.node(kind, vec![predicate, statements]))
}

fn case<'t>(tx: &mut Translator<'t>, value: &'t Option<Box<Node>>, consequent: &'t Node) -> R {
    let mut clauses: Vec<&Node> = vec![consequent];
    let mut cursor = consequent;
    loop {
        let next = match &cursor.syntax {
            Syntax::When { consequent: Some(next), .. } => next.as_ref(),
            Syntax::In { consequent: Some(next), .. } => next.as_ref(),
            _ => break,
        };
        clauses.push(next);
        cursor = next;
    }

    let kind = if matches!(consequent.syntax, Syntax::In { .. }) {
        "case_match"
    } else {
        "case"
    };
    let mut children = vec![tx.translate_opt(value)?];
    let chain_has_else = clauses
        .last()
        .is_some_and(|clause| matches!(clause.syntax, Syntax::Else { .. }));
    for clause in clauses {
        children.push(tx.translate(clause)?);
    }
    // The else slot is explicit in the schema even when the source has none.
    if !chain_has_else {
        children.push(Element::Absent);
    }
    Ok(tx.node(kind, children))
}

fn in_clause<'t>(tx: &mut Translator<'t>, pattern: &'t Node, statements: &'t Node) -> R {
    match &pattern.syntax {
        Syntax::IfNode { predicate, statements: guarded, .. } => {
            let guarded = tx.translate(guarded)?;
            let predicate = tx.translate(predicate)?;
            let guard = tx.node("if_guard", vec![predicate]);
            let body = tx.translate(statements)?;
            Ok(tx.node("in_pattern", vec![guarded, guard, body]))
        }
        Syntax::UnlessNode { predicate, statements: guarded, .. } => {
            let guarded = tx.translate(guarded)?;
            let predicate = tx.translate(predicate)?;
            let guard = tx.node("unless_guard", vec![predicate]);
            let body = tx.translate(statements)?;
            Ok(tx.node("in_pattern", vec![guarded, guard, body]))
        }
        _ => {
            let pattern = tx.translate(pattern)?;
            let body = tx.translate(statements)?;
            Ok(tx.node("in_pattern", vec![pattern, Element::Absent, body]))
        }
    }
}

fn begin<'t>(tx: &mut Translator<'t>, bodystmt: &'t Node) -> R {
    let Syntax::BodyStmt { statements, rescue_clause, else_clause, ensure_clause } =
        &bodystmt.syntax
    else {
        return Err(malformed(bodystmt, "begin without a body statement"));
    };

    let plain = rescue_clause.is_none() && else_clause.is_none() && ensure_clause.is_none();
    if plain && is_empty_statements(statements) {
        return Ok(tx.node("kwbegin", vec![]));
    }

    if plain {
        let visited = tx.translate(statements)?;
        return match visited {
            Element::Node(inner) if inner.kind == "begin" => {
                Ok(tx.node("kwbegin", inner.children))
            }
            other => Ok(tx.node("kwbegin", vec![other])),
        };
    }

    let body = tx.translate(bodystmt)?;
    Ok(tx.node("kwbegin", vec![body]))
}

fn body_statement<'t>(
    tx: &mut Translator<'t>,
    statements: &'t Node,
    rescue_clause: &'t Option<Box<Node>>,
    else_clause: &'t Option<Box<Node>>,
    ensure_clause: &'t Option<Box<Node>>,
) -> R {
    let mut inner = tx.translate(statements)?;

    if let Some(rescue_clause) = rescue_clause {
        let rescue = expect_node(tx.translate(rescue_clause)?, rescue_clause, "rescue chain")?;
        let mut children = vec![inner];
        children.extend(rescue.children);
        if let Some(else_clause) = else_clause {
            children.pop();
            children.push(tx.translate(else_clause)?);
        }
        inner = tx.node("rescue", children);
    }

    if let Some(ensure_clause) = ensure_clause {
        let ensure = expect_node(tx.translate(ensure_clause)?, ensure_clause, "ensure clause")?;
        let mut children = vec![inner];
        children.extend(ensure.children);
        inner = tx.node("ensure", children);
    }

    Ok(inner)
}

fn rescue<'t>(
    tx: &mut Translator<'t>,
    node: &'t Node,
    exception: &'t Option<RescueEx>,
    statements: &'t Node,
    consequent: &'t Option<Box<Node>>,
) -> R {
    let exceptions = match exception {
        None | Some(RescueEx { exceptions: None, .. }) => None,
        Some(RescueEx { exceptions: Some(listed), .. }) => match &listed.syntax {
            Syntax::MRHS { parts } => {
                let children = tx.translate_all(parts)?;
                Some(tx.node("array", children))
            }
            _ => {
                let single = tx.translate(listed)?;
                Some(tx.node("array", vec![single]))
            }
        },
    };

    let body = tx.translate(statements)?;
    let resbody = match exception {
        None => tx.node("resbody", vec![Element::Absent, Element::Absent, body]),
        Some(RescueEx { variable: None, .. }) => tx.node(
            "resbody",
            vec![exceptions.unwrap_or(Element::Absent), Element::Absent, body],
        ),
        Some(RescueEx { variable: Some(variable), .. }) => {
            let variable = tx.translate(variable)?;
            tx.node(
                "resbody",
                vec![exceptions.unwrap_or(Element::Absent), variable, body],
            )
        }
    };

    let mut children = vec![resbody];
    match consequent {
        Some(consequent) => {
            let chained = expect_node(tx.translate(consequent)?, node, "rescue chain")?;
            children.extend(chained.children);
        }
        None => children.push(Element::Absent),
    }
    Ok(tx.node("rescue", children))
}

fn statements<'t>(tx: &mut Translator<'t>, body: &'t [Node]) -> R {
    let real: Vec<&'t Node> = body
        .iter()
        .filter(|node| !matches!(node.syntax, Syntax::VoidStmt | Syntax::Comment { .. }))
        .collect();

    if real.is_empty() {
        return Ok(Element::Absent);
    }
    if real.len() == 1 {
        return tx.translate(real[0]);
    }

    let mut children = Vec::with_capacity(real.len());
    for node in real {
        let element = tx.translate(node)?;
        if !element.is_absent() {
            children.push(element);
        }
    }
    Ok(tx.node("begin", children))
}

fn paren<'t>(tx: &mut Translator<'t>, contents: &'t Option<Box<Node>>) -> R {
    let Some(contents) = contents.as_deref() else {
        return Ok(tx.node("begin", vec![]));
    };
    let void_only = matches!(
        &contents.syntax,
        Syntax::Statements { body } if matches!(body.as_slice(), [single] if matches!(single.syntax, Syntax::VoidStmt))
    );
    if void_only {
        return Ok(tx.node("begin", vec![]));
    }

    let visited = tx.translate(contents)?;
    match visited {
        Element::Node(ref inner) if inner.kind == "begin" => Ok(visited),
        other => Ok(tx.node("begin", vec![other])),
    }
}

// ============================================================================
// DEFINITION RULES
// ============================================================================

fn def<'t>(
    tx: &mut Translator<'t>,
    target: &'t Option<Box<Node>>,
    name: &'t Node,
    params: &'t Node,
    bodystmt: &'t Node,
) -> R {
    let name = Element::sym(expect_name(name, "method_definition")?);
    let args = unwrap_params(tx, params)?;
    let body = tx.translate(bodystmt)?;

    match target {
        Some(target) => {
            // A parenthesized singleton target flattens to its contents.
            let target = match &target.syntax {
                Syntax::Paren { contents: Some(contents) } => contents,
                _ => target,
            };
            let target = tx.translate(target)?;
            Ok(tx.node("defs", vec![target, name, args, body]))
        }
        None => Ok(tx.node("def", vec![name, args, body])),
    }
}

/// Parameter lists arrive either bare or wrapped in parentheses.
fn unwrap_params<'t>(tx: &mut Translator<'t>, params: &'t Node) -> R {
    match &params.syntax {
        Syntax::Params { .. } => tx.translate(params),
        Syntax::Paren { contents: Some(contents) } => tx.translate(contents),
        Syntax::Paren { contents: None } => Ok(tx.node("args", vec![])),
        _ => Err(malformed(params, "unexpected parameter list shape")),
    }
}

fn params<'t>(tx: &mut Translator<'t>, node: &'t Node) -> R {
    let Syntax::Params {
        requireds,
        optionals,
        rest,
        posts,
        keywords,
        keyword_rest,
        block,
    } = &node.syntax
    else {
        return Err(malformed(node, "expected a parameter list"));
    };

    let mut children = Vec::new();

    for required in requireds {
        match &required.syntax {
            Syntax::MLHSParen { .. } => children.push(tx.translate(required)?),
            _ => {
                let name = expect_name(required, "parameters")?;
                children.push(tx.node("arg", vec![Element::sym(name)]));
            }
        }
    }

    for (name, value) in optionals {
        let name = expect_name(name, "parameters")?.to_string();
        let value = tx.translate(value)?;
        children.push(tx.node("optarg", vec![Element::Sym(name), value]));
    }

    if let Some(rest) = rest {
        if !matches!(rest.syntax, Syntax::ExcessedComma) {
            children.push(tx.translate(rest)?);
        }
    }

    for post in posts {
        let name = expect_name(post, "parameters")?;
        children.push(tx.node("arg", vec![Element::sym(name)]));
    }

    for (name, value) in keywords {
        let key = Element::sym(label_text(expect_name(name, "parameters")?));
        match value {
            Some(value) => {
                let value = tx.translate(value)?;
                children.push(tx.node("kwoptarg", vec![key, value]));
            }
            None => children.push(tx.node("kwarg", vec![key])),
        }
    }

    match keyword_rest {
        KeywordRest::None | KeywordRest::Forward => {}
        KeywordRest::Nil => children.push(tx.node("kwnilarg", vec![])),
        KeywordRest::Param(param) => children.push(tx.translate(param)?),
    }

    if let Some(block) = block {
        children.push(tx.translate(block)?);
    }

    if matches!(keyword_rest, KeywordRest::Forward) {
        if children.is_empty() && !tx.config().distinct_forward_arg {
            return Ok(tx.node("forward_args", vec![]));
        }
        let position = requireds.len() + optionals.len() + keywords.len();
        children.insert(position, tx.node("forward_arg", vec![]));
    }

    Ok(tx.node("args", children))
}

fn block_var<'t>(tx: &mut Translator<'t>, params: &'t Node, locals: &'t [Node]) -> R {
    let mut shadowargs = Vec::with_capacity(locals.len());
    for local in locals {
        let name = expect_name(local, "block_parameter_pipes")?;
        shadowargs.push(tx.node("shadowarg", vec![Element::sym(name)]));
    }

    if tx.config().collapse_single_block_param {
        if let Some(required) = single_required_param(params) {
            let procarg0 = if tx.config().arg_inside_collapsed_param
                && matches!(required.syntax, Syntax::Ident { .. })
            {
                let name = expect_name(required, "block_parameter_pipes")?;
                let arg = tx.node("arg", vec![Element::sym(name)]);
                tx.node("procarg0", vec![arg])
            } else {
                let inner = expect_node(
                    tx.translate(required)?,
                    required,
                    "collapsed block parameter",
                )?;
                tx.node("procarg0", inner.children)
            };
            let mut children = vec![procarg0];
            children.append(&mut shadowargs);
            return Ok(tx.node("args", children));
        }
    }

    let args = expect_node(tx.translate(params)?, params, "block parameters")?;
    let mut children = args.children;
    children.append(&mut shadowargs);
    Ok(tx.node("args", children))
}

/// The single required, undestructurable-or-destructured parameter eligible
/// for collapsing, when the list has nothing else in it.
fn single_required_param(params: &Node) -> Option<&Node> {
    let Syntax::Params {
        requireds,
        optionals,
        rest,
        posts,
        keywords,
        keyword_rest,
        block,
    } = &params.syntax
    else {
        return None;
    };

    if !optionals.is_empty()
        || rest.is_some()
        || !posts.is_empty()
        || !keywords.is_empty()
        || !matches!(keyword_rest, KeywordRest::None)
        || block.is_some()
    {
        return None;
    }
    match requireds.as_slice() {
        [required]
            if matches!(
                required.syntax,
                Syntax::Ident { .. } | Syntax::MLHSParen { .. }
            ) =>
        {
            Some(required)
        }
        _ => None,
    }
}

fn lambda<'t>(tx: &mut Translator<'t>, node: &'t Node, params: &'t Node, statements: &'t Node) -> R {
    let vars = match &params.syntax {
        Syntax::LambdaVar { .. } => params,
        Syntax::Paren { contents: Some(contents) } => contents,
        _ => return Err(malformed(node, "unexpected lambda parameter shape")),
    };

    let callee = if tx.config().lambda_literal_node {
        tx.node("lambda", vec![])
    } else {
        tx.node("send", vec![Element::Absent, Element::sym("lambda")])
    };

    if lambda_var_is_empty(vars) {
        if let Some(maximum) = implicit_arity(statements) {
            let body = tx.translate(statements)?;
            return Ok(tx.node("numblock", vec![callee, Element::Int(maximum), body]));
        }
    }

    let arguments = tx.translate(vars)?;
    let body = tx.translate(statements)?;
    Ok(tx.node("block", vec![callee, arguments, body]))
}

fn lambda_var_is_empty(vars: &Node) -> bool {
    let Syntax::LambdaVar { params, locals } = &vars.syntax else {
        return false;
    };
    if !locals.is_empty() {
        return false;
    }
    matches!(
        &params.syntax,
        Syntax::Params {
            requireds,
            optionals,
            rest,
            posts,
            keywords,
            keyword_rest,
            block,
        } if requireds.is_empty()
            && optionals.is_empty()
            && rest.is_none()
            && posts.is_empty()
            && keywords.is_empty()
            && matches!(keyword_rest, KeywordRest::None)
            && block.is_none()
    )
}

fn lambda_var<'t>(tx: &mut Translator<'t>, params: &'t Node, locals: &'t [Node]) -> R {
    let args = expect_node(tx.translate(params)?, params, "lambda parameters")?;
    let mut children = args.children;
    for local in locals {
        let name = expect_name(local, "lambda_parameter_pipes")?;
        children.push(tx.node("shadowarg", vec![Element::sym(name)]));
    }
    Ok(tx.node("args", children))
}

// ============================================================================
// PATTERN RULES
// ============================================================================

fn array_pattern<'t>(
    tx: &mut Translator<'t>,
    constant: &'t Option<Box<Node>>,
    requireds: &'t [Node],
    rest: &'t Option<Box<Node>>,
    posts: &'t [Node],
) -> R {
    let mut kind = "array_pattern";
    let mut children = tx.translate_all(requireds)?;

    match rest.as_deref() {
        Some(rest_node) => match &rest_node.syntax {
            Syntax::VarField { value: None } if rest_node.span.is_empty() && posts.is_empty() => {
                // An implicit trailing rest, as in `[foo,]`; the schema has
                // a dedicated kind for these.
                kind = "array_pattern_with_tail";
            }
            Syntax::VarField { value: None } => {
                children.push(tx.node("match_rest", vec![]));
            }
            Syntax::VarField { .. } => {
                let rest = tx.translate(rest_node)?;
                children.push(tx.node("match_rest", vec![rest]));
            }
            _ => {}
        },
        None => {}
    }

    children.extend(tx.translate_all(posts)?);
    let inner = tx.node(kind, children);
    wrap_const_pattern(tx, constant, inner)
}

fn hash_pattern<'t>(
    tx: &mut Translator<'t>,
    node: &'t Node,
    constant: &'t Option<Box<Node>>,
    keywords: &'t [(Node, Option<Node>)],
    keyword_rest: &'t Option<Box<Node>>,
) -> R {
    let mut children = Vec::with_capacity(keywords.len() + 1);
    for (keyword, value) in keywords {
        match value {
            Some(value) => {
                let keyword = tx.translate(keyword)?;
                let value = tx.translate(value)?;
                children.push(tx.node("pair", vec![keyword, value]));
            }
            None => match &keyword.syntax {
                Syntax::Label { value } => {
                    children.push(tx.node("match_var", vec![Element::sym(label_text(value))]));
                }
                Syntax::StringContent { parts } => match parts.as_slice() {
                    [part] => match &part.syntax {
                        Syntax::TextSegment { value } => {
                            children.push(tx.node("match_var", vec![Element::sym(value)]));
                        }
                        _ => return Err(malformed(node, "unexpected string-key pattern")),
                    },
                    _ => return Err(malformed(node, "unexpected string-key pattern")),
                },
                _ => return Err(malformed(node, "unexpected keyless pattern entry")),
            },
        }
    }

    match keyword_rest.as_deref() {
        Some(rest) => match &rest.syntax {
            Syntax::VarField { value: None } => children.push(tx.node("match_rest", vec![])),
            Syntax::VarField { value: Some(inner) }
                if matches!(&inner.syntax, Syntax::Kw { value } if value == "nil") =>
            {
                children.push(tx.node("match_nil_pattern", vec![]));
            }
            Syntax::VarField { .. } => {
                let rest = tx.translate(rest)?;
                children.push(tx.node("match_rest", vec![rest]));
            }
            _ => {}
        },
        None => {}
    }

    let inner = tx.node("hash_pattern", children);
    wrap_const_pattern(tx, constant, inner)
}

fn find_pattern<'t>(
    tx: &mut Translator<'t>,
    constant: &'t Option<Box<Node>>,
    left: &'t Node,
    values: &'t [Node],
    right: &'t Node,
) -> R {
    let edge = |tx: &mut Translator<'t>, side: &'t Node| -> R {
        match &side.syntax {
            Syntax::VarField { value: None } => Ok(tx.node("match_rest", vec![])),
            _ => {
                let side = tx.translate(side)?;
                Ok(tx.node("match_rest", vec![side]))
            }
        }
    };

    let mut children = vec![edge(tx, left)?];
    children.extend(tx.translate_all(values)?);
    children.push(edge(tx, right)?);

    let inner = tx.node("find_pattern", children);
    wrap_const_pattern(tx, constant, inner)
}

fn wrap_const_pattern<'t>(
    tx: &mut Translator<'t>,
    constant: &'t Option<Box<Node>>,
    inner: Element,
) -> R {
    match constant {
        Some(constant) => {
            let constant = tx.translate(constant)?;
            Ok(tx.node("const_pattern", vec![constant, inner]))
        }
        None => Ok(inner),
    }
}

// ============================================================================
// SHARED PLUMBING
// ============================================================================

fn malformed(node: &Node, message: impl Into<String>) -> TranslateError {
    TranslateError::malformed(node.kind_name(), node.span, message)
}

fn expect_node(
    element: Element,
    node: &Node,
    what: &str,
) -> Result<crate::target::TargetNode, TranslateError> {
    element.into_node().ok_or_else(|| {
        malformed(node, format!("{what} did not produce a node"))
    })
}
