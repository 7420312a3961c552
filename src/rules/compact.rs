//! Mapping rules for the compact (s-expression) schema.
//!
//! This schema predates most of the expanded vocabulary: literals collapse
//! into a generic `lit` node, every call is a `call`, and several parameter
//! forms are encoded as bare prefixed symbols rather than nodes. String
//! payloads stay as raw source text; this consumer never cooked escapes,
//! and faithful translation means not cooking them either.
//!
//! The schema also predates pattern-matching find patterns and pinned
//! expressions; those constructs have no analogue here and surface as
//! unsupported-construct errors naming the kind.

use crate::arity::implicit_arity;
use crate::diagnostics::TranslateError;
use crate::engine::Translator;
use crate::literals;
use crate::segments::{Collapsed, Segment, SegmentAccumulator};
use crate::source::{
    CallOperator, HeredocMarker, HeredocQuote, KeywordRest, Node, RangeOp, RescueEx, Syntax,
};
use crate::target::Element;

use super::helpers::{args_parts, expect_name, is_empty_statements, label_text};

type R = Result<Element, TranslateError>;

/// Resolves and runs the rule for `node`'s construct.
pub fn dispatch<'t>(tx: &mut Translator<'t>, node: &'t Node) -> R {
    match &node.syntax {
        // Scalars -------------------------------------------------------
        Syntax::IntLit { value } => {
            let parsed = parse_int(node, value)?;
            Ok(tx.node("lit", vec![Element::Int(parsed)]))
        }
        Syntax::FloatLit { value } => {
            let parsed = literals::parse_float(value).ok_or_else(|| {
                malformed(node, format!("unreadable float literal `{value}`"))
            })?;
            Ok(tx.node("lit", vec![Element::Float(parsed)]))
        }
        Syntax::RationalLit { value } => {
            let (numer, denom) = literals::parse_rational(value).ok_or_else(|| {
                malformed(node, format!("unreadable rational literal `{value}`"))
            })?;
            Ok(tx.node("lit", vec![Element::Rational { numer, denom }]))
        }
        Syntax::ImaginaryLit { value } => {
            let parsed = literals::parse_imaginary(value).ok_or_else(|| {
                malformed(node, format!("unreadable imaginary literal `{value}`"))
            })?;
            Ok(tx.node("lit", vec![parsed]))
        }
        Syntax::CharLit { value } => {
            let body = value.strip_prefix('?').unwrap_or(value);
            Ok(tx.node("str", vec![Element::str(body)]))
        }

        // String-like literals ------------------------------------------
        Syntax::StringLit { parts } => string_literal(tx, parts),
        Syntax::TextSegment { value } => Ok(Element::str(value)),
        Syntax::EmbExpr { statements } => {
            let statements = tx.translate(statements)?;
            Ok(tx.node("evstr", vec![statements]))
        }
        Syntax::EmbVar { variable } => tx.translate(variable),
        Syntax::StringContent { parts } => match parts.as_slice() {
            [part] => match &part.syntax {
                Syntax::TextSegment { value } => Ok(tx.node("lit", vec![Element::sym(value)])),
                _ => Err(malformed(node, "string content without a text part")),
            },
            _ => Err(malformed(node, "string content with multiple parts")),
        },
        Syntax::StringConcat { left, right } => string_concat(tx, left, right),
        Syntax::XString { parts } => execution_string(tx, parts),
        Syntax::Heredoc { marker, dedent, parts } => heredoc(tx, marker, dedent, parts),
        Syntax::SymbolLit { value } => Ok(tx.node("lit", vec![Element::sym(value)])),
        Syntax::DynaSymbol { parts } => dyna_symbol(tx, parts),
        Syntax::Label { value } => {
            let name = label_text(value);
            if matches!(tx.parent().map(|p| &p.syntax), Some(Syntax::Params { .. })) {
                Ok(Element::sym(name))
            } else {
                Ok(tx.node("lit", vec![Element::sym(name)]))
            }
        }
        Syntax::RegexpLit { parts, flags } => regexp(tx, parts, flags),
        Syntax::RangeNode { left, op, right } => {
            let kind = match op {
                RangeOp::Inclusive => "dot2",
                RangeOp::Exclusive => "dot3",
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
            let children = hash_children(tx, assocs)?;
            Ok(tx.node("hash", children))
        }
        Syntax::BareAssocHash { assocs } => {
            let children = hash_children(tx, assocs)?;
            Ok(tx.node("hash", children))
        }
        Syntax::QSymbols { elements } => {
            let children = elements
                .iter()
                .map(|element| match &element.syntax {
                    Syntax::TextSegment { value } => Ok(tx.node("lit", vec![Element::sym(value)])),
                    _ => Err(malformed(element, "symbol array holds non-text element")),
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(tx.node("array", children))
        }
        Syntax::QWords { elements } | Syntax::Words { elements } | Syntax::Symbols { elements } => {
            let children = tx.translate_all(elements)?;
            Ok(tx.node("array", children))
        }
        Syntax::Word { parts } => word(tx, node, parts),

        // Names and variables -------------------------------------------
        Syntax::Ident { value } => Ok(Element::sym(value)),
        Syntax::IVar { value } => Ok(tx.node("ivar", vec![Element::sym(value)])),
        Syntax::CVar { value } => Ok(tx.node("cvar", vec![Element::sym(value)])),
        Syntax::GVar { value } => Ok(Element::sym(value)),
        Syntax::Backref { value } => Ok(Element::sym(value)),
        Syntax::Const { value } => Ok(tx.node("const", vec![Element::sym(value)])),
        Syntax::Kw { value } => keyword(tx, node, value),
        Syntax::Op { value } => Ok(Element::sym(value)),
        Syntax::VarRef { value } => tx.translate(value),
        Syntax::VarField { value } => var_field(tx, node, value),
        Syntax::VCall { value } => {
            let name = expect_name(value, "vcall")?;
            Ok(tx.node("call", vec![Element::Absent, Element::sym(name)]))
        }
        Syntax::ConstRef { constant } => Ok(Element::sym(expect_name(constant, "constant_reference")?)),
        Syntax::ConstPathRef { parent, constant } => {
            let name = expect_name(constant, "constant_path")?.to_string();
            let parent = tx.translate(parent)?;
            Ok(tx.node("colon2", vec![parent, Element::Sym(name)]))
        }
        Syntax::ConstPathField { parent, constant } => {
            let name = expect_name(constant, "constant_path_field")?.to_string();
            let parent = tx.translate(parent)?;
            Ok(tx.node("colon2", vec![parent, Element::Sym(name)]))
        }
        Syntax::TopConstRef { constant } => {
            let name = expect_name(constant, "top_constant_path")?;
            Ok(tx.node("colon3", vec![Element::sym(name)]))
        }
        Syntax::TopConstField { constant } => {
            let name = expect_name(constant, "top_constant_field")?;
            Ok(tx.node("colon3", vec![Element::sym(name)]))
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
        Syntax::BlockNode { .. } => Err(malformed(node, "block body outside a call position")),
        Syntax::ArgParen { .. } => Err(malformed(node, "argument paren outside a call position")),
        Syntax::Args { parts } => {
            let children = tx.translate_all(parts)?;
            Ok(tx.node("args", children))
        }
        Syntax::ArgStar { value } => match value.as_deref() {
            None => Ok(Element::sym("*")),
            Some(inner) => match &inner.syntax {
                Syntax::Ident { value } => Ok(Element::Sym(format!("*{value}"))),
                _ => {
                    let inner = tx.translate(inner)?;
                    Ok(tx.node("splat", vec![inner]))
                }
            },
        },
        Syntax::ArgBlock { value } => match value {
            Some(value) => {
                let value = tx.translate(value)?;
                Ok(tx.node("block_pass", vec![value]))
            }
            None => Ok(tx.node("block_pass", vec![])),
        },
        Syntax::ArgsForward => Ok(tx.node("forwarded_args", vec![])),
        Syntax::Assoc { .. } | Syntax::AssocSplat { .. } => Err(malformed(
            node,
            "association outside a hash container",
        )),
        Syntax::Super { arguments } => superclass_call(tx, arguments),
        Syntax::ZSuper => Ok(tx.node("zsuper", vec![])),
        Syntax::YieldNode { arguments } => yield_call(tx, node, arguments),
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
            Ok(tx.node("defined", vec![value]))
        }

        // Operators and assignment --------------------------------------
        Syntax::Unary { operator, statement } => unary(tx, operator, statement),
        Syntax::Binary { left, operator, right } => binary(tx, left, operator, right),
        Syntax::Not { statement } => {
            let receiver = tx.translate_opt(statement)?;
            Ok(tx.node("call", vec![receiver, Element::sym("!")]))
        }
        Syntax::Assign { target, value } => {
            let target = expect_target(tx.translate(target)?, node)?;
            let value = tx.translate(value)?;
            let mut children = target.children;
            children.push(value);
            Ok(tx.node(target.kind, children))
        }
        Syntax::OpAssign { target, operator, value } => {
            let target = tx.translate(target)?;
            let value = tx.translate(value)?;
            match operator.as_str() {
                "||=" => Ok(tx.node("op_asgn_or", vec![target, value])),
                "&&=" => Ok(tx.node("op_asgn_and", vec![target, value])),
                other => {
                    let op = other.strip_suffix('=').unwrap_or(other);
                    Ok(tx.node("op_asgn", vec![target, Element::sym(op), value]))
                }
            }
        }
        Syntax::MAssign { target, value } => {
            let target = tx.translate(target)?;
            let array = tx.node("array", vec![target]);
            let value = tx.translate(value)?;
            let to_ary = tx.node("to_ary", vec![value]);
            Ok(tx.node("masgn", vec![array, to_ary]))
        }
        Syntax::MLHS { parts } => {
            let children = tx.translate_all(parts)?;
            Ok(tx.node("masgn", children))
        }
        Syntax::MLHSParen { contents } => tx.translate(contents),
        Syntax::MRHS { parts } => {
            let children = tx.translate_all(parts)?;
            let array = tx.node("array", children);
            Ok(tx.node("svalue", vec![array]))
        }
        Syntax::Field { parent, name, .. } => {
            let name = expect_name(name, "field")?;
            let parent = tx.translate(parent)?;
            Ok(tx.node("attrasgn", vec![parent, Element::Sym(format!("{name}="))]))
        }
        Syntax::ARef { collection, index } => {
            let collection = tx.translate(collection)?;
            let mut children = vec![collection, Element::sym("[]")];
            if let Some(index) = index {
                let parts = args_parts(index, "index_read")?;
                children.extend(tx.translate_all(parts)?);
            }
            Ok(tx.node("call", children))
        }
        Syntax::ARefField { collection, index } => {
            let collection = tx.translate(collection)?;
            let mut children = vec![collection, Element::sym("[]=")];
            if let Some(index) = index {
                let parts = args_parts(index, "index_field")?;
                children.extend(tx.translate_all(parts)?);
            }
            Ok(tx.node("attrasgn", children))
        }

        // Control flow ---------------------------------------------------
        Syntax::IfNode { predicate, statements, consequent } => {
            let predicate = tx.translate(predicate)?;
            let statements = clause_body(tx, statements)?;
            let consequent = tx.translate_opt(consequent)?;
            Ok(tx.node("if", vec![predicate, statements, consequent]))
        }
        Syntax::UnlessNode { predicate, statements, consequent } => {
            let predicate = tx.translate(predicate)?;
            let statements = tx.translate(statements)?;
            let consequent = tx.translate_opt(consequent)?;
            Ok(tx.node("unless", vec![predicate, statements, consequent]))
        }
        Syntax::Elsif { predicate, statements, consequent } => {
            let predicate = tx.translate(predicate)?;
            let statements = clause_body(tx, statements)?;
            let consequent = tx.translate_opt(consequent)?;
            Ok(tx.node("if", vec![predicate, statements, consequent]))
        }
        Syntax::Else { statements } => tx.translate(statements),
        Syntax::IfOp { predicate, truthy, falsy } => {
            let predicate = tx.translate(predicate)?;
            let truthy = tx.translate(truthy)?;
            let falsy = tx.translate(falsy)?;
            Ok(tx.node("if", vec![predicate, truthy, falsy]))
        }
        Syntax::WhileNode { predicate, statements, .. } => {
            let predicate = tx.translate(predicate)?;
            let statements = tx.translate(statements)?;
            Ok(tx.node("while", vec![predicate, statements, Element::Bool(true)]))
        }
        Syntax::UntilNode { predicate, statements, .. } => {
            let predicate = tx.translate(predicate)?;
            let statements = tx.translate(statements)?;
            Ok(tx.node("until", vec![predicate, statements, Element::Bool(true)]))
        }
        Syntax::For { index, collection, statements } => {
            let collection = tx.translate(collection)?;
            let index = tx.translate(index)?;
            let statements = tx.translate(statements)?;
            Ok(tx.node("for", vec![collection, index, statements]))
        }
        Syntax::Case { value, consequent } => case(tx, value, consequent),
        Syntax::When { arguments, statements, .. } => {
            let parts = args_parts(arguments, "when_clause")?;
            let children = tx.translate_all(parts)?;
            let cases = tx.node("array", children);
            let statements = clause_body(tx, statements)?;
            Ok(tx.node("when", vec![cases, statements]))
        }
        Syntax::In { pattern, statements, .. } => {
            let pattern = tx.translate(pattern)?;
            let statements = tx.translate(statements)?;
            Ok(tx.node("in", vec![pattern, statements]))
        }
        Syntax::Begin { bodystmt } => tx.translate(bodystmt),
        Syntax::BodyStmt { statements, rescue_clause, else_clause, ensure_clause } => {
            body_statement(tx, statements, rescue_clause, else_clause, ensure_clause)
        }
        Syntax::Rescue { exception, statements, .. } => resbody(tx, exception, statements),
        Syntax::Ensure { statements } => tx.translate(statements),
        Syntax::RescueMod { statement, value } => {
            let statement = tx.translate(statement)?;
            let array = tx.node("array", vec![]);
            let value = tx.translate(value)?;
            let resbody = tx.node("resbody", vec![array, value]);
            Ok(tx.node("rescue", vec![statement, resbody]))
        }

        // Definitions ----------------------------------------------------
        Syntax::Def { target, name, params, bodystmt } => def(tx, target, name, params, bodystmt),
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
            let kind = if is_var_alias(left) { "valias" } else { "alias" };
            let left = tx.translate(left)?;
            let right = tx.translate(right)?;
            Ok(tx.node(kind, vec![left, right]))
        }
        Syntax::Undef { symbols } => {
            let children = tx.translate_all(symbols)?;
            Ok(tx.node("undef", children))
        }
        Syntax::BEGINBlock { statements } => {
            let marker = tx.node("preexe", vec![]);
            let statements = tx.translate(statements)?;
            Ok(tx.node("iter", vec![marker, Element::Int(0), statements]))
        }
        Syntax::ENDBlock { statements } => {
            let marker = tx.node("postexe", vec![]);
            let statements = tx.translate(statements)?;
            Ok(tx.node("iter", vec![marker, Element::Int(0), statements]))
        }
        Syntax::Program { statements } => tx.translate(statements),
        Syntax::Statements { body } => statements(tx, body),
        Syntax::VoidStmt | Syntax::Comment { .. } => Ok(Element::Absent),
        Syntax::Paren { contents } => tx.translate_opt(contents),

        // Parameters and blocks -----------------------------------------
        Syntax::Params { .. } => params(tx, node),
        Syntax::RestParam { name } => Ok(prefixed_param("*", name)?),
        Syntax::KwRestParam { name } => Ok(prefixed_param("**", name)?),
        Syntax::BlockArg { name } => Ok(prefixed_param("&", name)?),
        Syntax::ExcessedComma => Err(malformed(node, "dangling comma outside a parameter list")),
        Syntax::BlockVar { params, locals } => block_var(tx, params, locals),
        Syntax::Lambda { params, statements } => lambda(tx, params, statements),
        Syntax::LambdaVar { params, locals } => lambda_var(tx, params, locals),

        // Patterns -------------------------------------------------------
        Syntax::AryPtn { constant, requireds, rest, posts } => {
            let mut children = vec![tx.translate_opt(constant)?];
            children.extend(tx.translate_all(requireds)?);
            if let Some(rest) = rest {
                children.push(tx.translate(rest)?);
            }
            children.extend(tx.translate_all(posts)?);
            Ok(tx.node("array_pat", children))
        }
        Syntax::HshPtn { constant, keywords, keyword_rest } => {
            let mut children = vec![tx.translate_opt(constant)?];
            for (keyword, value) in keywords {
                children.push(tx.translate(keyword)?);
                match value {
                    Some(value) => children.push(tx.translate(value)?),
                    None => children.push(Element::Absent),
                }
            }
            if let Some(keyword_rest) = keyword_rest {
                children.push(tx.translate(keyword_rest)?);
            }
            Ok(tx.node("hash_pat", children))
        }
        Syntax::RAssign { value, pattern, .. } => {
            let value = tx.translate(value)?;
            let pattern = tx.translate(pattern)?;
            let in_clause = tx.node("in", vec![pattern, Element::Absent]);
            Ok(tx.node("case", vec![value, in_clause, Element::Absent]))
        }

        // This schema predates these constructs entirely.
        Syntax::FndPtn { .. } | Syntax::PinnedBegin { .. } | Syntax::PinnedVarRef { .. } => Err(
            TranslateError::unsupported(node.kind_name(), tx.backend_name(), node.span),
        ),
    }
}

// ============================================================================
// LITERAL RULES
// ============================================================================

fn parse_int(node: &Node, value: &str) -> Result<i64, TranslateError> {
    literals::parse_integer(value)
        .ok_or_else(|| malformed(node, format!("unreadable integer literal `{value}`")))
}

/// Compact string literals interleave raw text pieces with translated
/// segments; adjacent text (including text produced by a static
/// interpolation) concatenates into the preceding piece.
fn string_literal<'t>(tx: &mut Translator<'t>, parts: &'t [Node]) -> R {
    let mut pieces: Vec<Element> = vec![Element::str("")];

    for part in parts {
        if let Some(Element::Str(last)) = pieces.last_mut() {
            match &part.syntax {
                Syntax::TextSegment { value } => {
                    last.push_str(value);
                    continue;
                }
                Syntax::EmbExpr { statements } => {
                    if let Some(text) = static_interpolation(statements) {
                        last.push_str(text);
                        continue;
                    }
                }
                _ => {}
            }
        }
        pieces.push(tx.translate(part)?);
    }

    if pieces.len() == 1 {
        if let Some(Element::Str(text)) = pieces.pop() {
            return Ok(tx.node("str", vec![Element::Str(text)]));
        }
        return Ok(tx.node("str", vec![Element::str("")]));
    }
    Ok(tx.node("dstr", pieces))
}

/// The text of an interpolation that holds nothing but one static string.
fn static_interpolation(statements: &Node) -> Option<&str> {
    let Syntax::Statements { body } = &statements.syntax else {
        return None;
    };
    let [single] = body.as_slice() else {
        return None;
    };
    let Syntax::StringLit { parts } = &single.syntax else {
        return None;
    };
    let [part] = parts.as_slice() else {
        return None;
    };
    match &part.syntax {
        Syntax::TextSegment { value } => Some(value),
        _ => None,
    }
}

fn string_concat<'t>(tx: &mut Translator<'t>, left: &'t Node, right: &'t Node) -> R {
    let left = tx.translate(left)?;
    let right = tx.translate(right)?;

    // Juxtaposed static strings fuse into one literal.
    if let (Element::Node(l), Element::Node(r)) = (&left, &right) {
        if l.kind == "str" && r.kind == "str" {
            if let (Some(Element::Str(lt)), Some(Element::Str(rt))) =
                (l.children.first(), r.children.first())
            {
                return Ok(tx.node("str", vec![Element::Str(format!("{lt}{rt}"))]));
            }
        }
    }
    Ok(tx.node("dstr", vec![Element::str(""), left, right]))
}

fn dyna_symbol<'t>(tx: &mut Translator<'t>, parts: &'t [Node]) -> R {
    match parts {
        [] => Ok(tx.node("lit", vec![Element::sym("")])),
        [part] if matches!(part.syntax, Syntax::TextSegment { .. }) => {
            let Syntax::TextSegment { value } = &part.syntax else {
                return Err(malformed(part, "text segment expected"));
            };
            Ok(tx.node("lit", vec![Element::sym(value)]))
        }
        [first, rest @ ..] if matches!(first.syntax, Syntax::EmbExpr { .. }) => {
            let mut children = vec![Element::str("")];
            children.push(tx.translate(first)?);
            children.extend(tx.translate_all(rest)?);
            Ok(tx.node("dsym", children))
        }
        _ => {
            let children = tx.translate_all(parts)?;
            Ok(tx.node("dsym", children))
        }
    }
}

fn execution_string<'t>(tx: &mut Translator<'t>, parts: &'t [Node]) -> R {
    match parts {
        [first, rest @ ..] if matches!(first.syntax, Syntax::EmbExpr { .. }) => {
            let mut children = vec![Element::str("")];
            children.push(tx.translate(first)?);
            children.extend(tx.translate_all(rest)?);
            Ok(tx.node("dxstr", children))
        }
        _ => {
            let children = tx.translate_all(parts)?;
            Ok(tx.node("dxstr", children))
        }
    }
}

fn regexp<'t>(tx: &mut Translator<'t>, parts: &'t [Node], flags: &str) -> R {
    let mut options: Vec<char> = flags.chars().filter(char::is_ascii_lowercase).collect();
    options.sort_unstable();
    let options: String = options.into_iter().collect();

    let all_text = parts
        .iter()
        .all(|part| matches!(part.syntax, Syntax::TextSegment { .. }));
    if all_text {
        let source: String = parts
            .iter()
            .filter_map(|part| match &part.syntax {
                Syntax::TextSegment { value } => Some(value.as_str()),
                _ => None,
            })
            .collect();
        let mut children = vec![Element::Str(source)];
        if !options.is_empty() {
            children.push(Element::Sym(options));
        }
        return Ok(tx.node("regexp", children));
    }

    let mut children = vec![Element::str("")];
    children.extend(tx.translate_all(parts)?);
    if !options.is_empty() {
        children.push(Element::Sym(options));
    }
    Ok(tx.node("dregx", children))
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
            Syntax::TextSegment { value } => acc.push_block_text(value),
            _ => acc.push_embedded(tx.translate(part)?),
        }
    }

    if marker.squiggly {
        acc.strip_indentation(*dedent, marker.quote != HeredocQuote::Single);
    }

    if marker.quote == HeredocQuote::Backtick {
        return Ok(command_segments(tx, acc.into_segments()));
    }

    match acc.collapse() {
        Collapsed::Empty => Ok(tx.node("str", vec![Element::str("")])),
        Collapsed::Single(text) => Ok(tx.node("str", vec![Element::Str(text)])),
        Collapsed::Multi(segments) => {
            let mut segments = segments.into_iter();
            let mut children = match segments.next() {
                Some(Segment::Text(text)) => vec![Element::Str(text)],
                Some(Segment::Embedded(element)) => vec![Element::str(""), element],
                None => vec![Element::str("")],
            };
            for segment in segments {
                children.push(match segment {
                    Segment::Text(text) => tx.node("str", vec![Element::Str(text)]),
                    Segment::Embedded(element) => element,
                });
            }
            Ok(tx.node("dstr", children))
        }
    }
}

/// Shell-command heredocs wrap their segments regardless of count.
fn command_segments(tx: &Translator<'_>, segments: Vec<Segment>) -> Element {
    let mut segments = segments.into_iter();
    match (segments.next(), segments.len()) {
        (None, _) => tx.node("xstr", vec![Element::str("")]),
        (Some(Segment::Text(text)), 0) => tx.node("xstr", vec![Element::Str(text)]),
        (Some(first), _) => {
            let mut children = match first {
                Segment::Text(text) => vec![Element::Str(text)],
                Segment::Embedded(element) => vec![Element::str(""), element],
            };
            for segment in segments {
                children.push(match segment {
                    Segment::Text(text) => tx.node("str", vec![Element::Str(text)]),
                    Segment::Embedded(element) => element,
                });
            }
            tx.node("dxstr", children)
        }
    }
}

fn word<'t>(tx: &mut Translator<'t>, node: &'t Node, parts: &'t [Node]) -> R {
    let symbolic = matches!(tx.parent().map(|p| &p.syntax), Some(Syntax::Symbols { .. }));
    if !symbolic
        && !matches!(tx.parent().map(|p| &p.syntax), Some(Syntax::Words { .. }))
    {
        return Err(malformed(node, "word outside a word-array literal"));
    }

    match parts {
        [part] if matches!(part.syntax, Syntax::TextSegment { .. }) => {
            let Syntax::TextSegment { value } = &part.syntax else {
                return Err(malformed(part, "text segment expected"));
            };
            if symbolic {
                Ok(tx.node("lit", vec![Element::sym(value)]))
            } else {
                Ok(tx.node("str", vec![Element::str(value)]))
            }
        }
        [first, rest @ ..] if matches!(first.syntax, Syntax::EmbExpr { .. }) => {
            let kind = if symbolic { "dsym" } else { "dstr" };
            let mut children = vec![Element::str("")];
            children.push(tx.translate(first)?);
            children.extend(tx.translate_all(rest)?);
            Ok(tx.node(kind, children))
        }
        _ => {
            let kind = if symbolic { "dsym" } else { "dstr" };
            let children = tx.translate_all(parts)?;
            Ok(tx.node(kind, children))
        }
    }
}

fn keyword<'t>(tx: &mut Translator<'t>, node: &'t Node, value: &'t str) -> R {
    match value {
        "nil" => Ok(tx.node("nil", vec![])),
        "true" => Ok(tx.node("true", vec![])),
        "false" => Ok(tx.node("false", vec![])),
        "self" => Ok(tx.node("self", vec![])),
        "__FILE__" => {
            let name = tx.file().name.clone();
            Ok(tx.node("str", vec![Element::Str(name)]))
        }
        "__LINE__" => {
            let line = (node.span.line + tx.file().first_line).saturating_sub(1);
            Ok(tx.node("lit", vec![Element::Int(line as i64)]))
        }
        "__ENCODING__" => {
            let scope = tx.node("const", vec![Element::sym("Encoding")]);
            Ok(tx.node("colon2", vec![scope, Element::sym("UTF_8")]))
        }
        other => Err(malformed(node, format!("unexpected keyword `{other}`"))),
    }
}

// ============================================================================
// CALL RULES
// ============================================================================

fn call_kind(operator: &Option<CallOperator>) -> &'static str {
    match operator {
        Some(CallOperator::SafeNav) => "safe_call",
        _ => "call",
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
    let kind = call_kind(operator);

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
            Ok(tx.node("call", children))
        }
        (Some(receiver), None) => {
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
    let call = tx.node("call", children);

    match block {
        Some(block) => iter_block(tx, call, block),
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
    let message = tx.translate(message)?;
    let receiver_el = tx.translate(receiver)?;
    let mut children = vec![receiver_el, message];
    match arguments.as_deref().map(|a| &a.syntax) {
        None => {}
        Some(Syntax::Args { parts }) => children.extend(tx.translate_all(parts)?),
        Some(Syntax::ArgParen { arguments: Some(inner) }) => {
            let parts = args_parts(inner, "command_call")?;
            children.extend(tx.translate_all(parts)?);
        }
        Some(Syntax::ArgParen { arguments: None }) => {}
        Some(_) => return Err(malformed(receiver, "unexpected command argument shape")),
    }

    let kind = call_kind(&Some(*operator));
    let call = tx.node(kind, children);
    match block {
        Some(block) => iter_block(tx, call, block),
        None => Ok(call),
    }
}

fn method_add_block<'t>(
    tx: &mut Translator<'t>,
    node: &'t Node,
    call: &'t Node,
    block: &'t Node,
) -> R {
    if matches!(
        call.syntax,
        Syntax::Break { .. }
            | Syntax::Next { .. }
            | Syntax::ReturnNode { .. }
            | Syntax::YieldNode { .. }
    ) {
        let call = match tx.translate(call)? {
            Element::Node(node) => node,
            _ => return Err(malformed(node, "jump with block did not produce a node")),
        };
        let iter = iter_block_children(tx, block, call.children)?;
        return Ok(tx.node(call.kind, vec![iter]));
    }

    let call = tx.translate(call)?;
    let iter = iter_block_children(tx, block, vec![call])?;
    Ok(iter)
}

/// Wraps an already-built call in the schema's block-iteration node.
fn iter_block<'t>(tx: &mut Translator<'t>, call: Element, block: &'t Node) -> R {
    iter_block_children(tx, block, vec![call])
}

fn iter_block_children<'t>(
    tx: &mut Translator<'t>,
    block: &'t Node,
    mut children: Vec<Element>,
) -> R {
    let Syntax::BlockNode { block_var, bodystmt } = &block.syntax else {
        return Err(malformed(block, "expected a block body"));
    };

    if block_var.is_none() {
        if let Some(maximum) = implicit_arity(bodystmt) {
            children.push(Element::Int(maximum));
            if !body_is_empty(bodystmt) {
                children.push(tx.translate(bodystmt)?);
            }
            return Ok(tx.node("iter", children));
        }
    }

    children.push(tx.translate_opt(block_var)?);
    if !body_is_empty(bodystmt) {
        children.push(tx.translate(bodystmt)?);
    }
    Ok(tx.node("iter", children))
}

fn body_is_empty(bodystmt: &Node) -> bool {
    match &bodystmt.syntax {
        Syntax::BodyStmt { statements, rescue_clause, else_clause, ensure_clause } => {
            rescue_clause.is_none()
                && else_clause.is_none()
                && ensure_clause.is_none()
                && is_empty_statements(statements)
        }
        _ => is_empty_statements(bodystmt),
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

fn yield_call<'t>(tx: &mut Translator<'t>, node: &'t Node, arguments: &'t Option<Box<Node>>) -> R {
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
        _ => Err(malformed(node, "unexpected yield argument shape")),
    }
}

// ============================================================================
// OPERATOR AND ASSIGNMENT RULES
// ============================================================================

fn unary<'t>(tx: &mut Translator<'t>, operator: &'t str, statement: &'t Node) -> R {
    match (operator, &statement.syntax) {
        // Unary plus is always a send in this schema, literals included.
        ("+", _) => {
            let receiver = tx.translate(statement)?;
            Ok(tx.node("call", vec![receiver, Element::sym("+@")]))
        }
        ("-", Syntax::FloatLit { value }) => {
            let parsed = literals::parse_float(value).ok_or_else(|| {
                malformed(statement, format!("unreadable float literal `{value}`"))
            })?;
            Ok(tx.node("lit", vec![Element::Float(-parsed)]))
        }
        ("-", Syntax::IntLit { value }) => {
            let parsed = parse_int(statement, value)?;
            Ok(tx.node("lit", vec![Element::Int(-parsed)]))
        }
        ("-", _) => {
            let receiver = tx.translate(statement)?;
            Ok(tx.node("call", vec![receiver, Element::sym("-@")]))
        }
        (other, _) => {
            let receiver = tx.translate(statement)?;
            Ok(tx.node("call", vec![receiver, Element::sym(other)]))
        }
    }
}

fn binary<'t>(tx: &mut Translator<'t>, left: &'t Node, operator: &'t str, right: &'t Node) -> R {
    match operator {
        "and" | "&&" => {
            let left = tx.translate(left)?;
            let right = tx.translate(right)?;
            Ok(tx.node("and", vec![left, right]))
        }
        "or" | "||" => {
            let left = tx.translate(left)?;
            let right = tx.translate(right)?;
            Ok(tx.node("or", vec![left, right]))
        }
        "!~" => {
            let left = tx.translate(left)?;
            let right = tx.translate(right)?;
            let matched = tx.node("call", vec![left, Element::sym("=~"), right]);
            Ok(tx.node("not", vec![matched]))
        }
        other => {
            let left = tx.translate(left)?;
            let right = tx.translate(right)?;
            Ok(tx.node("call", vec![left, Element::sym(other), right]))
        }
    }
}

fn var_field<'t>(tx: &mut Translator<'t>, node: &'t Node, value: &'t Option<Box<Node>>) -> R {
    match value.as_deref().map(|v| &v.syntax) {
        Some(Syntax::Const { value }) => Ok(tx.node(
            "casgn",
            vec![Element::Absent, Element::sym(value)],
        )),
        Some(Syntax::CVar { value }) => Ok(tx.node("cvasgn", vec![Element::sym(value)])),
        Some(Syntax::GVar { value }) => Ok(tx.node("gasgn", vec![Element::sym(value)])),
        Some(Syntax::Ident { value }) => Ok(tx.node("lasgn", vec![Element::sym(value)])),
        Some(Syntax::IVar { value }) => Ok(tx.node("iasgn", vec![Element::sym(value)])),
        Some(Syntax::Kw { value }) if value == "nil" => {
            Ok(tx.node("kwrest", vec![Element::sym("**nil")]))
        }
        Some(Syntax::VarRef { value }) => {
            let name = expect_name(value, "variable_field")?;
            Ok(tx.node("lasgn", vec![Element::sym(name)]))
        }
        None => Ok(Element::sym("*")),
        Some(_) => Err(malformed(node, "unexpected variable-field target")),
    }
}

fn is_var_alias(left: &Node) -> bool {
    match &left.syntax {
        Syntax::GVar { .. } | Syntax::Backref { .. } => true,
        Syntax::VarRef { value } => {
            matches!(value.syntax, Syntax::GVar { .. } | Syntax::Backref { .. })
        }
        _ => false,
    }
}

// ============================================================================
// CONTROL-FLOW RULES
// ============================================================================

/// Clause bodies elide when empty instead of producing the nil node a bare
/// empty statement list becomes.
fn clause_body<'t>(tx: &mut Translator<'t>, statements: &'t Node) -> R {
    if is_empty_statements(statements) {
        Ok(Element::Absent)
    } else {
        tx.translate(statements)
    }
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

    let mut children = vec![tx.translate_opt(value)?];
    let chain_has_else = clauses
        .last()
        .is_some_and(|clause| matches!(clause.syntax, Syntax::Else { .. }));
    for clause in clauses {
        children.push(tx.translate(clause)?);
    }
    if !chain_has_else {
        children.push(Element::Absent);
    }
    Ok(tx.node("case", children))
}

fn body_statement<'t>(
    tx: &mut Translator<'t>,
    statements: &'t Node,
    rescue_clause: &'t Option<Box<Node>>,
    else_clause: &'t Option<Box<Node>>,
    ensure_clause: &'t Option<Box<Node>>,
) -> R {
    let mut inner = tx.translate(statements)?;

    if rescue_clause.is_some() {
        let mut children = vec![inner];
        let mut cursor = rescue_clause.as_deref();
        while let Some(clause) = cursor {
            children.push(tx.translate(clause)?);
            cursor = match &clause.syntax {
                Syntax::Rescue { consequent, .. } => consequent.as_deref(),
                _ => None,
            };
        }
        if let Some(else_clause) = else_clause {
            children.push(tx.translate(else_clause)?);
        }
        inner = tx.node("rescue", children);
    }

    if let Some(ensure_clause) = ensure_clause {
        let Syntax::Ensure { statements } = &ensure_clause.syntax else {
            return Err(malformed(ensure_clause, "expected an ensure clause"));
        };
        let ensured = tx.translate(statements)?;
        inner = tx.node("ensure", vec![inner, ensured]);
    }

    Ok(inner)
}

/// One rescue clause as the schema's handler node: the exception list array
/// (with the capture folded in as an assignment of the error global) and the
/// handler body.
fn resbody<'t>(
    tx: &mut Translator<'t>,
    exception: &'t Option<RescueEx>,
    statements: &'t Node,
) -> R {
    let mut array_children = Vec::new();
    if let Some(RescueEx { exceptions: Some(listed), .. }) = exception {
        match &listed.syntax {
            Syntax::MRHS { parts } => array_children.extend(tx.translate_all(parts)?),
            _ => array_children.push(tx.translate(listed)?),
        }
    }
    if let Some(RescueEx { variable: Some(variable), .. }) = exception {
        let target = match tx.translate(variable)? {
            Element::Node(node) => node,
            _ => return Err(malformed(variable, "capture did not produce a node")),
        };
        let error = tx.node("gvar", vec![Element::sym("$!")]);
        let mut children = target.children;
        children.push(error);
        array_children.push(tx.node(target.kind, children));
    }

    let array = tx.node("array", array_children);
    let body = tx.translate(statements)?;
    Ok(tx.node("resbody", vec![array, body]))
}

fn statements<'t>(tx: &mut Translator<'t>, body: &'t [Node]) -> R {
    let real: Vec<&'t Node> = body
        .iter()
        .filter(|node| !matches!(node.syntax, Syntax::VoidStmt | Syntax::Comment { .. }))
        .collect();

    if real.is_empty() {
        return Ok(tx.node("nil", vec![]));
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
    Ok(tx.node("block", children))
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
            let target = match &target.syntax {
                Syntax::Paren { contents: Some(contents) } => contents,
                _ => target,
            };
            let target = tx.translate(target)?;
            Ok(tx.node("defs", vec![target, name, args, body]))
        }
        None => Ok(tx.node("defn", vec![name, args, body])),
    }
}

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
    children.extend(tx.translate_all(requireds)?);

    for (name, value) in optionals {
        let name = tx.translate(name)?;
        let value = tx.translate(value)?;
        children.push(tx.node("lasgn", vec![name, value]));
    }

    if let Some(rest) = rest {
        if !matches!(rest.syntax, Syntax::ExcessedComma) {
            children.push(tx.translate(rest)?);
        }
    }

    children.extend(tx.translate_all(posts)?);

    for (name, value) in keywords {
        let mut kwarg = vec![tx.translate(name)?];
        if let Some(value) = value {
            kwarg.push(tx.translate(value)?);
        }
        children.push(tx.node("kwarg", kwarg));
    }

    match keyword_rest {
        KeywordRest::None => {}
        KeywordRest::Nil => children.push(Element::sym("**nil")),
        KeywordRest::Forward => children.push(Element::sym("...")),
        KeywordRest::Param(param) => children.push(tx.translate(param)?),
    }

    if let Some(block) = block {
        children.push(tx.translate(block)?);
    }

    Ok(tx.node("args", children))
}

fn prefixed_param(
    prefix: &str,
    name: &Option<Box<Node>>,
) -> Result<Element, TranslateError> {
    match name {
        Some(name) => {
            let text = expect_name(name, "parameters")?;
            Ok(Element::Sym(format!("{prefix}{text}")))
        }
        None => Ok(Element::sym(prefix)),
    }
}

fn block_var<'t>(tx: &mut Translator<'t>, params: &'t Node, locals: &'t [Node]) -> R {
    let args = match tx.translate(params)? {
        Element::Node(node) => node,
        _ => return Err(malformed(params, "block parameters did not produce a node")),
    };
    let mut children = args.children;

    if !locals.is_empty() {
        let mut shadowed = Vec::with_capacity(locals.len());
        for local in locals {
            shadowed.push(tx.translate(local)?);
        }
        children.push(tx.node("shadow", shadowed));
    }
    Ok(tx.node(args.kind, children))
}

fn lambda<'t>(tx: &mut Translator<'t>, params: &'t Node, statements: &'t Node) -> R {
    let mut children = vec![tx.node("lambda", vec![])];

    match &params.syntax {
        Syntax::Paren { contents: Some(contents) } if lambda_var_is_empty(contents) => {
            children.push(tx.node("args", vec![]));
        }
        Syntax::LambdaVar { .. } if lambda_var_is_empty(params) => {
            children.push(Element::Int(0));
        }
        _ => children.push(tx.translate(params)?),
    }

    if !is_empty_statements(statements) {
        children.push(tx.translate(statements)?);
    }
    Ok(tx.node("iter", children))
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
    let args = match tx.translate(params)? {
        Element::Node(node) => node,
        _ => return Err(malformed(params, "lambda parameters did not produce a node")),
    };
    let mut children = args.children;
    for local in locals {
        let name = expect_name(local, "lambda_parameter_pipes")?;
        children.push(tx.node("shadow", vec![Element::sym(name)]));
    }
    Ok(tx.node("args", children))
}

// ============================================================================
// HASH PLUMBING
// ============================================================================

/// Hashes flatten their associations into alternating key/value children;
/// splats contribute a single wrapped child.
fn hash_children<'t>(
    tx: &mut Translator<'t>,
    assocs: &'t [Node],
) -> Result<Vec<Element>, TranslateError> {
    let mut children = Vec::with_capacity(assocs.len() * 2);
    for assoc in assocs {
        match &assoc.syntax {
            Syntax::Assoc { key, value } => {
                children.push(tx.translate(key)?);
                match value {
                    Some(value) => children.push(tx.translate(value)?),
                    None => children.push(shorthand_value(tx, key)?),
                }
            }
            Syntax::AssocSplat { value } => {
                let value = tx.translate(value)?;
                children.push(tx.node("kwsplat", vec![value]));
            }
            _ => return Err(malformed(assoc, "unexpected hash entry")),
        }
    }
    Ok(children)
}

/// Shorthand `{x:}` entries resolve their value from the key's name.
fn shorthand_value<'t>(tx: &mut Translator<'t>, key: &'t Node) -> R {
    let Syntax::Label { value } = &key.syntax else {
        return Err(malformed(key, "shorthand pair without a label key"));
    };
    let name = label_text(value);
    if name.chars().next().is_some_and(|c| c.is_uppercase()) {
        Ok(tx.node("const", vec![Element::sym(name)]))
    } else {
        Ok(tx.node("call", vec![Element::Absent, Element::sym(name)]))
    }
}

// ============================================================================
// SHARED PLUMBING
// ============================================================================

fn malformed(node: &Node, message: impl Into<String>) -> TranslateError {
    TranslateError::malformed(node.kind_name(), node.span, message)
}

fn expect_target(
    element: Element,
    node: &Node,
) -> Result<crate::target::TargetNode, TranslateError> {
    element.into_node().ok_or_else(|| {
        malformed(node, "assignment target did not produce a node")
    })
}
