//! Shared tree-construction helpers for the integration suites.
//!
//! The engine consumes trees from an external parser; tests build those
//! trees by hand, so the helpers here keep the construction noise down.
//! Spans default to zero except where a test needs one.

#![allow(dead_code)]

use retree::source::{
    CallOperator, HeredocMarker, KeywordRest, Node, Span, Syntax,
};

pub fn n(syntax: Syntax) -> Node {
    Node::new(syntax, Span::default())
}

pub fn at(syntax: Syntax, start: usize, end: usize, line: usize) -> Node {
    Node::new(syntax, Span::new(start, end, line))
}

// ----------------------------------------------------------------------------
// Scalars and names
// ----------------------------------------------------------------------------

pub fn int(text: &str) -> Node {
    n(Syntax::IntLit { value: text.into() })
}

pub fn float(text: &str) -> Node {
    n(Syntax::FloatLit { value: text.into() })
}

pub fn rational(text: &str) -> Node {
    n(Syntax::RationalLit { value: text.into() })
}

pub fn imaginary(text: &str) -> Node {
    n(Syntax::ImaginaryLit { value: text.into() })
}

pub fn ident(name: &str) -> Node {
    n(Syntax::Ident { value: name.into() })
}

pub fn constant(name: &str) -> Node {
    n(Syntax::Const { value: name.into() })
}

pub fn kw(name: &str) -> Node {
    n(Syntax::Kw { value: name.into() })
}

pub fn label(name: &str) -> Node {
    n(Syntax::Label { value: format!("{name}:") })
}

pub fn symbol(name: &str) -> Node {
    n(Syntax::SymbolLit { value: name.into() })
}

pub fn text(content: &str) -> Node {
    n(Syntax::TextSegment { value: content.into() })
}

/// A local-variable read.
pub fn lvar(name: &str) -> Node {
    n(Syntax::VarRef { value: Box::new(ident(name)) })
}

/// An instance-variable read.
pub fn ivar(name: &str) -> Node {
    n(Syntax::VarRef {
        value: Box::new(n(Syntax::IVar { value: name.into() })),
    })
}

/// A global-variable read.
pub fn gvar(name: &str) -> Node {
    n(Syntax::VarRef {
        value: Box::new(n(Syntax::GVar { value: name.into() })),
    })
}

/// A constant read.
pub fn const_ref(name: &str) -> Node {
    n(Syntax::VarRef { value: Box::new(constant(name)) })
}

pub fn var_field(value: Option<Node>) -> Node {
    n(Syntax::VarField { value: value.map(Box::new) })
}

// ----------------------------------------------------------------------------
// Statements and structure
// ----------------------------------------------------------------------------

pub fn stmts(body: Vec<Node>) -> Node {
    n(Syntax::Statements { body })
}

pub fn body(statements: Vec<Node>) -> Node {
    n(Syntax::BodyStmt {
        statements: Box::new(stmts(statements)),
        rescue_clause: None,
        else_clause: None,
        ensure_clause: None,
    })
}

pub fn program(statements: Vec<Node>) -> Node {
    n(Syntax::Program { statements: Box::new(stmts(statements)) })
}

pub fn paren(contents: Node) -> Node {
    n(Syntax::Paren {
        contents: Some(Box::new(stmts(vec![contents]))),
    })
}

// ----------------------------------------------------------------------------
// Calls
// ----------------------------------------------------------------------------

pub fn args(parts: Vec<Node>) -> Node {
    n(Syntax::Args { parts })
}

pub fn arg_paren(arguments: Option<Node>) -> Node {
    n(Syntax::ArgParen { arguments: arguments.map(Box::new) })
}

pub fn vcall(name: &str) -> Node {
    n(Syntax::VCall { value: Box::new(ident(name)) })
}

/// `receiver.message(args...)` with a period operator.
pub fn call(receiver: Node, message: &str, arguments: Vec<Node>) -> Node {
    n(Syntax::CallNode {
        receiver: Some(Box::new(receiver)),
        operator: Some(CallOperator::Period),
        message: Some(Box::new(ident(message))),
        arguments: Some(Box::new(arg_paren(Some(args(arguments))))),
    })
}

/// A receiverless call with parenthesized arguments.
pub fn fcall(message: &str, arguments: Vec<Node>) -> Node {
    n(Syntax::CallNode {
        receiver: None,
        operator: None,
        message: Some(Box::new(ident(message))),
        arguments: Some(Box::new(arg_paren(Some(args(arguments))))),
    })
}

/// A receiverless call with no argument list at all.
pub fn bare_call(message: &str) -> Node {
    n(Syntax::CallNode {
        receiver: None,
        operator: None,
        message: Some(Box::new(ident(message))),
        arguments: None,
    })
}

pub fn safe_call(receiver: Node, message: &str, arguments: Vec<Node>) -> Node {
    n(Syntax::CallNode {
        receiver: Some(Box::new(receiver)),
        operator: Some(CallOperator::SafeNav),
        message: Some(Box::new(ident(message))),
        arguments: Some(Box::new(arg_paren(Some(args(arguments))))),
    })
}

pub fn command(message: &str, arguments: Vec<Node>) -> Node {
    n(Syntax::Command {
        message: Box::new(ident(message)),
        arguments: Box::new(args(arguments)),
        block: None,
    })
}

// ----------------------------------------------------------------------------
// Blocks and parameters
// ----------------------------------------------------------------------------

pub fn simple_params(requireds: Vec<Node>) -> Node {
    n(Syntax::Params {
        requireds,
        optionals: vec![],
        rest: None,
        posts: vec![],
        keywords: vec![],
        keyword_rest: KeywordRest::None,
        block: None,
    })
}

pub fn keyword_params(keywords: Vec<(Node, Option<Node>)>) -> Node {
    n(Syntax::Params {
        requireds: vec![],
        optionals: vec![],
        rest: None,
        posts: vec![],
        keywords,
        keyword_rest: KeywordRest::None,
        block: None,
    })
}

pub fn block_var(params: Node, locals: Vec<Node>) -> Node {
    n(Syntax::BlockVar { params: Box::new(params), locals })
}

pub fn block(block_var: Option<Node>, statements: Vec<Node>) -> Node {
    n(Syntax::BlockNode {
        block_var: block_var.map(Box::new),
        bodystmt: Box::new(body(statements)),
    })
}

pub fn method_add_block(call: Node, block: Node) -> Node {
    n(Syntax::MethodAddBlock {
        call: Box::new(call),
        block: Box::new(block),
    })
}

pub fn lambda_var(params: Node, locals: Vec<Node>) -> Node {
    n(Syntax::LambdaVar { params: Box::new(params), locals })
}

pub fn lambda(params: Node, statements: Vec<Node>) -> Node {
    n(Syntax::Lambda {
        params: Box::new(params),
        statements: Box::new(stmts(statements)),
    })
}

// ----------------------------------------------------------------------------
// Operators, assignment, control flow
// ----------------------------------------------------------------------------

pub fn binary(left: Node, operator: &str, right: Node) -> Node {
    n(Syntax::Binary {
        left: Box::new(left),
        operator: operator.into(),
        right: Box::new(right),
    })
}

pub fn unary(operator: &str, statement: Node) -> Node {
    n(Syntax::Unary {
        operator: operator.into(),
        statement: Box::new(statement),
    })
}

pub fn assign(target: Node, value: Node) -> Node {
    n(Syntax::Assign {
        target: Box::new(target),
        value: Box::new(value),
    })
}

pub fn if_node(predicate: Node, statements: Vec<Node>, consequent: Option<Node>) -> Node {
    n(Syntax::IfNode {
        predicate: Box::new(predicate),
        statements: Box::new(stmts(statements)),
        consequent: consequent.map(Box::new),
    })
}

pub fn else_node(statements: Vec<Node>) -> Node {
    n(Syntax::Else { statements: Box::new(stmts(statements)) })
}

pub fn when(arguments: Vec<Node>, statements: Vec<Node>, consequent: Option<Node>) -> Node {
    n(Syntax::When {
        arguments: Box::new(args(arguments)),
        statements: Box::new(stmts(statements)),
        consequent: consequent.map(Box::new),
    })
}

pub fn in_clause(pattern: Node, statements: Vec<Node>) -> Node {
    n(Syntax::In {
        pattern: Box::new(pattern),
        statements: Box::new(stmts(statements)),
        consequent: None,
    })
}

pub fn case(value: Option<Node>, consequent: Node) -> Node {
    n(Syntax::Case {
        value: value.map(Box::new),
        consequent: Box::new(consequent),
    })
}

// ----------------------------------------------------------------------------
// String-like literals
// ----------------------------------------------------------------------------

pub fn string(parts: Vec<Node>) -> Node {
    n(Syntax::StringLit { parts })
}

pub fn embexpr(expression: Node) -> Node {
    n(Syntax::EmbExpr {
        statements: Box::new(stmts(vec![expression])),
    })
}

pub fn heredoc(marker: HeredocMarker, dedent: Option<usize>, parts: Vec<Node>) -> Node {
    n(Syntax::Heredoc { marker, dedent, parts })
}
