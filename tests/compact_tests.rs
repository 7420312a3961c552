//! Translation scenarios under the compact (s-expression) schema.

mod common;

use common::*;
use retree::source::{HeredocMarker, HeredocQuote, Node, RescueEx, Syntax};
use retree::{translate, CompactSchema, TranslateError};

fn compact(root: &Node) -> String {
    translate(&CompactSchema, root)
        .expect("translation succeeds")
        .pretty()
}

// ----------------------------------------------------------------------------
// Literals and names
// ----------------------------------------------------------------------------

#[test]
fn scalars_collapse_into_generic_literal_nodes() {
    assert_eq!(compact(&program(vec![int("42")])), "(lit 42)");
    assert_eq!(compact(&program(vec![float("3.5")])), "(lit 3.5)");
    assert_eq!(compact(&program(vec![symbol("name")])), "(lit :name)");
    assert_eq!(compact(&program(vec![rational("3.14r")])), "(lit 157/50r)");
}

#[test]
fn string_payloads_stay_raw() {
    assert_eq!(
        compact(&program(vec![string(vec![text(r"a\nb")])])),
        "(str \"a\\\\nb\")"
    );
}

#[test]
fn local_reads_are_bare_symbols() {
    assert_eq!(compact(&program(vec![lvar("a")])), ":a");
    assert_eq!(compact(&program(vec![ivar("@a")])), "(ivar :@a)");
    assert_eq!(compact(&program(vec![gvar("$a")])), ":$a");
}

#[test]
fn minus_folds_but_plus_stays_a_send() {
    assert_eq!(compact(&program(vec![unary("-", int("42"))])), "(lit -42)");
    assert_eq!(
        compact(&program(vec![unary("+", int("42"))])),
        "(call (lit 42) :+@)"
    );
}

// ----------------------------------------------------------------------------
// Calls
// ----------------------------------------------------------------------------

#[test]
fn calls_use_the_generic_call_kind() {
    assert_eq!(compact(&program(vec![vcall("foo")])), "(call nil :foo)");
    assert_eq!(
        compact(&program(vec![call(lvar("a"), "b", vec![int("1")])])),
        "(call :a :b (lit 1))"
    );
    assert_eq!(
        compact(&program(vec![safe_call(lvar("a"), "b", vec![])])),
        "(safe_call :a :b)"
    );
}

#[test]
fn index_operations_desugar_to_conventional_methods() {
    let read = n(Syntax::ARef {
        collection: Box::new(ivar("@a")),
        index: Some(Box::new(args(vec![int("0")]))),
    });
    assert_eq!(compact(&program(vec![read])), "(call (ivar :@a) :[] (lit 0))");

    let write = assign(
        n(Syntax::ARefField {
            collection: Box::new(ivar("@a")),
            index: Some(Box::new(args(vec![int("0")]))),
        }),
        int("9"),
    );
    assert_eq!(
        compact(&program(vec![write])),
        "(attrasgn (ivar :@a) :[]= (lit 0) (lit 9))"
    );
}

#[test]
fn blocks_become_iteration_nodes() {
    let root = program(vec![method_add_block(
        call(lvar("a"), "each", vec![]),
        block(None, vec![int("1")]),
    )]);
    assert_eq!(compact(&root), "(iter (call :a :each) nil (lit 1))");
}

#[test]
fn pipeless_blocks_carry_inferred_arity() {
    let root = program(vec![method_add_block(
        bare_call("map"),
        block(None, vec![lvar("_1")]),
    )]);
    assert_eq!(compact(&root), "(iter (call nil :map) 1 :_1)");
}

// ----------------------------------------------------------------------------
// Assignment and control flow
// ----------------------------------------------------------------------------

#[test]
fn assignments_rebuild_from_their_target() {
    assert_eq!(
        compact(&program(vec![assign(var_field(Some(ident("a"))), int("1"))])),
        "(lasgn :a (lit 1))"
    );

    let attr = assign(
        n(Syntax::Field {
            parent: Box::new(lvar("a")),
            operator: retree::source::CallOperator::Period,
            name: Box::new(ident("b")),
        }),
        int("1"),
    );
    assert_eq!(compact(&program(vec![attr])), "(attrasgn :a :b= (lit 1))");
}

#[test]
fn multiple_assignment_wraps_targets_and_values() {
    let root = program(vec![n(Syntax::MAssign {
        target: Box::new(n(Syntax::MLHS {
            parts: vec![var_field(Some(ident("a"))), var_field(Some(ident("b")))],
        })),
        value: Box::new(int("1")),
    })]);
    assert_eq!(
        compact(&root),
        "(masgn (array (masgn (lasgn :a) (lasgn :b))) (to_ary (lit 1)))"
    );
}

#[test]
fn loops_carry_the_precondition_marker() {
    let root = program(vec![n(Syntax::WhileNode {
        predicate: Box::new(lvar("a")),
        statements: Box::new(stmts(vec![int("1")])),
        modifier: false,
    })]);
    assert_eq!(compact(&root), "(while :a (lit 1) true)");
}

#[test]
fn empty_bodies_become_nil_nodes() {
    let root = program(vec![n(Syntax::Def {
        target: None,
        name: Box::new(ident("m")),
        params: Box::new(simple_params(vec![])),
        bodystmt: Box::new(body(vec![])),
    })]);
    assert_eq!(compact(&root), "(defn :m (args) (nil))");
}

#[test]
fn keyword_parameters_read_labels_in_parameter_position() {
    let root = program(vec![n(Syntax::Def {
        target: None,
        name: Box::new(ident("m")),
        params: Box::new(keyword_params(vec![(label("k"), None)])),
        bodystmt: Box::new(body(vec![])),
    })]);
    assert_eq!(compact(&root), "(defn :m (args (kwarg :k)) (nil))");
}

#[test]
fn rescue_folds_the_capture_into_the_exception_array() {
    let root = program(vec![n(Syntax::Begin {
        bodystmt: Box::new(n(Syntax::BodyStmt {
            statements: Box::new(stmts(vec![int("1")])),
            rescue_clause: Some(Box::new(n(Syntax::Rescue {
                exception: Some(RescueEx {
                    exceptions: Some(Box::new(const_ref("E"))),
                    variable: Some(Box::new(var_field(Some(ident("e"))))),
                }),
                statements: Box::new(stmts(vec![int("2")])),
                consequent: None,
            }))),
            else_clause: None,
            ensure_clause: None,
        })),
    })]);
    assert_eq!(
        compact(&root),
        "(rescue (lit 1) (resbody (array (const :E) (lasgn :e (gvar :$!))) (lit 2)))"
    );
}

#[test]
fn variable_aliases_get_their_own_kind() {
    let vars = n(Syntax::Alias {
        left: Box::new(gvar("$a")),
        right: Box::new(gvar("$b")),
    });
    assert_eq!(compact(&program(vec![vars])), "(valias :$a :$b)");

    let methods = n(Syntax::Alias {
        left: Box::new(symbol("a")),
        right: Box::new(symbol("b")),
    });
    assert_eq!(compact(&program(vec![methods])), "(alias (lit :a) (lit :b))");
}

// ----------------------------------------------------------------------------
// String-like literals
// ----------------------------------------------------------------------------

#[test]
fn static_interpolations_fuse_into_the_leading_text() {
    let literal = string(vec![
        text("a"),
        embexpr(string(vec![text("b")])),
        text("c"),
    ]);
    assert_eq!(compact(&program(vec![literal])), "(str \"abc\")");
}

#[test]
fn dynamic_strings_lead_with_raw_text() {
    let literal = string(vec![text("a"), embexpr(vcall("x"))]);
    assert_eq!(
        compact(&program(vec![literal])),
        "(dstr \"a\" (evstr (call nil :x)))"
    );
}

#[test]
fn word_arrays_hold_raw_strings() {
    let root = program(vec![n(Syntax::QWords {
        elements: vec![text("a"), text("b")],
    })]);
    assert_eq!(compact(&root), "(array \"a\" \"b\")");
}

#[test]
fn heredocs_use_the_leading_string_convention() {
    let literal = heredoc(
        HeredocMarker::plain(HeredocQuote::Double),
        None,
        vec![text("x\n"), embexpr(vcall("y")), text("\n")],
    );
    assert_eq!(
        compact(&program(vec![literal])),
        "(dstr \"x\\n\" (evstr (call nil :y)) (str \"\\n\"))"
    );
}

#[test]
fn squiggly_heredocs_still_dedent() {
    let literal = heredoc(
        HeredocMarker::squiggly(HeredocQuote::Double),
        None,
        vec![text("    a\n  b\n")],
    );
    assert_eq!(compact(&program(vec![literal])), "(dstr \"  a\\n\" (str \"b\\n\"))");
}

// ----------------------------------------------------------------------------
// Unsupported constructs
// ----------------------------------------------------------------------------

#[test]
fn find_patterns_are_unsupported_and_name_the_kind() {
    let pattern = n(Syntax::FndPtn {
        constant: None,
        left: Box::new(var_field(None)),
        values: vec![int("1")],
        right: Box::new(var_field(None)),
    });
    let root = program(vec![case(Some(lvar("x")), in_clause(pattern, vec![int("2")]))]);

    let err = translate(&CompactSchema, &root).expect_err("must fail");
    assert!(matches!(err, TranslateError::UnsupportedConstruct { .. }));
    assert_eq!(err.construct(), "find_pattern");
    let message = err.to_string();
    assert!(message.contains("find_pattern"));
    assert!(message.contains("compact"));
}

#[test]
fn pinned_expressions_are_unsupported() {
    let pattern = n(Syntax::PinnedVarRef { value: Box::new(lvar("y")) });
    let root = program(vec![case(Some(lvar("x")), in_clause(pattern, vec![int("1")]))]);

    let err = translate(&CompactSchema, &root).expect_err("must fail");
    assert_eq!(err.construct(), "pinned_variable");
}

#[test]
fn array_patterns_remain_supported() {
    let pattern = n(Syntax::AryPtn {
        constant: None,
        requireds: vec![var_field(Some(ident("a")))],
        rest: None,
        posts: vec![],
    });
    let root = program(vec![case(Some(lvar("x")), in_clause(pattern, vec![int("1")]))]);
    assert_eq!(
        compact(&root),
        "(case :x (in (array_pat nil (lasgn :a)) (lit 1)) nil)"
    );
}
