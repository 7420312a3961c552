//! Implicit-parameter arity inference, end to end.

mod common;

use common::*;
use retree::arity::implicit_arity;
use retree::{translate, ExpandedSchema};

#[test]
fn arity_is_bounded_by_the_highest_reference() {
    let body = stmts(vec![lvar("_1"), lvar("_3"), lvar("_2")]);
    assert_eq!(implicit_arity(&body), Some(3));
}

#[test]
fn absent_when_nothing_matches_the_convention() {
    let body = stmts(vec![lvar("x"), lvar("_name"), lvar("__1")]);
    assert_eq!(implicit_arity(&body), None);
}

#[test]
fn nested_explicit_parameter_does_not_suppress() {
    // The inner block re-declares `_1` explicitly; the scan is not
    // scope-gated, so the outer block still counts the inner references.
    let inner = method_add_block(
        bare_call("inner"),
        block(
            Some(block_var(simple_params(vec![ident("_1")]), vec![])),
            vec![lvar("_1")],
        ),
    );
    let outer_body = stmts(vec![inner]);
    assert_eq!(implicit_arity(&outer_body), Some(1));

    // End to end: the pipeless outer block picks the implicit encoding.
    let root = program(vec![method_add_block(
        bare_call("outer"),
        block(None, vec![method_add_block(
            bare_call("inner"),
            block(
                Some(block_var(simple_params(vec![ident("_1")]), vec![])),
                vec![lvar("_1")],
            ),
        )]),
    )]);
    let rendered = translate(&ExpandedSchema, &root)
        .expect("translation succeeds")
        .pretty();
    assert!(
        rendered.starts_with("(numblock (send nil :outer) 1 "),
        "expected the implicit encoding, got {rendered}"
    );
}

#[test]
fn scan_reaches_through_arbitrary_structure() {
    let body = stmts(vec![if_node(
        lvar("_1"),
        vec![binary(int("1"), "+", paren(lvar("_4")))],
        None,
    )]);
    assert_eq!(implicit_arity(&body), Some(4));
}
