//! Driver-level properties: purity, elision, depth guarding, and safe
//! sharing across threads.

mod common;

use common::*;
use retree::source::Syntax;
use retree::{translate, translate_to_node, CompactSchema, ExpandedSchema, TranslateError};

#[test]
fn translation_is_deterministic() {
    let root = program(vec![call(lvar("a"), "b", vec![int("1"), float("2.5")])]);
    let first = translate(&ExpandedSchema, &root).expect("translation succeeds");
    let second = translate(&ExpandedSchema, &root).expect("translation succeeds");
    assert_eq!(first, second);
}

#[test]
fn fully_elided_programs_return_absent() {
    let root = program(vec![n(Syntax::VoidStmt)]);
    let element = translate(&ExpandedSchema, &root).expect("translation succeeds");
    assert!(element.is_absent());
    assert!(translate_to_node(&ExpandedSchema, &root)
        .expect("translation succeeds")
        .is_none());
}

#[test]
fn pathological_nesting_fails_fast() {
    let mut node = int("1");
    for _ in 0..5_000 {
        node = n(Syntax::Paren {
            contents: Some(Box::new(stmts(vec![node]))),
        });
    }
    let root = program(vec![node]);
    let err = translate(&ExpandedSchema, &root).expect_err("must fail");
    assert!(matches!(err, TranslateError::MalformedNode { .. }));
    assert!(err.to_string().contains("depth"));
}

#[test]
fn independent_translations_share_nothing() {
    let root = program(vec![method_add_block(
        bare_call("map"),
        block(None, vec![binary(lvar("_1"), "*", int("2"))]),
    )]);

    std::thread::scope(|scope| {
        let expanded = scope.spawn(|| {
            translate(&ExpandedSchema, &root)
                .expect("translation succeeds")
                .pretty()
        });
        let compact = scope.spawn(|| {
            translate(&CompactSchema, &root)
                .expect("translation succeeds")
                .pretty()
        });

        assert_eq!(
            expanded.join().expect("thread completes"),
            "(numblock (send nil :map) 1 (send (lvar :_1) :* (int 2)))"
        );
        assert_eq!(
            compact.join().expect("thread completes"),
            "(iter (call nil :map) 1 (call :_1 :* (lit 2)))"
        );
    });
}

#[test]
fn source_trees_deserialize_from_json() {
    let text = r#"{
        "syntax": {"Program": {"statements": {
            "syntax": {"Statements": {"body": [
                {"syntax": {"IntLit": {"value": "42"}},
                 "span": {"start": 0, "end": 2, "line": 1}}
            ]}},
            "span": {"start": 0, "end": 2, "line": 1}
        }}},
        "span": {"start": 0, "end": 2, "line": 1}
    }"#;
    let root = retree::source::from_json(text).expect("tree deserializes");
    let rendered = translate(&ExpandedSchema, &root)
        .expect("translation succeeds")
        .pretty();
    assert_eq!(rendered, "(int 42)");
}

#[test]
fn every_reachable_node_is_visited_exactly_once() {
    // A tree whose translation duplicates or skips children would change
    // the child count of the produced array.
    let root = program(vec![n(Syntax::ArrayLiteral {
        contents: Some(Box::new(args(vec![int("1"), int("2"), int("3")]))),
    })]);

    let produced = translate(&ExpandedSchema, &root)
        .expect("translation succeeds")
        .into_node()
        .expect("root is a node");
    assert_eq!(produced.kind, "array");
    assert_eq!(produced.children.len(), 3);
}
