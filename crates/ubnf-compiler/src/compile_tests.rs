use ubnf_core::Annotation;

use crate::emit::{HelperKind, OperandSource};
use crate::test_utils::*;
use crate::typegen::{FieldType, TypeRef};
use crate::{compile, Error};

fn calc_grammar() -> ubnf_core::Grammar {
    let mut add = left_assoc_rule("Add", "AddOp", "Mul", "+");
    add.annotations.push(Annotation::Precedence { level: 10 });
    let mut mul = left_assoc_rule("Mul", "MulOp", "Term", "*");
    mul.annotations.push(Annotation::Precedence { level: 20 });
    grammar(
        "Calc",
        vec![
            add,
            mul,
            rule(
                "Term",
                vec![mapping("TermNode", &["digits"])],
                seq(vec![cap(term("0"), "digits")]),
            ),
        ],
    )
}

#[test]
fn compile_produces_all_artifact_kinds() {
    let artifacts = compile(&calc_grammar()).unwrap();

    assert_eq!(
        artifacts.types[&("Term".to_string(), "digits".to_string())],
        FieldType::Scalar(TypeRef::Text)
    );

    let add = artifacts.matchers.rule("Add").unwrap();
    assert!(add.skip.blanks);
    assert!(artifacts
        .matchers
        .helpers
        .keys()
        .any(|key| key.rule == "Add" && key.kind == HelperKind::Repeat));

    assert_eq!(artifacts.operators.levels(), vec![10, 20]);

    assert_eq!(artifacts.folds.len(), 2);
    let add_fold = &artifacts.folds[0];
    assert_eq!(add_fold.rule, "Add");
    assert_eq!(
        add_fold.left,
        OperandSource::RuleNode {
            rule: "Mul".to_string(),
            class: "MulOp".to_string(),
        }
    );
    assert!(artifacts.matchers.helper(&add_fold.repeat).is_some());
}

#[test]
fn invalid_grammar_emits_nothing() {
    let broken = grammar(
        "Broken",
        vec![rule(
            "Expr",
            vec![Annotation::LeftAssoc],
            seq(vec![term("x")]),
        )],
    );
    let err = compile(&broken).unwrap_err();
    let Error::InvalidGrammar { grammar, issues } = err;
    assert_eq!(grammar, "Broken");
    assert!(!issues.is_empty());
}

#[test]
fn compile_is_deterministic() {
    let g = calc_grammar();
    let first = compile(&g).unwrap();
    let second = compile(&g).unwrap();
    assert_eq!(first.matchers, second.matchers);
    assert_eq!(first.folds, second.folds);
}
