use ubnf_core::Annotation;

use crate::analyze::{ensure_valid, validate, Issue, IssueCode};
use crate::test_utils::*;

fn codes(issues: &[Issue]) -> Vec<IssueCode> {
    issues.iter().map(|issue| issue.code).collect()
}

fn operand_rule(name: &str) -> ubnf_core::Rule {
    rule(name, vec![], seq(vec![term("x")]))
}

#[test]
fn clean_operator_grammar_has_no_issues() {
    let grammar = grammar(
        "Calc",
        vec![
            left_assoc_rule("Expr", "BinaryOp", "Term", "+"),
            operand_rule("Term"),
        ],
    );
    assert_eq!(validate(&grammar), vec![]);
}

#[test]
fn mapping_duplicate_param_is_reported() {
    let grammar = grammar(
        "G",
        vec![rule(
            "Pair",
            vec![mapping("Pair", &["key", "key"])],
            seq(vec![cap(term("k"), "key")]),
        )],
    );
    let issues = validate(&grammar);
    assert_eq!(codes(&issues), vec![IssueCode::MappingDuplicateParam]);
    assert_eq!(issues[0].rule.as_deref(), Some("Pair"));
}

#[test]
fn mapping_param_without_capture_is_reported() {
    let grammar = grammar(
        "G",
        vec![rule(
            "Pair",
            vec![mapping("Pair", &["key", "value"])],
            seq(vec![cap(term("k"), "key")]),
        )],
    );
    let issues = validate(&grammar);
    assert_eq!(codes(&issues), vec![IssueCode::MappingMissingCapture]);
    assert!(issues[0].message.contains("'value'"));
}

#[test]
fn capture_not_listed_in_mapping_is_reported() {
    let grammar = grammar(
        "G",
        vec![rule(
            "Pair",
            vec![mapping("Pair", &["key"])],
            seq(vec![cap(term("k"), "key"), cap(term("v"), "value")]),
        )],
    );
    let issues = validate(&grammar);
    assert_eq!(codes(&issues), vec![IssueCode::MappingUnlistedCapture]);
    assert!(issues[0].message.contains("@value"));
}

#[test]
fn captures_inside_nested_shapes_satisfy_mapping_params() {
    let grammar = grammar(
        "G",
        vec![rule(
            "Decl",
            vec![mapping("Decl", &["name", "init"])],
            seq(vec![
                cap(term("n"), "name"),
                opt(seq(vec![term("="), cap(term("e"), "init")])),
            ]),
        )],
    );
    assert_eq!(validate(&grammar), vec![]);
}

#[test]
fn both_assoc_annotations_report_one_issue_only() {
    let mut bad = left_assoc_rule("Expr", "BinaryOp", "Term", "+");
    bad.annotations.push(Annotation::RightAssoc);
    let grammar = grammar("G", vec![bad, operand_rule("Term")]);
    assert_eq!(codes(&validate(&grammar)), vec![IssueCode::AssocBoth]);
}

#[test]
fn assoc_without_mapping_is_reported() {
    let grammar = grammar(
        "G",
        vec![
            rule(
                "Expr",
                vec![Annotation::LeftAssoc],
                seq(vec![
                    cap(rref("Term"), "left"),
                    rep(seq(vec![cap(term("+"), "op"), cap(rref("Term"), "right")])),
                ]),
            ),
            operand_rule("Term"),
        ],
    );
    assert_eq!(codes(&validate(&grammar)), vec![IssueCode::AssocNoMapping]);
}

#[test]
fn assoc_mapping_missing_required_params_is_reported() {
    let mut bad = left_assoc_rule("Expr", "BinaryOp", "Term", "+");
    bad.annotations[1] = mapping("BinaryOp", &["left", "right"]);
    let grammar = grammar("G", vec![bad, operand_rule("Term")]);
    let issues = validate(&grammar);
    assert_eq!(
        codes(&issues),
        vec![
            IssueCode::AssocMissingParam,
            IssueCode::MappingUnlistedCapture,
        ]
    );
    assert!(issues[0].message.contains("'op'"));
}

#[test]
fn assoc_missing_capture_is_reported() {
    let grammar = grammar(
        "G",
        vec![
            rule(
                "Expr",
                vec![
                    Annotation::LeftAssoc,
                    mapping("BinaryOp", &["left", "op", "right"]),
                ],
                seq(vec![
                    cap(rref("Term"), "left"),
                    rep(seq(vec![term("+"), cap(rref("Term"), "right")])),
                ]),
            ),
            operand_rule("Term"),
        ],
    );
    let issues = validate(&grammar);
    assert_eq!(
        codes(&issues),
        vec![
            IssueCode::AssocMissingCapture,
            IssueCode::MappingMissingCapture,
        ]
    );
    assert!(issues[0].message.contains("@op"));
}

#[test]
fn assoc_without_repeat_is_reported() {
    let grammar = grammar(
        "G",
        vec![
            rule(
                "Expr",
                vec![
                    Annotation::LeftAssoc,
                    mapping("BinaryOp", &["left", "op", "right"]),
                ],
                seq(vec![
                    cap(rref("Term"), "left"),
                    cap(term("+"), "op"),
                    cap(rref("Term"), "right"),
                ]),
            ),
            operand_rule("Term"),
        ],
    );
    assert_eq!(codes(&validate(&grammar)), vec![IssueCode::AssocNoRepeat]);
}

#[test]
fn right_assoc_must_recurse_into_itself() {
    // Repeated right-hand side points at Term instead of Pow.
    let bad = rule(
        "Pow",
        vec![
            Annotation::RightAssoc,
            mapping("PowOp", &["left", "op", "right"]),
        ],
        seq(vec![
            cap(rref("Term"), "left"),
            rep(seq(vec![cap(term("^"), "op"), cap(rref("Term"), "right")])),
        ]),
    );
    let grammar = grammar("G", vec![bad, operand_rule("Term")]);
    let issues = validate(&grammar);
    assert_eq!(codes(&issues), vec![IssueCode::AssocNoncanonical]);
    assert!(issues[0].message.contains("canonical"));
}

#[test]
fn canonical_right_assoc_is_clean() {
    let grammar = grammar(
        "G",
        vec![
            right_assoc_rule("Pow", "PowOp", "Term", "^"),
            operand_rule("Term"),
        ],
    );
    assert_eq!(validate(&grammar), vec![]);
}

#[test]
fn global_whitespace_profile_must_be_java_style() {
    let mut grammar = grammar("G", vec![operand_rule("Term")]);
    grammar.settings.push(string_setting("whitespace", "python"));
    let issues = validate(&grammar);
    assert_eq!(codes(&issues), vec![IssueCode::WhitespaceGlobalProfile]);
    assert_eq!(issues[0].rule, None);
}

#[test]
fn global_whitespace_profile_is_case_insensitive() {
    let mut grammar = grammar("G", vec![operand_rule("Term")]);
    grammar.settings.push(string_setting("whitespace", "JavaStyle"));
    assert_eq!(validate(&grammar), vec![]);
}

#[test]
fn rule_whitespace_allows_java_style_and_none_only() {
    let mut ok_none = operand_rule("A");
    ok_none.annotations.push(Annotation::Whitespace {
        profile: Some("none".to_string()),
    });
    let mut ok_bare = operand_rule("B");
    ok_bare
        .annotations
        .push(Annotation::Whitespace { profile: None });
    let mut bad = operand_rule("C");
    bad.annotations.push(Annotation::Whitespace {
        profile: Some("tabs".to_string()),
    });
    let grammar = grammar("G", vec![ok_none, ok_bare, bad]);
    let issues = validate(&grammar);
    assert_eq!(codes(&issues), vec![IssueCode::WhitespaceRuleProfile]);
    assert_eq!(issues[0].rule.as_deref(), Some("C"));
}

#[test]
fn bad_whitespace_profile_is_rejected_even_when_shadowed() {
    let mut bad = operand_rule("R");
    bad.annotations.push(Annotation::Whitespace {
        profile: Some("tabs".to_string()),
    });
    bad.annotations.push(Annotation::Whitespace {
        profile: Some("none".to_string()),
    });
    let grammar = grammar("G", vec![bad]);
    let issues = validate(&grammar);
    assert_eq!(codes(&issues), vec![IssueCode::WhitespaceRuleProfile]);
    assert!(issues[0].message.contains("tabs"));
}

#[test]
fn negative_precedence_level_is_reported() {
    let mut bad = left_assoc_rule("Expr", "BinaryOp", "Term", "+");
    bad.annotations.push(Annotation::Precedence { level: -1 });
    let grammar = grammar("G", vec![bad, operand_rule("Term")]);
    assert_eq!(
        codes(&validate(&grammar)),
        vec![IssueCode::PrecedenceNegative]
    );
}

#[test]
fn duplicate_precedence_annotations_are_reported() {
    let mut bad = left_assoc_rule("Expr", "BinaryOp", "Term", "+");
    bad.annotations.push(Annotation::Precedence { level: 10 });
    bad.annotations.push(Annotation::Precedence { level: 20 });
    let grammar = grammar("G", vec![bad, operand_rule("Term")]);
    assert_eq!(
        codes(&validate(&grammar)),
        vec![IssueCode::PrecedenceDuplicate]
    );
}

#[test]
fn precedence_without_assoc_is_reported() {
    let mut bad = operand_rule("Term");
    bad.annotations.push(Annotation::Precedence { level: 5 });
    let grammar = grammar("G", vec![bad]);
    assert_eq!(
        codes(&validate(&grammar)),
        vec![IssueCode::PrecedenceNoAssoc]
    );
}

#[test]
fn operand_reference_must_have_tighter_precedence() {
    let mut add = left_assoc_rule("Add", "AddOp", "Mul", "+");
    add.annotations.push(Annotation::Precedence { level: 20 });
    let mut mul = left_assoc_rule("Mul", "MulOp", "Term", "*");
    mul.annotations.push(Annotation::Precedence { level: 10 });
    let grammar = grammar("G", vec![add, mul, operand_rule("Term")]);
    let issues = validate(&grammar);
    assert_eq!(codes(&issues), vec![IssueCode::PrecedenceTopology]);
    assert_eq!(issues[0].rule.as_deref(), Some("Add"));
}

#[test]
fn looser_to_tighter_precedence_chain_is_clean() {
    let mut add = left_assoc_rule("Add", "AddOp", "Mul", "+");
    add.annotations.push(Annotation::Precedence { level: 10 });
    let mut mul = left_assoc_rule("Mul", "MulOp", "Term", "*");
    mul.annotations.push(Annotation::Precedence { level: 20 });
    let grammar = grammar("G", vec![add, mul, operand_rule("Term")]);
    assert_eq!(validate(&grammar), vec![]);
}

#[test]
fn self_reference_is_exempt_from_topology_check() {
    let mut pow = right_assoc_rule("Pow", "PowOp", "Term", "^");
    pow.annotations.push(Annotation::Precedence { level: 30 });
    let grammar = grammar("G", vec![pow, operand_rule("Term")]);
    assert_eq!(validate(&grammar), vec![]);
}

#[test]
fn shared_level_must_share_associativity() {
    let mut add = left_assoc_rule("Add", "AddOp", "Term", "+");
    add.annotations.push(Annotation::Precedence { level: 10 });
    let mut cat = right_assoc_rule("Cat", "CatOp", "Term", "++");
    cat.annotations.push(Annotation::Precedence { level: 10 });
    let grammar = grammar("G", vec![add, cat, operand_rule("Term")]);
    let issues = validate(&grammar);
    assert_eq!(codes(&issues), vec![IssueCode::PrecedenceMixedAssoc]);
    assert!(issues[0].message.contains("mixes associativity"));
}

#[test]
fn issues_are_sorted_by_rule_then_code() {
    let zed = rule(
        "Zed",
        vec![mapping("Zed", &["a"])],
        seq(vec![cap(term("b"), "b")]),
    );
    let abel = rule(
        "Abel",
        vec![mapping("Abel", &["x"])],
        seq(vec![term("x")]),
    );
    let grammar = grammar("G", vec![zed, abel]);
    let issues = validate(&grammar);
    let rules: Vec<_> = issues.iter().map(|i| i.rule.as_deref()).collect();
    assert_eq!(
        rules,
        vec![Some("Abel"), Some("Zed"), Some("Zed")]
    );
    // Within Zed, codes sort lexicographically by their string form.
    assert_eq!(
        codes(&issues),
        vec![
            IssueCode::MappingMissingCapture,
            IssueCode::MappingMissingCapture,
            IssueCode::MappingUnlistedCapture,
        ]
    );
}

#[test]
fn ensure_valid_aggregates_all_issues_into_one_error() {
    let grammar = grammar(
        "Broken",
        vec![rule(
            "Expr",
            vec![Annotation::LeftAssoc],
            seq(vec![term("x")]),
        )],
    );
    let err = ensure_valid(&grammar).unwrap_err();
    let rendered = err.to_string();
    assert!(rendered.contains("Broken"));
    assert!(rendered.contains("E-ASSOC-NO-MAPPING"));
    assert!(rendered.contains("E-ASSOC-NO-REPEAT"));
    assert!(rendered.contains("E-ASSOC-MISSING-CAPTURE"));
}

#[test]
fn ensure_valid_passes_clean_grammar() {
    let grammar = grammar("G", vec![operand_rule("Term")]);
    assert!(ensure_valid(&grammar).is_ok());
}

#[test]
fn issues_serialize_with_stable_code_strings() {
    let grammar = grammar(
        "G",
        vec![rule(
            "Pair",
            vec![mapping("Pair", &["key", "key"])],
            seq(vec![cap(term("k"), "key")]),
        )],
    );
    let issues = validate(&grammar);
    let json = serde_json::to_value(&issues).unwrap();
    assert_eq!(json[0]["rule"], "Pair");
    assert_eq!(json[0]["code"], "E-MAPPING-DUPLICATE-PARAM");
    assert_eq!(json[0]["severity"], "Error");
    assert_eq!(json[0]["category"], "Mapping");
}
