//! Grammar-level semantic checks the emitters rely on.
//!
//! Each check is independent and every check runs even when others fail;
//! issues are gathered across all rules and sorted before reporting.

use indexmap::{IndexMap, IndexSet};
use ubnf_core::grammar::walk;
use ubnf_core::{Annotation, Assoc, AtomicElement, Grammar, Rule, DEFAULT_WHITESPACE_PROFILE};

use super::{Issue, IssueCode};
use crate::Error;

/// Parameters every associativity-annotated rule must map and capture.
const ASSOC_PARAMS: [&str; 3] = ["left", "op", "right"];

/// Run every check and return the findings sorted by (rule, code, message).
pub fn validate(grammar: &Grammar) -> Vec<Issue> {
    let mut issues = Vec::new();

    check_global_whitespace(grammar, &mut issues);

    for rule in &grammar.rules {
        let mapping = rule.mapping();
        let precedence_count = rule
            .annotations
            .iter()
            .filter(|a| matches!(a, Annotation::Precedence { .. }))
            .count();

        for annotation in &rule.annotations {
            if let Annotation::Whitespace { profile } = annotation {
                check_rule_whitespace(rule, profile.as_deref(), &mut issues);
            }
        }

        if mapping.is_some() {
            check_mapping(rule, &mut issues);
        }
        if rule.has_left_assoc() || rule.has_right_assoc() {
            check_assoc(rule, &mut issues);
        }
        check_precedence(rule, precedence_count, &mut issues);
    }

    check_precedence_topology(grammar, &mut issues);
    check_associativity_consistency(grammar, &mut issues);

    issues.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
    issues
}

/// Validate and aggregate: one error carrying the grammar name and the full
/// issue list, raised only after the complete pass.
pub fn ensure_valid(grammar: &Grammar) -> crate::Result<()> {
    let issues = validate(grammar);
    if issues.is_empty() {
        return Ok(());
    }
    Err(Error::InvalidGrammar {
        grammar: grammar.name.clone(),
        issues,
    })
}

// ============================================================================
// Per-rule checks
// ============================================================================

fn check_mapping(rule: &Rule, issues: &mut Vec<Issue>) {
    let Some(mapping) = rule.mapping() else {
        return;
    };

    let mut params = IndexSet::new();
    let mut duplicates = IndexSet::new();
    for param in mapping.params {
        if !params.insert(param.as_str()) {
            duplicates.insert(param.as_str());
        }
    }

    if !duplicates.is_empty() {
        let dup: Vec<&str> = duplicates.iter().copied().collect();
        issues.push(Issue::new(
            Some(&rule.name),
            IssueCode::MappingDuplicateParam,
            format!(
                "rule {} @mapping({}) has duplicate params: {}",
                rule.name,
                mapping.class_name,
                dup.join(", ")
            ),
            "Remove duplicate parameter names in @mapping params.".to_string(),
        ));
    }

    let captures = walk::capture_names(&rule.body);

    for param in &params {
        if !captures.contains(*param) {
            issues.push(Issue::new(
                Some(&rule.name),
                IssueCode::MappingMissingCapture,
                format!(
                    "rule {} @mapping({}) param '{param}' has no matching capture",
                    rule.name, mapping.class_name
                ),
                format!("Add @{param} capture in the rule body or remove it from params."),
            ));
        }
    }

    for capture in &captures {
        if !params.contains(capture.as_str()) {
            issues.push(Issue::new(
                Some(&rule.name),
                IssueCode::MappingUnlistedCapture,
                format!(
                    "rule {} has capture @{capture} not listed in @mapping({}) params",
                    rule.name, mapping.class_name
                ),
                format!("Add '{capture}' to @mapping params."),
            ));
        }
    }
}

fn check_assoc(rule: &Rule, issues: &mut Vec<Issue>) {
    if rule.has_left_assoc() && rule.has_right_assoc() {
        issues.push(Issue::new(
            Some(&rule.name),
            IssueCode::AssocBoth,
            format!("rule {} cannot use both @leftAssoc and @rightAssoc", rule.name),
            "Keep exactly one associativity annotation per rule.".to_string(),
        ));
        return;
    }

    let assoc_name = if rule.has_right_assoc() {
        "@rightAssoc"
    } else {
        "@leftAssoc"
    };
    let captures = walk::capture_names(&rule.body);

    match rule.mapping() {
        None => {
            issues.push(Issue::new(
                Some(&rule.name),
                IssueCode::AssocNoMapping,
                format!("rule {} uses {assoc_name} but has no @mapping", rule.name),
                "Add @mapping(ClassName, params=[left, op, right]) to this rule.".to_string(),
            ));
        }
        Some(mapping) => {
            for required in ASSOC_PARAMS {
                if !mapping.params.iter().any(|p| p == required) {
                    issues.push(Issue::new(
                        Some(&rule.name),
                        IssueCode::AssocMissingParam,
                        format!(
                            "rule {} uses {assoc_name} but @mapping({}) params does not contain '{required}'",
                            rule.name, mapping.class_name
                        ),
                        "Include left/op/right in @mapping params.".to_string(),
                    ));
                }
            }
        }
    }

    for required in ASSOC_PARAMS {
        if !captures.contains(required) {
            issues.push(Issue::new(
                Some(&rule.name),
                IssueCode::AssocMissingCapture,
                format!(
                    "rule {} uses {assoc_name} but capture @{required} is missing",
                    rule.name
                ),
                format!("Add @{required} capture in the rule body."),
            ));
        }
    }

    if !walk::contains_repeat(&rule.body) {
        issues.push(Issue::new(
            Some(&rule.name),
            IssueCode::AssocNoRepeat,
            format!("rule {} uses {assoc_name} but has no repeat segment", rule.name),
            "Use canonical operator pattern: Base { Op Right }.".to_string(),
        ));
    }

    if rule.has_right_assoc() && !has_canonical_right_shape(rule) {
        issues.push(Issue::new(
            Some(&rule.name),
            IssueCode::AssocNoncanonical,
            format!(
                "rule {} uses @rightAssoc but body is not canonical: expected Base {{ Op {} }}",
                rule.name, rule.name
            ),
            format!("Rewrite right-assoc rule as Base {{ op {} }}.", rule.name),
        ));
    }
}

/// Canonical right recursion: `Base { Op Self }` where the repeated
/// right-hand element is a reference to the rule itself.
fn has_canonical_right_shape(rule: &Rule) -> bool {
    let Some(top) = walk::single_sequence(&rule.body) else {
        return false;
    };
    let [_, second] = top.elements.as_slice() else {
        return false;
    };
    let AtomicElement::Repeat(repeat_body) = &second.element else {
        return false;
    };
    let Some(inner) = walk::single_sequence(repeat_body) else {
        return false;
    };
    let [_, right] = inner.elements.as_slice() else {
        return false;
    };
    matches!(&right.element, AtomicElement::RuleRef(name) if *name == rule.name)
}

fn check_precedence(rule: &Rule, precedence_count: usize, issues: &mut Vec<Issue>) {
    if precedence_count > 1 {
        issues.push(Issue::new(
            Some(&rule.name),
            IssueCode::PrecedenceDuplicate,
            format!("rule {} has duplicate @precedence annotations", rule.name),
            "Keep a single @precedence(level=...) annotation.".to_string(),
        ));
    }

    for annotation in &rule.annotations {
        if let Annotation::Precedence { level } = annotation
            && *level < 0
        {
            issues.push(Issue::new(
                Some(&rule.name),
                IssueCode::PrecedenceNegative,
                format!("rule {} has invalid @precedence level: {level}", rule.name),
                "Use a non-negative integer (e.g. @precedence(level=10)).".to_string(),
            ));
        }
    }

    if rule.has_left_assoc() && rule.has_right_assoc() {
        // Already reported as E-ASSOC-BOTH; keep precedence checks stable.
        return;
    }

    if precedence_count > 0 && !rule.has_left_assoc() && !rule.has_right_assoc() {
        issues.push(Issue::new(
            Some(&rule.name),
            IssueCode::PrecedenceNoAssoc,
            format!(
                "rule {} uses @precedence but has no @leftAssoc/@rightAssoc",
                rule.name
            ),
            "Add one associativity annotation alongside @precedence.".to_string(),
        ));
    }
}

// ============================================================================
// Grammar-level checks
// ============================================================================

fn check_global_whitespace(grammar: &Grammar, issues: &mut Vec<Issue>) {
    let Some(profile) = grammar.string_setting("whitespace") else {
        return;
    };
    let profile = profile.trim();
    if !profile.eq_ignore_ascii_case(DEFAULT_WHITESPACE_PROFILE) {
        issues.push(Issue::new(
            None,
            IssueCode::WhitespaceGlobalProfile,
            format!("global @whitespace profile must be javaStyle: {profile}"),
            "Use '@whitespace: javaStyle'.".to_string(),
        ));
    }
}

/// Every `@whitespace` annotation is checked, not just the effective
/// (last) one, so a bad profile cannot hide behind a later good one.
fn check_rule_whitespace(rule: &Rule, profile: Option<&str>, issues: &mut Vec<Issue>) {
    let profile = profile.unwrap_or(DEFAULT_WHITESPACE_PROFILE).trim();
    if !profile.eq_ignore_ascii_case(DEFAULT_WHITESPACE_PROFILE)
        && !profile.eq_ignore_ascii_case("none")
    {
        issues.push(Issue::new(
            Some(&rule.name),
            IssueCode::WhitespaceRuleProfile,
            format!(
                "rule {} uses unsupported @whitespace profile: {profile} (allowed: javaStyle, none)",
                rule.name
            ),
            "Use @whitespace or @whitespace(none).".to_string(),
        ));
    }
}

/// Every operand reference from a precedence-bearing operator rule to
/// another one must point at a strictly tighter (numerically greater)
/// level. Checked edge by edge, which conservatively rejects inversions in
/// deeper or non-linear reference graphs too.
fn check_precedence_topology(grammar: &Grammar, issues: &mut Vec<Issue>) {
    for rule in &grammar.rules {
        let (Some(level), Some(_)) = (rule.precedence(), rule.assoc()) else {
            continue;
        };
        for ref_name in walk::referenced_rules(&rule.body) {
            if ref_name == rule.name {
                continue;
            }
            let Some(ref_rule) = grammar.rule(&ref_name) else {
                continue;
            };
            if ref_rule.assoc().is_none() {
                continue;
            }
            let Some(ref_level) = ref_rule.precedence() else {
                continue;
            };
            if ref_level <= level {
                issues.push(Issue::new(
                    Some(&rule.name),
                    IssueCode::PrecedenceTopology,
                    format!(
                        "rule {} precedence {level} must be lower than referenced operator rule {ref_name} precedence {ref_level}",
                        rule.name
                    ),
                    format!("Decrease {} level or increase {ref_name} level.", rule.name),
                ));
            }
        }
    }
}

/// Two operator rules sharing a precedence level must share associativity.
fn check_associativity_consistency(grammar: &Grammar, issues: &mut Vec<Issue>) {
    let mut assoc_by_level: IndexMap<i32, Assoc> = IndexMap::new();
    for rule in &grammar.rules {
        let Some(assoc) = rule.assoc() else {
            continue;
        };
        let Some(level) = rule.precedence() else {
            continue;
        };
        match assoc_by_level.get(&level) {
            None => {
                assoc_by_level.insert(level, assoc);
            }
            Some(existing) if *existing == assoc => {}
            Some(existing) => {
                issues.push(Issue::new(
                    Some(&rule.name),
                    IssueCode::PrecedenceMixedAssoc,
                    format!(
                        "precedence level {level} mixes associativity: {existing:?} and {assoc:?}"
                    ),
                    "Use one associativity per precedence level.".to_string(),
                ));
            }
        }
    }
}
