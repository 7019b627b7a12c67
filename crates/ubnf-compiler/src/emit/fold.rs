//! Fold planning for associativity-annotated operator rules.
//!
//! A fold plan records where the `left`/`op`/`right` values of an operator
//! chain come from and which repeat helper holds the chain. The generic
//! [`fold_left`]/[`fold_right`] builders are the executable halves, shared
//! by the downstream tree-mapping emitter and the tests.

use serde::Serialize;
use ubnf_core::grammar::walk;
use ubnf_core::{Assoc, AtomicElement, Grammar, Rule};

use super::matcher::{operator_repeat_ordinal, HelperKey, HelperKind};

/// Where one fold operand's value comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum OperandSource {
    /// Matched literal text.
    Terminal,
    /// A declared token's matched text.
    Token(String),
    /// A rule without a mapping; only its raw text is available.
    RuleText(String),
    /// A mapping-bearing rule's generated node.
    RuleNode { rule: String, class: String },
    /// The canonical right-recursive reference to the rule itself.
    SelfRecursion,
}

/// Fold plan for one operator rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FoldProcedure {
    pub rule: String,
    /// Node class every fold step constructs.
    pub node_class: String,
    pub assoc: Assoc,
    /// The repeat helper holding the operator chain, numbered exactly as
    /// the matcher pass numbers it.
    pub repeat: HelperKey,
    pub left: OperandSource,
    pub op: OperandSource,
    pub right: OperandSource,
}

/// Plan the fold for `rule`. `Some` only for rules carrying exactly one
/// associativity annotation plus a `left`/`op`/`right` mapping; anything
/// else has no operator chain to fold.
pub fn emit_fold(grammar: &Grammar, rule: &Rule) -> Option<FoldProcedure> {
    let assoc = rule.assoc()?;
    let mapping = rule.mapping()?;
    for required in ["left", "op", "right"] {
        if !mapping.params.iter().any(|p| p == required) {
            return None;
        }
    }

    let left = operand_source(grammar, rule, "left")?;
    let op = operand_source(grammar, rule, "op")?;
    let right = operand_source(grammar, rule, "right")?;

    Some(FoldProcedure {
        rule: rule.name.clone(),
        node_class: mapping.class_name.to_string(),
        assoc,
        repeat: HelperKey {
            rule: rule.name.clone(),
            kind: HelperKind::Repeat,
            ordinal: operator_repeat_ordinal(rule),
        },
        left,
        op,
        right,
    })
}

fn operand_source(grammar: &Grammar, rule: &Rule, field: &str) -> Option<OperandSource> {
    let sites = walk::capture_sites(&rule.body, field);
    let site = sites.first()?;
    classify(grammar, rule, site.element)
}

/// Captured elements are normalized through single-element wrappers
/// before classification; token names shadow rule names, as in matching.
fn classify(grammar: &Grammar, rule: &Rule, element: &AtomicElement) -> Option<OperandSource> {
    match element {
        AtomicElement::Terminal(_) => Some(OperandSource::Terminal),
        AtomicElement::RuleRef(name) => {
            if *name == rule.name {
                return Some(OperandSource::SelfRecursion);
            }
            if let Some(token) = grammar.token(name) {
                return Some(OperandSource::Token(token.name.clone()));
            }
            match grammar.rule(name).and_then(Rule::mapping) {
                Some(mapping) => Some(OperandSource::RuleNode {
                    rule: name.clone(),
                    class: mapping.class_name.to_string(),
                }),
                None => Some(OperandSource::RuleText(name.clone())),
            }
        }
        AtomicElement::Repeat(body) | AtomicElement::Optional(body) | AtomicElement::Group(body) => {
            let inner = walk::single_element(body)?;
            classify(grammar, rule, &inner.element)
        }
    }
}

/// Build a left-leaning chain from a first operand and parallel operator
/// and operand sequences.
///
/// `ops` and `rests` must have equal length; the validator guarantees the
/// shape, so a mismatch here is a contract violation and fails loudly.
pub fn fold_left<N, O>(
    first: N,
    ops: Vec<O>,
    rests: Vec<N>,
    mut join: impl FnMut(N, O, N) -> N,
) -> N {
    assert_eq!(
        ops.len(),
        rests.len(),
        "fold_left: operator/operand arity mismatch"
    );
    let mut result = first;
    for (op, rest) in ops.into_iter().zip(rests) {
        result = join(result, op, rest);
    }
    result
}

/// One right-fold step. With no trailing operator the left operand is
/// returned unchanged, terminating the recursion; otherwise the caller
/// passes an already-folded right side and recursion right-associates
/// without any explicit loop.
pub fn fold_right<N, O>(left: N, tail: Option<(O, N)>, join: impl FnOnce(N, O, N) -> N) -> N {
    match tail {
        None => left,
        Some((op, right)) => join(left, op, right),
    }
}
