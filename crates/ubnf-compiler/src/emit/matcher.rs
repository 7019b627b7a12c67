//! Rule-body to matcher-expression translation.
//!
//! Capture annotations are invisible here; they only matter to `typegen`
//! and `fold`. The translation synthesizes helper matchers for nested
//! shapes that need a named boundary, numbering them per (rule, kind) in
//! first-encountered depth-first order so the output is stable across runs.

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;
use ubnf_core::grammar::walk;
use ubnf_core::{AnnotatedElement, AtomicElement, Grammar, Rule, RuleBody, Sequence};

/// Kind of synthesized helper matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum HelperKind {
    Repeat,
    Optional,
    Group,
}

impl HelperKind {
    fn label(self) -> &'static str {
        match self {
            HelperKind::Repeat => "Repeat",
            HelperKind::Optional => "Optional",
            HelperKind::Group => "Group",
        }
    }
}

/// Identity of a synthesized helper: owning rule, shape kind, and the
/// per-(rule, kind) ordinal assigned during emission.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct HelperKey {
    pub rule: String,
    pub kind: HelperKind,
    pub ordinal: u32,
}

impl HelperKey {
    /// Rendered matcher name, e.g. `ExprRepeat1`.
    pub fn name(&self) -> String {
        format!("{}{}{}", self.rule, self.kind.label(), self.ordinal)
    }
}

impl fmt::Display for HelperKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Characters skipped between adjacent sequence elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SkipSet {
    pub blanks: bool,
    pub line_comments: bool,
}

impl SkipSet {
    pub fn is_empty(self) -> bool {
        !self.blanks && !self.line_comments
    }
}

/// One node of a compiled matcher expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum MatcherExpr {
    /// Exact-text primitive.
    Literal(String),
    /// Reference to another rule's matcher.
    Rule(String),
    /// Reference to a declared token's external matcher. Token names
    /// shadow rule names.
    Token { name: String, matcher: String },
    ZeroOrMore(Box<MatcherExpr>),
    Optional(Box<MatcherExpr>),
    Helper(HelperKey),
    /// Inline anonymous sequence (multi-element choice alternative).
    Seq(Vec<MatcherExpr>),
    Choice(Vec<MatcherExpr>),
}

/// Top-level shape of a rule or helper matcher. Alternation-shaped
/// matchers delegate skipping to their branches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MatcherShape {
    Sequence,
    Alternation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleMatcher {
    pub rule: String,
    pub shape: MatcherShape,
    pub skip: SkipSet,
    pub expr: MatcherExpr,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HelperMatcher {
    pub key: HelperKey,
    pub shape: MatcherShape,
    pub skip: SkipSet,
    pub expr: MatcherExpr,
}

/// Emission result: one matcher per rule in declaration order, plus every
/// synthesized helper keyed by its triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatcherSet {
    pub rules: Vec<RuleMatcher>,
    pub helpers: IndexMap<HelperKey, HelperMatcher>,
}

impl MatcherSet {
    pub fn rule(&self, name: &str) -> Option<&RuleMatcher> {
        self.rules.iter().find(|m| m.rule == name)
    }

    pub fn helper(&self, key: &HelperKey) -> Option<&HelperMatcher> {
        self.helpers.get(key)
    }
}

/// Compile every rule body into matcher expressions.
pub fn emit(grammar: &Grammar) -> MatcherSet {
    let line_comments = has_line_comment_setting(grammar);
    let mut helpers = IndexMap::new();
    let mut rules = Vec::new();

    for rule in &grammar.rules {
        let skip = skip_set(rule, line_comments);
        let mut ctx = EmitCtx {
            grammar,
            rule: &rule.name,
            skip,
            repeat_ordinal: 0,
            optional_ordinal: 0,
            group_ordinal: 0,
            helpers: &mut helpers,
        };
        let (shape, expr) = ctx.body(&rule.body);
        rules.push(RuleMatcher {
            rule: rule.name.clone(),
            shape,
            skip,
            expr,
        });
    }

    MatcherSet { rules, helpers }
}

/// Ordinal the matcher pass assigns to the repeat helper whose body
/// captures both `op` and `right` (the operator chain), without emitting
/// anything. Repeat ordinals are counted exactly as `EmitCtx` counts
/// them, so non-chain repeats before the chain shift the result the same
/// way they shift the emitted helper's name.
pub(crate) fn operator_repeat_ordinal(rule: &Rule) -> u32 {
    fn scan_body(body: &RuleBody, next: &mut u32) -> Option<u32> {
        for alternative in walk::alternatives(body) {
            if let Some(found) = scan_sequence(alternative, next) {
                return Some(found);
            }
        }
        None
    }

    fn scan_sequence(sequence: &Sequence, next: &mut u32) -> Option<u32> {
        for element in &sequence.elements {
            match &element.element {
                AtomicElement::Repeat(body) => {
                    if inlines_repeat(body) {
                        continue;
                    }
                    *next += 1;
                    let ordinal = *next;
                    if holds_operator_chain(body) {
                        return Some(ordinal);
                    }
                    if let Some(found) = scan_body(body, next) {
                        return Some(found);
                    }
                }
                AtomicElement::Optional(body) | AtomicElement::Group(body) => {
                    if let Some(found) = scan_body(body, next) {
                        return Some(found);
                    }
                }
                AtomicElement::Terminal(_) | AtomicElement::RuleRef(_) => {}
            }
        }
        None
    }

    fn holds_operator_chain(body: &RuleBody) -> bool {
        let captures = walk::capture_names(body);
        captures.contains("op") && captures.contains("right")
    }

    let mut next = 0;
    scan_body(&rule.body, &mut next).unwrap_or(1)
}

fn inlines_repeat(body: &RuleBody) -> bool {
    matches!(
        walk::single_element(body),
        Some(AnnotatedElement {
            element: AtomicElement::RuleRef(_),
            ..
        })
    )
}

fn inlines_optional(body: &RuleBody) -> bool {
    matches!(
        walk::single_element(body),
        Some(AnnotatedElement {
            element: AtomicElement::RuleRef(_) | AtomicElement::Terminal(_),
            ..
        })
    )
}

fn skip_set(rule: &Rule, line_comments: bool) -> SkipSet {
    let skips_blanks = rule
        .whitespace_profile()
        .is_none_or(|profile| !profile.trim().eq_ignore_ascii_case("none"));
    if skips_blanks {
        SkipSet {
            blanks: true,
            line_comments,
        }
    } else {
        SkipSet {
            blanks: false,
            line_comments: false,
        }
    }
}

fn has_line_comment_setting(grammar: &Grammar) -> bool {
    grammar
        .block_setting("comment")
        .is_some_and(|entries| entries.iter().any(|kv| kv.key == "line"))
}

/// Mutable emission context for one rule. Helper ordinals are assigned
/// here, pre-order, and start again at 1 for every rule.
struct EmitCtx<'a> {
    grammar: &'a Grammar,
    rule: &'a str,
    skip: SkipSet,
    repeat_ordinal: u32,
    optional_ordinal: u32,
    group_ordinal: u32,
    helpers: &'a mut IndexMap<HelperKey, HelperMatcher>,
}

impl EmitCtx<'_> {
    fn body(&mut self, body: &RuleBody) -> (MatcherShape, MatcherExpr) {
        let alternatives = walk::alternatives(body);
        if alternatives.len() > 1 {
            let branches = alternatives
                .iter()
                .map(|alternative| self.sequence(alternative))
                .collect();
            (MatcherShape::Alternation, MatcherExpr::Choice(branches))
        } else {
            let expr = match alternatives.first() {
                Some(alternative) => self.sequence(alternative),
                None => MatcherExpr::Seq(Vec::new()),
            };
            (MatcherShape::Sequence, expr)
        }
    }

    fn sequence(&mut self, sequence: &Sequence) -> MatcherExpr {
        match sequence.elements.as_slice() {
            [single] => self.element(single),
            elements => MatcherExpr::Seq(elements.iter().map(|e| self.element(e)).collect()),
        }
    }

    fn element(&mut self, element: &AnnotatedElement) -> MatcherExpr {
        match &element.element {
            AtomicElement::Terminal(text) => MatcherExpr::Literal(text.clone()),
            AtomicElement::RuleRef(name) => self.reference(name),
            AtomicElement::Repeat(body) => {
                let inner = if inlines_repeat(body) {
                    self.inline_single(body)
                } else {
                    MatcherExpr::Helper(self.helper(HelperKind::Repeat, body))
                };
                MatcherExpr::ZeroOrMore(Box::new(inner))
            }
            AtomicElement::Optional(body) => {
                let inner = if inlines_optional(body) {
                    self.inline_single(body)
                } else {
                    MatcherExpr::Helper(self.helper(HelperKind::Optional, body))
                };
                MatcherExpr::Optional(Box::new(inner))
            }
            // Grouping always introduces a boundary, even for one element.
            AtomicElement::Group(body) => {
                MatcherExpr::Helper(self.helper(HelperKind::Group, body))
            }
        }
    }

    /// Single-element wrapper body that skipped helper synthesis.
    fn inline_single(&mut self, body: &RuleBody) -> MatcherExpr {
        match walk::single_element(body) {
            Some(element) => self.element(element),
            None => MatcherExpr::Seq(Vec::new()),
        }
    }

    fn reference(&self, name: &str) -> MatcherExpr {
        match self.grammar.token(name) {
            Some(token) => MatcherExpr::Token {
                name: token.name.clone(),
                matcher: token.matcher.clone(),
            },
            None => MatcherExpr::Rule(name.to_string()),
        }
    }

    fn helper(&mut self, kind: HelperKind, body: &RuleBody) -> HelperKey {
        let counter = match kind {
            HelperKind::Repeat => &mut self.repeat_ordinal,
            HelperKind::Optional => &mut self.optional_ordinal,
            HelperKind::Group => &mut self.group_ordinal,
        };
        *counter += 1;
        let key = HelperKey {
            rule: self.rule.to_string(),
            kind,
            ordinal: *counter,
        };

        // Ordinal is claimed before recursing, so nested helpers of the
        // same kind number after their parent.
        let (shape, expr) = self.body(body);
        let matcher = HelperMatcher {
            key: key.clone(),
            shape,
            skip: self.skip,
            expr,
        };
        self.helpers.insert(key.clone(), matcher);
        key
    }
}
