//! Grammar builders shared by the compiler test modules.

use ubnf_core::{
    AnnotatedElement, Annotation, AtomicElement, Grammar, Rule, RuleBody, Sequence, Setting,
    SettingValue, TokenDecl,
};

pub fn grammar(name: &str, rules: Vec<Rule>) -> Grammar {
    Grammar {
        name: name.to_string(),
        settings: Vec::new(),
        tokens: Vec::new(),
        rules,
    }
}

pub fn string_setting(key: &str, value: &str) -> Setting {
    Setting {
        key: key.to_string(),
        value: SettingValue::Str(value.to_string()),
    }
}

pub fn token(name: &str, matcher: &str) -> TokenDecl {
    TokenDecl {
        name: name.to_string(),
        matcher: matcher.to_string(),
    }
}

pub fn rule(name: &str, annotations: Vec<Annotation>, body: RuleBody) -> Rule {
    Rule {
        name: name.to_string(),
        annotations,
        body,
    }
}

pub fn mapping(class_name: &str, params: &[&str]) -> Annotation {
    Annotation::Mapping {
        class_name: class_name.to_string(),
        params: params.iter().map(|p| p.to_string()).collect(),
    }
}

pub fn sequence(elements: Vec<AnnotatedElement>) -> Sequence {
    Sequence { elements }
}

pub fn seq(elements: Vec<AnnotatedElement>) -> RuleBody {
    RuleBody::Sequence(sequence(elements))
}

pub fn choice(alternatives: Vec<Sequence>) -> RuleBody {
    RuleBody::Choice(alternatives)
}

pub fn term(literal: &str) -> AnnotatedElement {
    AnnotatedElement {
        element: AtomicElement::Terminal(literal.to_string()),
        capture: None,
    }
}

pub fn rref(name: &str) -> AnnotatedElement {
    AnnotatedElement {
        element: AtomicElement::RuleRef(name.to_string()),
        capture: None,
    }
}

pub fn rep(body: RuleBody) -> AnnotatedElement {
    AnnotatedElement {
        element: AtomicElement::Repeat(Box::new(body)),
        capture: None,
    }
}

pub fn opt(body: RuleBody) -> AnnotatedElement {
    AnnotatedElement {
        element: AtomicElement::Optional(Box::new(body)),
        capture: None,
    }
}

pub fn grp(body: RuleBody) -> AnnotatedElement {
    AnnotatedElement {
        element: AtomicElement::Group(Box::new(body)),
        capture: None,
    }
}

pub fn cap(mut element: AnnotatedElement, name: &str) -> AnnotatedElement {
    element.capture = Some(name.to_string());
    element
}

/// Canonical left-assoc operator rule: `Operand @left { (op @op Operand @right) }`.
pub fn left_assoc_rule(name: &str, class_name: &str, operand: &str, op: &str) -> Rule {
    rule(
        name,
        vec![
            Annotation::LeftAssoc,
            mapping(class_name, &["left", "op", "right"]),
        ],
        seq(vec![
            cap(rref(operand), "left"),
            rep(seq(vec![cap(term(op), "op"), cap(rref(operand), "right")])),
        ]),
    )
}

/// Canonical right-assoc operator rule: `Operand @left { (op @op Self @right) }`.
pub fn right_assoc_rule(name: &str, class_name: &str, operand: &str, op: &str) -> Rule {
    rule(
        name,
        vec![
            Annotation::RightAssoc,
            mapping(class_name, &["left", "op", "right"]),
        ],
        seq(vec![
            cap(rref(operand), "left"),
            rep(seq(vec![cap(term(op), "op"), cap(rref(name), "right")])),
        ]),
    )
}
