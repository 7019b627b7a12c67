use indexmap::IndexMap;
use serde::Serialize;
use ubnf_core::grammar::walk;
use ubnf_core::{AtomicElement, Grammar, Rule};

/// Element type of one captured occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TypeRef {
    /// Raw matched text.
    Text,
    /// Generated node class of a mapping-bearing rule.
    Node(String),
}

/// Inferred type of one generated node field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum FieldType {
    Scalar(TypeRef),
    Sequence(Box<FieldType>),
    Optional(Box<FieldType>),
    /// Ambiguous or unknown; the downstream emitter falls back to an
    /// untyped slot.
    Opaque,
}

/// Infer the type of `field` in `rule`.
///
/// All capture sites for the field are considered together: any occurrence
/// inside a `Repeat` makes the field a `Sequence`, otherwise any occurrence
/// inside an `Optional` makes it `Optional`. A `Group` is transparent and
/// adds no wrapping. Occurrences that disagree on the element type, or a
/// field with no capture at all, degrade to [`FieldType::Opaque`].
pub fn infer_field_type(grammar: &Grammar, rule: &Rule, field: &str) -> FieldType {
    let sites = walk::capture_sites(&rule.body, field);

    let mut agreed: Option<TypeRef> = None;
    let mut in_repeat = false;
    let mut in_optional = false;

    for site in &sites {
        in_repeat |= site.in_repeat;
        in_optional |= site.in_optional;

        let Some(ty) = element_type(grammar, site.element) else {
            return FieldType::Opaque;
        };
        match &agreed {
            None => agreed = Some(ty),
            Some(existing) if *existing == ty => {}
            Some(_) => return FieldType::Opaque,
        }
    }

    let Some(ty) = agreed else {
        return FieldType::Opaque;
    };
    let scalar = FieldType::Scalar(ty);
    if in_repeat {
        FieldType::Sequence(Box::new(scalar))
    } else if in_optional {
        FieldType::Optional(Box::new(scalar))
    } else {
        scalar
    }
}

/// Element type of one occurrence; `None` for shapes with no single
/// derivable type (multi-element wrapper bodies).
fn element_type(grammar: &Grammar, element: &AtomicElement) -> Option<TypeRef> {
    match element {
        AtomicElement::Terminal(_) => Some(TypeRef::Text),
        AtomicElement::RuleRef(name) => match grammar.rule(name).and_then(Rule::mapping) {
            Some(mapping) => Some(TypeRef::Node(mapping.class_name.to_string())),
            None => Some(TypeRef::Text),
        },
        AtomicElement::Repeat(body) | AtomicElement::Optional(body) | AtomicElement::Group(body) => {
            let inner = walk::single_element(body)?;
            element_type(grammar, &inner.element)
        }
    }
}

/// One `FieldType` per mapping parameter, in declaration order. Empty for
/// rules without a mapping.
pub fn rule_field_types(grammar: &Grammar, rule: &Rule) -> IndexMap<String, FieldType> {
    let Some(mapping) = rule.mapping() else {
        return IndexMap::new();
    };
    mapping
        .params
        .iter()
        .map(|param| (param.clone(), infer_field_type(grammar, rule, param)))
        .collect()
}

/// `(rule, parameter) -> FieldType` over every mapping-bearing rule, in
/// grammar declaration order.
pub fn type_map(grammar: &Grammar) -> IndexMap<(String, String), FieldType> {
    let mut map = IndexMap::new();
    for rule in &grammar.rules {
        for (param, ty) in rule_field_types(grammar, rule) {
            map.insert((rule.name.clone(), param), ty);
        }
    }
    map
}
