//! Shared structural traversals over rule bodies.
//!
//! Every compiler transform walks the same tree shape and differs only in
//! what it accumulates, so the traversals live here next to the model.

use indexmap::IndexSet;

use super::{AnnotatedElement, AtomicElement, RuleBody, Sequence};

/// A capture occurrence found somewhere in a rule body.
///
/// `in_optional` / `in_repeat` record whether the site sits transitively
/// inside an `Optional` / `Repeat` wrapper. `Group` is transparent and sets
/// neither flag.
#[derive(Debug, Clone, Copy)]
pub struct CaptureSite<'a> {
    pub element: &'a AtomicElement,
    pub in_optional: bool,
    pub in_repeat: bool,
}

/// Collect every capture name reachable in a body, in first-seen order.
///
/// Recurses into `Group`/`Optional`/`Repeat`; `Terminal`/`RuleRef` carry no
/// nested bodies.
pub fn capture_names(body: &RuleBody) -> IndexSet<String> {
    let mut names = IndexSet::new();
    collect_captures(body, &mut names);
    names
}

fn collect_captures(body: &RuleBody, names: &mut IndexSet<String>) {
    for seq in alternatives(body) {
        for ae in &seq.elements {
            if let Some(capture) = &ae.capture {
                names.insert(capture.clone());
            }
            match &ae.element {
                AtomicElement::Group(inner)
                | AtomicElement::Optional(inner)
                | AtomicElement::Repeat(inner) => collect_captures(inner, names),
                AtomicElement::Terminal(_) | AtomicElement::RuleRef(_) => {}
            }
        }
    }
}

/// Collect every referenced rule name in a body, in first-seen order.
pub fn referenced_rules(body: &RuleBody) -> IndexSet<String> {
    let mut refs = IndexSet::new();
    collect_refs(body, &mut refs);
    refs
}

fn collect_refs(body: &RuleBody, refs: &mut IndexSet<String>) {
    for seq in alternatives(body) {
        for ae in &seq.elements {
            match &ae.element {
                AtomicElement::RuleRef(name) => {
                    refs.insert(name.clone());
                }
                AtomicElement::Group(inner)
                | AtomicElement::Optional(inner)
                | AtomicElement::Repeat(inner) => collect_refs(inner, refs),
                AtomicElement::Terminal(_) => {}
            }
        }
    }
}

/// Whether a body contains a `Repeat` segment anywhere.
pub fn contains_repeat(body: &RuleBody) -> bool {
    alternatives(body).iter().any(|seq| {
        seq.elements.iter().any(|ae| match &ae.element {
            AtomicElement::Repeat(_) => true,
            AtomicElement::Group(inner) | AtomicElement::Optional(inner) => {
                contains_repeat(inner)
            }
            AtomicElement::Terminal(_) | AtomicElement::RuleRef(_) => false,
        })
    })
}

/// The alternatives of a body: one per `Choice` arm, or the lone sequence.
pub fn alternatives(body: &RuleBody) -> &[Sequence] {
    match body {
        RuleBody::Choice(alts) => alts,
        RuleBody::Sequence(seq) => std::slice::from_ref(seq),
    }
}

/// The single effective sequence of a body, normalizing a one-alternative
/// `Choice` down to its sequence. `None` for a real alternation.
pub fn single_sequence(body: &RuleBody) -> Option<&Sequence> {
    match body {
        RuleBody::Sequence(seq) => Some(seq),
        RuleBody::Choice(alts) if alts.len() == 1 => Some(&alts[0]),
        RuleBody::Choice(_) => None,
    }
}

/// The single element of a body, if it normalizes to a one-element sequence.
pub fn single_element(body: &RuleBody) -> Option<&AnnotatedElement> {
    let seq = single_sequence(body)?;
    match seq.elements.as_slice() {
        [only] => Some(only),
        _ => None,
    }
}

/// Find every occurrence of a capture name in a body, tracking the
/// transitive `Optional`/`Repeat` context of each site.
pub fn capture_sites<'a>(body: &'a RuleBody, name: &str) -> Vec<CaptureSite<'a>> {
    let mut sites = Vec::new();
    collect_sites(body, name, false, false, &mut sites);
    sites
}

fn collect_sites<'a>(
    body: &'a RuleBody,
    name: &str,
    in_optional: bool,
    in_repeat: bool,
    sites: &mut Vec<CaptureSite<'a>>,
) {
    for seq in alternatives(body) {
        for ae in &seq.elements {
            if ae.capture.as_deref() == Some(name) {
                sites.push(CaptureSite {
                    element: &ae.element,
                    in_optional,
                    in_repeat,
                });
            }
            match &ae.element {
                AtomicElement::Optional(inner) => {
                    collect_sites(inner, name, true, in_repeat, sites)
                }
                AtomicElement::Repeat(inner) => {
                    collect_sites(inner, name, in_optional, true, sites)
                }
                AtomicElement::Group(inner) => {
                    collect_sites(inner, name, in_optional, in_repeat, sites)
                }
                AtomicElement::Terminal(_) | AtomicElement::RuleRef(_) => {}
            }
        }
    }
}
