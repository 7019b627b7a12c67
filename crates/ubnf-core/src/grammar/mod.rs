//! Grammar declaration model.
//!
//! Mirrors the surface syntax one-to-one: a grammar holds ordered settings,
//! token declarations, and rules; a rule holds annotations and a body built
//! from choice/sequence/repeat/optional/group/terminal/rule-ref elements.

mod types;
pub mod walk;


pub use types::{
    AnnotatedElement, Annotation, Assoc, AtomicElement, Grammar, KeyValue, Mapping, Rule,
    RuleBody, Sequence, Setting, SettingValue, TokenDecl, DEFAULT_WHITESPACE_PROFILE,
};
