#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core data structures for UBNF grammar declarations.
//!
//! A [`grammar::Grammar`] is the immutable model shared by every compiler
//! transform: the validator, the type-inference pass, and the matcher/fold
//! emitters. The model is built once by the front end and never mutated;
//! all transforms read it and produce independent outputs.

pub mod grammar;

pub use grammar::{
    AnnotatedElement, Annotation, Assoc, AtomicElement, Grammar, KeyValue, Mapping, Rule,
    RuleBody, Sequence, Setting, SettingValue, TokenDecl, DEFAULT_WHITESPACE_PROFILE,
};
