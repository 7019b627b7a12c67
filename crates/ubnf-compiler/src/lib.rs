#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Compiler core for UBNF grammars.
//!
//! Three transforms over one shared [`ubnf_core::Grammar`] model:
//! - `analyze` - semantic validation (the gate before any emission)
//! - `typegen` - field-type inference for generated syntax-tree nodes
//! - `emit` - matcher-expression emission and associativity fold plans
//!
//! All transforms are pure functions over the immutable model. The only
//! mutable state is the helper-naming context scoped to one emission run.

pub mod analyze;
pub mod emit;
pub mod typegen;

#[cfg(test)]
mod compile_tests;
#[cfg(test)]
pub mod test_utils;

use indexmap::IndexMap;
use ubnf_core::Grammar;

use analyze::Issue;
use emit::{FoldProcedure, MatcherSet, OperatorTable};
use typegen::FieldType;

/// Errors produced by the compiler entry points.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// The grammar failed semantic validation; nothing was emitted.
    #[error("grammar validation failed for {grammar}:\n{}", analyze::render_issues(.issues))]
    InvalidGrammar { grammar: String, issues: Vec<Issue> },
}

/// Result type for compiler operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything the downstream source emitters consume.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifacts {
    /// `(rule, parameter) -> FieldType` for every mapping-bearing rule.
    pub types: IndexMap<(String, String), FieldType>,
    /// Per-rule matcher expressions plus synthesized helpers.
    pub matchers: MatcherSet,
    /// Precedence/associativity metadata for operator rules.
    pub operators: OperatorTable,
    /// One fold plan per associativity-annotated rule.
    pub folds: Vec<FoldProcedure>,
}

/// Validate a grammar and, only if it is clean, run every emission pass.
///
/// A grammar with any validation issue produces [`Error::InvalidGrammar`]
/// and no artifacts at all.
pub fn compile(grammar: &Grammar) -> Result<Artifacts> {
    analyze::ensure_valid(grammar)?;

    let folds = grammar
        .rules
        .iter()
        .filter_map(|rule| emit::emit_fold(grammar, rule))
        .collect();

    Ok(Artifacts {
        types: typegen::type_map(grammar),
        matchers: emit::emit(grammar),
        operators: emit::operator_table(grammar),
        folds,
    })
}
