//! Emission passes over a validated grammar.
//!
//! `matcher` turns rule bodies into matcher expressions plus the helper
//! matchers they synthesize; `operators` collects precedence/associativity
//! metadata; `fold` plans how captured operator chains become nodes.

mod fold;
mod matcher;
mod operators;


pub use fold::{emit_fold, fold_left, fold_right, FoldProcedure, OperandSource};
pub use matcher::{
    emit, HelperKey, HelperKind, HelperMatcher, MatcherExpr, MatcherSet, MatcherShape,
    RuleMatcher, SkipSet,
};
pub use operators::{operator_table, OperatorSpec, OperatorTable};
