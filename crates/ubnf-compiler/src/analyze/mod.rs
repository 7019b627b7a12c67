//! Semantic validation of grammar declarations.
//!
//! The validator is the gate in front of every emission pass: it collects
//! issues for all rules before reporting, never stops at the first defect,
//! and never auto-corrects. A grammar with any issue must not reach the
//! emitters.

mod issue;
mod validation;

#[cfg(test)]
mod validation_tests;

pub use issue::{render_issues, Category, Issue, IssueCode, Severity};
pub use validation::{ensure_valid, validate};
