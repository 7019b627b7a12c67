//! Operator metadata collected from associativity-annotated rules.

use serde::Serialize;
use ubnf_core::{Assoc, Grammar};

/// Precedence/associativity record for one operator rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperatorSpec {
    pub rule: String,
    /// Declared level; -1 when the rule carries no explicit precedence.
    pub precedence: i32,
    pub assoc: Assoc,
}

/// All operator specs of a grammar, sorted by (precedence, rule name).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OperatorTable {
    specs: Vec<OperatorSpec>,
}

/// Collect one spec per rule with exactly one associativity annotation.
pub fn operator_table(grammar: &Grammar) -> OperatorTable {
    let mut specs: Vec<OperatorSpec> = grammar
        .rules
        .iter()
        .filter_map(|rule| {
            let assoc = rule.assoc()?;
            Some(OperatorSpec {
                rule: rule.name.clone(),
                precedence: rule.precedence().unwrap_or(-1),
                assoc,
            })
        })
        .collect();
    specs.sort_by(|a, b| {
        (a.precedence, a.rule.as_str()).cmp(&(b.precedence, b.rule.as_str()))
    });
    OperatorTable { specs }
}

impl OperatorTable {
    pub fn specs(&self) -> &[OperatorSpec] {
        &self.specs
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn spec(&self, rule: &str) -> Option<&OperatorSpec> {
        self.specs.iter().find(|spec| spec.rule == rule)
    }

    /// Loosest-binding spec, the entry point of a precedence climb.
    pub fn lowest(&self) -> Option<&OperatorSpec> {
        self.specs.first()
    }

    /// Smallest declared level strictly above `level`.
    pub fn next_tighter(&self, level: i32) -> Option<i32> {
        self.specs
            .iter()
            .map(|spec| spec.precedence)
            .find(|&p| p > level)
    }

    /// Every spec declared at exactly `level`.
    pub fn at_level(&self, level: i32) -> impl Iterator<Item = &OperatorSpec> {
        self.specs.iter().filter(move |spec| spec.precedence == level)
    }

    /// Distinct levels, ascending.
    pub fn levels(&self) -> Vec<i32> {
        let mut levels: Vec<i32> = self.specs.iter().map(|spec| spec.precedence).collect();
        levels.dedup();
        levels
    }
}
