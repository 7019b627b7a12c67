//! Validation issue model.

use std::fmt;

use serde::Serialize;

/// Issue severity. Every current check reports `Error`; the shape keeps
/// room for advisory diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    Error,
    Warning,
}

/// Check category, matching the `E-<CATEGORY>-...` code namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Category {
    Mapping,
    Assoc,
    Whitespace,
    Precedence,
}

/// Stable issue codes of shape `E-<CATEGORY>-<REASON>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IssueCode {
    MappingDuplicateParam,
    MappingMissingCapture,
    MappingUnlistedCapture,
    AssocBoth,
    AssocNoMapping,
    AssocMissingParam,
    AssocMissingCapture,
    AssocNoRepeat,
    AssocNoncanonical,
    WhitespaceGlobalProfile,
    WhitespaceRuleProfile,
    PrecedenceNegative,
    PrecedenceDuplicate,
    PrecedenceNoAssoc,
    PrecedenceTopology,
    PrecedenceMixedAssoc,
}

impl IssueCode {
    pub fn as_str(self) -> &'static str {
        match self {
            IssueCode::MappingDuplicateParam => "E-MAPPING-DUPLICATE-PARAM",
            IssueCode::MappingMissingCapture => "E-MAPPING-MISSING-CAPTURE",
            IssueCode::MappingUnlistedCapture => "E-MAPPING-UNLISTED-CAPTURE",
            IssueCode::AssocBoth => "E-ASSOC-BOTH",
            IssueCode::AssocNoMapping => "E-ASSOC-NO-MAPPING",
            IssueCode::AssocMissingParam => "E-ASSOC-MISSING-PARAM",
            IssueCode::AssocMissingCapture => "E-ASSOC-MISSING-CAPTURE",
            IssueCode::AssocNoRepeat => "E-ASSOC-NO-REPEAT",
            IssueCode::AssocNoncanonical => "E-ASSOC-NONCANONICAL",
            IssueCode::WhitespaceGlobalProfile => "E-WHITESPACE-GLOBAL-PROFILE",
            IssueCode::WhitespaceRuleProfile => "E-WHITESPACE-RULE-PROFILE",
            IssueCode::PrecedenceNegative => "E-PRECEDENCE-NEGATIVE",
            IssueCode::PrecedenceDuplicate => "E-PRECEDENCE-DUPLICATE",
            IssueCode::PrecedenceNoAssoc => "E-PRECEDENCE-NO-ASSOC",
            IssueCode::PrecedenceTopology => "E-PRECEDENCE-TOPOLOGY",
            IssueCode::PrecedenceMixedAssoc => "E-PRECEDENCE-MIXED-ASSOC",
        }
    }

    pub fn category(self) -> Category {
        match self {
            IssueCode::MappingDuplicateParam
            | IssueCode::MappingMissingCapture
            | IssueCode::MappingUnlistedCapture => Category::Mapping,
            IssueCode::AssocBoth
            | IssueCode::AssocNoMapping
            | IssueCode::AssocMissingParam
            | IssueCode::AssocMissingCapture
            | IssueCode::AssocNoRepeat
            | IssueCode::AssocNoncanonical => Category::Assoc,
            IssueCode::WhitespaceGlobalProfile | IssueCode::WhitespaceRuleProfile => {
                Category::Whitespace
            }
            IssueCode::PrecedenceNegative
            | IssueCode::PrecedenceDuplicate
            | IssueCode::PrecedenceNoAssoc
            | IssueCode::PrecedenceTopology
            | IssueCode::PrecedenceMixedAssoc => Category::Precedence,
        }
    }
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Serialized issues carry the stable code string, not the variant name.
impl Serialize for IssueCode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One validation finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    /// Offending rule; `None` for grammar-level findings.
    pub rule: Option<String>,
    pub code: IssueCode,
    pub severity: Severity,
    pub category: Category,
    pub message: String,
    /// Remediation hint for the grammar author.
    pub hint: String,
}

impl Issue {
    pub fn new(rule: Option<&str>, code: IssueCode, message: String, hint: String) -> Self {
        Self {
            rule: rule.map(str::to_string),
            code,
            severity: Severity::Error,
            category: code.category(),
            message,
            hint,
        }
    }

    /// Sort key for deterministic reporting.
    pub fn sort_key(&self) -> (Option<&str>, &'static str, &str) {
        (self.rule.as_deref(), self.code.as_str(), &self.message)
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [code: {}] [hint: {}]",
            self.message, self.code, self.hint
        )
    }
}

/// Render issues as the newline-joined list used in aggregate errors.
pub fn render_issues(issues: &[Issue]) -> String {
    issues
        .iter()
        .map(|issue| format!(" - {issue}"))
        .collect::<Vec<_>>()
        .join("\n")
}
