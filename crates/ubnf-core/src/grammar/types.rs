//! Grammar type definitions.

use serde::{Deserialize, Serialize};

/// Whitespace profile assumed when `@whitespace` carries no argument.
pub const DEFAULT_WHITESPACE_PROFILE: &str = "javaStyle";

/// Complete grammar declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grammar {
    /// Grammar name (e.g., "TinyCalc").
    pub name: String,
    /// Global settings, preserving declaration order.
    #[serde(default)]
    pub settings: Vec<Setting>,
    /// Token declarations binding a name to an external matcher.
    #[serde(default)]
    pub tokens: Vec<TokenDecl>,
    /// Production rules, preserving declaration order.
    pub rules: Vec<Rule>,
}

/// Global setting: `@key: value`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Setting {
    pub key: String,
    pub value: SettingValue,
}

/// Setting payload: a plain string or a nested key/value block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettingValue {
    Str(String),
    Block(Vec<KeyValue>),
}

/// One entry of a block-valued setting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

/// Token declaration: `token NAME = Matcher`.
///
/// Token names shadow rule names wherever a rule reference is resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenDecl {
    pub name: String,
    /// Identifier of the external matcher implementing this token.
    pub matcher: String,
}

/// Rule declaration: `annotations* NAME ::= body ;`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub name: String,
    pub annotations: Vec<Annotation>,
    pub body: RuleBody,
}

/// Rule annotation variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Annotation {
    /// `@root` — marks the grammar entry rule.
    Root,
    /// `@mapping(ClassName, params=[a, b, c])` — output node type and fields.
    Mapping {
        class_name: String,
        params: Vec<String>,
    },
    /// `@whitespace` or `@whitespace(profile)`.
    Whitespace { profile: Option<String> },
    /// `@leftAssoc`.
    LeftAssoc,
    /// `@rightAssoc`.
    RightAssoc,
    /// `@precedence(level=10)`.
    Precedence { level: i32 },
    /// Any unrecognized annotation, passed through untouched.
    Simple { name: String },
}

/// Declared associativity of an operator rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Assoc {
    Left,
    Right,
}

/// Rule body: alternation of sequences, or a single sequence.
///
/// A `Choice` with exactly one alternative is semantically a `Sequence`;
/// consumers normalize through [`walk::single_sequence`](super::walk).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleBody {
    Choice(Vec<Sequence>),
    Sequence(Sequence),
}

/// Ordered run of annotated elements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequence {
    pub elements: Vec<AnnotatedElement>,
}

/// An atomic element plus an optional capture name.
///
/// Capture names need not be unique within a sequence; a name may recur
/// across repeat iterations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedElement {
    pub element: AtomicElement,
    pub capture: Option<String>,
}

/// Atomic body element variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AtomicElement {
    /// `( body )`
    Group(Box<RuleBody>),
    /// `[ body ]`
    Optional(Box<RuleBody>),
    /// `{ body }` — zero or more.
    Repeat(Box<RuleBody>),
    /// `'literal'`
    Terminal(String),
    /// Non-terminal reference by name.
    RuleRef(String),
}

/// Borrowed view of a rule's `@mapping` annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mapping<'a> {
    pub class_name: &'a str,
    pub params: &'a [String],
}

impl Grammar {
    /// Look up a rule by name.
    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.name == name)
    }

    /// Look up a token declaration by name.
    pub fn token(&self, name: &str) -> Option<&TokenDecl> {
        self.tokens.iter().find(|t| t.name == name)
    }

    /// The `@root`-annotated rule, falling back to the first declared rule.
    pub fn root_rule(&self) -> Option<&Rule> {
        self.rules
            .iter()
            .find(|r| r.is_root())
            .or_else(|| self.rules.first())
    }

    /// String value of a global setting, if declared with a string payload.
    pub fn string_setting(&self, key: &str) -> Option<&str> {
        self.settings.iter().find(|s| s.key == key).and_then(|s| {
            match &s.value {
                SettingValue::Str(v) => Some(v.as_str()),
                SettingValue::Block(_) => None,
            }
        })
    }

    /// Block entries of a global setting, if declared with a block payload.
    pub fn block_setting(&self, key: &str) -> Option<&[KeyValue]> {
        self.settings.iter().find(|s| s.key == key).and_then(|s| {
            match &s.value {
                SettingValue::Str(_) => None,
                SettingValue::Block(entries) => Some(entries.as_slice()),
            }
        })
    }
}

impl Rule {
    /// First `@mapping` annotation, if any.
    pub fn mapping(&self) -> Option<Mapping<'_>> {
        self.annotations.iter().find_map(|a| match a {
            Annotation::Mapping { class_name, params } => Some(Mapping {
                class_name,
                params,
            }),
            _ => None,
        })
    }

    pub fn is_root(&self) -> bool {
        self.annotations.iter().any(|a| matches!(a, Annotation::Root))
    }

    pub fn has_left_assoc(&self) -> bool {
        self.annotations
            .iter()
            .any(|a| matches!(a, Annotation::LeftAssoc))
    }

    pub fn has_right_assoc(&self) -> bool {
        self.annotations
            .iter()
            .any(|a| matches!(a, Annotation::RightAssoc))
    }

    /// Declared associativity when the rule carries exactly one of
    /// `@leftAssoc`/`@rightAssoc`. `None` when absent or contradictory.
    pub fn assoc(&self) -> Option<Assoc> {
        match (self.has_left_assoc(), self.has_right_assoc()) {
            (true, false) => Some(Assoc::Left),
            (false, true) => Some(Assoc::Right),
            _ => None,
        }
    }

    /// Declared precedence level; the last annotation wins.
    pub fn precedence(&self) -> Option<i32> {
        self.annotations
            .iter()
            .filter_map(|a| match a {
                Annotation::Precedence { level } => Some(*level),
                _ => None,
            })
            .last()
    }

    /// Effective whitespace profile from the rule's `@whitespace`
    /// annotations; the last one wins. A bare `@whitespace` means
    /// [`DEFAULT_WHITESPACE_PROFILE`]. `None` when no annotation is present.
    pub fn whitespace_profile(&self) -> Option<&str> {
        self.annotations
            .iter()
            .filter_map(|a| match a {
                Annotation::Whitespace { profile } => {
                    Some(profile.as_deref().unwrap_or(DEFAULT_WHITESPACE_PROFILE))
                }
                _ => None,
            })
            .last()
    }
}
