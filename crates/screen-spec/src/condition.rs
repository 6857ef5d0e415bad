//! The `show_if` condition language.
//!
//! A condition is one clause, or several clauses joined by ` OR ` or by
//! ` AND `. Only one joiner is honoured per condition and ` OR ` is checked
//! first. Each clause has one of two shapes:
//!
//! * `field contains 'value'`: the answer is a list holding `value`;
//! * `field == 'value'` / `field != 'value'`: string comparison against the
//!   answer's display form.
//!
//! Quotes around the value are optional. A clause matching neither shape is
//! kept as [`Clause::Unrecognized`] and evaluates as satisfied.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::answers::AnswerMap;

static CONTAINS_CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9_.]+)\s+contains\s+'?([A-Za-z0-9_\s/.\-]+)'?$")
        .expect("contains clause pattern compiles")
});

static COMPARE_CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9_.]+)\s*(==|!=)\s*'?([A-Za-z0-9_\s/.\-]+)'?$")
        .expect("comparison clause pattern compiles")
});

const OR_JOINER: &str = " OR ";
const AND_JOINER: &str = " AND ";

/// A single parsed clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Clause {
    Contains { field: String, value: String },
    Equals { field: String, value: String },
    NotEquals { field: String, value: String },
    Unrecognized(String),
}

impl Clause {
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if let Some(captures) = CONTAINS_CLAUSE.captures(text) {
            return Clause::Contains {
                field: captures[1].to_string(),
                value: captures[2].to_string(),
            };
        }
        if let Some(captures) = COMPARE_CLAUSE.captures(text) {
            let field = captures[1].to_string();
            let value = captures[3].to_string();
            return if &captures[2] == "==" {
                Clause::Equals { field, value }
            } else {
                Clause::NotEquals { field, value }
            };
        }
        tracing::warn!(clause = %text, "unrecognized condition clause evaluates as satisfied");
        Clause::Unrecognized(text.to_string())
    }

    pub fn evaluate(&self, answers: &AnswerMap) -> bool {
        match self {
            Clause::Contains { field, value } => match answers.get(field) {
                Some(Value::Array(items)) => items.iter().any(|item| item.as_str() == Some(value.as_str())),
                _ => false,
            },
            Clause::Equals { field, value } => answers.display_value(field) == *value,
            Clause::NotEquals { field, value } => answers.display_value(field) != *value,
            Clause::Unrecognized(_) => true,
        }
    }

    /// The field this clause reads, if it was recognized.
    pub fn field(&self) -> Option<&str> {
        match self {
            Clause::Contains { field, .. }
            | Clause::Equals { field, .. }
            | Clause::NotEquals { field, .. } => Some(field),
            Clause::Unrecognized(_) => None,
        }
    }
}

/// How the clauses of a condition combine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Combinator {
    Single(Clause),
    Any(Vec<Clause>),
    All(Vec<Clause>),
}

/// A parsed `show_if` condition. Serializes back to its source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Condition {
    source: String,
    combinator: Combinator,
}

impl Condition {
    pub fn parse(source: impl Into<String>) -> Self {
        let source = source.into();
        let combinator = if source.contains(OR_JOINER) {
            Combinator::Any(source.split(OR_JOINER).map(Clause::parse).collect())
        } else if source.contains(AND_JOINER) {
            Combinator::All(source.split(AND_JOINER).map(Clause::parse).collect())
        } else {
            Combinator::Single(Clause::parse(&source))
        };
        Self { source, combinator }
    }

    pub fn evaluate(&self, answers: &AnswerMap) -> bool {
        match &self.combinator {
            Combinator::Single(clause) => clause.evaluate(answers),
            Combinator::Any(clauses) => clauses.iter().any(|clause| clause.evaluate(answers)),
            Combinator::All(clauses) => clauses.iter().all(|clause| clause.evaluate(answers)),
        }
    }

    pub fn combinator(&self) -> &Combinator {
        &self.combinator
    }

    pub fn clauses(&self) -> &[Clause] {
        match &self.combinator {
            Combinator::Single(clause) => std::slice::from_ref(clause),
            Combinator::Any(clauses) | Combinator::All(clauses) => clauses.as_slice(),
        }
    }

    /// Field ids read by the recognized clauses.
    pub fn referenced_fields(&self) -> impl Iterator<Item = &str> {
        self.clauses().iter().filter_map(Clause::field)
    }
}

impl From<String> for Condition {
    fn from(source: String) -> Self {
        Self::parse(source)
    }
}

impl From<&str> for Condition {
    fn from(source: &str) -> Self {
        Self::parse(source)
    }
}

impl From<Condition> for String {
    fn from(condition: Condition) -> Self {
        condition.source
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Parses and evaluates a single clause in one go.
pub fn evaluate(clause: &str, answers: &AnswerMap) -> bool {
    Clause::parse(clause).evaluate(answers)
}
