//! The canonical predicate: a conjunction of per-field constraints.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Comparison {
    Eq(JsonValue),
    Ne(JsonValue),
    Gt(JsonValue),
    Gte(JsonValue),
    Lt(JsonValue),
    Lte(JsonValue),
    Like {
        pattern: String,
        case_insensitive: bool,
    },
    In(Vec<JsonValue>),
    Between(JsonValue, JsonValue),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub field: String,
    pub comparison: Comparison,
}

impl Constraint {
    pub fn new(field: impl Into<String>, comparison: Comparison) -> Self {
        Self {
            field: field.into(),
            comparison,
        }
    }
}

/// AND of every constraint. An empty predicate matches all rows.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Predicate {
    constraints: Vec<Constraint>,
}

impl Predicate {
    pub fn match_all() -> Self {
        Self::default()
    }

    pub fn and(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn push(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn is_match_all(&self) -> bool {
        self.constraints.is_empty()
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Comparison::Eq(v) => write!(f, "= {}", v),
            Comparison::Ne(v) => write!(f, "<> {}", v),
            Comparison::Gt(v) => write!(f, "> {}", v),
            Comparison::Gte(v) => write!(f, ">= {}", v),
            Comparison::Lt(v) => write!(f, "< {}", v),
            Comparison::Lte(v) => write!(f, "<= {}", v),
            Comparison::Like {
                pattern,
                case_insensitive: true,
            } => write!(f, "ILIKE {:?}", pattern),
            Comparison::Like { pattern, .. } => write!(f, "LIKE {:?}", pattern),
            Comparison::In(values) => {
                let rendered: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                write!(f, "IN ({})", rendered.join(", "))
            }
            Comparison::Between(low, high) => write!(f, "BETWEEN {} AND {}", low, high),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.constraints.is_empty() {
            return write!(f, "TRUE");
        }
        for (idx, c) in self.constraints.iter().enumerate() {
            if idx > 0 {
                write!(f, " AND ")?;
            }
            write!(f, "{} {}", c.field, c.comparison)?;
        }
        Ok(())
    }
}

/// Row window derived from a 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub offset: u64,
    pub limit: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    pub field: String,
    #[serde(default)]
    pub direction: Direction,
}

impl OrderBy {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Desc,
        }
    }
}
