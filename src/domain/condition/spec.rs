//! Caller-facing condition shapes.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Per-field operator maps: `field -> {operator -> operand}`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperatorFilters(IndexMap<String, IndexMap<String, JsonValue>>);

impl OperatorFilters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `operator` with `operand` on `field`.
    pub fn op(
        mut self,
        field: impl Into<String>,
        operator: impl Into<String>,
        operand: impl Into<JsonValue>,
    ) -> Self {
        self.0
            .entry(field.into())
            .or_default()
            .insert(operator.into(), operand.into());
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &IndexMap<String, JsonValue>)> {
        self.0.iter()
    }
}

/// A filter description in one of the supported shapes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Condition {
    /// Matches every row.
    #[default]
    All,
    /// `field = value` for every pair.
    Exact { values: IndexMap<String, JsonValue> },
    /// Case-insensitive substring match on one field.
    Text { field: String, term: String },
    /// Operator map; see [`OperatorFilters`].
    Operators { filters: OperatorFilters },
}

impl Condition {
    pub fn all() -> Self {
        Condition::All
    }

    pub fn exact<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<JsonValue>,
    {
        Condition::Exact {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn text(field: impl Into<String>, term: impl Into<String>) -> Self {
        Condition::Text {
            field: field.into(),
            term: term.into(),
        }
    }
}

impl From<OperatorFilters> for Condition {
    fn from(filters: OperatorFilters) -> Self {
        Condition::Operators { filters }
    }
}

/// A condition, optionally wrapped with a 1-based page request.
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionSpec {
    Plain(Condition),
    Paginated {
        condition: Condition,
        page: i64,
        page_size: i64,
    },
}

impl From<Condition> for ConditionSpec {
    fn from(condition: Condition) -> Self {
        ConditionSpec::Plain(condition)
    }
}
