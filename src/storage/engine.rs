//! The storage engine boundary.
//!
//! The façade only ever talks to these traits; `storage::sqlite` is the
//! default implementation.

use crate::domain::condition::{OrderBy, Predicate, Window};
use crate::domain::schema::TableDefinition;
use crate::domain::Record;
use crate::error::EngineResult;
use crate::infra::config::Dialect;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;

/// A read request against one table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub predicate: Predicate,
    /// Projection. `None` selects every column.
    pub attributes: Option<Vec<String>>,
    pub order: Vec<OrderBy>,
    pub window: Option<Window>,
}

impl Query {
    pub fn filter(predicate: Predicate) -> Self {
        Self {
            predicate,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawQueryOptions {
    /// Positional parameters bound in order.
    #[serde(default)]
    pub params: Vec<JsonValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RawQueryResult {
    pub rows: Vec<Record>,
    pub rows_affected: u64,
    pub last_insert_id: Option<i64>,
}

/// Engine-level operations.
#[async_trait]
pub trait StorageEngine: Send + Sync {
    fn dialect(&self) -> Dialect;

    /// Binds a table definition to engine storage, creating it if missing.
    async fn define_table(
        &self,
        definition: &TableDefinition,
    ) -> EngineResult<Arc<dyn EngineTable>>;

    async fn raw_query(
        &self,
        statement: &str,
        options: &RawQueryOptions,
    ) -> EngineResult<RawQueryResult>;

    async fn authenticate(&self) -> EngineResult<()>;

    async fn close(&self) -> EngineResult<()>;
}

/// Table-level operations on a defined table.
#[async_trait]
pub trait EngineTable: Send + Sync {
    async fn create(&self, record: &Record) -> EngineResult<Record>;

    /// Creates every record or none of them.
    async fn bulk_create(&self, records: &[Record]) -> EngineResult<Vec<Record>>;

    async fn find_all(&self, query: &Query) -> EngineResult<Vec<Record>>;

    async fn find_one(&self, query: &Query) -> EngineResult<Option<Record>>;

    async fn find_by_primary_key(&self, id: i64) -> EngineResult<Option<Record>>;

    /// Returns the number of affected rows.
    async fn update(&self, changes: &Record, predicate: &Predicate) -> EngineResult<u64>;

    /// Returns the number of deleted rows.
    async fn destroy(&self, predicate: &Predicate) -> EngineResult<u64>;

    async fn count(&self, predicate: &Predicate) -> EngineResult<u64>;
}
