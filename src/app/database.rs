//! The Database façade.
//!
//! This module is the single entry point callers use. It is responsible for:
//! 1.  Registering tables through the `SchemaRegistry` it owns.
//! 2.  Resolving every CRUD call against that registry and translating its
//!     condition into the canonical predicate before the engine sees it.
//! 3.  Tracking the connection lifecycle of the underlying engine.

use crate::app::lifecycle::{ConnectionState, Lifecycle};
use crate::domain::condition::{
    translate, translate_spec, Condition, ConditionSpec, OperatorFilters, OrderBy,
    TranslationError, Window,
};
use crate::domain::ident::validate_ident;
use crate::domain::schema::{
    Association, FieldSchema, SchemaRegistry, TableDescription, TableHandle, TableOptions,
};
use crate::domain::Record;
use crate::error::{EngineError, StoreError, StoreResult};
use crate::infra::config::StoreConfig;
use crate::storage::{Query, RawQueryOptions, RawQueryResult, SqliteEngine, StorageEngine};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Ordering and row cap for `find`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindOptions {
    #[serde(default)]
    pub order: Vec<OrderBy>,
    #[serde(default)]
    pub limit: Option<u64>,
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub data: Vec<Record>,
    pub total: u64,
    pub page: u64,
    pub pages: u64,
    pub has_more: bool,
}

impl Page {
    pub fn new(data: Vec<Record>, total: u64, page: u64, page_size: u64) -> Self {
        let pages = if page_size == 0 {
            0
        } else {
            (total + page_size - 1) / page_size
        };
        Self {
            data,
            total,
            page,
            pages,
            has_more: page < pages,
        }
    }
}

fn engine_failure<'a>(
    table: &'a str,
    operation: &'static str,
) -> impl FnOnce(EngineError) -> StoreError + 'a {
    move |e| {
        tracing::error!(table, operation, error = %e, "storage engine operation failed");
        StoreError::Engine(e)
    }
}

fn check_fields<'a, I>(fields: I) -> Result<(), TranslationError>
where
    I: IntoIterator<Item = &'a str>,
{
    for field in fields {
        if !validate_ident(field) {
            return Err(TranslationError::InvalidField(field.to_string()));
        }
    }
    Ok(())
}

/// Backend-agnostic CRUD surface over one storage engine.
pub struct Database {
    engine: Arc<dyn StorageEngine>,
    registry: RwLock<SchemaRegistry>,
    lifecycle: Lifecycle,
}

impl Database {
    pub fn new(engine: Arc<dyn StorageEngine>) -> Self {
        Self {
            engine,
            registry: RwLock::new(SchemaRegistry::new()),
            lifecycle: Lifecycle::new(),
        }
    }

    /// Opens the configured engine. Nothing is connected yet; see [`connect`](Self::connect).
    pub async fn open(config: &StoreConfig) -> StoreResult<Self> {
        let engine = SqliteEngine::open(config).await.map_err(|e| {
            tracing::error!(error = %e, "failed to open storage engine");
            StoreError::Engine(e)
        })?;
        Ok(Self::new(Arc::new(engine)))
    }

    pub fn engine(&self) -> &Arc<dyn StorageEngine> {
        &self.engine
    }

    // --- lifecycle ---

    /// Returns false (after logging) if the engine rejects the connection.
    pub async fn connect(&self) -> bool {
        self.lifecycle.connect(self.engine.as_ref()).await
    }

    pub async fn close(&self) {
        self.lifecycle.close(self.engine.as_ref()).await
    }

    pub async fn state(&self) -> ConnectionState {
        self.lifecycle.state().await
    }

    pub async fn is_connected(&self) -> bool {
        self.state().await == ConnectionState::Connected
    }

    // --- schema registry ---

    /// Registers `name` or returns the handle it is already registered with.
    pub async fn define(
        &self,
        name: &str,
        fields: FieldSchema,
        options: TableOptions,
    ) -> StoreResult<Arc<TableHandle>> {
        if let Some(existing) = self.registry.read().await.resolve(name) {
            return Ok(existing);
        }
        // The write lock is held across the engine call so concurrent
        // definitions of one name resolve to the first writer's handle.
        let mut registry = self.registry.write().await;
        registry
            .register(self.engine.as_ref(), name, fields, options)
            .await
    }

    pub async fn table(&self, name: &str) -> Option<Arc<TableHandle>> {
        self.registry.read().await.resolve(name)
    }

    pub async fn list_tables(&self) -> Vec<String> {
        self.registry.read().await.list_tables()
    }

    pub async fn describe(&self, name: &str) -> Option<TableDescription> {
        self.registry.read().await.describe(name)
    }

    pub async fn associate(&self, name: &str, association: Association) -> StoreResult<()> {
        self.resolve(name).await?.associate(association);
        Ok(())
    }

    async fn resolve(&self, name: &str) -> StoreResult<Arc<TableHandle>> {
        self.table(name)
            .await
            .ok_or_else(|| StoreError::TableNotRegistered(name.to_string()))
    }

    // --- writes ---

    /// Inserts one record and returns it as stored, system fields included.
    pub async fn insert(&self, table: &str, mut record: Record) -> StoreResult<Record> {
        let handle = self.resolve(table).await?;
        check_fields(record.keys().map(|k| k.as_str()))?;
        handle.definition().apply_defaults(&mut record);
        handle
            .table()
            .create(&record)
            .await
            .map_err(engine_failure(table, "insert"))
    }

    /// Inserts every record in one engine batch. An empty batch returns an
    /// empty result without reaching the engine.
    pub async fn insert_many(
        &self,
        table: &str,
        mut records: Vec<Record>,
    ) -> StoreResult<Vec<Record>> {
        let handle = self.resolve(table).await?;
        if records.is_empty() {
            return Ok(Vec::new());
        }
        for record in &mut records {
            check_fields(record.keys().map(|k| k.as_str()))?;
            handle.definition().apply_defaults(record);
        }
        handle
            .table()
            .bulk_create(&records)
            .await
            .map_err(engine_failure(table, "insert_many"))
    }

    /// Applies `changes` to every matching row and returns the affected count.
    pub async fn update(
        &self,
        table: &str,
        mut changes: Record,
        condition: &Condition,
    ) -> StoreResult<u64> {
        let handle = self.resolve(table).await?;
        check_fields(changes.keys().map(|k| k.as_str()))?;
        let predicate = translate(condition)?;
        handle.definition().stamp_update(&mut changes);
        handle
            .table()
            .update(&changes, &predicate)
            .await
            .map_err(engine_failure(table, "update"))
    }

    pub async fn delete(&self, table: &str, condition: &Condition) -> StoreResult<u64> {
        let handle = self.resolve(table).await?;
        let predicate = translate(condition)?;
        handle
            .table()
            .destroy(&predicate)
            .await
            .map_err(engine_failure(table, "delete"))
    }

    // --- reads ---

    pub async fn find(&self, table: &str, condition: &Condition) -> StoreResult<Vec<Record>> {
        self.find_with(table, condition, &FindOptions::default())
            .await
    }

    pub async fn find_with(
        &self,
        table: &str,
        condition: &Condition,
        options: &FindOptions,
    ) -> StoreResult<Vec<Record>> {
        let handle = self.resolve(table).await?;
        check_fields(options.order.iter().map(|o| o.field.as_str()))?;
        let query = Query {
            predicate: translate(condition)?,
            attributes: None,
            order: options.order.clone(),
            window: options.limit.map(|limit| Window { offset: 0, limit }),
        };
        handle
            .table()
            .find_all(&query)
            .await
            .map_err(engine_failure(table, "find"))
    }

    pub async fn find_one(
        &self,
        table: &str,
        condition: &Condition,
    ) -> StoreResult<Option<Record>> {
        let handle = self.resolve(table).await?;
        let query = Query::filter(translate(condition)?);
        handle
            .table()
            .find_one(&query)
            .await
            .map_err(engine_failure(table, "find_one"))
    }

    pub async fn find_by_id(&self, table: &str, id: i64) -> StoreResult<Option<Record>> {
        let handle = self.resolve(table).await?;
        handle
            .table()
            .find_by_primary_key(id)
            .await
            .map_err(engine_failure(table, "find_by_id"))
    }

    pub async fn count(&self, table: &str, condition: &Condition) -> StoreResult<u64> {
        let handle = self.resolve(table).await?;
        let predicate = translate(condition)?;
        handle
            .table()
            .count(&predicate)
            .await
            .map_err(engine_failure(table, "count"))
    }

    /// Returns page `page` (1-based) of the matching rows, ordered by primary
    /// key when the table has a single one.
    pub async fn search_paginated(
        &self,
        table: &str,
        condition: &Condition,
        page: i64,
        page_size: i64,
    ) -> StoreResult<Page> {
        let handle = self.resolve(table).await?;
        let spec = ConditionSpec::Paginated {
            condition: condition.clone(),
            page,
            page_size,
        };
        let (predicate, window) = translate_spec(&spec)?;

        let order = match handle.definition().primary_keys().as_slice() {
            [pk] => vec![OrderBy::asc(*pk)],
            _ => Vec::new(),
        };

        let total = handle
            .table()
            .count(&predicate)
            .await
            .map_err(engine_failure(table, "search_paginated"))?;
        let query = Query {
            predicate,
            attributes: None,
            order,
            window,
        };
        let data = handle
            .table()
            .find_all(&query)
            .await
            .map_err(engine_failure(table, "search_paginated"))?;

        // Page and page size were checked positive during translation.
        Ok(Page::new(data, total, page as u64, page_size as u64))
    }

    /// Like `find`, but each record carries only the projected fields.
    pub async fn search_fields(
        &self,
        table: &str,
        condition: &Condition,
        fields: &[String],
    ) -> StoreResult<Vec<Record>> {
        let handle = self.resolve(table).await?;
        check_fields(fields.iter().map(|f| f.as_str()))?;
        let query = Query {
            predicate: translate(condition)?,
            attributes: Some(fields.to_vec()),
            order: Vec::new(),
            window: None,
        };
        handle
            .table()
            .find_all(&query)
            .await
            .map_err(engine_failure(table, "search_fields"))
    }

    // --- the separate search entry points, all lowered through `translate` ---

    /// Exact-match search: `field = value` for every pair.
    pub async fn search(
        &self,
        table: &str,
        values: IndexMap<String, JsonValue>,
    ) -> StoreResult<Vec<Record>> {
        self.find(table, &Condition::Exact { values }).await
    }

    /// Case-insensitive substring search on one field.
    pub async fn search_text(
        &self,
        table: &str,
        field: &str,
        term: &str,
    ) -> StoreResult<Vec<Record>> {
        self.find(table, &Condition::text(field, term)).await
    }

    /// Operator-map search.
    pub async fn search_advanced(
        &self,
        table: &str,
        filters: OperatorFilters,
    ) -> StoreResult<Vec<Record>> {
        self.find(table, &Condition::from(filters)).await
    }

    // --- passthrough ---

    /// Runs an engine-native statement as-is. No registry lookup, no
    /// translation.
    pub async fn query(
        &self,
        statement: &str,
        options: &RawQueryOptions,
    ) -> StoreResult<RawQueryResult> {
        self.engine
            .raw_query(statement, options)
            .await
            .map_err(engine_failure("<raw>", "query"))
    }
}

#[cfg(test)]
mod tests {
    use super::Page;

    #[test]
    fn page_metadata() {
        let page = Page::new(Vec::new(), 25, 2, 10);
        assert_eq!((page.pages, page.has_more), (3, true));

        let page = Page::new(Vec::new(), 25, 3, 10);
        assert_eq!((page.pages, page.has_more), (3, false));

        let page = Page::new(Vec::new(), 0, 1, 10);
        assert_eq!((page.pages, page.has_more), (0, false));

        let page = Page::new(Vec::new(), 20, 2, 10);
        assert_eq!((page.pages, page.has_more), (2, false));
    }

    #[test]
    fn page_serializes_camel_case() {
        let json = serde_json::to_value(Page::new(Vec::new(), 1, 1, 1)).unwrap();
        assert_eq!(json["hasMore"], serde_json::json!(false));
        assert_eq!(json["pages"], serde_json::json!(1));
    }
}
