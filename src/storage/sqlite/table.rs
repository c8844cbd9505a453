use crate::domain::condition::{Comparison, Constraint, Predicate, Window};
use crate::domain::schema::TableDefinition;
use crate::domain::Record;
use crate::error::{EngineError, EngineResult};
use crate::storage::engine::{EngineTable, Query};
use crate::storage::sqlite::decode::decode_row;
use crate::storage::sqlite::sql;
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sqlx::{Row, SqlitePool};

/// A table defined in a sqlite database.
pub struct SqliteTable {
    pool: SqlitePool,
    definition: TableDefinition,
}

impl SqliteTable {
    pub fn new(pool: SqlitePool, definition: TableDefinition) -> Self {
        Self { pool, definition }
    }

    fn decode(&self, row: &sqlx::sqlite::SqliteRow) -> EngineResult<Record> {
        decode_row(row, Some(self.definition.fields()))
    }
}

#[async_trait]
impl EngineTable for SqliteTable {
    async fn create(&self, record: &Record) -> EngineResult<Record> {
        let mut builder = sql::insert(&self.definition, record);
        let row = builder.build().fetch_one(&self.pool).await?;
        self.decode(&row)
    }

    async fn bulk_create(&self, records: &[Record]) -> EngineResult<Vec<Record>> {
        let mut tx = self.pool.begin().await?;
        let mut created = Vec::with_capacity(records.len());
        for record in records {
            let mut builder = sql::insert(&self.definition, record);
            let row = builder.build().fetch_one(&mut *tx).await?;
            created.push(self.decode(&row)?);
        }
        // Dropping `tx` on an early return rolls the whole batch back.
        tx.commit().await?;
        Ok(created)
    }

    async fn find_all(&self, query: &Query) -> EngineResult<Vec<Record>> {
        let mut builder = sql::select(&self.definition, query);
        let rows = builder.build().fetch_all(&self.pool).await?;
        rows.iter().map(|row| self.decode(row)).collect()
    }

    async fn find_one(&self, query: &Query) -> EngineResult<Option<Record>> {
        let mut single = query.clone();
        single.window = Some(Window {
            offset: query.window.map(|w| w.offset).unwrap_or(0),
            limit: 1,
        });
        let mut builder = sql::select(&self.definition, &single);
        let row = builder.build().fetch_optional(&self.pool).await?;
        row.as_ref().map(|r| self.decode(r)).transpose()
    }

    async fn find_by_primary_key(&self, id: i64) -> EngineResult<Option<Record>> {
        let primary_keys = self.definition.primary_keys();
        let [pk] = primary_keys.as_slice() else {
            return Err(EngineError::Unsupported(format!(
                "table '{}' has {} primary key columns, lookup by identity needs exactly one",
                self.definition.name(),
                primary_keys.len()
            )));
        };
        let predicate =
            Predicate::match_all().and(Constraint::new(*pk, Comparison::Eq(JsonValue::from(id))));
        self.find_one(&Query::filter(predicate)).await
    }

    async fn update(&self, changes: &Record, predicate: &Predicate) -> EngineResult<u64> {
        if changes.is_empty() {
            return Ok(0);
        }
        let mut builder = sql::update(&self.definition, changes, predicate);
        let result = builder.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn destroy(&self, predicate: &Predicate) -> EngineResult<u64> {
        let mut builder = sql::delete(&self.definition, predicate);
        let result = builder.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn count(&self, predicate: &Predicate) -> EngineResult<u64> {
        let mut builder = sql::count(&self.definition, predicate);
        let row = builder.build().fetch_one(&self.pool).await?;
        let count: i64 = row.try_get("count")?;
        Ok(count.max(0) as u64)
    }
}
