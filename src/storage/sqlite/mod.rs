//! Embedded sqlite storage engine built on a sqlx connection pool.

pub mod decode;
pub mod sql;
pub mod table;

use crate::domain::schema::TableDefinition;
use crate::error::{EngineError, EngineResult};
use crate::infra::config::{Dialect, StorageLocation, StoreConfig};
use crate::storage::engine::{EngineTable, RawQueryOptions, RawQueryResult, StorageEngine};
use async_trait::async_trait;
use futures::TryStreamExt;
use serde_json::Value as JsonValue;
use sqlx::sqlite::{SqliteArguments, SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{ConnectOptions, Either, Sqlite, SqlitePool};
use std::str::FromStr;
use std::sync::Arc;

pub use table::SqliteTable;

type SqliteQuery<'q> = sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>;

/// The default storage engine.
///
/// The pool connects lazily, so operations work before `authenticate` is
/// called; `authenticate` only verifies that a connection can be made.
pub struct SqliteEngine {
    pool: SqlitePool,
}

impl SqliteEngine {
    pub async fn open(config: &StoreConfig) -> EngineResult<Self> {
        let mut options = match &config.storage {
            StorageLocation::Memory => SqliteConnectOptions::from_str("sqlite::memory:")?,
            StorageLocation::File(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    tokio::fs::create_dir_all(parent).await?;
                }
                SqliteConnectOptions::new()
                    .filename(path)
                    .create_if_missing(true)
            }
            StorageLocation::Url(url) => SqliteConnectOptions::from_str(url)?,
        };
        options = options.foreign_keys(true);
        if !config.logging {
            options = options.disable_statement_logging();
        }

        let pool = match config.storage {
            // Every in-memory connection would be its own database, so keep
            // exactly one and never let it idle out.
            StorageLocation::Memory => SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_lazy_with(options),
            _ => SqlitePoolOptions::new()
                .max_connections(config.max_connections)
                .connect_lazy_with(options),
        };

        tracing::debug!(storage = ?config.storage, "opened sqlite engine");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn bind_json<'q>(query: SqliteQuery<'q>, value: &JsonValue) -> SqliteQuery<'q> {
    match value {
        JsonValue::Null => query.bind(Option::<String>::None),
        JsonValue::Bool(b) => query.bind(*b),
        JsonValue::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => query.bind(i),
            (None, Some(f)) => query.bind(f),
            (None, None) => query.bind(n.to_string()),
        },
        JsonValue::String(s) => query.bind(s.clone()),
        other => query.bind(other.to_string()),
    }
}

/// sqlite keeps the connection's last rowid across statements, so it only
/// describes this statement when the statement itself inserts.
fn inserts_rows(statement: &str) -> bool {
    let keyword = statement
        .trim_start()
        .split(|c: char| !c.is_ascii_alphabetic())
        .next()
        .unwrap_or_default();
    keyword.eq_ignore_ascii_case("insert") || keyword.eq_ignore_ascii_case("replace")
}

#[async_trait]
impl StorageEngine for SqliteEngine {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    async fn define_table(
        &self,
        definition: &TableDefinition,
    ) -> EngineResult<Arc<dyn EngineTable>> {
        let ddl = sql::create_table_sql(definition);
        tracing::debug!(table = definition.name(), %ddl, "defining table");
        sqlx::query(&ddl).execute(&self.pool).await?;

        for index in &definition.options().indexes {
            if index.fields.is_empty() {
                return Err(EngineError::Unsupported(format!(
                    "index on table '{}' has no fields",
                    definition.name()
                )));
            }
            let ddl = sql::create_index_sql(definition.storage_name(), index);
            sqlx::query(&ddl).execute(&self.pool).await?;
        }

        Ok(Arc::new(SqliteTable::new(
            self.pool.clone(),
            definition.clone(),
        )))
    }

    async fn raw_query(
        &self,
        statement: &str,
        options: &RawQueryOptions,
    ) -> EngineResult<RawQueryResult> {
        let mut query = sqlx::query(statement);
        for param in &options.params {
            query = bind_json(query, param);
        }

        let inserts = inserts_rows(statement);
        let mut result = RawQueryResult::default();
        let mut stream = query.fetch_many(&self.pool);
        while let Some(item) = stream.try_next().await? {
            match item {
                Either::Left(done) => {
                    result.rows_affected += done.rows_affected();
                    if inserts && done.rows_affected() > 0 {
                        result.last_insert_id = Some(done.last_insert_rowid());
                    }
                }
                Either::Right(row) => result.rows.push(decode::decode_row(&row, None)?),
            }
        }
        Ok(result)
    }

    async fn authenticate(&self) -> EngineResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) -> EngineResult<()> {
        self.pool.close().await;
        Ok(())
    }
}
