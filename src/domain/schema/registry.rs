//! SchemaRegistry for mapping table names to live table handles.

use crate::domain::schema::definition::{FieldSchema, TableDefinition, TableOptions};
use crate::domain::schema::handle::{TableDescription, TableHandle};
use crate::error::{StoreError, StoreResult};
use crate::storage::StorageEngine;
use indexmap::IndexMap;
use std::sync::Arc;

/// A registry that maps table names to their registered handles, in
/// registration order.
pub struct SchemaRegistry {
    tables: IndexMap<String, Arc<TableHandle>>,
}

impl SchemaRegistry {
    /// Creates a new empty SchemaRegistry.
    pub fn new() -> Self {
        Self {
            tables: IndexMap::new(),
        }
    }

    /// Returns the handle registered under `name`, defining it against
    /// `engine` first if this is the first registration.
    ///
    /// Re-registering a known name returns the existing handle and discards
    /// `fields` and `options` without comparing them.
    pub async fn register(
        &mut self,
        engine: &dyn StorageEngine,
        name: &str,
        fields: FieldSchema,
        options: TableOptions,
    ) -> StoreResult<Arc<TableHandle>> {
        if let Some(existing) = self.tables.get(name) {
            tracing::debug!(table = name, "table already registered, keeping existing handle");
            return Ok(existing.clone());
        }

        let definition = TableDefinition::new(name, fields, options)?;
        let table = engine.define_table(&definition).await.map_err(|e| {
            tracing::error!(table = name, error = %e, "storage engine failed to define table");
            StoreError::Engine(e)
        })?;

        tracing::debug!(
            table = name,
            storage_name = definition.storage_name(),
            fields = definition.fields().len(),
            "registered table"
        );
        let handle = Arc::new(TableHandle::new(definition, table));
        self.tables.insert(name.to_string(), handle.clone());
        Ok(handle)
    }

    /// Retrieves a handle by name.
    /// Returns None if the table is not registered.
    pub fn resolve(&self, name: &str) -> Option<Arc<TableHandle>> {
        self.tables.get(name).cloned()
    }

    /// Returns all registered table names in registration order.
    pub fn list_tables(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }

    pub fn describe(&self, name: &str) -> Option<TableDescription> {
        self.tables.get(name).map(|handle| handle.describe())
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}
