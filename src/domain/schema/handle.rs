use crate::domain::schema::definition::{FieldSchema, TableDefinition};
use crate::storage::EngineTable;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, RwLock};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssociationKind {
    BelongsTo,
    HasOne,
    HasMany,
    BelongsToMany,
}

/// Relationship metadata attached to a handle. Recorded and reported, never
/// resolved by this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Association {
    pub kind: AssociationKind,
    pub target: String,
    #[serde(default)]
    pub foreign_key: Option<String>,
    #[serde(default)]
    pub alias: Option<String>,
}

/// Snapshot returned by `describe`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableDescription {
    pub table_name: String,
    pub storage_name: String,
    pub attributes: FieldSchema,
    pub associations: Vec<Association>,
}

/// A registered table: its definition bound to the engine table that
/// executes operations against it.
pub struct TableHandle {
    definition: TableDefinition,
    table: Arc<dyn EngineTable>,
    associations: RwLock<Vec<Association>>,
}

impl TableHandle {
    pub fn new(definition: TableDefinition, table: Arc<dyn EngineTable>) -> Self {
        Self {
            definition,
            table,
            associations: RwLock::new(Vec::new()),
        }
    }

    pub fn name(&self) -> &str {
        self.definition.name()
    }

    pub fn storage_name(&self) -> &str {
        self.definition.storage_name()
    }

    pub fn definition(&self) -> &TableDefinition {
        &self.definition
    }

    pub fn table(&self) -> &Arc<dyn EngineTable> {
        &self.table
    }

    pub fn associate(&self, association: Association) {
        let mut associations = self
            .associations
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        associations.push(association);
    }

    pub fn associations(&self) -> Vec<Association> {
        self.associations
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn describe(&self) -> TableDescription {
        TableDescription {
            table_name: self.name().to_string(),
            storage_name: self.storage_name().to_string(),
            attributes: self.definition.fields().clone(),
            associations: self.associations(),
        }
    }
}

impl fmt::Debug for TableHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableHandle")
            .field("name", &self.name())
            .field("storage_name", &self.storage_name())
            .finish_non_exhaustive()
    }
}
