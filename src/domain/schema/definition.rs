//! Table definitions: the caller's declared fields merged over the system fields.

use crate::domain::ident::validate_ident;
use crate::domain::schema::field::{now_timestamp, FieldDescriptor, FieldType};
use crate::domain::Record;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Ordered mapping of field name to descriptor.
pub type FieldSchema = IndexMap<String, FieldDescriptor>;

pub const ID_FIELD: &str = "id";
pub const CREATED_AT_FIELD: &str = "createdAt";
pub const UPDATED_AT_FIELD: &str = "updatedAt";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("invalid table name '{0}'")]
    InvalidTableName(String),
    #[error("invalid field name '{field}' in table '{table}'")]
    InvalidFieldName { table: String, field: String },
    #[error("index on table '{table}' references unknown field '{field}'")]
    UnknownIndexField { table: String, field: String },
}

/// Secondary index created alongside the table.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IndexSpec {
    pub fields: Vec<String>,
    #[serde(default)]
    pub unique: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TableOptions {
    /// Storage name override. Lower-cased like the default name.
    #[serde(default)]
    pub storage_name: Option<String>,
    #[serde(default)]
    pub indexes: Vec<IndexSpec>,
}

/// The fields every table carries: identity plus creation/update timestamps.
pub fn system_fields() -> FieldSchema {
    let mut fields = FieldSchema::new();
    fields.insert(
        ID_FIELD.to_string(),
        FieldDescriptor::new(FieldType::Integer)
            .primary_key()
            .auto_increment(),
    );
    fields.insert(
        CREATED_AT_FIELD.to_string(),
        FieldDescriptor::new(FieldType::Date).default_now(),
    );
    fields.insert(
        UPDATED_AT_FIELD.to_string(),
        FieldDescriptor::new(FieldType::Date).default_now(),
    );
    fields
}

/// Applies `caller` over `system`. A caller descriptor replaces the system
/// descriptor of the same name in place; new caller fields follow in
/// declaration order.
pub fn merge_fields(system: FieldSchema, caller: FieldSchema) -> FieldSchema {
    let mut merged = system;
    for (name, descriptor) in caller {
        merged.insert(name, descriptor);
    }
    merged
}

/// A fully merged, validated table schema.
#[derive(Debug, Clone, PartialEq)]
pub struct TableDefinition {
    name: String,
    storage_name: String,
    fields: FieldSchema,
    options: TableOptions,
}

impl TableDefinition {
    pub fn new(
        name: &str,
        caller_fields: FieldSchema,
        options: TableOptions,
    ) -> Result<Self, SchemaError> {
        if !validate_ident(name) {
            return Err(SchemaError::InvalidTableName(name.to_string()));
        }
        let storage_name = options
            .storage_name
            .as_deref()
            .unwrap_or(name)
            .to_lowercase();
        if !validate_ident(&storage_name) {
            return Err(SchemaError::InvalidTableName(storage_name));
        }

        let fields = merge_fields(system_fields(), caller_fields);
        for field in fields.keys() {
            if !validate_ident(field) {
                return Err(SchemaError::InvalidFieldName {
                    table: name.to_string(),
                    field: field.clone(),
                });
            }
        }
        for index in &options.indexes {
            for field in &index.fields {
                if !fields.contains_key(field) {
                    return Err(SchemaError::UnknownIndexField {
                        table: name.to_string(),
                        field: field.clone(),
                    });
                }
            }
        }

        Ok(Self {
            name: name.to_string(),
            storage_name,
            fields,
            options,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn storage_name(&self) -> &str {
        &self.storage_name
    }

    pub fn fields(&self) -> &FieldSchema {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.get(name)
    }

    pub fn options(&self) -> &TableOptions {
        &self.options
    }

    /// Primary-key columns in declaration order.
    pub fn primary_keys(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(_, d)| d.primary_key)
            .map(|(n, _)| n.as_str())
            .collect()
    }

    /// Fills every absent field that declares a default. All `Now` defaults
    /// in one record share a single timestamp.
    pub fn apply_defaults(&self, record: &mut Record) {
        let now = now_timestamp();
        for (name, descriptor) in &self.fields {
            if record.contains_key(name) {
                continue;
            }
            if let Some(default) = &descriptor.default {
                record.insert(name.clone(), default.resolve(&now));
            }
        }
    }

    /// Sets `updatedAt` to now unless the caller already supplied it. Only
    /// applies while `updatedAt` is a date field.
    pub fn stamp_update(&self, changes: &mut Record) {
        let is_date = matches!(
            self.fields.get(UPDATED_AT_FIELD),
            Some(d) if d.field_type == FieldType::Date
        );
        if is_date && !changes.contains_key(UPDATED_AT_FIELD) {
            changes.insert(
                UPDATED_AT_FIELD.to_string(),
                serde_json::Value::String(now_timestamp()),
            );
        }
    }
}
