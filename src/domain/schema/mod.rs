//! Table schemas and the registry that owns their live handles.

pub mod definition;
pub mod field;
pub mod handle;
pub mod registry;

pub use definition::{
    merge_fields, system_fields, FieldSchema, IndexSpec, SchemaError, TableDefinition,
    TableOptions, CREATED_AT_FIELD, ID_FIELD, UPDATED_AT_FIELD,
};
pub use field::{DefaultValue, FieldDescriptor, FieldType};
pub use handle::{Association, AssociationKind, TableDescription, TableHandle};
pub use registry::SchemaRegistry;
