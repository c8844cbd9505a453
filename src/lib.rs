pub mod app;
pub mod domain;
pub mod error;
pub mod infra;
pub mod storage;
pub mod transport;

// Convenience re-exports (keeps call-sites clean)
pub use app::{ConnectionState, Database, FindOptions, Page};
pub use domain::condition::{Condition, OperatorFilters, OrderBy, TranslationError};
pub use domain::schema::{
    Association, AssociationKind, FieldDescriptor, FieldSchema, FieldType, IndexSpec,
    TableHandle, TableOptions,
};
pub use domain::Record;
pub use error::{EngineError, StoreError, StoreResult};
pub use infra::config::StoreConfig;
pub use storage::{RawQueryOptions, RawQueryResult, SqliteEngine, StorageEngine};
