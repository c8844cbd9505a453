pub mod engine;
pub mod sqlite;

pub use engine::{EngineTable, Query, RawQueryOptions, RawQueryResult, StorageEngine};
pub use sqlite::{SqliteEngine, SqliteTable};
