//! Engine-neutral domain: table schemas and query conditions.

use serde_json::Value as JsonValue;

pub mod condition;
pub mod ident;
pub mod schema;

/// A record as exchanged with callers and the storage engine.
pub type Record = serde_json::Map<String, JsonValue>;
