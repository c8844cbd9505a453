//! Row decoding: sqlite storage classes to JSON, then declared-type coercion.

use crate::domain::schema::FieldSchema;
use crate::domain::Record;
use crate::error::EngineResult;
use serde_json::Value as JsonValue;
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Row, TypeInfo, ValueRef};

/// Decodes one column by its runtime storage class.
fn decode_column(row: &SqliteRow, idx: usize) -> EngineResult<JsonValue> {
    let raw = row.try_get_raw(idx)?;
    if raw.is_null() {
        return Ok(JsonValue::Null);
    }
    let storage_class = raw.type_info().name().to_string();

    let value = match storage_class.as_str() {
        "INTEGER" | "BOOLEAN" => JsonValue::from(row.try_get_unchecked::<i64, _>(idx)?),
        "REAL" => JsonValue::from(row.try_get_unchecked::<f64, _>(idx)?),
        "BLOB" => {
            let bytes: Vec<u8> = row.try_get_unchecked(idx)?;
            JsonValue::Array(bytes.into_iter().map(JsonValue::from).collect())
        }
        _ => JsonValue::String(row.try_get_unchecked::<String, _>(idx)?),
    };
    Ok(value)
}

/// Decodes a row into a record. With a schema, known columns are coerced to
/// their declared field type.
pub fn decode_row(row: &SqliteRow, fields: Option<&FieldSchema>) -> EngineResult<Record> {
    let mut record = Record::new();
    for (idx, column) in row.columns().iter().enumerate() {
        let name = column.name();
        let mut value = decode_column(row, idx)?;
        if let Some(descriptor) = fields.and_then(|f| f.get(name)) {
            value = descriptor.field_type.coerce_stored(value);
        }
        record.insert(name.to_string(), value);
    }
    Ok(record)
}
