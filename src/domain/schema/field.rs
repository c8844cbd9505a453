//! Field descriptors: the per-column metadata a table is declared with.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Semantic type of a column, independent of the engine's SQL type names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Integer,
    BigInt,
    Float,
    Boolean,
    String,
    Text,
    Date,
    Json,
    Uuid,
}

impl FieldType {
    /// Converts a value decoded by storage class into the shape callers expect
    /// for this type. Values that do not fit are passed through untouched.
    pub fn coerce_stored(self, value: JsonValue) -> JsonValue {
        match (self, value) {
            (FieldType::Boolean, JsonValue::Number(n)) => match n.as_i64() {
                Some(i) => JsonValue::Bool(i != 0),
                None => JsonValue::Number(n),
            },
            (FieldType::Json, JsonValue::String(s)) => {
                serde_json::from_str(&s).unwrap_or(JsonValue::String(s))
            }
            (_, v) => v,
        }
    }
}

/// Default applied to a field when an inserted record omits it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultValue {
    /// A literal value.
    Value(JsonValue),
    /// The insertion timestamp.
    Now,
}

impl DefaultValue {
    pub fn resolve(&self, now: &str) -> JsonValue {
        match self {
            DefaultValue::Value(v) => v.clone(),
            DefaultValue::Now => JsonValue::String(now.to_string()),
        }
    }
}

/// Metadata for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default = "default_nullable")]
    pub nullable: bool,
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub default: Option<DefaultValue>,
    #[serde(default)]
    pub primary_key: bool,
    #[serde(default)]
    pub auto_increment: bool,
}

fn default_nullable() -> bool {
    true
}

impl FieldDescriptor {
    pub fn new(field_type: FieldType) -> Self {
        Self {
            field_type,
            nullable: true,
            unique: false,
            default: None,
            primary_key: false,
            auto_increment: false,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    pub fn default_value(mut self, value: JsonValue) -> Self {
        self.default = Some(DefaultValue::Value(value));
        self
    }

    pub fn default_now(mut self) -> Self {
        self.default = Some(DefaultValue::Now);
        self
    }
}

/// Timestamp format used for `Now` defaults and `updatedAt` bumps.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn boolean_fields_decode_from_integers() {
        assert_eq!(FieldType::Boolean.coerce_stored(json!(1)), json!(true));
        assert_eq!(FieldType::Boolean.coerce_stored(json!(0)), json!(false));
        assert_eq!(FieldType::Integer.coerce_stored(json!(1)), json!(1));
    }

    #[test]
    fn json_fields_parse_stored_text() {
        assert_eq!(
            FieldType::Json.coerce_stored(json!("{\"a\":[1,2]}")),
            json!({"a": [1, 2]})
        );
        assert_eq!(FieldType::Json.coerce_stored(json!("not json")), json!("not json"));
    }

    #[test]
    fn descriptor_deserializes_with_defaults() {
        let d: FieldDescriptor = serde_json::from_value(json!({"type": "string"})).unwrap();
        assert_eq!(d, FieldDescriptor::new(FieldType::String));

        let d: FieldDescriptor = serde_json::from_value(json!({
            "type": "integer",
            "nullable": false,
            "default": {"value": 3}
        }))
        .unwrap();
        assert!(!d.nullable);
        assert_eq!(d.default, Some(DefaultValue::Value(json!(3))));
    }
}
