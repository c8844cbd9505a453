use crate::app::{Database, FindOptions};
use crate::domain::condition::Condition;
use crate::domain::schema::{FieldSchema, TableOptions};
use crate::domain::Record;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub data: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct RegisterTableRequest {
    pub table_name: String,
    /// Field name -> descriptor, e.g. `{"email": {"type": "string", "unique": true}}`.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub fields: FieldSchema,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub options: TableOptions,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct InsertManyRequest {
    #[schema(value_type = Vec<Object>)]
    pub records: Vec<Record>,
}

/// Body shared by find-one, delete and count.
#[derive(Deserialize, Debug, Default, ToSchema)]
pub struct ConditionRequest {
    /// Tagged condition, e.g. `{"kind": "exact", "values": {"age": 25}}`.
    /// Omitted means match-all.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub condition: Condition,
}

#[derive(Deserialize, Debug, Default, ToSchema)]
pub struct FindRequest {
    #[serde(default)]
    #[schema(value_type = Object)]
    pub condition: Condition,
    #[serde(default, flatten)]
    #[schema(value_type = Object)]
    pub options: FindOptions,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct UpdateRequest {
    #[schema(value_type = Object)]
    pub changes: Record,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub condition: Condition,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct SearchRequest {
    #[serde(default)]
    #[schema(value_type = Object)]
    pub condition: Condition,
    /// 1-based page number.
    #[schema(value_type = i64)]
    pub page: JsonValue,
    #[schema(value_type = i64)]
    pub page_size: JsonValue,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct SelectRequest {
    #[serde(default)]
    #[schema(value_type = Object)]
    pub condition: Condition,
    pub fields: Vec<String>,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct RawQueryRequest {
    pub statement: String,
    #[serde(default)]
    #[schema(value_type = Vec<Object>)]
    pub params: Vec<JsonValue>,
}

pub fn json_422(err: JsonRejection, expected: &str) -> (StatusCode, Json<ApiResponse>) {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ApiResponse {
            success: false,
            data: None,
            error: Some(format!("Invalid JSON body: {} (expected: {})", err, expected)),
        }),
    )
}
