use crate::error::{EngineError, StoreError};
use crate::transport::http::types::ApiResponse;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value as JsonValue;
use sqlx::error::ErrorKind;

pub fn status_for(err: &StoreError) -> StatusCode {
    match err {
        StoreError::TableNotRegistered(_) => StatusCode::NOT_FOUND,
        StoreError::Schema(_) | StoreError::Translation(_) => StatusCode::BAD_REQUEST,
        StoreError::Engine(EngineError::Database(sqlx::Error::Database(db))) => match db.kind() {
            ErrorKind::UniqueViolation
            | ErrorKind::ForeignKeyViolation
            | ErrorKind::NotNullViolation
            | ErrorKind::CheckViolation => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        },
        StoreError::Engine(EngineError::Unsupported(_)) => StatusCode::BAD_REQUEST,
        StoreError::Engine(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn error_response(err: StoreError) -> Response {
    (
        status_for(&err),
        Json(ApiResponse {
            success: false,
            data: None,
            error: Some(err.to_string()),
        }),
    )
        .into_response()
}

pub fn ok_response<T: Serialize>(data: T) -> Response {
    match serde_json::to_value(data) {
        Ok(data) => (
            StatusCode::OK,
            Json(ApiResponse {
                success: true,
                data: Some(data),
                error: None,
            }),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse {
                success: false,
                data: None,
                error: Some(format!("Failed to serialize response: {}", e)),
            }),
        )
            .into_response(),
    }
}

pub fn respond<T: Serialize>(result: Result<T, StoreError>) -> Response {
    match result {
        Ok(data) => ok_response(data),
        Err(e) => error_response(e),
    }
}

pub fn not_found(message: String) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse {
            success: false,
            data: None,
            error: Some(message),
        }),
    )
        .into_response()
}

pub fn count_body(count: u64) -> JsonValue {
    serde_json::json!({ "count": count })
}
