use crate::transport::http::handlers::common::{error_response, not_found, ok_response};
use crate::transport::http::types::{json_422, ApiResponse, AppState, RegisterTableRequest};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;

#[utoipa::path(
    post,
    path = "/tables",
    request_body = RegisterTableRequest,
    responses(
        (status = 200, description = "Table registered (or already registered)", body = ApiResponse),
        (status = 400, description = "Invalid table or field name", body = ApiResponse),
        (status = 422, description = "Unprocessable entity (invalid JSON body)", body = ApiResponse),
        (status = 500, description = "Storage engine rejected the definition", body = ApiResponse)
    )
)]
pub async fn register_table_handler(
    State(state): State<AppState>,
    request: Result<Json<RegisterTableRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(request) = match request {
        Ok(v) => v,
        Err(e) => {
            return json_422(e, "{\"table_name\": \"...\", \"fields\": {...}}").into_response()
        }
    };

    match state
        .db
        .define(&request.table_name, request.fields, request.options)
        .await
    {
        Ok(handle) => ok_response(handle.describe()),
        Err(e) => error_response(e),
    }
}

#[utoipa::path(
    get,
    path = "/tables",
    responses(
        (status = 200, description = "Registered table names in registration order", body = ApiResponse)
    )
)]
pub async fn list_tables_handler(State(state): State<AppState>) -> impl IntoResponse {
    ok_response(serde_json::json!({ "tables": state.db.list_tables().await }))
}

#[utoipa::path(
    get,
    path = "/tables/{table}",
    params(
        ("table" = String, Path, description = "Registered table name")
    ),
    responses(
        (status = 200, description = "Table description", body = ApiResponse),
        (status = 404, description = "Table not registered", body = ApiResponse)
    )
)]
pub async fn describe_table_handler(
    State(state): State<AppState>,
    Path(table): Path<String>,
) -> impl IntoResponse {
    match state.db.describe(&table).await {
        Some(description) => ok_response(description),
        None => not_found(format!("table '{}' is not registered", table)),
    }
}
