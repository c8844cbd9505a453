use crate::domain::condition::parse_page_param;
use crate::domain::Record;
use crate::error::StoreError;
use crate::transport::http::handlers::common::{
    count_body, error_response, not_found, ok_response, respond,
};
use crate::transport::http::types::{
    json_422, ApiResponse, AppState, ConditionRequest, FindRequest, InsertManyRequest,
    SearchRequest, SelectRequest, UpdateRequest,
};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;

#[utoipa::path(
    post,
    path = "/api/tables/{table}/records",
    params(
        ("table" = String, Path, description = "Registered table name")
    ),
    request_body(content = Object, description = "Record to insert"),
    responses(
        (status = 200, description = "Stored record, system fields included", body = ApiResponse),
        (status = 400, description = "Invalid field name", body = ApiResponse),
        (status = 404, description = "Table not registered", body = ApiResponse),
        (status = 409, description = "Constraint violation", body = ApiResponse),
        (status = 422, description = "Unprocessable entity (invalid JSON body)", body = ApiResponse)
    )
)]
pub async fn insert_handler(
    State(state): State<AppState>,
    Path(table): Path<String>,
    request: Result<Json<Record>, JsonRejection>,
) -> impl IntoResponse {
    let Json(record) = match request {
        Ok(v) => v,
        Err(e) => return json_422(e, "{\"field\": value, ...}").into_response(),
    };
    respond(state.db.insert(&table, record).await)
}

#[utoipa::path(
    post,
    path = "/api/tables/{table}/records/batch",
    params(
        ("table" = String, Path, description = "Registered table name")
    ),
    request_body = InsertManyRequest,
    responses(
        (status = 200, description = "Stored records; all or none are inserted", body = ApiResponse),
        (status = 404, description = "Table not registered", body = ApiResponse),
        (status = 409, description = "Constraint violation, nothing inserted", body = ApiResponse),
        (status = 422, description = "Unprocessable entity (invalid JSON body)", body = ApiResponse)
    )
)]
pub async fn insert_many_handler(
    State(state): State<AppState>,
    Path(table): Path<String>,
    request: Result<Json<InsertManyRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(request) = match request {
        Ok(v) => v,
        Err(e) => return json_422(e, "{\"records\": [...]}").into_response(),
    };
    respond(state.db.insert_many(&table, request.records).await)
}

#[utoipa::path(
    get,
    path = "/api/tables/{table}/records/{id}",
    params(
        ("table" = String, Path, description = "Registered table name"),
        ("id" = i64, Path, description = "Primary key value")
    ),
    responses(
        (status = 200, description = "The record", body = ApiResponse),
        (status = 404, description = "Table not registered or no such record", body = ApiResponse)
    )
)]
pub async fn find_by_id_handler(
    State(state): State<AppState>,
    Path((table, id)): Path<(String, i64)>,
) -> impl IntoResponse {
    match state.db.find_by_id(&table, id).await {
        Ok(Some(record)) => ok_response(record),
        Ok(None) => not_found(format!("no record with id {} in '{}'", id, table)),
        Err(e) => error_response(e),
    }
}

#[utoipa::path(
    post,
    path = "/api/tables/{table}/find",
    params(
        ("table" = String, Path, description = "Registered table name")
    ),
    request_body = FindRequest,
    responses(
        (status = 200, description = "Matching records", body = ApiResponse),
        (status = 400, description = "Condition could not be translated", body = ApiResponse),
        (status = 404, description = "Table not registered", body = ApiResponse)
    )
)]
pub async fn find_handler(
    State(state): State<AppState>,
    Path(table): Path<String>,
    request: Result<Json<FindRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(request) = match request {
        Ok(v) => v,
        Err(e) => {
            return json_422(e, "{\"condition\": {...}, \"order\": [...], \"limit\": n}")
                .into_response()
        }
    };
    respond(
        state
            .db
            .find_with(&table, &request.condition, &request.options)
            .await,
    )
}

#[utoipa::path(
    post,
    path = "/api/tables/{table}/find-one",
    params(
        ("table" = String, Path, description = "Registered table name")
    ),
    request_body = ConditionRequest,
    responses(
        (status = 200, description = "First matching record, or null", body = ApiResponse),
        (status = 400, description = "Condition could not be translated", body = ApiResponse),
        (status = 404, description = "Table not registered", body = ApiResponse)
    )
)]
pub async fn find_one_handler(
    State(state): State<AppState>,
    Path(table): Path<String>,
    request: Result<Json<ConditionRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(request) = match request {
        Ok(v) => v,
        Err(e) => return json_422(e, "{\"condition\": {...}}").into_response(),
    };
    respond(state.db.find_one(&table, &request.condition).await)
}

#[utoipa::path(
    post,
    path = "/api/tables/{table}/update",
    params(
        ("table" = String, Path, description = "Registered table name")
    ),
    request_body = UpdateRequest,
    responses(
        (status = 200, description = "Number of updated rows", body = ApiResponse),
        (status = 400, description = "Condition could not be translated", body = ApiResponse),
        (status = 404, description = "Table not registered", body = ApiResponse)
    )
)]
pub async fn update_handler(
    State(state): State<AppState>,
    Path(table): Path<String>,
    request: Result<Json<UpdateRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(request) = match request {
        Ok(v) => v,
        Err(e) => return json_422(e, "{\"changes\": {...}, \"condition\": {...}}").into_response(),
    };
    respond(
        state
            .db
            .update(&table, request.changes, &request.condition)
            .await
            .map(count_body),
    )
}

#[utoipa::path(
    post,
    path = "/api/tables/{table}/delete",
    params(
        ("table" = String, Path, description = "Registered table name")
    ),
    request_body = ConditionRequest,
    responses(
        (status = 200, description = "Number of deleted rows", body = ApiResponse),
        (status = 400, description = "Condition could not be translated", body = ApiResponse),
        (status = 404, description = "Table not registered", body = ApiResponse)
    )
)]
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(table): Path<String>,
    request: Result<Json<ConditionRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(request) = match request {
        Ok(v) => v,
        Err(e) => return json_422(e, "{\"condition\": {...}}").into_response(),
    };
    respond(
        state
            .db
            .delete(&table, &request.condition)
            .await
            .map(count_body),
    )
}

#[utoipa::path(
    post,
    path = "/api/tables/{table}/count",
    params(
        ("table" = String, Path, description = "Registered table name")
    ),
    request_body = ConditionRequest,
    responses(
        (status = 200, description = "Number of matching rows", body = ApiResponse),
        (status = 400, description = "Condition could not be translated", body = ApiResponse),
        (status = 404, description = "Table not registered", body = ApiResponse)
    )
)]
pub async fn count_handler(
    State(state): State<AppState>,
    Path(table): Path<String>,
    request: Result<Json<ConditionRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(request) = match request {
        Ok(v) => v,
        Err(e) => return json_422(e, "{\"condition\": {...}}").into_response(),
    };
    respond(
        state
            .db
            .count(&table, &request.condition)
            .await
            .map(count_body),
    )
}

#[utoipa::path(
    post,
    path = "/api/tables/{table}/search",
    params(
        ("table" = String, Path, description = "Registered table name")
    ),
    request_body = SearchRequest,
    responses(
        (status = 200, description = "One page of matching records", body = ApiResponse),
        (status = 400, description = "Bad page parameters or condition", body = ApiResponse),
        (status = 404, description = "Table not registered", body = ApiResponse)
    )
)]
pub async fn search_handler(
    State(state): State<AppState>,
    Path(table): Path<String>,
    request: Result<Json<SearchRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(request) = match request {
        Ok(v) => v,
        Err(e) => {
            return json_422(e, "{\"condition\": {...}, \"page\": n, \"page_size\": n}")
                .into_response()
        }
    };

    let page = match parse_page_param("page", &request.page) {
        Ok(p) => p,
        Err(e) => return error_response(StoreError::Translation(e)),
    };
    let page_size = match parse_page_param("page_size", &request.page_size) {
        Ok(p) => p,
        Err(e) => return error_response(StoreError::Translation(e)),
    };

    respond(
        state
            .db
            .search_paginated(&table, &request.condition, page, page_size)
            .await,
    )
}

#[utoipa::path(
    post,
    path = "/api/tables/{table}/select",
    params(
        ("table" = String, Path, description = "Registered table name")
    ),
    request_body = SelectRequest,
    responses(
        (status = 200, description = "Matching records restricted to the requested fields", body = ApiResponse),
        (status = 400, description = "Invalid field name or condition", body = ApiResponse),
        (status = 404, description = "Table not registered", body = ApiResponse)
    )
)]
pub async fn select_handler(
    State(state): State<AppState>,
    Path(table): Path<String>,
    request: Result<Json<SelectRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(request) = match request {
        Ok(v) => v,
        Err(e) => {
            return json_422(e, "{\"condition\": {...}, \"fields\": [...]}").into_response()
        }
    };
    respond(
        state
            .db
            .search_fields(&table, &request.condition, &request.fields)
            .await,
    )
}
