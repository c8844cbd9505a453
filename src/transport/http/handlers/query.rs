use crate::storage::RawQueryOptions;
use crate::transport::http::handlers::common::respond;
use crate::transport::http::types::{json_422, ApiResponse, AppState, RawQueryRequest};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

#[utoipa::path(
    post,
    path = "/api/query",
    request_body = RawQueryRequest,
    responses(
        (status = 200, description = "Rows returned and rows affected", body = ApiResponse),
        (status = 400, description = "Empty statement", body = ApiResponse),
        (status = 422, description = "Unprocessable entity (invalid JSON body)", body = ApiResponse),
        (status = 500, description = "Storage engine rejected the statement", body = ApiResponse)
    )
)]
pub async fn raw_query_handler(
    State(state): State<AppState>,
    request: Result<Json<RawQueryRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(request) = match request {
        Ok(v) => v,
        Err(e) => {
            return json_422(e, "{\"statement\": \"...\", \"params\": [...]}").into_response()
        }
    };

    if request.statement.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse {
                success: false,
                data: None,
                error: Some("statement must not be empty".to_string()),
            }),
        )
            .into_response();
    }

    let options = RawQueryOptions {
        params: request.params,
    };
    respond(state.db.query(&request.statement, &options).await)
}
