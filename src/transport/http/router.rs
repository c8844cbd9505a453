use crate::transport::http::handlers::{health, query, records, tables};
use crate::transport::http::types::{
    ApiResponse, AppState, ConditionRequest, FindRequest, InsertManyRequest, RawQueryRequest,
    RegisterTableRequest, SearchRequest, SelectRequest, UpdateRequest,
};
use axum::routing::{get, post};
use axum::Router;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthcheck_handler,
        tables::register_table_handler,
        tables::list_tables_handler,
        tables::describe_table_handler,
        records::insert_handler,
        records::insert_many_handler,
        records::find_by_id_handler,
        records::find_handler,
        records::find_one_handler,
        records::update_handler,
        records::delete_handler,
        records::count_handler,
        records::search_handler,
        records::select_handler,
        query::raw_query_handler
    ),
    components(schemas(
        ApiResponse,
        RegisterTableRequest,
        InsertManyRequest,
        ConditionRequest,
        FindRequest,
        UpdateRequest,
        SearchRequest,
        SelectRequest,
        RawQueryRequest
    ))
)]
pub struct ApiDoc;

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::healthcheck_handler))
        .route(
            "/tables",
            post(tables::register_table_handler).get(tables::list_tables_handler),
        )
        .route("/tables/:table", get(tables::describe_table_handler))
        .route("/api/tables/:table/records", post(records::insert_handler))
        .route(
            "/api/tables/:table/records/batch",
            post(records::insert_many_handler),
        )
        .route(
            "/api/tables/:table/records/:id",
            get(records::find_by_id_handler),
        )
        .route("/api/tables/:table/find", post(records::find_handler))
        .route("/api/tables/:table/find-one", post(records::find_one_handler))
        .route("/api/tables/:table/update", post(records::update_handler))
        .route("/api/tables/:table/delete", post(records::delete_handler))
        .route("/api/tables/:table/count", post(records::count_handler))
        .route("/api/tables/:table/search", post(records::search_handler))
        .route("/api/tables/:table/select", post(records::select_handler))
        .route("/api/query", post(query::raw_query_handler))
        .with_state(app_state)
}
