use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use crate::server::server::AppState;

#[derive(Debug, Deserialize, Default)]
pub struct SyncParams {
    pub created_after: Option<String>,
}

pub async fn health() -> Response {
    (StatusCode::OK, Json(json!({"status": "ok"}))).into_response()
}

pub async fn check_marketplace(State(state): State<AppState>) -> Response {
    match state.pipeline.check_marketplace().await {
        Ok(token_received) => (
            StatusCode::OK,
            Json(json!({"status": "ok", "token_received": token_received})),
        )
            .into_response(),
        Err(e) => failure(e.to_string()),
    }
}

pub async fn check_destination(State(state): State<AppState>) -> Response {
    match state.pipeline.check_destination().await {
        Ok(records) => (
            StatusCode::OK,
            Json(json!({"status": "ok", "records": records})),
        )
            .into_response(),
        Err(e) => failure(e.to_string()),
    }
}

pub async fn sync(State(state): State<AppState>, Query(params): Query<SyncParams>) -> Response {
    info!(created_after = ?params.created_after, "sync triggered");
    match state.pipeline.run(params.created_after.as_deref()).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => failure(e.to_string()),
    }
}

fn failure(message: String) -> Response {
    error!("request failed: {}", message);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"status": "error", "error": message})),
    )
        .into_response()
}
