use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::auth::{AppState, run_blocking};
use crate::error::AppError;

/// GET /hc: liveness plus a database round trip (no auth).
pub async fn health(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let db = state.db.clone();
    run_blocking(move || Ok(db.ping()?)).await?;

    Ok(Json(json!({ "status": "ok" })))
}
