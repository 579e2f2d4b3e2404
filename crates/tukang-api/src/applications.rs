use std::collections::HashMap;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};

use tukang_types::api::{ApplyResponse, Envelope};
use tukang_types::models::{Decision, Role, StoreApplication, WorkerApplication};

use crate::auth::{AppState, run_blocking};
use crate::error::AppError;
use crate::middleware::AuthenticatedActor;
use crate::validation::{parse_flag, parse_id};

fn parse_decision(raw: Option<&String>) -> Result<Decision, AppError> {
    match raw.map(String::as_str) {
        Some("accepted") => Ok(Decision::Accepted),
        Some("rejected") => Ok(Decision::Rejected),
        _ => Err(AppError::Validation(
            "invalid status; must be 'accepted' or 'rejected'".into(),
        )),
    }
}

/// POST /api/apply-store/{store_id}: worker applies to a store.
pub async fn apply_store(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedActor>,
    Path(raw_id): Path<String>,
) -> Result<Json<Envelope<ApplyResponse>>, AppError> {
    let store_id = parse_id(&raw_id, "store")?;

    let inner = state.clone();
    let application_id = run_blocking(move || inner.workflow.apply_to_store(actor, store_id)).await?;

    Ok(Json(Envelope::new("Application sent", ApplyResponse { application_id })))
}

/// POST /api/apply-user/{user_id}: store invites a worker.
pub async fn apply_user(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedActor>,
    Path(raw_id): Path<String>,
) -> Result<Json<Envelope<ApplyResponse>>, AppError> {
    let worker_id = parse_id(&raw_id, "user")?;

    let inner = state.clone();
    let application_id = run_blocking(move || inner.workflow.invite_worker(actor, worker_id)).await?;

    Ok(Json(Envelope::new("Invitation sent", ApplyResponse { application_id })))
}

/// GET /api/application/store
pub async fn review_store(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedActor>,
) -> Result<Json<Envelope<Vec<StoreApplication>>>, AppError> {
    let inner = state.clone();
    let applications = run_blocking(move || inner.workflow.review_for_store_owner(actor)).await?;

    Ok(Json(Envelope::new("Applications retrieved", applications)))
}

/// GET /api/application/user?is_direct_hire=bool
pub async fn review_user(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedActor>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Envelope<Vec<WorkerApplication>>>, AppError> {
    let is_direct_hire = parse_flag(params.get("is_direct_hire").map(String::as_str), "is_direct_hire")?
        .unwrap_or(false);

    let inner = state.clone();
    let applications =
        run_blocking(move || inner.workflow.review_for_worker(actor, is_direct_hire)).await?;

    Ok(Json(Envelope::new("Applications retrieved", applications)))
}

/// PUT /api/status-apply-user/{app_id}?update=accepted|rejected
pub async fn status_user(
    state: State<AppState>,
    actor: Extension<AuthenticatedActor>,
    raw_id: Path<String>,
    params: Query<HashMap<String, String>>,
) -> Result<Json<Envelope<()>>, AppError> {
    set_status(state, actor, raw_id, params, Role::Tukang).await
}

/// PUT /api/status-apply-store/{app_id}?update=accepted|rejected
pub async fn status_store(
    state: State<AppState>,
    actor: Extension<AuthenticatedActor>,
    raw_id: Path<String>,
    params: Query<HashMap<String, String>>,
) -> Result<Json<Envelope<()>>, AppError> {
    set_status(state, actor, raw_id, params, Role::Store).await
}

async fn set_status(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedActor>,
    Path(raw_id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    role: Role,
) -> Result<Json<Envelope<()>>, AppError> {
    actor.require(role)?;
    let app_id = parse_id(&raw_id, "application")?;
    let decision = parse_decision(params.get("update"))?;

    let inner = state.clone();
    run_blocking(move || inner.workflow.set_application_status(actor, app_id, decision)).await?;

    Ok(Json(Envelope::empty("Application status updated")))
}

/// DELETE /api/applicants/{app_id}: worker withdraws an application.
pub async fn delete_application(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedActor>,
    Path(raw_id): Path<String>,
) -> Result<Json<Envelope<()>>, AppError> {
    let app_id = parse_id(&raw_id, "application")?;

    let inner = state.clone();
    run_blocking(move || inner.workflow.withdraw_application(actor, app_id)).await?;

    Ok(Json(Envelope::empty("Application deleted")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decision_must_be_terminal_status() {
        let accepted = "accepted".to_string();
        let sent = "sent".to_string();

        assert_eq!(parse_decision(Some(&accepted)).unwrap(), Decision::Accepted);
        assert!(matches!(parse_decision(Some(&sent)), Err(AppError::Validation(_))));
        assert!(matches!(parse_decision(None), Err(AppError::Validation(_))));
    }
}
