use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;

use tukang_db::Database;
use tukang_types::api::{Envelope, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};
use tukang_types::models::{Role, UserDetail};

use crate::directory::UserDirectory;
use crate::error::AppError;
use crate::images::ImageStore;
use crate::middleware::AuthenticatedActor;
use crate::token::TokenKeys;
use crate::validation::{json_body, validate_registration};
use crate::workflow::Workflow;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Arc<Database>,
    pub workflow: Workflow,
    pub tokens: TokenKeys,
    pub images: ImageStore,
}

impl AppStateInner {
    /// Wire the workflow's capabilities to the shared database.
    pub fn new(db: Arc<Database>, tokens: TokenKeys, images: ImageStore) -> Self {
        let workflow = Workflow::new(db.clone(), db.clone(), db.clone());
        Self {
            db,
            workflow,
            tokens,
            images,
        }
    }
}

/// Run blocking database work off the async runtime.
pub(crate) async fn run_blocking<T, F>(f: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::Internal(format!("spawn_blocking join error: {e}")))?
}

pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let registration = validate_registration(json_body(payload)?)?;

    let db = state.db.clone();
    let role = registration.role;
    let user_id = run_blocking(move || {
        if db.exists_by_phone(&registration.phone_number)? {
            return Err(AppError::PhoneTaken);
        }
        db.create_with_optional_store(&registration)
    })
    .await?;

    info!("Registered {} user {}", role, user_id);

    Ok((
        StatusCode::CREATED,
        Json(Envelope::new("User registered successfully", RegisterResponse { user_id })),
    ))
}

pub async fn user_login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<Envelope<LoginResponse>>, AppError> {
    login(state, json_body(payload)?, None).await
}

/// Login restricted to store accounts.
pub async fn store_login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<Envelope<LoginResponse>>, AppError> {
    login(state, json_body(payload)?, Some(Role::Store)).await
}

async fn login(
    state: AppState,
    req: LoginRequest,
    required_role: Option<Role>,
) -> Result<Json<Envelope<LoginResponse>>, AppError> {
    let db = state.db.clone();
    let user = run_blocking(move || db.verify_credentials(&req.phone_number, &req.password)).await?;

    if required_role.is_some_and(|role| role != user.role) {
        return Err(AppError::Unauthorized("not a store account"));
    }

    let token = state
        .tokens
        .issue(user.id, user.role)
        .map_err(|e| AppError::Internal(format!("token encoding failed: {e}")))?;

    info!("User {} logged in", user.id);

    Ok(Json(Envelope::new(
        "Login successful",
        LoginResponse {
            token,
            user_id: user.id,
            role: user.role,
        },
    )))
}

pub async fn user_dashboard(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedActor>,
) -> Result<Json<Envelope<UserDetail>>, AppError> {
    let db = state.db.clone();
    let user = run_blocking(move || UserDirectory::get_detail(&*db, actor.id))
        .await?
        .ok_or(AppError::NotFound("user"))?;

    Ok(Json(Envelope::new("User dashboard retrieved", user)))
}
