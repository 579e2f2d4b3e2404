use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use tracing::debug;

use tukang_types::models::Role;

use crate::auth::AppState;
use crate::error::AppError;

/// Caller identity decoded once from the bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedActor {
    pub id: i64,
    pub role: Role,
}

impl AuthenticatedActor {
    pub fn require(&self, role: Role) -> Result<(), AppError> {
        if self.role == role {
            Ok(())
        } else {
            Err(AppError::Forbidden(match role {
                Role::Tukang => "only tukang accounts can do this",
                Role::Store => "only store accounts can do this",
            }))
        }
    }
}

/// Extract and validate JWT from Authorization header.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(AppError::Unauthorized("Unauthorized"))?;

    let claims = state.tokens.decode(token).map_err(|e| {
        debug!("Rejected bearer token: {}", e);
        AppError::Unauthorized("Unauthorized")
    })?;

    req.extensions_mut().insert(AuthenticatedActor {
        id: claims.user_id,
        role: claims.role,
    });
    Ok(next.run(req).await)
}
