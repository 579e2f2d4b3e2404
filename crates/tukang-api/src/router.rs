use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post, put},
};
use tower_http::services::ServeDir;

use crate::auth::{self, AppState};
use crate::images::MAX_IMAGE_BYTES;
use crate::middleware::require_auth;
use crate::{applications, health, stores};

/// Multipart framing on top of the largest accepted image.
const UPLOAD_BODY_LIMIT: usize = MAX_IMAGE_BYTES + 1024 * 1024;

/// Build the full HTTP surface. Cross-cutting layers (CORS, tracing) are
/// added by the binary.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/user/register", post(auth::register))
        .route("/user/login", post(auth::user_login))
        .route("/store/login", post(auth::store_login))
        .route("/stores", get(stores::list_stores))
        .route("/store/{id}", get(stores::get_store));

    let protected_routes = Router::new()
        .route("/user/dashboard", get(auth::user_dashboard))
        .route("/store-dashboard", get(stores::store_dashboard))
        .route("/store/dashboard", get(stores::store_dashboard))
        .route("/store-hiring", put(stores::update_hiring))
        .route(
            "/store-img",
            post(stores::upload_image).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route("/apply-store/{id}", post(applications::apply_store))
        .route("/apply-user/{id}", post(applications::apply_user))
        .route("/application/store", get(applications::review_store))
        .route("/application/user", get(applications::review_user))
        .route("/status-apply-user/{id}", put(applications::status_user))
        .route("/status-apply-store/{id}", put(applications::status_store))
        .route("/applicants/{id}", delete(applications::delete_application))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let uploads = ServeDir::new(state.images.root());

    Router::new()
        .nest("/api", public_routes.merge(protected_routes))
        .route("/hc", get(health::health))
        .nest_service("/uploads", uploads)
        .with_state(state)
}
