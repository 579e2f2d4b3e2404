use std::collections::HashMap;

use axum::{
    Extension, Json,
    extract::{Multipart, Path, Query, State, rejection::JsonRejection},
};
use tracing::{error, info};

use tukang_types::api::{Envelope, UpdateHiringRequest, UpdateHiringResponse, UploadImageResponse};
use tukang_types::models::{StoreDashboard, StoreDetail, StorePage};

use crate::auth::{AppState, run_blocking};
use crate::directory::{StoreDirectory, UserDirectory};
use crate::error::AppError;
use crate::images::{ImageStore, MAX_IMAGE_BYTES};
use crate::middleware::AuthenticatedActor;
use crate::validation::{json_body, parse_flag, parse_id};

const DEFAULT_PAGE: u32 = 1;
const DEFAULT_LIMIT: u32 = 10;
const MAX_LIMIT: u32 = 100;

/// Positive integer query value, or `default` when absent or malformed.
fn positive_or(raw: Option<&String>, default: u32) -> u32 {
    raw.and_then(|v| v.parse::<u32>().ok())
        .filter(|v| *v >= 1)
        .unwrap_or(default)
}

/// GET /api/stores?page&limit&isHiring
pub async fn list_stores(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Envelope<StorePage>>, AppError> {
    let page = positive_or(params.get("page"), DEFAULT_PAGE);
    let limit = positive_or(params.get("limit"), DEFAULT_LIMIT).min(MAX_LIMIT);
    let hiring = parse_flag(params.get("isHiring").map(String::as_str), "isHiring")?;

    let db = state.db.clone();
    let stores = run_blocking(move || db.list(page, limit, hiring)).await?;

    Ok(Json(Envelope::new("Stores retrieved", stores)))
}

/// GET /api/store/{id}
pub async fn get_store(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<Envelope<StoreDetail>>, AppError> {
    let store_id = parse_id(&raw_id, "store")?;

    let db = state.db.clone();
    let store = run_blocking(move || StoreDirectory::get_detail(&*db, store_id))
        .await?
        .ok_or(AppError::NotFound("store"))?;

    Ok(Json(Envelope::new("Store retrieved", store)))
}

/// GET /api/store-dashboard
pub async fn store_dashboard(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedActor>,
) -> Result<Json<Envelope<StoreDashboard>>, AppError> {
    let inner = state.clone();
    let dashboard = run_blocking(move || {
        let store = inner.workflow.own_store(actor)?;
        let user = UserDirectory::get_detail(&*inner.db, actor.id)?.ok_or(AppError::NotFound("user"))?;
        Ok(StoreDashboard { store, user })
    })
    .await?;

    Ok(Json(Envelope::new("Store dashboard retrieved", dashboard)))
}

/// PUT /api/store-hiring
pub async fn update_hiring(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedActor>,
    payload: Result<Json<UpdateHiringRequest>, JsonRejection>,
) -> Result<Json<Envelope<UpdateHiringResponse>>, AppError> {
    let UpdateHiringRequest { is_hiring } = json_body(payload)?;

    let inner = state.clone();
    let rejected_applications =
        run_blocking(move || inner.workflow.set_own_store_hiring(actor, is_hiring)).await?;

    Ok(Json(Envelope::new(
        "Hiring status updated",
        UpdateHiringResponse {
            is_hiring,
            rejected_applications,
        },
    )))
}

/// POST /api/store-img: multipart field `img`.
pub async fn upload_image(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedActor>,
    mut multipart: Multipart,
) -> Result<Json<Envelope<UploadImageResponse>>, AppError> {
    let inner = state.clone();
    let store = run_blocking(move || inner.workflow.own_store(actor)).await?;

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(e.body_text()))?
    {
        if field.name() != Some("img") {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        let ext = ImageStore::extension_for(&content_type)
            .ok_or_else(|| AppError::Validation("img must be a jpeg, png or webp image".into()))?;
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?;
        upload = Some((ext, data));
        break;
    }

    let (ext, data) = upload.ok_or_else(|| AppError::Validation("img is required".into()))?;
    if data.is_empty() {
        return Err(AppError::Validation("img is empty".into()));
    }
    if data.len() > MAX_IMAGE_BYTES {
        return Err(AppError::Validation("img must be at most 2MB".into()));
    }

    let image = state
        .images
        .save_store_image(store.id, ext, &data)
        .await
        .map_err(|e| AppError::Internal(format!("failed to write store image: {e:#}")))?;

    let db = state.db.clone();
    let store_id = store.id;
    let url = image.url.clone();
    let saved = run_blocking(move || db.attach_image(store_id, &url)).await;

    if let Err(e) = saved {
        if let Err(cleanup) = state.images.remove(&image.path).await {
            error!("Failed to remove orphaned image {}: {:#}", image.path.display(), cleanup);
        }
        return Err(e);
    }

    info!("Store {} uploaded image {}", store_id, image.url);

    Ok(Json(Envelope::new(
        "Image uploaded",
        UploadImageResponse { url_image: image.url },
    )))
}
