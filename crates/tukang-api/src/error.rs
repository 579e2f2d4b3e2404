use std::collections::BTreeMap;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::Value;
use tracing::error;

use tukang_types::api::Envelope;
use tukang_types::models::ApplicationStatus;

/// Field name -> failed rule, reported together for one request.
pub type FieldErrors = BTreeMap<&'static str, String>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("validation failed")]
    InvalidFields(FieldErrors),
    #[error("{0}")]
    Unauthorized(&'static str),
    #[error("{0}")]
    Forbidden(&'static str),
    #[error("invalid {0} ID")]
    InvalidReference(&'static str),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("application already exists for this user and store")]
    DuplicateApplication,
    #[error("store is not hiring")]
    StoreNotHiring,
    #[error("application is already {0}")]
    InvalidTransition(ApplicationStatus),
    #[error("phone number already registered")]
    PhoneTaken,
    #[error(transparent)]
    Persistence(#[from] anyhow::Error),
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::InvalidFields(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::InvalidReference(_) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::DuplicateApplication
            | Self::StoreNotHiring
            | Self::InvalidTransition(_)
            | Self::PhoneTaken => StatusCode::CONFLICT,
            Self::Persistence(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match self {
            Self::InvalidFields(fields) => {
                let data = fields
                    .into_iter()
                    .map(|(field, rule)| (field.to_string(), Value::String(rule)))
                    .collect::<serde_json::Map<_, _>>();
                Envelope::new("Validation failed", Value::Object(data))
            }
            Self::Persistence(e) => {
                error!("Persistence error: {:#}", e);
                Envelope::empty("internal server error")
            }
            Self::Internal(msg) => {
                error!("Internal error: {}", msg);
                Envelope::empty("internal server error")
            }
            other => Envelope::empty(other.to_string()),
        };

        (status, Json(body)).into_response()
    }
}
