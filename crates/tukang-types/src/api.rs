use serde::{Deserialize, Serialize};

use crate::models::Role;

// -- JWT Claims --

/// Token claims shared by issuance and the auth middleware.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64,
    pub role: Role,
    pub apps: String,
    pub exp: usize,
}

// -- Envelope --

/// Every response body: `{ "message": ..., "data": ... }`.
#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub message: String,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn empty(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            data: None,
        }
    }
}

// -- Auth --

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub phone_number: String,
    pub name: String,
    pub password: String,
    pub role: String,
    #[serde(default)]
    pub store_name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub working_hours: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub user_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub phone_number: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user_id: i64,
    pub role: Role,
}

// -- Stores --

#[derive(Debug, Deserialize)]
pub struct UpdateHiringRequest {
    pub is_hiring: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateHiringResponse {
    pub is_hiring: bool,
    pub rejected_applications: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadImageResponse {
    pub url_image: String,
}

// -- Applications --

#[derive(Debug, Serialize, Deserialize)]
pub struct ApplyResponse {
    pub application_id: i64,
}
