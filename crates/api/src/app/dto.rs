use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::app::errors;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct WhoAmIResponse<'a> {
    pub subject: &'a str,
    pub role: &'a str,
    pub expires_at: DateTime<Utc>,
}

/// `{"data": ...}` wrapper used by the company endpoints.
#[derive(Debug, Serialize)]
pub struct Data<T> {
    pub data: T,
}

/// Turn a body extraction failure into the usual JSON error shape.
pub fn body<T>(payload: Result<axum::Json<T>, JsonRejection>) -> Result<T, axum::response::Response> {
    payload
        .map(|axum::Json(value)| value)
        .map_err(|rejection| errors::json_error(StatusCode::BAD_REQUEST, "invalid_body", rejection.body_text()))
}
