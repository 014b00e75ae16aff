use axum::{extract::Extension, http::StatusCode, Json};

use firmreg_auth::Principal;

use crate::app::dto;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(Extension(principal): Extension<Principal>) -> axum::response::Response {
    use axum::response::IntoResponse;

    Json(dto::WhoAmIResponse {
        subject: principal.subject(),
        role: principal.role().as_str(),
        expires_at: principal.expires_at(),
    })
    .into_response()
}
