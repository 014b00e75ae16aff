use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;

use firmreg_auth::Registration;
use firmreg_infra::StoreError;

use crate::app::{dto, errors, services::AppServices};

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    payload: Result<Json<dto::RegisterRequest>, JsonRejection>,
) -> axum::response::Response {
    let body = match dto::body(payload) {
        Ok(b) => b,
        Err(resp) => return resp,
    };

    let registration = match Registration::parse(&body.username, &body.password, &body.role) {
        Ok(r) => r,
        Err(e) => return errors::domain_error_to_response(e),
    };

    // Hashing blocks for the whole bcrypt cost; run it on the blocking pool.
    let hasher = Arc::clone(&services.hasher);
    let password = registration.password.clone();
    let hash = match tokio::task::spawn_blocking(move || hasher.hash(&password)).await {
        Ok(Ok(h)) => h,
        Ok(Err(e)) => return errors::password_error_to_response(e),
        Err(_) => return errors::internal_error("password_error"),
    };

    let user = registration.into_user(hash, Utc::now());
    let (username, role) = (user.username.clone(), user.role);

    match services.users.insert(user).await {
        Ok(()) => {
            tracing::info!(%username, %role, "user registered");
            (
                StatusCode::CREATED,
                Json(dto::MessageResponse { message: "registration successful" }),
            )
                .into_response()
        }
        Err(StoreError::Conflict(_)) => {
            errors::json_error(StatusCode::CONFLICT, "username_taken", "username is already registered")
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    payload: Result<Json<dto::LoginRequest>, JsonRejection>,
) -> axum::response::Response {
    let body = match dto::body(payload) {
        Ok(b) => b,
        Err(resp) => return resp,
    };

    let user = match services.users.find_by_username(body.username.trim()).await {
        Ok(Some(u)) => u,
        Ok(None) => return invalid_credentials(),
        Err(e) => return errors::store_error_to_response(e),
    };

    let hasher = Arc::clone(&services.hasher);
    let stored_hash = user.password_hash.clone();
    let password = body.password;
    match tokio::task::spawn_blocking(move || hasher.verify(&password, &stored_hash)).await {
        Ok(Ok(true)) => {}
        Ok(Ok(false)) => return invalid_credentials(),
        Ok(Err(e)) => return errors::password_error_to_response(e),
        Err(_) => return errors::internal_error("password_error"),
    }

    let issued = match services.tokens.issue(&user.username, user.role) {
        Ok(t) => t,
        Err(e) => return errors::token_error_to_response(e),
    };

    tracing::info!(username = %user.username, role = %user.role, "login succeeded");
    (
        StatusCode::OK,
        Json(dto::LoginResponse {
            token: issued.token,
            expires_at: issued.claims.expires_at(),
        }),
    )
        .into_response()
}

fn invalid_credentials() -> axum::response::Response {
    errors::json_error(StatusCode::UNAUTHORIZED, "invalid_credentials", "invalid username or password")
}
