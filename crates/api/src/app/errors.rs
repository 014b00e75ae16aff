use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use firmreg_auth::{AuthError, PasswordError, TokenError};
use firmreg_companies::ValidationError;
use firmreg_core::DomainError;
use firmreg_infra::StoreError;

/// Every authorization failure is reported as 401; the code says which one.
pub fn auth_error_to_response(err: AuthError) -> axum::response::Response {
    json_error(StatusCode::UNAUTHORIZED, err.code(), err.to_string())
}

pub fn validation_error_to_response(err: ValidationError) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, err.code(), err.to_string())
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
    }
}

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    match err {
        StoreError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        StoreError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        StoreError::Domain(e) => domain_error_to_response(e),
        StoreError::Backend { operation, message } => {
            tracing::error!(operation, %message, "store failure");
            internal_error("store_error")
        }
    }
}

pub fn password_error_to_response(err: PasswordError) -> axum::response::Response {
    tracing::error!(error = %err, "password hashing failed");
    internal_error("password_error")
}

pub fn token_error_to_response(err: TokenError) -> axum::response::Response {
    tracing::error!(error = %err, "token signing failed");
    internal_error("token_error")
}

/// Internal details stay in the log.
pub fn internal_error(code: &'static str) -> axum::response::Response {
    json_error(StatusCode::INTERNAL_SERVER_ERROR, code, "internal server error")
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_auth_error_is_unauthorized() {
        for err in [
            AuthError::MissingCredential,
            AuthError::MalformedCredential,
            AuthError::MalformedToken,
            AuthError::InvalidSignature,
            AuthError::Expired,
            AuthError::InsufficientRole,
        ] {
            assert_eq!(auth_error_to_response(err).status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn merger_errors_are_bad_request() {
        for err in [
            ValidationError::EmptyPatch,
            ValidationError::FieldTooLong { field: "description", max: 3000, actual: 3001 },
            ValidationError::FieldBelowMinimum { field: "amount_of_employees", min: 1, actual: 0 },
        ] {
            assert_eq!(validation_error_to_response(err).status(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn store_errors_map_to_distinct_statuses() {
        assert_eq!(store_error_to_response(StoreError::NotFound).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            store_error_to_response(StoreError::Conflict("dup".into())).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            store_error_to_response(StoreError::Domain(DomainError::validation("bad type"))).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            store_error_to_response(StoreError::backend("op", "boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
