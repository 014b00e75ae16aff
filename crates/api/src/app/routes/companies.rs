use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use firmreg_auth::Principal;
use firmreg_companies::{CompanyPatch, CreateCompany, UpdateCompanyRequest};
use firmreg_core::CompanyId;

use crate::app::{dto, errors, services::AppServices};

pub async fn create_company(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    payload: Result<Json<CreateCompany>, JsonRejection>,
) -> axum::response::Response {
    let body = match dto::body(payload) {
        Ok(b) => b,
        Err(resp) => return resp,
    };

    let new_company = match body.validate() {
        Ok(c) => c,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.companies.create(new_company).await {
        Ok(company) => {
            tracing::info!(id = %company.id, name = %company.name, by = principal.subject(), "company created");
            (StatusCode::CREATED, Json(dto::Data { data: company })).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_company(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.companies.get(id).await {
        Ok(company) => (StatusCode::OK, Json(dto::Data { data: company })).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_company(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateCompanyRequest>, JsonRejection>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let body = match dto::body(payload) {
        Ok(b) => b,
        Err(resp) => return resp,
    };

    let patch = match CompanyPatch::build(body) {
        Ok(p) => p,
        Err(e) => return errors::validation_error_to_response(e),
    };

    match services.companies.update(id, &patch).await {
        Ok(company) => {
            tracing::info!(%id, fields = ?patch.fields(), by = principal.subject(), "company updated");
            (StatusCode::OK, Json(dto::Data { data: company })).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_company(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.companies.delete(id).await {
        Ok(()) => {
            tracing::info!(%id, by = principal.subject(), "company deleted");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

fn parse_id(raw: &str) -> Result<CompanyId, axum::response::Response> {
    raw.parse::<CompanyId>()
        .map_err(errors::domain_error_to_response)
}
