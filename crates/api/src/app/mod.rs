//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: stores, token service, gate and limiter
//! - `routes/`: HTTP handlers, one file per resource
//! - `dto.rs`: request/response bodies
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{
    Extension, Router,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, patch, post},
};

use crate::{middleware, rate_limit};

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
///
/// Layering, outermost first: access log, rate limiter, then the
/// authorization gate on the routes that need it.
pub fn build_app(services: AppServices) -> Router {
    let auth_state = middleware::AuthState {
        gate: services.gate.clone(),
    };
    let gated = || from_fn_with_state(auth_state.clone(), middleware::auth_middleware);
    let limiter = Arc::clone(&services.limiter);

    let api = Router::new()
        .route("/users/register", post(routes::users::register))
        .route("/users/login", post(routes::users::login))
        .route("/whoami", get(routes::system::whoami).route_layer(gated()))
        .route(
            "/companies",
            post(routes::companies::create_company).route_layer(gated()),
        )
        .route(
            "/companies/:id",
            get(routes::companies::get_company).merge(
                patch(routes::companies::update_company)
                    .delete(routes::companies::delete_company)
                    .route_layer(gated()),
            ),
        );

    Router::new()
        .route("/health", get(routes::system::health))
        .nest("/api/v1", api)
        .layer(Extension(Arc::new(services)))
        .layer(from_fn_with_state(limiter, rate_limit::rate_limit_middleware))
        .layer(from_fn(middleware::request_logging))
}
