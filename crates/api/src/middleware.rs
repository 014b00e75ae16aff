use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use tracing::{Instrument, info, warn};

use firmreg_auth::{AuthError, AuthorizationGate, Claims, Principal};

use crate::app::errors;

#[derive(Clone)]
pub struct AuthState {
    pub gate: AuthorizationGate,
}

/// Runs the authorization gate and stores the [`Principal`] for handlers.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let claims = match authorize_request(&state.gate, &req) {
        Ok(claims) => claims,
        Err(e) => {
            warn!(
                method = %req.method(),
                path = %req.uri().path(),
                reason = e.code(),
                "request denied"
            );
            return errors::auth_error_to_response(e);
        }
    };

    req.extensions_mut().insert(Principal::from(claims));
    next.run(req).await
}

fn authorize_request(gate: &AuthorizationGate, req: &Request<Body>) -> Result<Claims, AuthError> {
    let header = req
        .headers()
        .get(header::AUTHORIZATION)
        .map(|v| v.to_str().map_err(|_| AuthError::MalformedCredential))
        .transpose()?;

    gate.authorize(header, req.method().as_str())
}

/// Access log: one event per request with method, path, status, latency,
/// client address and user agent.
pub async fn request_logging(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let client_ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_default();
    let user_agent = request
        .headers()
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let span = tracing::info_span!("http_request", method = %method, path = %path);
    let start = Instant::now();
    let response = next.run(request).instrument(span).await;
    let latency_ms = start.elapsed().as_millis() as u64;
    let status = response.status().as_u16();

    if response.status().is_server_error() {
        warn!(%method, %path, status, latency_ms, %client_ip, %user_agent, "request failed");
    } else {
        info!(%method, %path, status, latency_ms, %client_ip, %user_agent, "request completed");
    }

    response
}
