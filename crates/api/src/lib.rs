//! HTTP API: configuration, request governance, routing and handlers.

pub mod app;
pub mod config;
pub mod middleware;
pub mod rate_limit;
