//! HTTP server for the swaglex demo blog API and its OpenAPI documentation.
//!
//! [`create_router`](routes::create_router) assembles the axum application;
//! [`start_server`](server::start_server) binds it and runs until a shutdown
//! signal arrives.

pub mod api;
pub mod auth;
pub mod cleanup;
pub mod config;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod problem;
pub mod rate_limiter;
pub mod routes;
pub mod server;
pub mod spec;

pub use cleanup::CleanupService;
pub use config::Config;
pub use handlers::AppState;
pub use problem::{ApiError, ErrorBody};
pub use rate_limiter::{Clock, ManualClock, RateLimitConfig, RateLimitError, RateLimiter, SystemClock};
pub use spec::{ApiSpec, SpecError};
