use std::{io, net::SocketAddr, sync::Arc};
use swaglex_blog::BlogStore;
use thiserror::Error;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    cleanup::CleanupService,
    config::{Config, LogFormat},
    handlers::AppState,
    rate_limiter::RateLimiter,
    routes::create_router,
    spec::{ApiSpec, SpecError},
};

#[derive(Error, Debug)]
pub enum ServerError {
    #[error(transparent)]
    Spec(#[from] SpecError),
    #[error("Failed to bind to address {address}: {source}")]
    Bind { address: String, source: io::Error },
    #[error("Server terminated unexpectedly: {0}")]
    Serve(#[source] io::Error),
}

pub fn init_tracing(config: &Config) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| config.log_level.clone().into());

    match config.log_format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json())
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer())
                .init();
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// The document to serve: the configured file, or the generated one.
pub fn load_spec(config: &Config) -> Result<ApiSpec, SpecError> {
    match &config.spec_path {
        Some(path) => {
            info!("Loading OpenAPI document from {}", path.display());
            ApiSpec::load(path)
        }
        None => ApiSpec::generated(),
    }
}

pub async fn start_server(config: Config) -> Result<(), ServerError> {
    info!("Starting swaglex-web-api server with config: {:?}", config);

    let spec = load_spec(&config)?;
    info!(
        "Serving OpenAPI document: {} v{}",
        spec.title().unwrap_or_else(|| "Unknown".to_string()),
        spec.version().unwrap_or_else(|| "1.0.0".to_string())
    );

    let rate_limiter = Arc::new(RateLimiter::new(config.rate_limit.clone()));
    info!(
        "Rate limiter initialized: {} requests per {}ms",
        rate_limiter.max_requests(),
        rate_limiter.window_ms()
    );

    let state = AppState::new(BlogStore::seeded(), spec, &config);
    let app = create_router(&config, state, Arc::clone(&rate_limiter));

    let bind_address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .map_err(|source| ServerError::Bind {
            address: bind_address.clone(),
            source,
        })?;

    let server_url = config.server_url();
    info!("Server running on {}", server_url);
    info!("Documentation available at {}{}", server_url, config.docs_path);
    info!("OpenAPI JSON at {}/spec.json, YAML at {}/spec.yaml", server_url, server_url);
    info!("Environment: {}", config.environment);

    info!("Configuration options:");
    info!("  SWAGLEX_HOST: Host to bind to (default: 0.0.0.0)");
    info!("  SWAGLEX_PORT: Port to bind to (default: 3003)");
    info!("  SWAGLEX_ENV or NODE_ENV: Environment name (default: development)");
    info!("  RUST_LOG or SWAGLEX_LOG_LEVEL: Log level (default: swaglex_web_api=debug,tower_http=debug)");
    info!("  SWAGLEX_LOG_FORMAT: Log format - 'json' or 'text' (default: json)");
    info!("  SWAGLEX_CORS_ORIGINS: Comma-separated CORS origins (default: http://localhost:3000,http://localhost:3003)");
    info!("  SWAGLEX_SPEC_PATH: OpenAPI YAML/JSON file to serve (default: generated)");
    info!("  SWAGLEX_DOCS_PATH: Swagger UI mount path (default: /docs)");
    info!("  SWAGLEX_RATE_LIMIT_MAX_REQUESTS: Requests per window (default: 100)");
    info!("  SWAGLEX_RATE_LIMIT_WINDOW_MS: Window size in milliseconds (default: 900000)");
    info!("  SWAGLEX_RATE_LIMIT_SWEEP_EVERY: Sweep idle clients every N admits, 0 disables (default: 100)");
    info!("  SWAGLEX_RATE_LIMIT_CLEANUP_INTERVAL_SECONDS: Cleanup interval in seconds (default: 60)");

    let mut cleanup_service = CleanupService::new(
        Arc::clone(&rate_limiter),
        config.rate_limit.cleanup_interval_seconds,
    );
    cleanup_service.start();

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(ServerError::Serve)?;

    cleanup_service.stop();
    info!("Shutting down swaglex-web-api server");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_load_spec_defaults_to_generated() {
        let spec = load_spec(&Config::default()).unwrap();
        assert_eq!(spec.title().as_deref(), Some("Custom Blog API"));
    }

    #[test]
    fn test_load_spec_reports_missing_file() {
        let config = Config {
            spec_path: Some(PathBuf::from("/no/such/openapi.yaml")),
            ..Default::default()
        };
        let err = load_spec(&config).unwrap_err();
        assert!(err.to_string().contains("/no/such/openapi.yaml"));
    }

    #[tokio::test]
    async fn test_bind_failure_is_reported() {
        let occupied = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = occupied.local_addr().unwrap().port();

        let config = Config {
            host: "127.0.0.1".to_string(),
            port,
            ..Default::default()
        };
        let err = start_server(config).await.unwrap_err();
        assert!(matches!(err, ServerError::Bind { .. }));
    }
}
