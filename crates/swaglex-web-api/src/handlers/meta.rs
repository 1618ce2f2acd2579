use axum::{
    extract::State,
    http::{Method, Uri},
    response::Json,
};
use chrono::Utc;
use tracing::debug;

use crate::{
    api::{HealthResponse, InfoEndpoints, InfoResponse, RootLinks, RootResponse, SpecLinks, StoreStats},
    handlers::{AppState, SERVICE_NAME},
    problem::ApiError,
};

const FEATURES: [&str; 8] = [
    "articles",
    "comments",
    "users",
    "analytics",
    "search",
    "custom-middleware",
    "rate-limiting",
    "compression",
];

#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: state.spec.version(),
        service: SERVICE_NAME.to_string(),
        environment: state.environment.to_string(),
        uptime: state.started_at.elapsed().as_secs_f64(),
        timestamp: Utc::now(),
        features: FEATURES.iter().map(|f| f.to_string()).collect(),
    })
}

#[utoipa::path(
    get,
    path = "/api/info",
    tag = "system",
    responses((status = 200, description = "API metadata, endpoint map and live record counts", body = InfoResponse))
)]
pub async fn info(State(state): State<AppState>) -> Json<InfoResponse> {
    debug!("GET /api/info called");

    let stats = {
        let store = state.store.lock().await;
        StoreStats {
            total_articles: store.articles().len(),
            total_users: store.users().len(),
            total_comments: store.comments().len(),
        }
    };

    Json(InfoResponse {
        name: state.spec.title(),
        version: state.spec.version(),
        description: state.spec.description(),
        environment: state.environment.to_string(),
        endpoints: InfoEndpoints {
            articles: "/api/articles".to_string(),
            users: "/api/users".to_string(),
            analytics: "/api/analytics".to_string(),
            search: "/api/search".to_string(),
            docs: state.docs_path.to_string(),
            spec: SpecLinks::default(),
            health: "/health".to_string(),
        },
        stats,
    })
}

#[utoipa::path(
    get,
    path = "/",
    tag = "system",
    responses((status = 200, description = "Entry points of the server", body = RootResponse))
)]
pub async fn root(State(state): State<AppState>) -> Json<RootResponse> {
    Json(RootResponse {
        message: "Custom Blog API Server".to_string(),
        version: state.spec.version(),
        documentation: state.docs_path.to_string(),
        api: RootLinks {
            info: "/api/info".to_string(),
            spec: SpecLinks::default(),
            health: "/health".to_string(),
        },
        environment: state.environment.to_string(),
        timestamp: Utc::now(),
    })
}

pub async fn not_found(method: Method, uri: Uri) -> ApiError {
    debug!("No route for {} {}", method, uri.path());
    ApiError::RouteNotFound {
        method: method.to_string(),
        path: uri.path().to_string(),
    }
}
