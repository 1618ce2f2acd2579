use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Json},
};
use serde_json::Value;
use tracing::debug;

use crate::{
    handlers::AppState,
    spec::{OperationTags, PathsReport, SpecStats, VersionInfo},
};

#[utoipa::path(
    get,
    path = "/spec.json",
    tag = "documentation",
    responses((status = 200, description = "The OpenAPI document as JSON", body = Value))
)]
pub async fn spec_json(State(state): State<AppState>) -> Json<Value> {
    debug!("GET /spec.json called");
    Json(state.spec.document().clone())
}

#[utoipa::path(
    get,
    path = "/spec.yaml",
    tag = "documentation",
    responses((status = 200, description = "The OpenAPI document as YAML", body = String, content_type = "application/yaml"))
)]
pub async fn spec_yaml(State(state): State<AppState>) -> impl IntoResponse {
    debug!("GET /spec.yaml called");
    (
        [(header::CONTENT_TYPE, "application/yaml")],
        state.spec.yaml().to_string(),
    )
}

#[utoipa::path(
    get,
    path = "/api/stats",
    tag = "documentation",
    responses((status = 200, description = "Counts of paths, operations, tags, servers and security schemes", body = SpecStats))
)]
pub async fn spec_stats(State(state): State<AppState>) -> Json<SpecStats> {
    debug!("GET /api/stats called");
    Json(state.spec.stats(&state.docs_path))
}

#[utoipa::path(
    get,
    path = "/api/paths",
    tag = "documentation",
    responses((status = 200, description = "Every documented path with its operations", body = PathsReport))
)]
pub async fn spec_paths(State(state): State<AppState>) -> Json<PathsReport> {
    debug!("GET /api/paths called");
    Json(state.spec.paths())
}

#[utoipa::path(
    get,
    path = "/api/tags",
    tag = "documentation",
    responses((status = 200, description = "Documented operations grouped by tag", body = OperationTags))
)]
pub async fn spec_tags(State(state): State<AppState>) -> Json<OperationTags> {
    debug!("GET /api/tags called");
    Json(state.spec.tags())
}

#[utoipa::path(
    get,
    path = "/api/version",
    tag = "documentation",
    responses((status = 200, description = "Title, version, contact, license and servers of the API", body = VersionInfo))
)]
pub async fn spec_version(State(state): State<AppState>) -> Json<VersionInfo> {
    debug!("GET /api/version called");
    Json(state.spec.version_info())
}
