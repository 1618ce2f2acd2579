use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use swaglex_blog::{BlogError, FieldError};
use thiserror::Error;
use utoipa::ToSchema;

/// Routes listed in 404 responses.
pub const AVAILABLE_ENDPOINTS: [&str; 19] = [
    "GET /",
    "GET /api/info",
    "GET /api/articles",
    "POST /api/articles",
    "GET /api/articles/tags",
    "GET /api/articles/{id}",
    "GET /api/articles/{id}/comments",
    "POST /api/articles/{id}/comments",
    "GET /api/users/profile",
    "PUT /api/users/profile",
    "GET /api/analytics",
    "GET /api/search",
    "GET /api/stats",
    "GET /api/paths",
    "GET /api/tags",
    "GET /api/version",
    "GET /spec.json",
    "GET /spec.yaml",
    "GET /health",
];

/// Error envelope shared by every failing endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    #[schema(example = "Validation Error")]
    pub error: String,
    pub message: String,
    #[schema(example = 400)]
    pub code: u16,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<FieldError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub available_endpoints: Vec<String>,
}

impl ErrorBody {
    pub fn new(status: StatusCode, error: &str, message: impl Into<String>) -> Self {
        Self {
            error: error.to_string(),
            message: message.into(),
            code: status.as_u16(),
            details: Vec::new(),
            retry_after: None,
            available_endpoints: Vec::new(),
        }
    }

    pub fn with_details(mut self, details: Vec<FieldError>) -> Self {
        self.details = details;
        self
    }

    pub fn with_retry_after(mut self, seconds: u64) -> Self {
        self.retry_after = Some(seconds);
        self
    }

    pub fn with_available_endpoints(mut self, endpoints: &[&str]) -> Self {
        self.available_endpoints = endpoints.iter().map(|e| e.to_string()).collect();
        self
    }
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Blog(#[from] BlogError),
    #[error("{0}")]
    Unauthorized(&'static str),
    #[error("Rate limit exceeded. Please try again later.")]
    Throttled { retry_after_secs: u64 },
    #[error("Route {method} {path} not found")]
    RouteNotFound { method: String, path: String },
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Blog(BlogError::NotFound { .. }) | Self::RouteNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            Self::Blog(BlogError::Validation { .. }) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Throttled { .. } => StatusCode::TOO_MANY_REQUESTS,
        }
    }

    pub fn body(&self) -> ErrorBody {
        let status = self.status();
        let message = self.to_string();
        match self {
            Self::Blog(err @ BlogError::Validation { .. }) => {
                ErrorBody::new(status, "Validation Error", message).with_details(err.details().to_vec())
            }
            Self::Blog(BlogError::NotFound { .. }) => ErrorBody::new(status, "Not Found", message),
            Self::Unauthorized(_) => ErrorBody::new(status, "Unauthorized", message),
            Self::Throttled { retry_after_secs } => {
                ErrorBody::new(status, "Too Many Requests", message).with_retry_after(*retry_after_secs)
            }
            Self::RouteNotFound { .. } => {
                ErrorBody::new(status, "Not Found", message).with_available_endpoints(&AVAILABLE_ENDPOINTS)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = (self.status(), Json(self.body())).into_response();
        if let Self::Throttled { retry_after_secs } = self
            && let Ok(value) = HeaderValue::from_str(&retry_after_secs.to_string())
        {
            response.headers_mut().insert(header::RETRY_AFTER, value);
        }
        response
    }
}
