//! Bearer-token stub guarding the write and account endpoints.
//!
//! Any token of at least ten characters is accepted and attributed to a
//! fixed demo user. There is no verification behind it.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};
use swaglex_blog::AuthorSnapshot;
use tracing::debug;

use crate::problem::ApiError;

const MIN_TOKEN_LEN: usize = 10;
const DEMO_USER_ID: &str = "123e4567-e89b-12d3-a456-426614174000";

/// The caller attached to an authenticated request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: String,
    pub username: String,
    pub role: String,
}

impl AuthUser {
    fn demo() -> Self {
        Self {
            id: DEMO_USER_ID.to_string(),
            username: "demo_user".to_string(),
            role: "writer".to_string(),
        }
    }

    pub fn snapshot(&self) -> AuthorSnapshot {
        AuthorSnapshot {
            id: self.id.clone(),
            username: self.username.clone(),
            email: None,
            first_name: None,
            last_name: None,
        }
    }
}

pub fn authenticate(headers: &HeaderMap) -> Result<AuthUser, ApiError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthorized(
            "Missing or invalid authorization header",
        ))?;

    if token.len() < MIN_TOKEN_LEN {
        debug!("Rejected bearer token of length {}", token.len());
        return Err(ApiError::Unauthorized("Invalid token"));
    }

    Ok(AuthUser::demo())
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        authenticate(&parts.headers)
    }
}
