use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderValue,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::{net::SocketAddr, sync::Arc};
use tracing::{debug, warn};

use crate::{
    problem::ApiError,
    rate_limiter::{RateLimitError, RateLimiter},
};

const RATE_LIMITED_PREFIX: &str = "/api";

/// Gates every `/api` request through the limiter. Other paths pass
/// straight through.
pub async fn rate_limit_middleware(
    State(rate_limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    if !is_rate_limited(request.uri().path()) {
        return next.run(request).await;
    }

    let identifier = extract_identifier(&request);

    match rate_limiter.check(&identifier) {
        Ok(admission) => {
            debug!(
                "Rate limit check passed for identifier: {} ({} used)",
                identifier, admission.used
            );

            let mut response = next.run(request).await;
            add_rate_limit_headers(&mut response, admission.remaining, &rate_limiter);
            response
        }
        Err(RateLimitError::LimitExceeded {
            limit,
            retry_after_secs,
        }) => {
            warn!(
                "Rate limit exceeded for identifier '{}': limit {}, retry after {}s",
                identifier, limit, retry_after_secs
            );

            let mut response = ApiError::Throttled { retry_after_secs }.into_response();
            add_rate_limit_headers(&mut response, 0, &rate_limiter);
            response
        }
    }
}

fn is_rate_limited(path: &str) -> bool {
    path.strip_prefix(RATE_LIMITED_PREFIX)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

fn extract_identifier(request: &Request) -> String {
    if let Some(forwarded_for) = request.headers().get("x-forwarded-for")
        && let Ok(forwarded_str) = forwarded_for.to_str()
        && let Some(first_ip) = forwarded_str.split(',').map(str::trim).find(|ip| !ip.is_empty())
    {
        return first_ip.to_string();
    }

    if let Some(real_ip) = request.headers().get("x-real-ip")
        && let Ok(ip_str) = real_ip.to_str()
        && !ip_str.trim().is_empty()
    {
        return ip_str.trim().to_string();
    }

    if let Some(ConnectInfo(addr)) = request.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }

    "unknown".to_string()
}

fn add_rate_limit_headers(response: &mut Response, remaining: usize, rate_limiter: &RateLimiter) {
    let headers = response.headers_mut();

    if let Ok(limit_header) = HeaderValue::from_str(&rate_limiter.max_requests().to_string()) {
        headers.insert("X-RateLimit-Limit", limit_header);
    }

    if let Ok(remaining_header) = HeaderValue::from_str(&remaining.to_string()) {
        headers.insert("X-RateLimit-Remaining", remaining_header);
    }

    if let Ok(window_header) = HeaderValue::from_str(&rate_limiter.window_seconds().to_string()) {
        headers.insert("X-RateLimit-Window", window_header);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rate_limiter::RateLimitConfig;
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode},
        middleware,
        routing::get,
    };
    use rstest::rstest;
    use tower::ServiceExt;

    fn app(max_requests: usize) -> Router {
        let rate_limiter = Arc::new(RateLimiter::new(RateLimitConfig {
            max_requests,
            window_ms: 60_000,
            sweep_every: 0,
            ..Default::default()
        }));

        Router::new()
            .route("/api/ping", get(|| async { "pong" }))
            .route("/health", get(|| async { "ok" }))
            .layer(middleware::from_fn_with_state(rate_limiter, rate_limit_middleware))
    }

    fn request(path: &str, client: &str) -> Request<Body> {
        Request::builder()
            .uri(path)
            .header("x-forwarded-for", client)
            .body(Body::empty())
            .unwrap()
    }

    #[test]
    fn test_extract_identifier_from_forwarded_for() {
        let request = Request::builder()
            .header("x-forwarded-for", "192.168.1.1, 10.0.0.1")
            .body(Body::empty())
            .unwrap();

        assert_eq!(extract_identifier(&request), "192.168.1.1");
    }

    #[test]
    fn test_extract_identifier_from_real_ip() {
        let request = Request::builder()
            .header("x-real-ip", "192.168.1.100")
            .body(Body::empty())
            .unwrap();

        assert_eq!(extract_identifier(&request), "192.168.1.100");
    }

    #[test]
    fn test_extract_identifier_from_peer_address() {
        let mut request = Request::builder().body(Body::empty()).unwrap();
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 4000))));

        assert_eq!(extract_identifier(&request), "127.0.0.1");
    }

    #[test]
    fn test_extract_identifier_fallback() {
        let request = Request::builder().body(Body::empty()).unwrap();
        assert_eq!(extract_identifier(&request), "unknown");
    }

    #[rstest]
    #[case("/api", true)]
    #[case("/api/articles", true)]
    #[case("/apix", false)]
    #[case("/health", false)]
    #[case("/", false)]
    fn test_is_rate_limited(#[case] path: &str, #[case] expected: bool) {
        assert_eq!(is_rate_limited(path), expected);
    }

    #[tokio::test]
    async fn test_rejects_after_limit_with_headers() {
        let app = app(2);

        for remaining in ["1", "0"] {
            let response = app.clone().oneshot(request("/api/ping", "10.0.0.1")).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(response.headers()["X-RateLimit-Limit"], "2");
            assert_eq!(response.headers()["X-RateLimit-Remaining"], remaining);
            assert_eq!(response.headers()["X-RateLimit-Window"], "60");
        }

        let response = app.clone().oneshot(request("/api/ping", "10.0.0.1")).await.unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()["Retry-After"], "60");

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Too Many Requests");
        assert_eq!(json["message"], "Rate limit exceeded. Please try again later.");
        assert_eq!(json["code"], 429);
        assert_eq!(json["retryAfter"], 60);

        // A different client still has its full budget.
        let response = app.oneshot(request("/api/ping", "10.0.0.2")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_non_api_paths_are_not_limited() {
        let app = app(1);
        for _ in 0..3 {
            let response = app.clone().oneshot(request("/health", "10.0.0.1")).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            assert!(response.headers().get("X-RateLimit-Limit").is_none());
        }
    }
}
