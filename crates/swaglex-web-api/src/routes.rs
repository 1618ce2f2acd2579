use axum::{
    Router,
    body::Body,
    extract::DefaultBodyLimit,
    http::{HeaderName, HeaderValue, Method, Request, Response, header},
    middleware,
    routing::get,
};
use std::{sync::Arc, time::Duration};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{Span, info, info_span, warn};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    config::Config,
    handlers::{AppState, blog, docs, meta},
    middleware::{compression::compression_layer, honor_no_compression, rate_limit_middleware, security_headers},
    rate_limiter::RateLimiter,
};

const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

pub fn create_router(config: &Config, state: AppState, rate_limiter: Arc<RateLimiter>) -> Router {
    let api = Router::new()
        .route("/api/articles", get(blog::list_articles).post(blog::create_article))
        .route("/api/articles/tags", get(blog::article_tags))
        .route("/api/articles/{id}", get(blog::get_article))
        .route(
            "/api/articles/{id}/comments",
            get(blog::list_comments).post(blog::add_comment),
        )
        .route(
            "/api/users/profile",
            get(blog::get_profile).put(blog::update_profile),
        )
        .route("/api/analytics", get(blog::analytics))
        .route("/api/search", get(blog::search))
        .route("/api/stats", get(docs::spec_stats))
        .route("/api/paths", get(docs::spec_paths))
        .route("/api/tags", get(docs::spec_tags))
        .route("/api/version", get(docs::spec_version))
        .route("/api/info", get(meta::info));

    Router::new()
        .merge(api)
        .route("/", get(meta::root))
        .route("/health", get(meta::health))
        .route("/spec.json", get(docs::spec_json))
        .route("/spec.yaml", get(docs::spec_yaml))
        .merge(swagger_ui(&config.docs_path))
        .fallback(meta::not_found)
        .with_state(state)
        .layer(middleware::from_fn_with_state(
            rate_limiter,
            rate_limit_middleware,
        ))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(security_headers))
                .layer(middleware::from_fn(honor_no_compression))
                .layer(compression_layer())
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(|request: &Request<Body>| {
                            info_span!(
                                "request",
                                method = %request.method(),
                                path = %request.uri().path(),
                            )
                        })
                        .on_response(|response: &Response<Body>, latency: Duration, _span: &Span| {
                            info!(
                                "response latency: {:?}, status: {}",
                                latency,
                                response.status()
                            );
                        }),
                )
                .layer(cors_layer(&config.cors_origins)),
        )
}

fn swagger_ui(docs_path: &str) -> SwaggerUi {
    SwaggerUi::new(docs_path.to_string()).config(
        utoipa_swagger_ui::Config::new(["/spec.json"])
            .try_it_out_enabled(true)
            .persist_authorization(true)
            .display_request_duration(true)
            .filter(true)
            .show_extensions(true)
            .show_common_extensions(true),
    )
}

fn cors_layer(cors_origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-requested-with"),
        ]);

    // Credentials cannot be combined with a wildcard origin.
    if cors_origins.iter().any(|origin| origin == "*") {
        return base.allow_origin(Any);
    }

    let origins: Result<Vec<HeaderValue>, _> = cors_origins
        .iter()
        .map(|origin| origin.parse::<HeaderValue>())
        .collect();

    match origins {
        Ok(origins) => base.allow_origin(origins).allow_credentials(true),
        Err(_) => {
            warn!("Invalid CORS origins {:?}, falling back to allow all", cors_origins);
            base.allow_origin(Any)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{rate_limiter::RateLimitConfig, spec::ApiSpec};
    use axum::http::{HeaderMap, StatusCode};
    use serde_json::{Value, json};
    use swaglex_blog::BlogStore;
    use tower::ServiceExt;

    const SEED_ARTICLE: &str = "/api/articles/123e4567-e89b-12d3-a456-426614174000";
    const TOKEN: &str = "Bearer demo-token-123";

    fn app_with_limit(max_requests: usize) -> Router {
        let config = Config {
            rate_limit: RateLimitConfig {
                max_requests,
                window_ms: 60_000,
                sweep_every: 0,
                cleanup_interval_seconds: 60,
            },
            ..Default::default()
        };
        let state = AppState::new(BlogStore::seeded(), ApiSpec::generated().unwrap(), &config);
        let rate_limiter = Arc::new(RateLimiter::new(config.rate_limit.clone()));
        create_router(&config, state, rate_limiter)
    }

    fn app() -> Router {
        app_with_limit(1000)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    fn get_authorized(uri: &str) -> Request<Body> {
        Request::get(uri)
            .header(header::AUTHORIZATION, TOKEN)
            .body(Body::empty())
            .unwrap()
    }

    fn send_json(method: Method, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, token);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn call(app: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, headers, json)
    }

    #[tokio::test]
    async fn test_list_articles_defaults() {
        let (status, _, json) = call(&app(), get("/api/articles")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["articles"].as_array().map(Vec::len), Some(1));
        assert_eq!(
            json["pagination"],
            json!({"page": 1, "limit": 10, "total": 1, "totalPages": 1})
        );

        let (_, _, json) = call(&app(), get("/api/articles?published=false&page=x")).await;
        assert_eq!(json["pagination"]["total"], 0);
        assert_eq!(json["pagination"]["page"], 1);
    }

    #[tokio::test]
    async fn test_get_article_increments_views() {
        let app = app();
        let (status, _, first) = call(&app, get(SEED_ARTICLE)).await;
        assert_eq!(status, StatusCode::OK);
        let (_, _, second) = call(&app, get(SEED_ARTICLE)).await;
        assert_eq!(first["viewCount"], 1251);
        assert_eq!(second["viewCount"], 1252);
    }

    #[tokio::test]
    async fn test_missing_article_is_not_found() {
        let (status, _, json) = call(&app(), get("/api/articles/does-not-exist")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "Not Found");
        assert_eq!(json["message"], "Article not found");
        assert_eq!(json["code"], 404);
    }

    #[tokio::test]
    async fn test_create_article_requires_bearer_token() {
        let app = app();
        let payload = json!({"title": "T", "content": "C"});

        let (status, _, json) = call(&app, send_json(Method::POST, "/api/articles", None, payload.clone())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["message"], "Missing or invalid authorization header");

        let (status, _, json) = call(
            &app,
            send_json(Method::POST, "/api/articles", Some("Bearer short"), payload),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["message"], "Invalid token");
    }

    #[tokio::test]
    async fn test_create_article_validation() {
        let app = app();

        let (status, _, json) = call(&app, send_json(Method::POST, "/api/articles", Some(TOKEN), json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Validation Error");
        assert_eq!(json["details"].as_array().map(Vec::len), Some(2));

        let (status, _, json) = call(
            &app,
            send_json(Method::POST, "/api/articles", Some(TOKEN), json!({"title": "Only a title"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["details"], json!([{"field": "content", "message": "Content is required"}]));
    }

    #[tokio::test]
    async fn test_create_article() {
        let app = app();
        let payload = json!({
            "title": "Hello, Axum World!",
            "content": "Routing and extractors.",
            "tags": ["rust", "axum", "rust"],
            "published": true
        });

        let (status, _, created) = call(&app, send_json(Method::POST, "/api/articles", Some(TOKEN), payload)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["slug"], "hello-axum-world-");
        assert_eq!(created["excerpt"], "Routing and extractors....");
        assert_eq!(created["tags"], json!(["rust", "axum"]));
        assert_eq!(created["author"]["username"], "demo_user");
        assert!(created["publishedAt"].is_string());

        let (_, _, list) = call(&app, get("/api/articles?tag=axum")).await;
        assert_eq!(list["pagination"]["total"], 1);
        assert_eq!(list["articles"][0]["id"], created["id"]);
    }

    #[tokio::test]
    async fn test_comments_flow() {
        let app = app();
        let uri = format!("{SEED_ARTICLE}/comments");

        let (status, _, json) = call(&app, get(&uri)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["pagination"]["limit"], 20);
        assert_eq!(json["pagination"]["total"], 1);

        let (status, _, comment) = call(
            &app,
            send_json(Method::POST, &uri, None, json!({"content": "Nice read"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(comment.get("author").is_none());

        let (_, _, article) = call(&app, get(SEED_ARTICLE)).await;
        assert_eq!(article["commentCount"], 9);

        let (status, _, json) = call(&app, send_json(Method::POST, &uri, Some(TOKEN), json!({"content": ""}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["details"][0]["field"], "content");

        let (_, _, json) = call(&app, get("/api/articles/unknown/comments")).await;
        assert_eq!(json["pagination"]["total"], 0);
    }

    #[tokio::test]
    async fn test_profile_roundtrip() {
        let app = app();

        let (status, _, _) = call(&app, get("/api/users/profile")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _, profile) = call(&app, get_authorized("/api/users/profile")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(profile["username"], "johndoe");

        let (status, _, updated) = call(
            &app,
            send_json(
                Method::PUT,
                "/api/users/profile",
                Some(TOKEN),
                json!({"bio": "Writes about Rust", "firstName": ""}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["bio"], "Writes about Rust");
        assert_eq!(updated["firstName"], profile["firstName"]);
    }

    #[tokio::test]
    async fn test_analytics() {
        let app = app();

        let (status, _, _) = call(&app, get("/api/analytics")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _, json) = call(&app, get_authorized("/api/analytics")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["period"], "month");
        assert_eq!(json["totalArticles"], 1);
        assert_eq!(json["totalViews"], 1250);
        assert_eq!(json["topArticles"][0]["views"], 1250);
        assert_eq!(json["engagement"]["avgLikesPerArticle"], 42.0);

        let (_, _, json) = call(&app, get_authorized("/api/analytics?period=week")).await;
        assert_eq!(json["period"], "week");
    }

    #[tokio::test]
    async fn test_search() {
        let app = app();

        let (status, _, json) = call(&app, get("/api/search?q=a")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "Search query must be at least 2 characters long");

        let (status, _, _) = call(&app, get("/api/search")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _, json) = call(&app, get("/api/search?q=api&type=posts")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, json!({"query": "api", "totalResults": 0}));

        let (status, _, json) = call(&app, get("/api/search?q=API&type=articles")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["totalResults"], 1);
        assert!(json.get("comments").is_none());
        assert!(json.get("users").is_none());

        let (_, _, json) = call(&app, get("/api/search?q=zzzz")).await;
        assert_eq!(json["totalResults"], 0);
        assert_eq!(json["articles"], json!([]));
        assert_eq!(json["comments"], json!([]));
        assert_eq!(json["users"], json!([]));
    }

    #[tokio::test]
    async fn test_article_tags() {
        let (status, _, json) = call(&app(), get("/api/articles/tags")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["tags"][0]["name"], "api");
        assert_eq!(json["tags"][0]["count"], 1);
        assert_eq!(json["tags"].as_array().map(Vec::len), Some(3));
    }

    #[tokio::test]
    async fn test_spec_endpoints() {
        let app = app();

        let (status, _, json) = call(&app, get("/spec.json")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["info"]["title"], "Custom Blog API");

        let response = app.clone().oneshot(get("/spec.yaml")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/yaml");

        let (_, _, stats) = call(&app, get("/api/stats")).await;
        assert!(stats["statistics"]["totalOperations"].as_u64().unwrap() >= 19);
        assert_eq!(stats["statistics"]["securitySchemes"], 1);

        let (_, _, tags) = call(&app, get("/api/tags")).await;
        let articles = tags["tags"]
            .as_array()
            .unwrap()
            .iter()
            .find(|tag| tag["name"] == "articles")
            .unwrap();
        assert_eq!(articles["operationCount"], 4);

        let (_, _, paths) = call(&app, get("/api/paths")).await;
        assert!(paths["totalPaths"].as_u64().unwrap() > 0);

        let (_, _, version) = call(&app, get("/api/version")).await;
        assert_eq!(version["title"], "Custom Blog API");
        assert!(version["lastUpdated"].is_string());
    }

    #[tokio::test]
    async fn test_docs_are_served() {
        let response = app().oneshot(get("/docs/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_meta_endpoints() {
        let app = app();

        let (status, headers, health) = call(&app, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(health["status"], "ok");
        assert_eq!(health["environment"], "development");
        assert_eq!(headers[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
        assert_eq!(headers[header::X_FRAME_OPTIONS], "SAMEORIGIN");

        let (_, _, info) = call(&app, get("/api/info")).await;
        assert_eq!(
            info["stats"],
            json!({"totalArticles": 1, "totalUsers": 1, "totalComments": 1})
        );
        assert_eq!(info["endpoints"]["docs"], "/docs");

        let (_, _, root) = call(&app, get("/")).await;
        assert_eq!(root["message"], "Custom Blog API Server");
        assert_eq!(root["documentation"], "/docs");
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let (status, _, json) = call(&app(), get("/api/nothing-here")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["message"], "Route GET /api/nothing-here not found");
        assert!(
            json["availableEndpoints"]
                .as_array()
                .unwrap()
                .contains(&json!("GET /health"))
        );
    }

    #[tokio::test]
    async fn test_rate_limit_applies_to_api_only() {
        let app = app_with_limit(2);

        for _ in 0..2 {
            let (status, _, _) = call(&app, get("/api/articles")).await;
            assert_eq!(status, StatusCode::OK);
        }

        let (status, headers, json) = call(&app, get("/api/articles")).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(json["code"], 429);
        assert!(headers.contains_key(header::RETRY_AFTER));
        assert_eq!(headers[header::X_CONTENT_TYPE_OPTIONS], "nosniff");

        let (status, _, _) = call(&app, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_cors_preflight() {
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/articles")
            .header(header::ORIGIN, "http://localhost:3000")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        let headers = response.headers();
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://localhost:3000"
        );
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
    }

    #[tokio::test]
    async fn test_cors_headers_on_traced_api_response() {
        let request = Request::builder()
            .uri("/api/articles")
            .header(header::ORIGIN, "http://localhost:3003")
            .body(Body::empty())
            .unwrap();

        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://localhost:3003"
        );
        assert_eq!(headers["x-ratelimit-limit"], "1000");
        assert_eq!(headers[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
    }

    #[test]
    fn test_wildcard_origin_drops_credentials() {
        // Building the layer must not panic on the wildcard.
        let _ = cors_layer(&["*".to_string()]);
        let _ = cors_layer(&["not a valid\norigin".to_string()]);
    }
}
