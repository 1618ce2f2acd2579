use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::Json,
};
use swaglex_blog::{
    Analytics, Article, Comment, NewArticle, NewComment, ProfileUpdate, SearchQuery,
    SearchResults, User,
};
use tracing::{debug, info, warn};

use crate::{
    api::{
        AnalyticsParams, ArticleListParams, ArticleListResponse, ArticleTagsResponse,
        CommentListResponse, PageParams, SearchParams,
    },
    auth::{AuthUser, authenticate},
    handlers::AppState,
    problem::{ApiError, ErrorBody},
};

#[utoipa::path(
    get,
    path = "/api/articles",
    tag = "articles",
    responses(
        (status = 200, description = "A page of articles", body = ArticleListResponse),
        (status = 429, description = "Rate limit exceeded", body = ErrorBody),
    ),
    params(
        ("page" = Option<u32>, Query, description = "Page number, starting at 1"),
        ("limit" = Option<u32>, Query, description = "Articles per page (default 10)"),
        ("author" = Option<String>, Query, description = "Only articles by this author id"),
        ("tag" = Option<String>, Query, description = "Only articles carrying this tag"),
        ("published" = Option<String>, Query, description = "'true' (default) for published articles, anything else for drafts"),
        ("search" = Option<String>, Query, description = "Case-insensitive text over title and content")
    )
)]
pub async fn list_articles(
    State(state): State<AppState>,
    Query(params): Query<ArticleListParams>,
) -> Json<ArticleListResponse> {
    let filter = params.filter();
    let request = params.page_request();
    debug!("GET /api/articles called with filter: {:?}, {:?}", filter, request);

    let page = state.store.lock().await.list_articles(&filter, request);
    debug!(
        "Returning {} of {} articles",
        page.items.len(),
        page.pagination.total
    );
    Json(page.into())
}

#[utoipa::path(
    get,
    path = "/api/articles/tags",
    tag = "articles",
    responses(
        (status = 200, description = "Articles grouped by tag", body = ArticleTagsResponse),
    )
)]
pub async fn article_tags(State(state): State<AppState>) -> Json<ArticleTagsResponse> {
    let index = state.store.lock().await.article_tags();
    debug!("GET /api/articles/tags returning {} tags", index.len());
    Json(index.into())
}

#[utoipa::path(
    get,
    path = "/api/articles/{id}",
    tag = "articles",
    responses(
        (status = 200, description = "The article; its view count is incremented", body = Article),
        (status = 404, description = "Article not found", body = ErrorBody),
    ),
    params(("id" = String, Path, description = "Article id"))
)]
pub async fn get_article(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Article>, ApiError> {
    debug!("GET /api/articles/{} called", id);
    let article = state.store.lock().await.get_article(&id)?;
    Ok(Json(article))
}

#[utoipa::path(
    post,
    path = "/api/articles",
    tag = "articles",
    request_body = NewArticle,
    responses(
        (status = 201, description = "Article created", body = Article),
        (status = 400, description = "Title or content missing", body = ErrorBody),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorBody),
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_article(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<NewArticle>,
) -> Result<(StatusCode, Json<Article>), ApiError> {
    debug!("POST /api/articles called by {}", user.username);

    let article = state
        .store
        .lock()
        .await
        .create_article(payload, Some(user.snapshot()))
        .inspect_err(|e| warn!("Rejected article from {}: {}", user.username, e))?;

    info!("Article {} created by {}", article.id, user.username);
    Ok((StatusCode::CREATED, Json(article)))
}

#[utoipa::path(
    get,
    path = "/api/articles/{id}/comments",
    tag = "comments",
    responses(
        (status = 200, description = "A page of comments on the article", body = CommentListResponse),
    ),
    params(
        ("id" = String, Path, description = "Article id"),
        ("page" = Option<u32>, Query, description = "Page number, starting at 1"),
        ("limit" = Option<u32>, Query, description = "Comments per page (default 20)")
    )
)]
pub async fn list_comments(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<PageParams>,
) -> Json<CommentListResponse> {
    let request = params.comment_page_request();
    debug!("GET /api/articles/{}/comments called with {:?}", id, request);

    let page = state.store.lock().await.list_comments(&id, request);
    Json(page.into())
}

#[utoipa::path(
    post,
    path = "/api/articles/{id}/comments",
    tag = "comments",
    request_body = NewComment,
    responses(
        (status = 201, description = "Comment created", body = Comment),
        (status = 400, description = "Content missing", body = ErrorBody),
    ),
    params(("id" = String, Path, description = "Article id"))
)]
pub async fn add_comment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(payload): Json<NewComment>,
) -> Result<(StatusCode, Json<Comment>), ApiError> {
    // Credentials are optional here; anonymous comments carry no author.
    let author = authenticate(&headers).ok().map(|user| user.snapshot());
    debug!(
        "POST /api/articles/{}/comments called (author: {:?})",
        id,
        author.as_ref().map(|a| a.username.as_str())
    );

    let comment = state.store.lock().await.add_comment(&id, payload, author)?;
    Ok((StatusCode::CREATED, Json(comment)))
}

#[utoipa::path(
    get,
    path = "/api/users/profile",
    tag = "users",
    responses(
        (status = 200, description = "Profile of the signed-in user", body = User),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorBody),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_profile(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<User>, ApiError> {
    debug!("GET /api/users/profile called by {}", user.username);
    let profile = state.store.lock().await.profile()?;
    Ok(Json(profile))
}

#[utoipa::path(
    put,
    path = "/api/users/profile",
    tag = "users",
    request_body = ProfileUpdate,
    responses(
        (status = 200, description = "Updated profile", body = User),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorBody),
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_profile(
    user: AuthUser,
    State(state): State<AppState>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<User>, ApiError> {
    debug!("PUT /api/users/profile called by {}", user.username);
    let profile = state.store.lock().await.update_profile(update)?;
    Ok(Json(profile))
}

#[utoipa::path(
    get,
    path = "/api/analytics",
    tag = "analytics",
    responses(
        (status = 200, description = "Aggregate counts, top articles and engagement", body = Analytics),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorBody),
    ),
    params(("period" = Option<String>, Query, description = "Reporting period label (default month)")),
    security(("bearer_auth" = []))
)]
pub async fn analytics(
    user: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<AnalyticsParams>,
) -> Json<Analytics> {
    debug!(
        "GET /api/analytics called by {} for period {:?}",
        user.username, params.period
    );
    Json(state.store.lock().await.analytics(params.period))
}

#[utoipa::path(
    get,
    path = "/api/search",
    tag = "search",
    responses(
        (status = 200, description = "Matches per collection", body = SearchResults),
        (status = 400, description = "Query too short", body = ErrorBody),
    ),
    params(
        ("q" = String, Query, description = "Text to look for, at least 2 characters"),
        ("type" = Option<String>, Query, description = "articles, comments, users or all (default); other values match nothing"),
        ("limit" = Option<u32>, Query, description = "Maximum matches per collection (default 20)")
    )
)]
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResults>, ApiError> {
    let query = SearchQuery::new(
        params.q.clone().unwrap_or_default(),
        params.scope(),
        params.limit(),
    )?;
    debug!("GET /api/search called with {:?}", query);

    let results = state.store.lock().await.search(&query);
    debug!("Search for {:?} found {} results", results.query, results.total_results);
    Ok(Json(results))
}
