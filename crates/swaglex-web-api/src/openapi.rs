use swaglex_blog::{
    Analytics, Article, ArticleRef, AuthorSnapshot, Comment, Engagement, FieldError, NewArticle,
    NewComment, Pagination, ProfileUpdate, SearchResults, TopArticle, User,
};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};

use crate::{
    api::{
        ArticleListResponse, ArticleTag, ArticleTagsResponse, CommentListResponse, HealthResponse,
        InfoResponse, RootResponse, StoreStats,
    },
    handlers::{blog, docs, meta},
    problem::ErrorBody,
    spec::{OperationTags, PathsReport, SpecStats, VersionInfo},
};

/// Registers the bearer scheme referenced by the protected operations.
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Custom Blog API",
        description = "A blog API with articles, comments, user profiles, analytics and search, \
                       documented with OpenAPI and served with Swagger UI."
    ),
    servers(
        (url = "http://localhost:3003", description = "Local development server")
    ),
    paths(
        blog::list_articles,
        blog::create_article,
        blog::article_tags,
        blog::get_article,
        blog::list_comments,
        blog::add_comment,
        blog::get_profile,
        blog::update_profile,
        blog::analytics,
        blog::search,
        docs::spec_json,
        docs::spec_yaml,
        docs::spec_stats,
        docs::spec_paths,
        docs::spec_tags,
        docs::spec_version,
        meta::root,
        meta::info,
        meta::health
    ),
    components(
        schemas(Article, AuthorSnapshot, Comment, User, NewArticle, NewComment, ProfileUpdate),
        schemas(Pagination, ArticleListResponse, CommentListResponse),
        schemas(ArticleRef, ArticleTag, ArticleTagsResponse),
        schemas(Analytics, TopArticle, Engagement, SearchResults),
        schemas(ErrorBody, FieldError),
        schemas(SpecStats, PathsReport, OperationTags, VersionInfo),
        schemas(HealthResponse, InfoResponse, RootResponse, StoreStats)
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "articles", description = "Blog articles"),
        (name = "comments", description = "Comments on articles"),
        (name = "users", description = "The signed-in user's profile"),
        (name = "analytics", description = "Aggregate blog statistics"),
        (name = "search", description = "Search across articles, comments and users"),
        (name = "documentation", description = "The OpenAPI document and summaries of it"),
        (name = "system", description = "Health and service metadata")
    )
)]
pub struct ApiDoc;
