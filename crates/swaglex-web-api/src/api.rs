//! Query parameters and response bodies of the blog endpoints.
//!
//! Query parameters are taken as raw strings so that malformed numbers fall
//! back to their defaults instead of rejecting the request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use swaglex_blog::{
    Article, ArticleFilter, ArticleRef, Comment, Page, PageRequest, Pagination, SearchScope,
    TagIndex,
    query::{self, DEFAULT_ARTICLE_LIMIT, DEFAULT_COMMENT_LIMIT},
    search::DEFAULT_SEARCH_LIMIT,
};
use utoipa::ToSchema;

#[derive(Debug, Default, Deserialize)]
pub struct ArticleListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub author: Option<String>,
    pub tag: Option<String>,
    pub published: Option<String>,
    pub search: Option<String>,
}

impl ArticleListParams {
    /// Unpublished articles are only listed when asked for explicitly, and
    /// any value other than `true` selects them.
    pub fn filter(&self) -> ArticleFilter {
        ArticleFilter {
            author: non_empty(&self.author),
            tag: non_empty(&self.tag),
            published: Some(self.published.as_deref().is_none_or(|v| v == "true")),
            search: non_empty(&self.search),
        }
    }

    pub fn page_request(&self) -> PageRequest {
        PageRequest::parse(
            self.page.as_deref(),
            self.limit.as_deref(),
            DEFAULT_ARTICLE_LIMIT,
        )
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl PageParams {
    pub fn comment_page_request(&self) -> PageRequest {
        PageRequest::parse(
            self.page.as_deref(),
            self.limit.as_deref(),
            DEFAULT_COMMENT_LIMIT,
        )
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub limit: Option<String>,
}

impl SearchParams {
    pub fn scope(&self) -> SearchScope {
        match self.kind.as_deref() {
            None | Some("") => SearchScope::default(),
            Some(kind) => kind.parse().unwrap_or(SearchScope::Nothing),
        }
    }

    pub fn limit(&self) -> usize {
        query::parse_positive(self.limit.as_deref()).unwrap_or(DEFAULT_SEARCH_LIMIT)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AnalyticsParams {
    pub period: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ArticleListResponse {
    pub articles: Vec<Article>,
    pub pagination: Pagination,
}

impl From<Page<Article>> for ArticleListResponse {
    fn from(page: Page<Article>) -> Self {
        Self {
            articles: page.items,
            pagination: page.pagination,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CommentListResponse {
    pub comments: Vec<Comment>,
    pub pagination: Pagination,
}

impl From<Page<Comment>> for CommentListResponse {
    fn from(page: Page<Comment>) -> Self {
        Self {
            comments: page.items,
            pagination: page.pagination,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ArticleTagsResponse {
    pub tags: Vec<ArticleTag>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ArticleTag {
    #[schema(example = "rust")]
    pub name: String,
    pub count: usize,
    pub articles: Vec<ArticleRef>,
}

impl From<TagIndex<ArticleRef>> for ArticleTagsResponse {
    fn from(index: TagIndex<ArticleRef>) -> Self {
        Self {
            tags: index
                .into_iter()
                .map(|group| ArticleTag {
                    count: group.count(),
                    name: group.name,
                    articles: group.entries,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: String,
    pub version: Option<String>,
    pub service: String,
    pub environment: String,
    /// Seconds since the server started.
    pub uptime: f64,
    pub timestamp: DateTime<Utc>,
    pub features: Vec<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InfoResponse {
    pub name: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
    pub environment: String,
    pub endpoints: InfoEndpoints,
    pub stats: StoreStats,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct InfoEndpoints {
    pub articles: String,
    pub users: String,
    pub analytics: String,
    pub search: String,
    pub docs: String,
    pub spec: SpecLinks,
    pub health: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SpecLinks {
    pub json: String,
    pub yaml: String,
}

impl Default for SpecLinks {
    fn default() -> Self {
        Self {
            json: "/spec.json".to_string(),
            yaml: "/spec.yaml".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoreStats {
    pub total_articles: usize,
    pub total_users: usize,
    pub total_comments: usize,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RootResponse {
    pub message: String,
    pub version: Option<String>,
    pub documentation: String,
    pub api: RootLinks,
    pub environment: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RootLinks {
    pub info: String,
    pub spec: SpecLinks,
    pub health: String,
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}
