use std::{convert::Infallible, str::FromStr};

use serde::Serialize;

use crate::{
    error::{BlogError, FieldError},
    model::{Article, Comment, User},
};

pub const MIN_QUERY_CHARS: usize = 2;
pub const DEFAULT_SEARCH_LIMIT: usize = 20;

/// Which collections a search covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchScope {
    #[default]
    All,
    Articles,
    Comments,
    Users,
    /// An unrecognised type name. Covers no collection.
    Nothing,
}

impl SearchScope {
    pub fn includes_articles(self) -> bool {
        matches!(self, Self::All | Self::Articles)
    }

    pub fn includes_comments(self) -> bool {
        matches!(self, Self::All | Self::Comments)
    }

    pub fn includes_users(self) -> bool {
        matches!(self, Self::All | Self::Users)
    }
}

impl FromStr for SearchScope {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "all" => Self::All,
            "articles" => Self::Articles,
            "comments" => Self::Comments,
            "users" => Self::Users,
            _ => Self::Nothing,
        })
    }
}

/// A checked search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    query: String,
    needle: String,
    scope: SearchScope,
    limit: usize,
}

impl SearchQuery {
    /// Fails when `query` is shorter than two characters.
    pub fn new(query: impl Into<String>, scope: SearchScope, limit: usize) -> crate::Result<Self> {
        let query = query.into();
        if query.chars().count() < MIN_QUERY_CHARS {
            return Err(BlogError::validation(
                "Search query must be at least 2 characters long",
                vec![FieldError::new("q", "Query must be at least 2 characters")],
            ));
        }

        Ok(Self {
            needle: query.to_lowercase(),
            query,
            scope,
            limit: limit.max(1),
        })
    }

    pub fn scope(&self) -> SearchScope {
        self.scope
    }
}

/// Matches per collection. Collections outside the requested scope are
/// `None` and left out of the serialized form.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    pub query: String,
    pub total_results: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub articles: Option<Vec<Article>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<Comment>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub users: Option<Vec<User>>,
}

pub(crate) fn run(
    search: &SearchQuery,
    articles: &[Article],
    comments: &[Comment],
    users: &[User],
) -> SearchResults {
    let needle = search.needle.as_str();
    let scope = search.scope;

    let articles = scope.includes_articles().then(|| {
        articles
            .iter()
            .filter(|a| a.text_contains(needle) || a.tags_contain(needle))
            .take(search.limit)
            .cloned()
            .collect::<Vec<_>>()
    });

    let comments = scope.includes_comments().then(|| {
        comments
            .iter()
            .filter(|c| c.content.to_lowercase().contains(needle))
            .take(search.limit)
            .cloned()
            .collect::<Vec<_>>()
    });

    let users = scope.includes_users().then(|| {
        users
            .iter()
            .filter(|u| u.matches(needle))
            .take(search.limit)
            .cloned()
            .collect::<Vec<_>>()
    });

    let total_results = articles.as_ref().map_or(0, Vec::len)
        + comments.as_ref().map_or(0, Vec::len)
        + users.as_ref().map_or(0, Vec::len);

    SearchResults {
        query: search.query.clone(),
        total_results,
        articles,
        comments,
        users,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("all", SearchScope::All)]
    #[case("articles", SearchScope::Articles)]
    #[case("comments", SearchScope::Comments)]
    #[case("users", SearchScope::Users)]
    fn test_scope_from_str(#[case] raw: &str, #[case] expected: SearchScope) {
        assert_eq!(raw.parse::<SearchScope>().unwrap(), expected);
    }

    #[test]
    fn test_unknown_scope_covers_nothing() {
        let scope = "posts".parse::<SearchScope>().unwrap();
        assert_eq!(scope, SearchScope::Nothing);

        let query = SearchQuery::new("ab", scope, 20).unwrap();
        let results = run(&query, &[], &[], &[]);
        assert_eq!(results.total_results, 0);

        let json = serde_json::to_value(&results).unwrap();
        assert_eq!(json, serde_json::json!({"query": "ab", "totalResults": 0}));
    }

    #[rstest]
    #[case("", false)]
    #[case("a", false)]
    #[case("é", false)]
    #[case("ab", true)]
    #[case("éé", true)]
    fn test_query_length(#[case] query: &str, #[case] ok: bool) {
        assert_eq!(SearchQuery::new(query, SearchScope::All, 20).is_ok(), ok);
    }

    #[test]
    fn test_empty_collections_give_present_empty_arrays() {
        let query = SearchQuery::new("ab", SearchScope::All, 20).unwrap();
        let results = run(&query, &[], &[], &[]);
        assert_eq!(results.total_results, 0);
        assert_eq!(results.articles, Some(vec![]));
        assert_eq!(results.comments, Some(vec![]));
        assert_eq!(results.users, Some(vec![]));
    }

    #[test]
    fn test_scope_omits_other_collections() {
        let query = SearchQuery::new("ab", SearchScope::Users, 20).unwrap();
        let results = run(&query, &[], &[], &[]);
        assert!(results.articles.is_none());
        assert!(results.comments.is_none());
        assert_eq!(results.users, Some(vec![]));

        let json = serde_json::to_value(&results).unwrap();
        assert!(json.get("articles").is_none());
        assert!(json.get("users").is_some());
    }
}
