//! Filtering and offset pagination over in-memory collections.

use serde::Serialize;

use crate::model::Article;

pub const DEFAULT_PAGE: usize = 1;
pub const DEFAULT_ARTICLE_LIMIT: usize = 10;
pub const DEFAULT_COMMENT_LIMIT: usize = 20;

/// A validated `page`/`limit` pair. Both are always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: usize,
    limit: usize,
}

impl PageRequest {
    /// Clamps zero values up to 1.
    pub fn new(page: usize, limit: usize) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    /// Parses raw query-string values, falling back to `page=1` and
    /// `default_limit` for anything missing, non-numeric or below 1.
    pub fn parse(page: Option<&str>, limit: Option<&str>, default_limit: usize) -> Self {
        Self::new(
            parse_positive(page).unwrap_or(DEFAULT_PAGE),
            parse_positive(limit).unwrap_or(default_limit),
        )
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.limit)
    }
}

/// Parses a query-string integer, rejecting anything below 1.
pub fn parse_positive(raw: Option<&str>) -> Option<usize> {
    raw.and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|v| *v >= 1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: usize,
    pub limit: usize,
    /// Number of records matching the filters, before slicing.
    pub total: usize,
    pub total_pages: usize,
}

/// One slice of a filtered collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }
}

/// Slices `matches` according to `request`. Pages past the end are empty.
pub fn paginate<T: Clone>(matches: &[&T], request: PageRequest) -> Page<T> {
    let total = matches.len();
    let items = matches
        .iter()
        .skip(request.offset())
        .take(request.limit())
        .map(|item| (*item).clone())
        .collect();

    Page {
        items,
        pagination: Pagination {
            page: request.page(),
            limit: request.limit(),
            total,
            total_pages: total.div_ceil(request.limit()),
        },
    }
}

/// Conjunctive predicates for listing articles. `None` means "don't filter".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleFilter {
    pub author: Option<String>,
    pub tag: Option<String>,
    pub published: Option<bool>,
    pub search: Option<String>,
}

impl ArticleFilter {
    pub fn matches(&self, article: &Article) -> bool {
        if let Some(author) = &self.author
            && article.author.as_ref().map(|a| a.id.as_str()) != Some(author.as_str())
        {
            return false;
        }

        if let Some(tag) = &self.tag
            && !article.tags.iter().any(|t| t == tag)
        {
            return false;
        }

        if let Some(published) = self.published
            && article.published != published
        {
            return false;
        }

        match &self.search {
            Some(search) => article.text_contains(&search.to_lowercase()),
            None => true,
        }
    }
}
