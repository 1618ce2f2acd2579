use serde::Serialize;

use crate::model::Article;

pub const DEFAULT_PERIOD: &str = "month";
const TOP_ARTICLES: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Analytics {
    /// Echo of the requested reporting period; the figures are not windowed.
    pub period: String,
    pub total_articles: usize,
    pub total_comments: usize,
    pub total_users: usize,
    pub total_views: u64,
    pub top_articles: Vec<TopArticle>,
    pub engagement: Engagement,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TopArticle {
    pub article: Article,
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
}

/// Per-article averages. All zero for an empty collection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Engagement {
    pub avg_views_per_article: f64,
    pub avg_comments_per_article: f64,
    pub avg_likes_per_article: f64,
}

pub(crate) fn compute(
    period: String,
    articles: &[Article],
    total_comments: usize,
    total_users: usize,
) -> Analytics {
    let total_views: u64 = articles.iter().map(|a| a.view_count).sum();

    // `sort_by` is stable, so equal view counts keep collection order.
    let mut ranked: Vec<&Article> = articles.iter().collect();
    ranked.sort_by(|a, b| b.view_count.cmp(&a.view_count));

    let top_articles = ranked
        .into_iter()
        .take(TOP_ARTICLES)
        .map(|article| TopArticle {
            article: article.clone(),
            views: article.view_count,
            likes: article.like_count,
            comments: article.comment_count,
        })
        .collect();

    Analytics {
        period,
        total_articles: articles.len(),
        total_comments,
        total_users,
        total_views,
        top_articles,
        engagement: Engagement {
            avg_views_per_article: average(articles, |a| a.view_count),
            avg_comments_per_article: average(articles, |a| a.comment_count),
            avg_likes_per_article: average(articles, |a| a.like_count),
        },
    }
}

fn average(articles: &[Article], field: impl Fn(&Article) -> u64) -> f64 {
    if articles.is_empty() {
        return 0.0;
    }
    let sum: u64 = articles.iter().map(field).sum();
    sum as f64 / articles.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn article(id: &str, views: u64, likes: u64, comments: u64) -> Article {
        let now = Utc::now();
        Article {
            id: id.to_string(),
            title: format!("Article {id}"),
            slug: format!("article-{id}"),
            content: String::new(),
            excerpt: String::new(),
            author: None,
            tags: Vec::new(),
            published: true,
            published_at: Some(now),
            view_count: views,
            like_count: likes,
            comment_count: comments,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_empty_collection_has_zero_averages() {
        let analytics = compute(DEFAULT_PERIOD.to_string(), &[], 0, 0);
        assert_eq!(analytics.total_views, 0);
        assert!(analytics.top_articles.is_empty());
        assert_eq!(analytics.engagement.avg_views_per_article, 0.0);
        assert_eq!(analytics.engagement.avg_comments_per_article, 0.0);
        assert_eq!(analytics.engagement.avg_likes_per_article, 0.0);
    }

    #[test]
    fn test_top_articles_descending_and_stable() {
        let articles = vec![
            article("a", 10, 0, 0),
            article("b", 30, 0, 0),
            article("c", 10, 0, 0),
            article("d", 5, 0, 0),
            article("e", 30, 0, 0),
            article("f", 1, 0, 0),
            article("g", 100, 0, 0),
        ];
        let analytics = compute("week".to_string(), &articles, 0, 0);
        let ids: Vec<&str> = analytics
            .top_articles
            .iter()
            .map(|t| t.article.id.as_str())
            .collect();
        assert_eq!(ids, vec!["g", "b", "e", "a", "c"]);
        assert_eq!(analytics.period, "week");
    }

    #[test]
    fn test_totals_and_averages() {
        let articles = vec![article("a", 10, 4, 1), article("b", 20, 2, 3)];
        let analytics = compute(DEFAULT_PERIOD.to_string(), &articles, 7, 2);
        assert_eq!(analytics.total_articles, 2);
        assert_eq!(analytics.total_comments, 7);
        assert_eq!(analytics.total_users, 2);
        assert_eq!(analytics.total_views, 30);
        assert_eq!(analytics.engagement.avg_views_per_article, 15.0);
        assert_eq!(analytics.engagement.avg_comments_per_article, 2.0);
        assert_eq!(analytics.engagement.avg_likes_per_article, 3.0);
    }
}
