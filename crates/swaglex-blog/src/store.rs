use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::{
    Result,
    analytics::{self, Analytics},
    error::{BlogError, FieldError},
    ids::{IdGenerator, MonotonicIds},
    model::{
        Article, AuthorSnapshot, Comment, NewArticle, NewComment, ProfileUpdate, User,
        dedup_tags, derive_excerpt, non_empty, slugify,
    },
    query::{ArticleFilter, Page, PageRequest, paginate},
    search::{self, SearchQuery, SearchResults},
    tags::TagIndex,
};

/// The part of an article listed under a tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ArticleRef {
    pub id: String,
    pub title: String,
    pub slug: String,
}

impl From<&Article> for ArticleRef {
    fn from(article: &Article) -> Self {
        Self {
            id: article.id.clone(),
            title: article.title.clone(),
            slug: article.slug.clone(),
        }
    }
}

/// Owns the article, comment and user collections.
///
/// Collections preserve insertion order. The store does no locking of its
/// own: callers that share it across tasks wrap it in a single mutex so
/// that every operation, including the view-count bump on reads, is atomic.
pub struct BlogStore {
    articles: Vec<Article>,
    comments: Vec<Comment>,
    users: Vec<User>,
    ids: Box<dyn IdGenerator>,
}

impl Default for BlogStore {
    fn default() -> Self {
        Self::new(Box::new(MonotonicIds::new()))
    }
}

impl BlogStore {
    pub fn new(ids: Box<dyn IdGenerator>) -> Self {
        Self {
            articles: Vec::new(),
            comments: Vec::new(),
            users: Vec::new(),
            ids,
        }
    }

    /// A store holding the demonstration article, comment and profile.
    pub fn seeded() -> Self {
        let mut store = Self::default();
        for user in seed_users() {
            store.insert_user(user);
        }
        for article in seed_articles() {
            store.insert_article(article);
        }
        for comment in seed_comments() {
            store.insert_comment(comment);
        }
        store
    }

    /// Appends a fully formed article without validation or side effects.
    pub fn insert_article(&mut self, article: Article) {
        self.articles.push(article);
    }

    /// Appends a fully formed comment. Does not touch `commentCount`.
    pub fn insert_comment(&mut self, comment: Comment) {
        self.comments.push(comment);
    }

    pub fn insert_user(&mut self, user: User) {
        self.users.push(user);
    }

    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn list_articles(&self, filter: &ArticleFilter, request: PageRequest) -> Page<Article> {
        let matches: Vec<&Article> = self.articles.iter().filter(|a| filter.matches(a)).collect();
        debug!(
            "Listing articles: {} of {} match {:?}",
            matches.len(),
            self.articles.len(),
            filter
        );
        paginate(&matches, request)
    }

    /// Looks up an article and counts the read as a view.
    pub fn get_article(&mut self, id: &str) -> Result<Article> {
        let article = self
            .articles
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| BlogError::not_found("Article", id))?;

        article.view_count += 1;
        Ok(article.clone())
    }

    pub fn create_article(
        &mut self,
        payload: NewArticle,
        author: Option<AuthorSnapshot>,
    ) -> Result<Article> {
        let title = non_empty(payload.title);
        let content = non_empty(payload.content);

        let (title, content) = match (title, content) {
            (Some(title), Some(content)) => (title, content),
            (title, content) => {
                let mut details = Vec::new();
                if title.is_none() {
                    details.push(FieldError::new("title", "Title is required"));
                }
                if content.is_none() {
                    details.push(FieldError::new("content", "Content is required"));
                }
                return Err(BlogError::validation(
                    "Title and content are required",
                    details,
                ));
            }
        };

        let now = Utc::now();
        let published = payload.published.unwrap_or(false);
        let article = Article {
            id: self.ids.next_id(),
            slug: slugify(&title),
            excerpt: non_empty(payload.excerpt).unwrap_or_else(|| derive_excerpt(&content)),
            title,
            content,
            author,
            tags: dedup_tags(payload.tags.unwrap_or_default()),
            published,
            published_at: published.then_some(now),
            view_count: 0,
            like_count: 0,
            comment_count: 0,
            created_at: now,
            updated_at: now,
        };

        info!("Created article {} ({})", article.id, article.slug);
        self.articles.push(article.clone());
        Ok(article)
    }

    /// Comments for `article_id`, in insertion order. The article itself is
    /// not required to exist.
    pub fn list_comments(&self, article_id: &str, request: PageRequest) -> Page<Comment> {
        let matches: Vec<&Comment> = self
            .comments
            .iter()
            .filter(|c| c.article_id == article_id)
            .collect();
        paginate(&matches, request)
    }

    /// Stores a comment and bumps the article's `commentCount` when the
    /// article exists. Comments on unknown articles are still stored.
    pub fn add_comment(
        &mut self,
        article_id: &str,
        payload: NewComment,
        author: Option<AuthorSnapshot>,
    ) -> Result<Comment> {
        let Some(content) = non_empty(payload.content) else {
            return Err(BlogError::validation(
                "Comment content is required",
                vec![FieldError::new("content", "Content is required")],
            ));
        };

        let now = Utc::now();
        let comment = Comment {
            id: self.ids.next_id(),
            content,
            author,
            article_id: article_id.to_string(),
            parent_id: non_empty(payload.parent_id),
            likes: 0,
            created_at: now,
            updated_at: now,
        };
        self.comments.push(comment.clone());

        match self.articles.iter_mut().find(|a| a.id == article_id) {
            Some(article) => article.comment_count += 1,
            None => debug!("Comment {} references unknown article {}", comment.id, article_id),
        }

        info!("Added comment {} to article {}", comment.id, article_id);
        Ok(comment)
    }

    /// The profile of the signed-in user. The demo has exactly one.
    pub fn profile(&self) -> Result<User> {
        self.users
            .first()
            .cloned()
            .ok_or_else(|| BlogError::not_found("User", "profile"))
    }

    pub fn update_profile(&mut self, update: ProfileUpdate) -> Result<User> {
        let user = self
            .users
            .first_mut()
            .ok_or_else(|| BlogError::not_found("User", "profile"))?;

        if let Some(first_name) = non_empty(update.first_name) {
            user.first_name = first_name;
        }
        if let Some(last_name) = non_empty(update.last_name) {
            user.last_name = last_name;
        }
        if let Some(bio) = non_empty(update.bio) {
            user.bio = Some(bio);
        }
        if let Some(avatar) = non_empty(update.avatar) {
            user.avatar = Some(avatar);
        }
        user.updated_at = Utc::now();

        info!("Updated profile for {}", user.username);
        Ok(user.clone())
    }

    pub fn analytics(&self, period: Option<String>) -> Analytics {
        analytics::compute(
            non_empty(period).unwrap_or_else(|| analytics::DEFAULT_PERIOD.to_string()),
            &self.articles,
            self.comments.len(),
            self.users.len(),
        )
    }

    pub fn search(&self, query: &SearchQuery) -> SearchResults {
        search::run(query, &self.articles, &self.comments, &self.users)
    }

    pub fn article_tags(&self) -> TagIndex<ArticleRef> {
        TagIndex::build(
            self.articles
                .iter()
                .map(|article| (&article.tags, ArticleRef::from(article))),
        )
    }
}

fn seed_time(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 1, day, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

fn seed_users() -> Vec<User> {
    vec![User {
        id: "123e4567-e89b-12d3-a456-426614174001".to_string(),
        username: "johndoe".to_string(),
        email: "john.doe@example.com".to_string(),
        first_name: "John".to_string(),
        last_name: "Doe".to_string(),
        bio: Some("Full-stack developer passionate about APIs".to_string()),
        avatar: None,
        role: "writer".to_string(),
        article_count: 15,
        follower_count: 250,
        following_count: 180,
        created_at: seed_time(1),
        updated_at: seed_time(1),
    }]
}

fn seed_articles() -> Vec<Article> {
    vec![Article {
        id: "123e4567-e89b-12d3-a456-426614174000".to_string(),
        title: "Getting Started with API Documentation".to_string(),
        slug: "getting-started-with-api-documentation".to_string(),
        content: "This is a comprehensive guide to API documentation...".to_string(),
        excerpt: "A brief introduction to API documentation best practices".to_string(),
        author: Some(AuthorSnapshot {
            id: "123e4567-e89b-12d3-a456-426614174001".to_string(),
            username: "johndoe".to_string(),
            email: Some("john.doe@example.com".to_string()),
            first_name: Some("John".to_string()),
            last_name: Some("Doe".to_string()),
        }),
        tags: vec![
            "api".to_string(),
            "documentation".to_string(),
            "tutorial".to_string(),
        ],
        published: true,
        published_at: Some(seed_time(1)),
        view_count: 1250,
        like_count: 42,
        comment_count: 8,
        created_at: seed_time(1),
        updated_at: seed_time(1),
    }]
}

fn seed_comments() -> Vec<Comment> {
    vec![Comment {
        id: "123e4567-e89b-12d3-a456-426614174002".to_string(),
        content: "Great article! Very helpful for beginners.".to_string(),
        author: Some(AuthorSnapshot {
            id: "123e4567-e89b-12d3-a456-426614174003".to_string(),
            username: "janedoe".to_string(),
            email: Some("jane.doe@example.com".to_string()),
            first_name: Some("Jane".to_string()),
            last_name: Some("Doe".to_string()),
        }),
        article_id: "123e4567-e89b-12d3-a456-426614174000".to_string(),
        parent_id: None,
        likes: 5,
        created_at: seed_time(2),
        updated_at: seed_time(2),
    }]
}
