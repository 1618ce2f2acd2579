//! In-memory collections behind the swaglex demo blog API.
//!
//! [`BlogStore`] owns the articles, comments and users and answers list,
//! lookup, create, search and analytics queries over them. Nothing is
//! persisted; every collection lives for as long as the store does.
//!
//! ```rust
//! use swaglex_blog::{ArticleFilter, BlogStore, PageRequest};
//!
//! let store = BlogStore::seeded();
//! let page = store.list_articles(&ArticleFilter::default(), PageRequest::new(1, 10));
//! assert_eq!(page.pagination.total, 1);
//! ```
pub mod analytics;
pub mod error;
pub mod ids;
pub mod model;
pub mod query;
pub mod search;
pub mod store;
pub mod tags;

pub use analytics::{Analytics, Engagement, TopArticle};
pub use error::{BlogError, FieldError, Result};
pub use ids::{IdGenerator, MonotonicIds};
pub use model::{Article, AuthorSnapshot, Comment, NewArticle, NewComment, ProfileUpdate, User};
pub use query::{ArticleFilter, Page, PageRequest, Pagination};
pub use search::{SearchQuery, SearchResults, SearchScope};
pub use store::{ArticleRef, BlogStore};
pub use tags::{TagGroup, TagIndex};
