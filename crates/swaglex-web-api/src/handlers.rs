pub mod blog;
pub mod docs;
pub mod meta;

use std::{sync::Arc, time::Instant};
use swaglex_blog::BlogStore;
use tokio::sync::Mutex;

use crate::{config::Config, spec::ApiSpec};

pub const SERVICE_NAME: &str = "swaglex-blog-api";

/// Shared by every handler. The store sits behind one mutex so each request's
/// reads and writes, including view-count bumps, apply atomically.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Mutex<BlogStore>>,
    pub spec: Arc<ApiSpec>,
    pub environment: Arc<str>,
    pub docs_path: Arc<str>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(store: BlogStore, spec: ApiSpec, config: &Config) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            spec: Arc::new(spec),
            environment: config.environment.as_str().into(),
            docs_path: config.docs_path.as_str().into(),
            started_at: Instant::now(),
        }
    }
}
