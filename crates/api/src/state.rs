use std::sync::Arc;

use flimix_core::content::ContentRepo;
use flimix_core::page::PageRepo;
use flimix_core::section::SectionRepo;
use sqlx::PgPool;

use crate::config::AppConfig;

/// Shared application state, passed to all handlers via Axum's `State` extractor.
/// Wrapped in `Arc` so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    pool: PgPool,
    #[allow(dead_code)]
    config: AppConfig,
    content: ContentRepo,
    sections: SectionRepo,
    pages: PageRepo,
}

impl AppState {
    pub fn new(pool: PgPool, config: AppConfig) -> Self {
        Self {
            inner: Arc::new(InnerState {
                content: ContentRepo::new(pool.clone()),
                sections: SectionRepo::new(pool.clone()),
                pages: PageRepo::new(pool.clone()),
                pool,
                config,
            }),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    pub fn content(&self) -> &ContentRepo {
        &self.inner.content
    }

    pub fn sections(&self) -> &SectionRepo {
        &self.inner.sections
    }

    pub fn pages(&self) -> &PageRepo {
        &self.inner.pages
    }
}
