use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named, orderable collection of sections. At most one landing page is
/// active system-wide; a partial unique index enforces it in the store.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct LandingPage {
    pub id: i64,
    pub name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Association row placing a section on a landing page at a position.
/// A section appears at most once per page but may be on several pages.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct LandingPageSection {
    pub id: i64,
    pub landing_page_id: i64,
    pub section_id: i64,
    pub position: i32,
}
