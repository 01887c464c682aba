use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use flimix_core::page::assemble::{assemble, PageDocument};
use flimix_core::section::resolver::{resolve_section, ResolvedEntry};
use flimix_core::section::Section;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/page-data", get(page_data))
}

#[derive(Debug, Deserialize)]
struct PageDataQuery {
    /// Preview a specific landing page instead of the active one.
    landing_page: Option<i64>,
}

/// The page document for the active landing page (materializing the
/// default page on first access), or for an explicitly named page when
/// the admin canvas is previewing.
async fn page_data(
    State(state): State<AppState>,
    Query(query): Query<PageDataQuery>,
) -> ApiResult<Json<PageDocument>> {
    let page = match query.landing_page {
        Some(id) => state
            .pages()
            .get(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("landing page {id} not found")))?,
        None => state.pages().get_or_create_active().await?,
    };

    let sections = state.pages().sections_of(page.id).await?;
    let mut resolved: Vec<(Section, Vec<ResolvedEntry>)> = Vec::with_capacity(sections.len());
    for (_, section) in sections {
        let entries = resolve_section(state.content(), state.sections(), &section).await?;
        resolved.push((section, entries));
    }

    Ok(Json(assemble(&resolved)))
}
