use axum::{
    extract::{Path, State},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use flimix_core::page::LandingPage;
use flimix_core::section::Section;

use crate::error::ApiResult;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/landing-pages", get(list).post(create))
        .route("/api/landing-pages/{id}", put(update).delete(remove))
        .route("/api/landing-pages/{id}/activate", post(activate))
        .route(
            "/api/landing-pages/{id}/sections",
            get(sections).post(add_section),
        )
        .route(
            "/api/landing-pages/{id}/sections/{section_id}",
            delete(remove_section),
        )
        .route(
            "/api/landing-pages/{id}/sections/reorder",
            post(reorder_sections),
        )
}

async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<LandingPage>>> {
    Ok(Json(state.pages().list().await?))
}

#[derive(Debug, Deserialize)]
struct PageName {
    name: String,
}

async fn create(
    State(state): State<AppState>,
    Json(body): Json<PageName>,
) -> ApiResult<Json<LandingPage>> {
    Ok(Json(state.pages().create(&body.name).await?))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<PageName>,
) -> ApiResult<Json<LandingPage>> {
    Ok(Json(state.pages().rename(id, &body.name).await?))
}

/// Refused for the active page.
async fn remove(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Json<Value>> {
    state.pages().delete(id).await?;
    Ok(Json(json!({ "deleted": id })))
}

/// Make this the single active landing page.
async fn activate(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<LandingPage>> {
    Ok(Json(state.pages().activate(id).await?))
}

#[derive(Debug, Serialize)]
struct PlacedSection {
    position: i32,
    section: Section,
}

async fn sections(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Vec<PlacedSection>>> {
    let placed = state.pages().sections_of(id).await?;
    Ok(Json(
        placed
            .into_iter()
            .map(|(link, section)| PlacedSection {
                position: link.position,
                section,
            })
            .collect(),
    ))
}

#[derive(Debug, Deserialize)]
struct AddSection {
    section_id: i64,
}

async fn add_section(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<AddSection>,
) -> ApiResult<Json<Value>> {
    let link = state.pages().add_section(id, body.section_id).await?;
    Ok(Json(json!({
        "landing_page_id": link.landing_page_id,
        "section_id": link.section_id,
        "position": link.position,
    })))
}

async fn remove_section(
    State(state): State<AppState>,
    Path((id, section_id)): Path<(i64, i64)>,
) -> ApiResult<Json<Value>> {
    state.pages().remove_section(id, section_id).await?;
    Ok(Json(json!({ "deleted": section_id })))
}

#[derive(Debug, Deserialize)]
struct ReorderSections {
    section_ids: Vec<i64>,
}

/// Reorder the page's sections. Ids not on the page are skipped.
async fn reorder_sections(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<ReorderSections>,
) -> ApiResult<Json<Value>> {
    state
        .pages()
        .reorder_sections(id, &body.section_ids)
        .await?;
    Ok(Json(json!({ "reordered": body.section_ids.len() })))
}
