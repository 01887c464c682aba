use axum::{
    extract::{Path, State},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use flimix_core::content::{ContentKind, ContentRef};
use flimix_core::section::resolver::{resolve_section, ResolvedEntry};
use flimix_core::section::{CreateSection, Section, SectionItem, UpdateSection};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/sections", get(list).post(create))
        .route("/api/sections/{id}", put(update).delete(remove))
        .route("/api/sections/{id}/content", get(content))
        .route("/api/sections/{id}/items", get(items).post(add_item))
        .route("/api/sections/{id}/items/{item_id}", delete(remove_item))
        .route("/api/sections/{id}/items/reorder", post(reorder_items))
}

#[derive(Debug, Serialize)]
struct SectionSummary {
    #[serde(flatten)]
    section: Section,
    item_count: i64,
}

async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<SectionSummary>>> {
    let sections = state.sections().list_with_item_counts().await?;
    Ok(Json(
        sections
            .into_iter()
            .map(|(section, item_count)| SectionSummary {
                section,
                item_count,
            })
            .collect(),
    ))
}

async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateSection>,
) -> ApiResult<Json<Section>> {
    Ok(Json(state.sections().create(&input).await?))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<UpdateSection>,
) -> ApiResult<Json<Section>> {
    Ok(Json(state.sections().update(id, &input).await?))
}

async fn remove(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Json<Value>> {
    state.sections().delete(id).await?;
    Ok(Json(json!({ "deleted": id })))
}

/// The full resolved sequence for the section. Hero truncation is a page
/// assembly concern and is not applied here.
async fn content(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Vec<ResolvedEntry>>> {
    let section = state
        .sections()
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("section {id} not found")))?;
    let entries = resolve_section(state.content(), state.sections(), &section).await?;
    Ok(Json(entries))
}

async fn items(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Vec<SectionItem>>> {
    Ok(Json(state.sections().items(id).await?))
}

#[derive(Debug, Deserialize)]
struct AddItem {
    content_kind: ContentKind,
    content_id: i64,
}

async fn add_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<AddItem>,
) -> ApiResult<Json<SectionItem>> {
    let content_ref = ContentRef::new(body.content_kind, body.content_id);
    Ok(Json(state.sections().add_item(id, content_ref).await?))
}

async fn remove_item(
    State(state): State<AppState>,
    Path((id, item_id)): Path<(i64, i64)>,
) -> ApiResult<Json<Value>> {
    state.sections().remove_item(id, item_id).await?;
    Ok(Json(json!({ "deleted": item_id })))
}

#[derive(Debug, Deserialize)]
struct ReorderItems {
    item_ids: Vec<i64>,
}

/// Reorder the section's manual items. Stale ids are skipped.
async fn reorder_items(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<ReorderItems>,
) -> ApiResult<Json<Value>> {
    state.sections().reorder_items(id, &body.item_ids).await?;
    Ok(Json(json!({ "reordered": body.item_ids.len() })))
}
